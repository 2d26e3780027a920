// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::f32::consts::PI;

use super::*;

pub struct Triangle;

impl Triangle {
    /// A single right triangle on the XY plane, facing +Z.
    pub fn build() -> MeshResult<HalfEdgeMesh> {
        HalfEdgeMesh::build_from_polygons(&[Vec3::ZERO, Vec3::X, Vec3::Y], &[[0u32, 1, 2]])
    }
}

pub struct Tetrahedron;

impl Tetrahedron {
    /// A regular tetrahedron centered at the origin, with its vertices on the
    /// unit sphere.
    pub fn build() -> MeshResult<HalfEdgeMesh> {
        let s = 1.0 / 3.0f32.sqrt();
        HalfEdgeMesh::build_from_polygons(
            &[
                Vec3::new(1.0, 1.0, 1.0) * s,
                Vec3::new(1.0, -1.0, -1.0) * s,
                Vec3::new(-1.0, 1.0, -1.0) * s,
                Vec3::new(-1.0, -1.0, 1.0) * s,
            ],
            &[[0u32, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]],
        )
    }
}

pub struct Cube;

impl Cube {
    pub fn build(center: Vec3, size: Vec3) -> MeshResult<HalfEdgeMesh> {
        let hsize = size * 0.5;

        let v1 = center + Vec3::new(-hsize.x, -hsize.y, -hsize.z);
        let v2 = center + Vec3::new(hsize.x, -hsize.y, -hsize.z);
        let v3 = center + Vec3::new(hsize.x, -hsize.y, hsize.z);
        let v4 = center + Vec3::new(-hsize.x, -hsize.y, hsize.z);

        let v5 = center + Vec3::new(-hsize.x, hsize.y, -hsize.z);
        let v6 = center + Vec3::new(-hsize.x, hsize.y, hsize.z);
        let v7 = center + Vec3::new(hsize.x, hsize.y, hsize.z);
        let v8 = center + Vec3::new(hsize.x, hsize.y, -hsize.z);

        // Bottom, top, back, front, left, right
        HalfEdgeMesh::build_from_polygons(
            &[v1, v2, v3, v4, v5, v6, v7, v8],
            &[
                [0u32, 1, 2, 3],
                [4, 5, 6, 7],
                [4, 7, 1, 0],
                [3, 2, 6, 5],
                [5, 4, 0, 3],
                [6, 2, 1, 7],
            ],
        )
    }
}

pub struct Torus;

impl Torus {
    /// A triangulated torus around the Z axis, with `segments` steps both
    /// around the tube and around the hole.
    pub fn build(major_radius: f32, minor_radius: f32, segments: u32) -> MeshResult<HalfEdgeMesh> {
        if segments < 3 {
            return Err(MeshError::invalid_parameter(format!(
                "A torus needs at least 3 segments, got {segments}"
            )));
        }
        let n = segments as usize;
        let angle = |i: usize| 2.0 * PI * i as f32 / n as f32;

        // Row i goes around the tube, column j around the hole
        let idx = |i: usize, j: usize| (i % n) * n + (j % n);
        let mut positions = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                let (phi, theta) = (angle(i), angle(j));
                let ring = major_radius + minor_radius * phi.cos();
                positions.push(Vec3::new(
                    ring * theta.cos(),
                    ring * theta.sin(),
                    minor_radius * phi.sin(),
                ));
            }
        }

        let mut polygons = Vec::with_capacity(2 * n * n);
        for i in 0..n {
            for j in 0..n {
                polygons.push([idx(i, j + 1), idx(i + 1, j), idx(i, j)]);
                polygons.push([idx(i, j + 1), idx(i + 1, j + 1), idx(i + 1, j)]);
            }
        }

        HalfEdgeMesh::build_from_polygons(&positions, &polygons)
    }
}

/// A 2D curve in the half-plane `x >= 0`, rotated around the Y axis to build
/// a surface of revolution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileCurve {
    pub points: Vec<Vec2>,
}

impl ProfileCurve {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Converts points in the pixel coordinates of a `width` x `height`
    /// drawing canvas, where Y grows downwards. The rotation axis is the
    /// vertical line at the middle of the canvas.
    pub fn from_canvas_points(points: &[Vec2], width: f32, height: f32) -> Self {
        Self::new(
            points
                .iter()
                .map(|p| Vec2::new(p.x - width / 2.0, height - p.y))
                .collect(),
        )
    }

    /// Parses a list of points, one `x y` pair per line. Blank lines and `#`
    /// comments are skipped.
    pub fn parse(text: &str) -> MeshResult<Self> {
        use nom::{
            character::complete::{space0, space1},
            number::complete::double,
            sequence::{delimited, separated_pair},
            IResult, Parser,
        };

        fn point(input: &str) -> IResult<&str, Vec2> {
            delimited(space0, separated_pair(double, space1, double), space0)
                .map(|(x, y)| Vec2::new(x as f32, y as f32))
                .parse(input)
        }

        let mut points = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            match point(line) {
                Ok(("", p)) => points.push(p),
                Ok((rest, _)) => {
                    return Err(MeshError::parse(i + 1, format!("Unexpected text: {rest}")))
                }
                Err(err) => {
                    return Err(MeshError::parse(i + 1, format!("Could not read point: {err}")))
                }
            }
        }
        Ok(Self::new(points))
    }
}

pub struct SurfaceOfRevolution;

impl SurfaceOfRevolution {
    /// Rotates `profile` around the Y axis in `angle_count` steps, joining
    /// consecutive rings with quads. Profile points on the axis collapse to a
    /// single vertex, and are joined to their neighbouring rings with
    /// triangles.
    ///
    /// Faces point outwards when the profile is traced from bottom to top.
    #[profiling::function]
    pub fn build(profile: &ProfileCurve, angle_count: u32) -> MeshResult<HalfEdgeMesh> {
        if angle_count < 3 {
            return Err(MeshError::invalid_parameter(format!(
                "A surface of revolution needs at least 3 angles, got {angle_count}"
            )));
        }
        if profile.points.len() < 2 {
            return Err(MeshError::invalid_parameter(format!(
                "A profile curve needs at least 2 points, got {}",
                profile.points.len()
            )));
        }
        if let Some(p) = profile.points.iter().find(|p| p.x < 0.0) {
            return Err(MeshError::invalid_parameter(format!(
                "Profile point {p} is on the wrong side of the rotation axis"
            )));
        }

        // Only the endpoints may touch the axis. An interior axis point pinches
        // the surface into two cones joined at a single vertex.
        let last = profile.points.len() - 1;
        if let Some((i, p)) = profile
            .points
            .iter()
            .enumerate()
            .find(|(i, p)| *i != 0 && *i != last && p.x <= AXIS_EPSILON)
        {
            return Err(MeshError::invalid_parameter(format!(
                "Profile point {i} at {p} lies on the rotation axis, only the first and \
                 last points may"
            )));
        }

        let n = angle_count as usize;
        let mut positions = Vec::new();
        // Vertex indices of every ring. Axis points have a single vertex.
        let mut rings = Vec::<Vec<usize>>::with_capacity(profile.points.len());
        for p in &profile.points {
            if p.x <= AXIS_EPSILON {
                rings.push(vec![positions.len()]);
                positions.push(Vec3::new(0.0, p.y, 0.0));
            } else {
                let start = positions.len();
                for j in 0..n {
                    let theta = 2.0 * PI * j as f32 / n as f32;
                    positions.push(Vec3::new(p.x * theta.cos(), p.y, p.x * theta.sin()));
                }
                rings.push((start..start + n).collect());
            }
        }

        let mut polygons = Vec::<SVec<usize>>::new();
        for (lower, upper) in rings.iter().tuple_windows() {
            for j in 0..n {
                let k = (j + 1) % n;
                match (lower.len() == 1, upper.len() == 1) {
                    (false, false) => {
                        polygons.push(smallvec::smallvec![lower[j], upper[j], upper[k], lower[k]])
                    }
                    (true, false) => polygons.push(smallvec::smallvec![lower[0], upper[j], upper[k]]),
                    (false, true) => polygons.push(smallvec::smallvec![lower[j], upper[0], lower[k]]),
                    (true, true) => break,
                }
            }
        }

        log::debug!(
            "Surface of revolution: {} profile points, {} vertices, {} faces",
            profile.points.len(),
            positions.len(),
            polygons.len()
        );
        HalfEdgeMesh::build_from_polygons(&positions, &polygons)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn semicircle(steps: usize) -> ProfileCurve {
        ProfileCurve::new(
            (0..=steps)
                .map(|i| {
                    let phi = PI * i as f32 / steps as f32;
                    // sin(PI) comes out slightly negative in f32
                    Vec2::new(phi.sin().abs(), -phi.cos())
                })
                .collect(),
        )
    }

    #[test]
    pub fn test_platonic_primitives() {
        let cube = Cube::build(Vec3::ZERO, Vec3::ONE).unwrap();
        assert_eq!(cube.num_vertices(), 8);
        assert_eq!(cube.num_faces(), 6);
        assert_eq!(cube.num_edges(), 12);
        assert_eq!(cube.genus().unwrap(), 0);
        for (f, _) in cube.read_connectivity().iter_faces() {
            let normal = cube.face_normal(f).unwrap();
            let centroid = cube.face_centroid(f).unwrap();
            assert!(normal.abs_diff_eq(centroid * 2.0, 1e-6));
        }

        let tet = Tetrahedron::build().unwrap();
        let centroid = mean_point(tet.positions().values().copied()).unwrap();
        assert!(centroid.abs_diff_eq(Vec3::ZERO, 1e-6));
        let edge_lengths = tet
            .read_connectivity()
            .iter_halfedges()
            .map(|(h, _)| {
                let (a, b) = tet.edge_vertices(h).unwrap();
                tet.position(a).unwrap().distance(tet.position(b).unwrap())
            })
            .collect_vec();
        for l in edge_lengths {
            approx::assert_relative_eq!(l, (8.0f32 / 3.0).sqrt(), epsilon = 1e-5);
        }

        let triangle = Triangle::build().unwrap();
        assert_eq!(triangle.boundary_cycles().unwrap().len(), 1);
    }

    #[test]
    pub fn test_torus() {
        let torus = Torus::build(4.0, 1.0, 8).unwrap();
        assert_eq!(torus.num_vertices(), 64);
        assert_eq!(torus.num_faces(), 128);
        assert_eq!(torus.euler_characteristic(), 0);
        assert_eq!(torus.genus().unwrap(), 1);
        // The outermost vertex has a normal pointing away from the hole
        let v = torus.vertex_at_index(0).unwrap();
        assert!(torus.vertex_normal(v).unwrap().abs_diff_eq(Vec3::X, 1e-5));

        assert!(matches!(
            Torus::build(4.0, 1.0, 2),
            Err(MeshError::InvalidParameter { .. })
        ));
    }

    #[test]
    pub fn test_revolved_sphere() {
        let sphere = SurfaceOfRevolution::build(&semicircle(6), 12).unwrap();
        // Two poles plus five rings
        assert_eq!(sphere.num_vertices(), 2 + 5 * 12);
        assert_eq!(sphere.num_faces(), 2 * 12 + 4 * 12);
        assert!(sphere.boundary_cycles().unwrap().is_empty());
        assert_eq!(sphere.genus().unwrap(), 0);

        // Outward facing
        for (f, _) in sphere.read_connectivity().iter_faces() {
            let normal = sphere.face_normal(f).unwrap();
            let centroid = sphere.face_centroid(f).unwrap();
            assert!(normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    pub fn test_revolved_cylinder() {
        let profile = ProfileCurve::new(vec![Vec2::new(1.0, 0.0), Vec2::new(1.0, 2.0)]);
        let cylinder = SurfaceOfRevolution::build(&profile, 20).unwrap();
        assert_eq!(cylinder.num_vertices(), 40);
        assert_eq!(cylinder.num_faces(), 20);
        assert_eq!(cylinder.boundary_cycles().unwrap().len(), 2);
    }

    #[test]
    pub fn test_revolution_rejects_bad_input() {
        let profile = ProfileCurve::new(vec![Vec2::new(1.0, 0.0), Vec2::new(1.0, 2.0)]);
        assert!(matches!(
            SurfaceOfRevolution::build(&profile, 2),
            Err(MeshError::InvalidParameter { .. })
        ));
        let short = ProfileCurve::new(vec![Vec2::new(1.0, 0.0)]);
        assert!(matches!(
            SurfaceOfRevolution::build(&short, 20),
            Err(MeshError::InvalidParameter { .. })
        ));
        let crossing = ProfileCurve::new(vec![Vec2::new(1.0, 0.0), Vec2::new(-1.0, 2.0)]);
        assert!(matches!(
            SurfaceOfRevolution::build(&crossing, 20),
            Err(MeshError::InvalidParameter { .. })
        ));
        let pinched = ProfileCurve::new(vec![
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 2.0),
        ]);
        assert!(matches!(
            SurfaceOfRevolution::build(&pinched, 8),
            Err(MeshError::InvalidParameter { .. })
        ));
    }

    #[test]
    pub fn test_profile_curve_input() {
        let canvas = ProfileCurve::from_canvas_points(&[Vec2::new(300.0, 100.0)], 400.0, 300.0);
        assert_eq!(canvas.points, vec![Vec2::new(100.0, 200.0)]);

        let parsed = ProfileCurve::parse("# profile\n0 -1\n 1.5 0 \n\n0 1 # top\n").unwrap();
        assert_eq!(
            parsed.points,
            vec![Vec2::new(0.0, -1.0), Vec2::new(1.5, 0.0), Vec2::new(0.0, 1.0)]
        );
        assert!(matches!(
            ProfileCurve::parse("0 1\n1 two\n"),
            Err(MeshError::Parse { line: 2, .. })
        ));
    }
}
