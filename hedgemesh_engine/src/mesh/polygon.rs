// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::prelude::*;

/// A plain face / vertex list. This is the shape meshes have when they are
/// read from a file or produced as polygon soup by a generator, before the
/// halfedge graph is built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolygonMesh {
    pub positions: Vec<Vec3>,
    /// One color per position.
    pub colors: Vec<Vec3>,
    /// Indices into `positions`, counter-clockwise when seen from outside.
    pub faces: Vec<SVec<usize>>,
}

impl PolygonMesh {
    /// Builds a polygon mesh where every vertex has the default color.
    pub fn new(positions: Vec<Vec3>, faces: Vec<SVec<usize>>) -> Self {
        let colors = vec![DEFAULT_COLOR; positions.len()];
        Self {
            positions,
            colors,
            faces,
        }
    }

    /// Flattens a halfedge mesh back into a face list. Vertices and faces keep
    /// their insertion order.
    pub fn from_halfedge(mesh: &HalfEdgeMesh) -> MeshResult<Self> {
        let conn = mesh.read_connectivity();
        let v_mapping = conn.vertex_mapping();
        let mut positions = Vec::with_capacity(mesh.num_vertices());
        let mut colors = Vec::with_capacity(mesh.num_vertices());
        for (v, _) in conn.iter_vertices() {
            positions.push(mesh.position(v)?);
            colors.push(mesh.color(v));
        }
        let faces = conn
            .iter_faces()
            .map(|(f, _)| -> MeshResult<SVec<usize>> {
                Ok(mesh
                    .face_vertices(f)?
                    .iter()
                    .map(|&v| v_mapping[v] as usize)
                    .collect_svec())
            })
            .collect::<MeshResult<Vec<_>>>()?;
        Ok(Self {
            positions,
            colors,
            faces,
        })
    }

    /// Adds the vertices and faces of `other` to this mesh, shifting its
    /// indices.
    pub fn append(&mut self, other: &PolygonMesh) {
        let offset = self.positions.len();
        self.positions.extend_from_slice(&other.positions);
        self.colors.extend_from_slice(&other.colors);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|face| face.iter().map(|idx| idx + offset).collect_svec()),
        );
    }

    /// Checks that every face has at least three distinct vertices, that all
    /// of them exist, and that there is one color per position.
    pub fn validate(&self) -> MeshResult<()> {
        if self.colors.len() != self.positions.len() {
            return Err(MeshError::invalid_parameter(format!(
                "Got {} colors for {} positions",
                self.colors.len(),
                self.positions.len()
            )));
        }
        for (i, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(MeshError::invalid_parameter(format!(
                    "Face {i} has {} vertices, at least three are needed",
                    face.len()
                )));
            }
            if let Some(dup) = face.iter().duplicates().next() {
                return Err(MeshError::invalid_parameter(format!(
                    "Face {i} references vertex {dup} more than once"
                )));
            }
            if let Some(idx) = face.iter().find(|&&idx| idx >= self.positions.len()) {
                return Err(MeshError::invalid_parameter(format!(
                    "Face {i} references vertex {idx}, but there are only {} vertices",
                    self.positions.len()
                )));
            }
        }
        Ok(())
    }

    /// Reverses faces as needed so that every pair of neighbouring faces
    /// traverses their shared edge in opposite directions. Each connected
    /// patch keeps the winding of its first face.
    ///
    /// Returns how many faces were flipped. Fails on non-orientable surfaces
    /// and on edges shared by more than two faces.
    pub fn consistently_orient(&mut self) -> MeshResult<usize> {
        fn traverses(face: &[usize], a: usize, b: usize) -> bool {
            face.iter().circular_tuple_windows().any(|(&x, &y)| x == a && y == b)
        }

        // Undirected edge -> faces containing it
        let mut edge_faces = HashMap::<(usize, usize), SVec<usize>>::new();
        for (f, face) in self.faces.iter().enumerate() {
            for (&a, &b) in face.iter().circular_tuple_windows() {
                let faces = edge_faces.entry((a.min(b), a.max(b))).or_default();
                faces.push(f);
                if faces.len() > 2 {
                    return Err(MeshError::InconsistentOrientation { from: a, to: b });
                }
            }
        }

        let mut visited = vec![false; self.faces.len()];
        let mut flipped = 0;
        for seed in 0..self.faces.len() {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            let mut queue = VecDeque::from([seed]);
            while let Some(f) = queue.pop_front() {
                let edges = self.faces[f]
                    .iter()
                    .copied()
                    .circular_tuple_windows()
                    .collect::<SVec<(usize, usize)>>();
                for (a, b) in edges {
                    let g = match edge_faces[&(a.min(b), a.max(b))]
                        .iter()
                        .copied()
                        .find(|&g| g != f)
                    {
                        Some(g) => g,
                        None => continue,
                    };

                    if traverses(&self.faces[g], a, b) {
                        if visited[g] {
                            return Err(MeshError::InconsistentOrientation { from: a, to: b });
                        }
                        self.faces[g].reverse();
                        flipped += 1;
                    }
                    if !visited[g] {
                        visited[g] = true;
                        queue.push_back(g);
                    }
                }
            }
        }

        if flipped > 0 {
            log::warn!("Flipped {flipped} faces to get a consistent orientation");
        }
        Ok(flipped)
    }

    /// Translates the mesh so that the mean of its vertices is at the origin.
    /// Returns the offset that was subtracted.
    pub fn center_at_centroid(&mut self) -> Vec3 {
        let centroid = mean_point(self.positions.iter_cpy()).unwrap_or(Vec3::ZERO);
        for p in &mut self.positions {
            *p -= centroid;
        }
        centroid
    }

    /// Builds the halfedge mesh for these faces, as they are.
    pub fn to_halfedge(&self) -> MeshResult<HalfEdgeMesh> {
        HalfEdgeMesh::build_from_polygons_with_colors(&self.positions, &self.colors, &self.faces)
    }

    /// Normalizes the mesh as requested by `options`, then builds the halfedge
    /// mesh.
    pub fn import(mut self, options: &ImportOptions) -> MeshResult<HalfEdgeMesh> {
        self.validate()?;
        if options.consistently_orient {
            self.consistently_orient()?;
        }
        if options.center_at_centroid {
            let offset = self.center_at_centroid();
            log::debug!("Moved mesh by {offset} to center it at the origin");
        }
        self.to_halfedge()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use smallvec::smallvec;

    fn square_positions() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    pub fn test_orient_repairs_flipped_face() {
        // Both triangles traverse the diagonal from 2 to 0
        let mut polygons =
            PolygonMesh::new(square_positions(), vec![smallvec![0, 1, 2], smallvec![0, 3, 2]]);
        assert!(matches!(
            polygons.to_halfedge(),
            Err(MeshError::InconsistentOrientation { from: 2, to: 0 })
        ));

        assert_eq!(polygons.consistently_orient().unwrap(), 1);
        let mesh = polygons.to_halfedge().unwrap();
        assert_eq!(mesh.boundary_cycles().unwrap().len(), 1);
        let f = mesh.face_at_index(1).unwrap();
        assert!(mesh.face_normal(f).unwrap().abs_diff_eq(Vec3::Z, 1e-6));

        // Already consistent, nothing to do
        assert_eq!(polygons.consistently_orient().unwrap(), 0);
    }

    #[test]
    pub fn test_orient_rejects_mobius_strip() {
        // Four quads glued in a ring, with a half twist on the last one
        let positions = (0..8).map(|i| Vec3::splat(i as f32)).collect_vec();
        let (t, b) = ([0, 1, 2, 3], [4, 5, 6, 7]);
        let mut faces: Vec<SVec<usize>> = (0..3)
            .map(|i| smallvec![t[i], t[i + 1], b[i + 1], b[i]])
            .collect();
        faces.push(smallvec![b[3], t[3], b[0], t[0]]);
        let mut polygons = PolygonMesh::new(positions, faces);
        assert!(matches!(
            polygons.consistently_orient(),
            Err(MeshError::InconsistentOrientation { .. })
        ));
    }

    #[test]
    pub fn test_orient_rejects_fin() {
        // Three triangles sharing the edge 0-1
        let mut positions = square_positions();
        positions.push(Vec3::Z);
        let mut polygons = PolygonMesh::new(
            positions,
            vec![smallvec![0, 1, 2], smallvec![1, 0, 3], smallvec![0, 1, 4]],
        );
        assert!(matches!(
            polygons.consistently_orient(),
            Err(MeshError::InconsistentOrientation { .. })
        ));
    }

    #[test]
    pub fn test_center_at_centroid() {
        let mut polygons = PolygonMesh::new(square_positions(), vec![smallvec![0, 1, 2, 3]]);
        let offset = polygons.center_at_centroid();
        assert!(offset.abs_diff_eq(Vec3::new(0.5, 0.5, 0.0), 1e-6));
        assert!(polygons.positions[0].abs_diff_eq(Vec3::new(-0.5, -0.5, 0.0), 1e-6));
        let centroid = mean_point(polygons.positions.iter_cpy()).unwrap();
        assert!(centroid.abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    pub fn test_validate() {
        let positions = square_positions();
        assert!(PolygonMesh::new(positions.clone(), vec![smallvec![0, 1, 2]])
            .validate()
            .is_ok());
        assert!(PolygonMesh::new(positions.clone(), vec![smallvec![0, 1]])
            .validate()
            .is_err());
        assert!(PolygonMesh::new(positions.clone(), vec![smallvec![0, 1, 0]])
            .validate()
            .is_err());
        assert!(PolygonMesh::new(positions, vec![smallvec![0, 1, 9]])
            .validate()
            .is_err());
    }

    #[test]
    pub fn test_halfedge_roundtrip() {
        let polygons = PolygonMesh::new(square_positions(), vec![smallvec![0, 1, 2, 3]]);
        let mesh = polygons.to_halfedge().unwrap();
        assert_eq!(PolygonMesh::from_halfedge(&mesh).unwrap(), polygons);
    }
}
