// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

impl HalfEdgeMesh {
    fn face_positions(&self, face: FaceId) -> MeshResult<SVec<Vec3>> {
        self.face_vertices(face)?
            .iter()
            .map(|&v| self.position(v))
            .collect()
    }

    /// Unit normal of a face, computed with Newell's method so that it also
    /// works for non-planar polygons. Degenerate faces give a zero vector.
    pub fn face_normal(&self, face: FaceId) -> MeshResult<Vec3> {
        let points = self.face_positions(face)?;
        let mut normal = Vec3::ZERO;
        for (a, b) in points.iter().circular_tuple_windows() {
            normal += Vec3::new(
                (a.y - b.y) * (a.z + b.z),
                (a.z - b.z) * (a.x + b.x),
                (a.x - b.x) * (a.y + b.y),
            );
        }
        Ok(normal.normalize_or_zero())
    }

    /// Area of a face, as the sum of the triangles of a fan around its first
    /// vertex.
    pub fn face_area(&self, face: FaceId) -> MeshResult<f32> {
        let points = self.face_positions(face)?;
        let p0 = points[0];
        Ok(points[1..]
            .iter()
            .tuple_windows()
            .map(|(p1, p2)| 0.5 * (*p1 - p0).cross(*p2 - p0).length())
            .sum())
    }

    /// Arithmetic mean of the face vertices.
    pub fn face_centroid(&self, face: FaceId) -> MeshResult<Vec3> {
        let points = self.face_positions(face)?;
        mean_point(points.iter_cpy())
            .ok_or_else(|| MeshError::corrupt(format!("{face:?} has no vertices")))
    }

    /// Unit normal at a vertex: the average of the normals of its attached
    /// faces, weighted by their area. Zero when the vertex has no attached
    /// area.
    pub fn vertex_normal(&self, vertex: VertexId) -> MeshResult<Vec3> {
        let mut normal = Vec3::ZERO;
        let mut total_area = 0.0;
        for face in self.attached_faces(vertex)? {
            let area = self.face_area(face)?;
            normal += area * self.face_normal(face)?;
            total_area += area;
        }
        if total_area <= 0.0 {
            return Ok(Vec3::ZERO);
        }
        Ok((normal / total_area).normalize_or_zero())
    }

    /// Vertex normals for every vertex, in vertex order.
    pub fn vertex_normals(&self) -> MeshResult<SecondaryMap<VertexId, Vec3>> {
        let mut normals = SecondaryMap::with_capacity(self.num_vertices());
        for (v, _) in self.read_connectivity().iter_vertices() {
            normals.insert(v, self.vertex_normal(v)?);
        }
        Ok(normals)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn test_square_geometry() {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 2.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
        ];
        let mesh = HalfEdgeMesh::build_from_polygons(&positions, &[[0u32, 1, 2, 3]]).unwrap();
        let f = mesh.face_at_index(0).unwrap();
        assert!(mesh.face_normal(f).unwrap().abs_diff_eq(Vec3::Z, 1e-6));
        approx::assert_relative_eq!(mesh.face_area(f).unwrap(), 4.0);
        assert!(mesh.face_centroid(f).unwrap().abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));

        let v = mesh.vertex_at_index(2).unwrap();
        assert!(mesh.vertex_normal(v).unwrap().abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    pub fn test_degenerate_face() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::X * 2.0];
        let mesh = HalfEdgeMesh::build_from_polygons(&positions, &[[0u32, 1, 2]]).unwrap();
        let f = mesh.face_at_index(0).unwrap();
        assert_eq!(mesh.face_normal(f).unwrap(), Vec3::ZERO);
        assert_eq!(mesh.face_area(f).unwrap(), 0.0);
        let v = mesh.vertex_at_index(0).unwrap();
        assert_eq!(mesh.vertex_normal(v).unwrap(), Vec3::ZERO);
    }

    #[test]
    pub fn test_tetrahedron_normals_point_outwards() {
        let mesh = primitives::Tetrahedron::build().unwrap();
        for (v, _) in mesh.read_connectivity().iter_vertices() {
            let p = mesh.position(v).unwrap();
            let n = mesh.vertex_normal(v).unwrap();
            approx::assert_relative_eq!(n.length(), 1.0, epsilon = 1e-5);
            // Centred at the origin, so normals are parallel to positions
            assert!(n.abs_diff_eq(p.normalize(), 1e-5));
        }
    }
}
