// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

/// The main representation to draw the halfedge's faces as triangles on the GPU
#[derive(Clone, Debug)]
pub struct VertexIndexBuffers {
    /// Vertex positions, one per vertex.
    pub positions: Vec<Vec3>,
    /// Vertex normals, one per vertex.
    pub normals: Vec<Vec3>,
    /// Vertex colors, one per vertex.
    pub colors: Vec<Vec3>,
    /// Indices: 3*N where N is the number of triangles. Indices point to
    /// elements of `positions`, `normals` and `colors`.
    pub indices: Vec<u32>,
}

/// Unindexed line segments: every two consecutive positions are a segment.
#[derive(Clone, Debug, Default)]
pub struct LineBuffers {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
}

/// Colored points, to be drawn as a point list.
#[derive(Clone, Debug, Default)]
pub struct PointBuffers {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
}

impl PointBuffers {
    pub fn push_point(&mut self, p: Vec3, color: Vec3) {
        self.positions.push(p);
        self.colors.push(color);
    }
}

impl LineBuffers {
    pub fn push_segment(&mut self, a: Vec3, b: Vec3, color: Vec3) {
        self.positions.push(a);
        self.positions.push(b);
        self.colors.push(color);
        self.colors.push(color);
    }

    /// Returns the segments twice, scaled by `draw_offset` and by its inverse,
    /// so they are not hidden by the surface they lie on.
    pub fn with_draw_offset(&self, config: &DisplayConfig) -> LineBuffers {
        let scales = [config.draw_offset, 1.0 / config.draw_offset];
        LineBuffers {
            positions: scales
                .iter()
                .flat_map(|s| self.positions.iter().map(move |p| *p * *s))
                .collect(),
            colors: scales
                .iter()
                .flat_map(|_| self.colors.iter().copied())
                .collect(),
        }
    }
}

impl HalfEdgeMesh {
    /// Triangle index list, triangulating each face as a fan around its first
    /// vertex. A face with `n` sides gives `n - 2` triangles.
    pub fn triangle_indices(&self) -> MeshResult<Vec<u32>> {
        let conn = self.read_connectivity();
        let v_mapping = conn.vertex_mapping();
        let mut indices = vec![];
        for (face_id, _face) in conn.iter_faces() {
            let vertices = self.face_vertices(face_id)?;
            let v1 = vertices[0];
            for (&v2, &v3) in vertices[1..].iter().tuple_windows() {
                indices.push(v_mapping[v1]);
                indices.push(v_mapping[v2]);
                indices.push(v_mapping[v3]);
            }
        }
        Ok(indices)
    }

    /// Line index list with one `(head, tail)` pair per edge.
    pub fn edge_indices(&self) -> MeshResult<Vec<u32>> {
        let conn = self.read_connectivity();
        let v_mapping = conn.vertex_mapping();
        let mut visited = HashSet::new();
        let mut indices = vec![];
        for (h, _) in conn.iter_halfedges() {
            let pair = conn.at_halfedge(h).pair().try_end()?;
            if visited.contains(&pair) {
                continue;
            }
            visited.insert(h);
            let (head, tail) = self.edge_vertices(h)?;
            indices.push(v_mapping[head]);
            indices.push(v_mapping[tail]);
        }
        Ok(indices)
    }

    /// Generates the [`VertexIndexBuffers`] for this mesh, with smooth
    /// normals. Suitable to be uploaded to the GPU.
    #[profiling::function]
    pub fn generate_triangle_buffers(&self) -> MeshResult<VertexIndexBuffers> {
        let conn = self.read_connectivity();
        let normals = self.vertex_normals()?;
        let mut positions = Vec::with_capacity(self.num_vertices());
        let mut colors = Vec::with_capacity(self.num_vertices());
        for (v, _) in conn.iter_vertices() {
            positions.push(self.position(v)?);
            colors.push(self.color(v));
        }
        Ok(VertexIndexBuffers {
            positions,
            normals: normals.values().copied().collect(),
            colors,
            indices: self.triangle_indices()?,
        })
    }

    /// Generates the [`LineBuffers`] for the edges of this mesh. Each segment
    /// takes the colors of its endpoints.
    pub fn generate_line_buffers(&self) -> MeshResult<LineBuffers> {
        let conn = self.read_connectivity();
        let mut visited = HashSet::new();
        let mut buffers = LineBuffers::default();
        for (h, _) in conn.iter_halfedges() {
            let pair = conn.at_halfedge(h).pair().try_end()?;
            if visited.contains(&pair) {
                continue;
            }
            visited.insert(h);
            let (head, tail) = self.edge_vertices(h)?;
            buffers.positions.push(self.position(head)?);
            buffers.positions.push(self.position(tail)?);
            buffers.colors.push(self.color(head));
            buffers.colors.push(self.color(tail));
        }
        Ok(buffers)
    }

    /// Line segments along every boundary loop, in the boundary color.
    pub fn generate_boundary_buffers(&self, config: &DisplayConfig) -> MeshResult<LineBuffers> {
        let color = Vec3::from(config.boundary_color);
        let mut buffers = LineBuffers::default();
        for cycle in self.boundary_cycles()? {
            for h in cycle {
                let (head, tail) = self.edge_vertices(h)?;
                buffers.push_segment(self.position(tail)?, self.position(head)?, color);
            }
        }
        Ok(buffers.with_draw_offset(config))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn test_index_buffer_sizes() {
        let cube = primitives::Cube::build(Vec3::ZERO, Vec3::ONE).unwrap();
        // Six quads, two triangles each
        assert_eq!(cube.triangle_indices().unwrap().len(), 3 * 12);
        assert_eq!(cube.edge_indices().unwrap().len(), 2 * 12);

        let buffers = cube.generate_triangle_buffers().unwrap();
        assert_eq!(buffers.positions.len(), 8);
        assert_eq!(buffers.normals.len(), 8);
        assert_eq!(buffers.colors.len(), 8);
        assert!(buffers.indices.iter().all(|&i| i < 8));

        let lines = cube.generate_line_buffers().unwrap();
        assert_eq!(lines.positions.len(), 24);
        assert_eq!(lines.colors.len(), 24);
    }

    #[test]
    pub fn test_triangle_indices_fan() {
        let quad = HalfEdgeMesh::build_from_polygons(
            &[Vec3::ZERO, Vec3::X, Vec3::X + Vec3::Y, Vec3::Y],
            &[[0u32, 1, 2, 3]],
        )
        .unwrap();
        assert_eq!(quad.triangle_indices().unwrap(), vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(quad.edge_indices().unwrap().len(), 8);
    }

    #[test]
    pub fn test_boundary_buffers() {
        let config = DisplayConfig::default();
        let closed = primitives::Tetrahedron::build().unwrap();
        assert!(closed
            .generate_boundary_buffers(&config)
            .unwrap()
            .positions
            .is_empty());

        let triangle = primitives::Triangle::build().unwrap();
        let lines = triangle.generate_boundary_buffers(&config).unwrap();
        // Three segments, drawn twice
        assert_eq!(lines.positions.len(), 12);
        assert!(lines
            .colors
            .iter()
            .all(|c| *c == Vec3::from(config.boundary_color)));
        assert!(lines.positions[2].abs_diff_eq(lines.positions[8] * config.draw_offset.powi(2), 1e-5));
    }
}
