// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

impl HalfEdgeMesh {
    /// Returns the ghost halfedge loops of the mesh, one per hole. Empty for
    /// a watertight mesh.
    pub fn boundary_cycles(&self) -> MeshResult<Vec<SVec<HalfEdgeId>>> {
        let conn = self.read_connectivity();
        let mut visited = HashSet::new();
        let mut cycles = Vec::new();
        for (h, halfedge) in conn.iter_halfedges() {
            if halfedge.face().is_some() || visited.contains(&h) {
                continue;
            }
            let cycle = conn.halfedge_loop(h)?;
            visited.extend(cycle.iter_cpy());
            cycles.push(cycle);
        }
        Ok(cycles)
    }

    /// Number of connected components. Isolated vertices count as their own
    /// component.
    pub fn connected_components(&self) -> MeshResult<usize> {
        let mut visited = HashSet::new();
        let mut components = 0;
        for (v0, _) in self.read_connectivity().iter_vertices() {
            if !visited.insert(v0) {
                continue;
            }
            components += 1;
            let mut queue = VecDeque::from([v0]);
            while let Some(v) = queue.pop_front() {
                for w in self.vertex_neighbors(v)? {
                    if visited.insert(w) {
                        queue.push_back(w);
                    }
                }
            }
        }
        Ok(components)
    }

    /// V - E + F, where E counts halfedge pairs.
    pub fn euler_characteristic(&self) -> i32 {
        self.num_vertices() as i32 - self.num_edges() as i32 + self.num_faces() as i32
    }

    /// The genus of a closed, connected surface, from `V - E + F = 2 - 2g`.
    ///
    /// Returns -1 when the genus is not defined: the mesh has boundary loops,
    /// it is not made of exactly one component, or the Euler characteristic
    /// is odd.
    pub fn genus(&self) -> MeshResult<i32> {
        if !self.boundary_cycles()?.is_empty() || self.connected_components()? != 1 {
            return Ok(-1);
        }
        let chi = self.euler_characteristic();
        if chi % 2 != 0 {
            return Ok(-1);
        }
        Ok((2 - chi) / 2)
    }

    /// Returns a new mesh where every boundary loop has been closed with a fan
    /// of triangles. The new faces are wound so their halfedges pair with the
    /// old boundary.
    ///
    /// The fan is anchored at the first loop vertex whose diagonals are not
    /// already edges of the mesh, since those would be traversed twice.
    #[profiling::function]
    pub fn fill_holes(&self) -> MeshResult<HalfEdgeMesh> {
        let cycles = self.boundary_cycles()?;
        if cycles.is_empty() {
            let mut copy = self.clone();
            copy.mark_dirty();
            return Ok(copy);
        }

        let mut polygons = PolygonMesh::from_halfedge(self)?;
        let v_mapping = self.read_connectivity().vertex_mapping();
        let mut edges = HashSet::new();
        for face in &polygons.faces {
            for (&a, &b) in face.iter().circular_tuple_windows() {
                edges.insert((a.min(b), a.max(b)));
            }
        }
        let mut added = 0;
        for cycle in &cycles {
            if cycle.len() < 3 {
                return Err(MeshError::corrupt(format!(
                    "Cannot fill a boundary loop with {} edges",
                    cycle.len()
                )));
            }
            // Walking the ghosts gives the hole's vertices in the winding the
            // new faces need.
            let hole = cycle
                .iter()
                .map(|&g| -> MeshResult<usize> {
                    let head = self.read_connectivity().at_halfedge(g).head().try_end()?;
                    Ok(v_mapping[head] as usize)
                })
                .collect::<MeshResult<SVec<usize>>>()?;
            let k = hole.len();
            let is_edge = |a: usize, b: usize| edges.contains(&(a.min(b), a.max(b)));
            let anchor = (0..k)
                .find(|&s| (2..k - 1).all(|j| !is_edge(hole[s], hole[(s + j) % k])))
                .ok_or_else(|| {
                    MeshError::corrupt(format!(
                        "Cannot fill the boundary loop at vertex {}: every fan diagonal is \
                         already an edge",
                        hole[0]
                    ))
                })?;
            let fan = hole[anchor..]
                .iter()
                .chain(&hole[..anchor])
                .copied()
                .collect_svec();
            for (&b, &c) in fan[1..].iter().tuple_windows() {
                polygons.faces.push(smallvec::smallvec![fan[0], b, c]);
                added += 1;
            }
            for &b in &fan[2..k - 1] {
                edges.insert((fan[0].min(b), fan[0].max(b)));
            }
        }

        log::debug!("Filled {} holes with {added} triangles", cycles.len());
        polygons.to_halfedge()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn open_box() -> HalfEdgeMesh {
        let cube = primitives::Cube::build(Vec3::ZERO, Vec3::ONE).unwrap();
        let mut polygons = PolygonMesh::from_halfedge(&cube).unwrap();
        polygons.faces.pop();
        polygons.to_halfedge().unwrap()
    }

    #[test]
    pub fn test_closed_mesh_topology() {
        let tet = primitives::Tetrahedron::build().unwrap();
        assert!(tet.boundary_cycles().unwrap().is_empty());
        assert_eq!(tet.connected_components().unwrap(), 1);
        assert_eq!(tet.euler_characteristic(), 2);
        assert_eq!(tet.genus().unwrap(), 0);
    }

    #[test]
    pub fn test_single_quad_has_no_genus() {
        let quad = HalfEdgeMesh::build_from_polygons(
            &[Vec3::ZERO, Vec3::X, Vec3::X + Vec3::Y, Vec3::Y],
            &[[0u32, 1, 2, 3]],
        )
        .unwrap();
        let cycles = quad.boundary_cycles().unwrap();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 4);
        assert_eq!(quad.genus().unwrap(), -1);
    }

    #[test]
    pub fn test_disconnected_mesh() {
        let tet = primitives::Tetrahedron::build().unwrap();
        let mut polygons = PolygonMesh::from_halfedge(&tet).unwrap();
        let other = PolygonMesh::from_halfedge(&tet).unwrap();
        polygons.append(&other);
        let mesh = polygons.to_halfedge().unwrap();
        assert_eq!(mesh.connected_components().unwrap(), 2);
        assert_eq!(mesh.euler_characteristic(), 4);
        assert_eq!(mesh.genus().unwrap(), -1);
    }

    #[test]
    pub fn test_fill_holes_on_open_box() {
        let open = open_box();
        assert_eq!(open.boundary_cycles().unwrap().len(), 1);

        let filled = open.fill_holes().unwrap();
        assert!(filled.boundary_cycles().unwrap().is_empty());
        // A square hole is closed with two triangles
        assert_eq!(filled.num_faces(), open.num_faces() + 2);
        assert_eq!(filled.num_vertices(), open.num_vertices());
        assert_eq!(filled.genus().unwrap(), 0);
        validation::check_invariants(&filled).unwrap();
    }

    #[test]
    pub fn test_fill_holes_avoids_existing_diagonal() {
        // A square split along the 0-2 diagonal: fanning from 0 or 2 would
        // add that edge a second time.
        let square = HalfEdgeMesh::build_from_polygons(
            &[Vec3::ZERO, Vec3::X, Vec3::X + Vec3::Y, Vec3::Y],
            &[[0u32, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        let filled = square.fill_holes().unwrap();
        assert_eq!(filled.num_faces(), 4);
        assert_eq!(filled.num_edges(), 6);
        assert!(filled.boundary_cycles().unwrap().is_empty());
        assert_eq!(filled.genus().unwrap(), 0);
        validation::check_invariants(&filled).unwrap();
    }

    #[test]
    pub fn test_fill_holes_on_closed_mesh_is_a_copy() {
        let tet = primitives::Tetrahedron::build().unwrap();
        let filled = tet.fill_holes().unwrap();
        assert_eq!(filled.num_faces(), tet.num_faces());
        assert_eq!(filled.num_halfedges(), tet.num_halfedges());
        assert_eq!(
            filled.positions().values().collect_vec(),
            tet.positions().values().collect_vec()
        );
    }
}
