// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

/// Checks the structural invariants of the halfedge graph:
///
/// - `next` and `prev` are inverse of each other, and `next` loops close.
///   Face loops close after as many steps as the face has vertices.
/// - Pairs are symmetric and point back to the opposite vertex.
/// - Ghost loops have at least three halfedges.
/// - Every vertex is the tail of its stored halfedge.
///
/// Returns a `CorruptTopology` error describing the first violation found, or
/// `IncompleteTopology` when a pointer is missing altogether.
pub fn check_invariants(mesh: &HalfEdgeMesh) -> MeshResult<()> {
    let conn = mesh.read_connectivity();

    for (h, halfedge) in conn.iter_halfedges() {
        let next = conn.at_halfedge(h).next().try_end()?;
        let prev = conn.at_halfedge(h).prev().try_end()?;
        if conn[next].prev != Some(h) || conn[prev].next != Some(h) {
            return Err(MeshError::corrupt(format!(
                "next / prev of {h:?} are not inverse of each other"
            )));
        }

        let pair = conn.at_halfedge(h).pair().try_end()?;
        if conn[pair].pair != Some(h) {
            return Err(MeshError::corrupt(format!("The pair of {h:?} does not point back")));
        }
        if halfedge.face.is_none() && conn[pair].face.is_none() {
            return Err(MeshError::corrupt(format!("{h:?} and its pair are both ghosts")));
        }

        // The tail of a halfedge is both `prev.head` and `pair.head`.
        let tail = conn.at_halfedge(h).tail().try_end()?;
        if conn.at_halfedge(pair).head().try_end()? != tail {
            return Err(MeshError::corrupt(format!(
                "{h:?} does not start where its pair ends"
            )));
        }
    }

    for (f, _) in conn.iter_faces() {
        let halfedges = conn.face_edges(f)?;
        if halfedges.len() < 3 {
            return Err(MeshError::corrupt(format!("{f:?} has fewer than three sides")));
        }
        for &h in &halfedges {
            if conn[h].face != Some(f) {
                return Err(MeshError::corrupt(format!(
                    "{h:?} is in the loop of {f:?} but belongs to another face"
                )));
            }
        }
    }

    for (h, halfedge) in conn.iter_halfedges() {
        if halfedge.face.is_none() {
            let ghost_loop = conn.halfedge_loop(h)?;
            if ghost_loop.len() < 3 {
                return Err(MeshError::corrupt(format!(
                    "Boundary loop through {h:?} has only {} halfedges",
                    ghost_loop.len()
                )));
            }
            if ghost_loop.iter().any(|&g| conn[g].face.is_some()) {
                return Err(MeshError::corrupt(format!(
                    "Boundary loop through {h:?} contains face halfedges"
                )));
            }
        }
    }

    for (v, vertex) in conn.iter_vertices() {
        if let Some(h) = vertex.halfedge {
            if conn.at_halfedge(h).tail().try_end()? != v {
                return Err(MeshError::corrupt(format!(
                    "{v:?} is not the tail of its halfedge"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn test_valid_meshes_pass() {
        check_invariants(&primitives::Tetrahedron::build().unwrap()).unwrap();
        check_invariants(&primitives::Triangle::build().unwrap()).unwrap();
        check_invariants(&HalfEdgeMesh::new()).unwrap();
    }

    #[test]
    pub fn test_detects_broken_links() {
        let mut mesh = primitives::Tetrahedron::build().unwrap();
        let h = mesh.read_connectivity().iter_halfedges().next().unwrap().0;
        mesh.connectivity[h].prev = None;
        assert!(matches!(
            check_invariants(&mesh),
            Err(MeshError::IncompleteTopology(TraversalError::HalfEdgeHasNoPrev(_)))
        ));

        let mut mesh = primitives::Tetrahedron::build().unwrap();
        let (h, other) = mesh
            .read_connectivity()
            .iter_halfedges()
            .map(|(h, _)| h)
            .take(2)
            .collect_tuple()
            .unwrap();
        mesh.connectivity[h].pair = Some(other);
        assert!(matches!(
            check_invariants(&mesh),
            Err(MeshError::CorruptTopology { .. })
        ));
    }

    #[test]
    pub fn test_spiralling_face_loop_is_capped() {
        let mut mesh = primitives::Tetrahedron::build().unwrap();
        let f = mesh.read_connectivity().iter_faces().next().unwrap().0;
        let h0 = mesh.read_connectivity().at_face(f).halfedge().end();
        let h1 = mesh.read_connectivity().at_halfedge(h0).next().end();
        let h2 = mesh.read_connectivity().at_halfedge(h1).next().end();
        // h0 -> h1 -> h2 -> h1 -> ... never comes back to h0
        mesh.connectivity[h2].next = Some(h1);
        assert!(matches!(
            mesh.face_edges(f),
            Err(MeshError::CorruptTopology { .. })
        ));
        assert!(matches!(
            mesh.face_vertices(f),
            Err(MeshError::CorruptTopology { .. })
        ));
    }

    #[test]
    pub fn test_spiralling_fan_is_capped() {
        let mut mesh = primitives::Tetrahedron::build().unwrap();
        let v = mesh.vertex_at_index(0).unwrap();
        let fan = mesh.read_connectivity().at_vertex(v).outgoing_halfedges().unwrap();
        assert_eq!(fan.len(), 3);
        // Rotating past the last halfedge of the fan lands on the second one
        let last_pair = mesh.read_connectivity().at_halfedge(fan[2]).pair().end();
        mesh.connectivity[last_pair].next = Some(fan[1]);
        assert!(matches!(
            mesh.vertex_neighbors(v),
            Err(MeshError::CorruptTopology { .. })
        ));
        assert!(matches!(
            mesh.attached_faces(v),
            Err(MeshError::CorruptTopology { .. })
        ));
    }

    #[test]
    pub fn test_spiralling_boundary_loop_is_capped() {
        let mut mesh = primitives::Triangle::build().unwrap();
        let ghosts = mesh
            .read_connectivity()
            .iter_halfedges()
            .filter(|(_, h)| h.face().is_none())
            .map(|(h, _)| h)
            .collect_vec();
        assert_eq!(ghosts.len(), 3);
        let g0 = ghosts[0];
        let g1 = mesh.read_connectivity().at_halfedge(g0).next().end();
        let g2 = mesh.read_connectivity().at_halfedge(g1).next().end();
        mesh.connectivity[g2].next = Some(g1);
        assert!(matches!(
            mesh.boundary_cycles(),
            Err(MeshError::CorruptTopology { .. })
        ));
    }
}
