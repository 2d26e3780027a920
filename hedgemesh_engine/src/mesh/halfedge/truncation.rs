// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

/// Cuts every corner of the mesh. Each vertex `v` is replaced by one new
/// vertex per outgoing edge `v -> w`, placed at `v + factor * (w - v)`:
///
/// - Every original face with `k` sides becomes a face with `2k` sides.
/// - Every original vertex becomes a face joining its cut points, with as many
///   sides as the vertex has edges.
///
/// `factor` must be in `(0, 1)`. At exactly 0.5 the two cut points of an edge
/// coincide and are welded into one, so faces keep their number of sides and
/// shrink around their center. Past 0.5 the cuts of neighbouring vertices
/// cross each other and the result self-intersects.
///
/// A vertex with fewer than three edges, like the corner of a lone polygon,
/// gets no face: its cut is left open. Isolated vertices are dropped.
#[profiling::function]
pub fn truncate(mesh: &HalfEdgeMesh, factor: f32) -> MeshResult<HalfEdgeMesh> {
    if !(factor > 0.0 && factor < 1.0) {
        return Err(MeshError::invalid_parameter(format!(
            "Truncation factor must be between 0 and 1, got {factor}"
        )));
    }
    let weld = (factor - 0.5).abs() <= f32::EPSILON;
    let conn = mesh.read_connectivity();

    // One cut point per halfedge, next to the halfedge's tail. Welded cuts
    // share a single point per edge.
    let mut cut_points = SecondaryMap::<HalfEdgeId, usize>::new();
    let mut soup = PolygonMesh::default();
    for (h, _) in conn.iter_halfedges() {
        if cut_points.contains_key(h) {
            continue;
        }
        let (head, tail) = mesh.edge_vertices(h)?;
        let p = mesh.position(tail)?.lerp(mesh.position(head)?, factor);
        cut_points.insert(h, soup.positions.len());
        soup.positions.push(p);
        if weld {
            let pair = conn.at_halfedge(h).pair().try_end()?;
            cut_points.insert(pair, soup.positions.len() - 1);
            soup.colors.push((mesh.color(tail) + mesh.color(head)) * 0.5);
        } else {
            soup.colors.push(mesh.color(tail));
        }
    }

    for (f, _) in conn.iter_faces() {
        let mut polygon = SVec::new();
        for h in mesh.face_edges(f)? {
            polygon.push(cut_points[h]);
            if !weld {
                let pair = conn.at_halfedge(h).pair().try_end()?;
                polygon.push(cut_points[pair]);
            }
        }
        soup.faces.push(polygon);
    }

    for (v, _) in conn.iter_vertices() {
        let fan = conn.at_vertex(v).outgoing_halfedges()?;
        if fan.len() < 3 {
            continue;
        }
        // Rotating around a vertex goes clockwise when seen from outside.
        // Reversing the fan gives a counter-clockwise face.
        soup.faces
            .push(fan.iter().rev().map(|h| cut_points[*h]).collect_svec());
    }

    log::debug!(
        "Truncated mesh with factor {factor}: {} vertices, {} faces",
        soup.positions.len(),
        soup.faces.len()
    );
    soup.to_halfedge()
}
