// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

/// A neighbourhood query on a single element, addressed by its index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraversalQuery {
    /// The vertices that share an edge with a vertex.
    VertexNeighbors(usize),
    /// The faces around a vertex.
    AttachedFaces(usize),
    /// The halfedges around a face.
    FaceEdges(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraversalResult {
    Vertices(SVec<VertexId>),
    Faces(SVec<FaceId>),
    Edges(SVec<HalfEdgeId>),
}

/// Debug geometry for a query result, ready to be drawn over the mesh.
#[derive(Clone, Debug, Default)]
pub struct TraversalOverlay {
    pub lines: LineBuffers,
    pub points: PointBuffers,
}

impl TraversalQuery {
    pub fn run(&self, mesh: &HalfEdgeMesh) -> MeshResult<TraversalResult> {
        Ok(match *self {
            TraversalQuery::VertexNeighbors(i) => {
                TraversalResult::Vertices(mesh.vertex_neighbors(mesh.vertex_at_index(i)?)?)
            }
            TraversalQuery::AttachedFaces(i) => {
                TraversalResult::Faces(mesh.attached_faces(mesh.vertex_at_index(i)?)?)
            }
            TraversalQuery::FaceEdges(i) => {
                TraversalResult::Edges(mesh.face_edges(mesh.face_at_index(i)?)?)
            }
        })
    }

    /// Runs the query and builds its overlay. The queried element is drawn in
    /// the highlight color, the result in the traversal color. Lines are
    /// drawn twice, slightly in front of and behind the surface.
    pub fn overlay_buffers(
        &self,
        mesh: &HalfEdgeMesh,
        config: &DisplayConfig,
    ) -> MeshResult<TraversalOverlay> {
        let highlight = Vec3::from(config.highlight_color);
        let traversal = Vec3::from(config.traversal_color);
        let mut lines = LineBuffers::default();
        let mut points = PointBuffers::default();

        match (*self, self.run(mesh)?) {
            (TraversalQuery::VertexNeighbors(i), TraversalResult::Vertices(neighbors)) => {
                let p = mesh.position(mesh.vertex_at_index(i)?)?;
                points.push_point(p, highlight);
                for w in neighbors {
                    let q = mesh.position(w)?;
                    points.push_point(q, traversal);
                    lines.push_segment(p, q, traversal);
                }
            }
            (TraversalQuery::AttachedFaces(i), TraversalResult::Faces(faces)) => {
                points.push_point(mesh.position(mesh.vertex_at_index(i)?)?, highlight);
                for f in faces {
                    push_face_outline(mesh, f, traversal, &mut lines)?;
                }
            }
            (TraversalQuery::FaceEdges(i), TraversalResult::Edges(_)) => {
                let f = mesh.face_at_index(i)?;
                points.push_point(mesh.face_centroid(f)?, highlight);
                push_face_outline(mesh, f, traversal, &mut lines)?;
            }
            (query, result) => {
                return Err(MeshError::corrupt(format!(
                    "{query:?} produced an unexpected {result:?}"
                )))
            }
        }

        Ok(TraversalOverlay {
            lines: lines.with_draw_offset(config),
            points,
        })
    }
}

fn push_face_outline(
    mesh: &HalfEdgeMesh,
    face: FaceId,
    color: Vec3,
    lines: &mut LineBuffers,
) -> MeshResult<()> {
    for h in mesh.face_edges(face)? {
        let (head, tail) = mesh.edge_vertices(h)?;
        lines.push_segment(mesh.position(tail)?, mesh.position(head)?, color);
    }
    Ok(())
}

impl TraversalResult {
    pub fn len(&self) -> usize {
        match self {
            TraversalResult::Vertices(v) => v.len(),
            TraversalResult::Faces(f) => f.len(),
            TraversalResult::Edges(h) => h.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A one-line listing of the result, using vertex and face indices. Edges
    /// are written as `tail-head`.
    pub fn describe(&self, mesh: &HalfEdgeMesh) -> MeshResult<String> {
        let conn = mesh.read_connectivity();
        Ok(match self {
            TraversalResult::Vertices(vertices) => {
                let v_mapping = conn.vertex_mapping();
                format!("vertices: {}", v_mapping.map_seq(vertices).iter().join(" "))
            }
            TraversalResult::Faces(faces) => {
                let f_mapping = conn.face_mapping();
                format!("faces: {}", f_mapping.map_seq(faces).iter().join(" "))
            }
            TraversalResult::Edges(halfedges) => {
                let v_mapping = conn.vertex_mapping();
                let edges = halfedges
                    .iter()
                    .map(|&h| -> MeshResult<String> {
                        let (head, tail) = mesh.edge_vertices(h)?;
                        Ok(format!("{}-{}", v_mapping[tail], v_mapping[head]))
                    })
                    .collect::<MeshResult<Vec<String>>>()?;
                format!("edges: {}", edges.join(" "))
            }
        })
    }
}
