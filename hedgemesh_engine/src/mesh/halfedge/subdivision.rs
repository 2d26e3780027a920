// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubdivisionScheme {
    Topological,
    Linear,
    Loop,
}

/// The element of the coarse mesh a vertex of the refined mesh comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexOrigin {
    Vertex(VertexId),
    Face(FaceId),
    /// Any of the two halfedges of the edge.
    Edge(HalfEdgeId),
}

/// A refined polygon soup, with the origin of each of its vertices.
struct Refinement {
    origins: Vec<VertexOrigin>,
    faces: Vec<SVec<usize>>,
}

impl Refinement {
    /// Builds the refined mesh, placing each vertex with `place`.
    fn build(
        self,
        mesh: &HalfEdgeMesh,
        place: impl Fn(VertexOrigin) -> MeshResult<Vec3>,
    ) -> MeshResult<HalfEdgeMesh> {
        let mut positions = Vec::with_capacity(self.origins.len());
        let mut colors = Vec::with_capacity(self.origins.len());
        for origin in self.origins.iter_cpy() {
            positions.push(place(origin)?);
            colors.push(origin_color(mesh, origin)?);
        }
        HalfEdgeMesh::build_from_polygons_with_colors(&positions, &colors, &self.faces)
    }
}

/// The original vertices that generate a refined vertex.
fn generators(mesh: &HalfEdgeMesh, origin: VertexOrigin) -> MeshResult<SVec<VertexId>> {
    Ok(match origin {
        VertexOrigin::Vertex(v) => smallvec::smallvec![v],
        VertexOrigin::Face(f) => mesh.face_vertices(f)?,
        VertexOrigin::Edge(h) => {
            let (head, tail) = mesh.edge_vertices(h)?;
            smallvec::smallvec![head, tail]
        }
    })
}

/// The mean position of the generators.
fn generator_mean(mesh: &HalfEdgeMesh, origin: VertexOrigin) -> MeshResult<Vec3> {
    let points = generators(mesh, origin)?
        .iter()
        .map(|&v| mesh.position(v))
        .collect::<MeshResult<SVec<_>>>()?;
    mean_point(points).ok_or_else(|| MeshError::corrupt(format!("{origin:?} has no vertices")))
}

fn origin_color(mesh: &HalfEdgeMesh, origin: VertexOrigin) -> MeshResult<Vec3> {
    let colors = generators(mesh, origin)?.iter().map(|&v| mesh.color(v)).collect_svec();
    Ok(mean_point(colors).unwrap_or(DEFAULT_COLOR))
}

/// Allocates the original vertices, followed by one vertex per edge. Returns
/// the index of every original vertex and of the edge point of every
/// halfedge (both halfedges of an edge share it).
fn vertex_and_edge_points(
    mesh: &HalfEdgeMesh,
    origins: &mut Vec<VertexOrigin>,
) -> MeshResult<(SecondaryMap<VertexId, usize>, SecondaryMap<HalfEdgeId, usize>)> {
    let conn = mesh.read_connectivity();
    let mut vertex_points = SecondaryMap::new();
    for (v, _) in conn.iter_vertices() {
        vertex_points.insert(v, origins.len());
        origins.push(VertexOrigin::Vertex(v));
    }
    Ok((vertex_points, edge_points(mesh, origins)?))
}

fn edge_points(
    mesh: &HalfEdgeMesh,
    origins: &mut Vec<VertexOrigin>,
) -> MeshResult<SecondaryMap<HalfEdgeId, usize>> {
    let conn = mesh.read_connectivity();
    let mut edge_points = SecondaryMap::new();
    for (h, _) in conn.iter_halfedges() {
        if edge_points.contains_key(h) {
            continue;
        }
        let pair = conn.at_halfedge(h).pair().try_end()?;
        edge_points.insert(h, origins.len());
        edge_points.insert(pair, origins.len());
        origins.push(VertexOrigin::Edge(h));
    }
    Ok(edge_points)
}

/// Splits every face into the quads around its corners, each quad made of a
/// corner, its two edge points and the face point. Quads are emitted as two
/// triangles sharing the corner - face point diagonal.
///
/// Vertices are ordered as original vertices, then face points, then edge
/// points.
fn face_split_refinement(mesh: &HalfEdgeMesh) -> MeshResult<Refinement> {
    let conn = mesh.read_connectivity();
    let mut origins = Vec::new();

    let mut vertex_points = SecondaryMap::<VertexId, usize>::new();
    for (v, _) in conn.iter_vertices() {
        vertex_points.insert(v, origins.len());
        origins.push(VertexOrigin::Vertex(v));
    }
    let mut face_points = SecondaryMap::<FaceId, usize>::new();
    for (f, _) in conn.iter_faces() {
        face_points.insert(f, origins.len());
        origins.push(VertexOrigin::Face(f));
    }
    let edge_points = edge_points(mesh, &mut origins)?;

    let mut faces = Vec::new();
    for (f, _) in conn.iter_faces() {
        let c = face_points[f];
        for (h, h_next) in mesh.face_edges(f)?.iter_cpy().circular_tuple_windows() {
            let corner = vertex_points[conn.at_halfedge(h).head().try_end()?];
            let (m_prev, m_next) = (edge_points[h], edge_points[h_next]);
            faces.push(smallvec::smallvec![corner, m_next, c]);
            faces.push(smallvec::smallvec![corner, c, m_prev]);
        }
    }
    Ok(Refinement { origins, faces })
}

/// Splits every edge in two, cutting each corner off its face as a triangle.
/// The edge points of a face are joined by a central face, so triangles are
/// split in four.
fn edge_split_refinement(mesh: &HalfEdgeMesh) -> MeshResult<Refinement> {
    let conn = mesh.read_connectivity();
    let mut origins = Vec::new();
    let (vertex_points, edge_points) = vertex_and_edge_points(mesh, &mut origins)?;

    let mut faces = Vec::new();
    for (f, _) in conn.iter_faces() {
        let halfedges = mesh.face_edges(f)?;
        for (h, h_next) in halfedges.iter_cpy().circular_tuple_windows() {
            let corner = vertex_points[conn.at_halfedge(h).head().try_end()?];
            faces.push(smallvec::smallvec![corner, edge_points[h_next], edge_points[h]]);
        }
        faces.push(halfedges.iter().map(|h| edge_points[*h]).collect_svec());
    }
    Ok(Refinement { origins, faces })
}

/// Adds a vertex at the middle of every face and every edge, and splits the
/// faces around them (see [`SubdivisionScheme`]). New vertices sit at the
/// mean of the original vertices that generate them.
#[profiling::function]
pub fn subdivide_topological(mesh: &HalfEdgeMesh) -> MeshResult<HalfEdgeMesh> {
    let refined = face_split_refinement(mesh)?.build(mesh, |origin| generator_mean(mesh, origin))?;
    log::debug!(
        "Subdivided mesh: {} -> {} faces",
        mesh.num_faces(),
        refined.num_faces()
    );
    Ok(refined)
}

/// Topological subdivision, followed by an explicit reset of every vertex to
/// the centroid of its generators: face centroids, edge midpoints, and the
/// original positions.
pub fn subdivide_linear(mesh: &HalfEdgeMesh) -> MeshResult<HalfEdgeMesh> {
    let refinement = face_split_refinement(mesh)?;
    let origins = refinement.origins.clone();
    let mut refined = refinement.build(mesh, |_| Ok(Vec3::ZERO))?;

    let targets = origins
        .iter()
        .map(|&origin| generator_mean(mesh, origin))
        .collect::<MeshResult<Vec<_>>>()?;
    let vertices = refined.read_connectivity().iter_vertices().map(|(v, _)| v).collect_vec();
    let positions = refined.write_positions();
    for (v, target) in vertices.into_iter().zip(targets) {
        positions[v] = target;
    }
    Ok(refined)
}

/// Loop subdivision: every edge is split and every triangle becomes four,
/// with positions smoothed from the coarse mesh.
///
/// - Edge points: `3/8` of each endpoint plus `1/8` of each opposite vertex.
///   On polygons with more than three sides the opposite vertex is the mean of
///   the rest of the polygon. Boundary edges use their midpoint.
/// - Interior vertices: `(1 - n b) v + b * sum(neighbours)`, with `b = 3/16` for
///   `n = 3` and `3 / (8n)` otherwise.
/// - Boundary vertices: `3/4 v + 1/8` of each of their two boundary neighbours.
#[profiling::function]
pub fn subdivide_loop(mesh: &HalfEdgeMesh) -> MeshResult<HalfEdgeMesh> {
    let refined = edge_split_refinement(mesh)?.build(mesh, |origin| match origin {
        VertexOrigin::Vertex(v) => loop_vertex_point(mesh, v),
        VertexOrigin::Edge(h) => loop_edge_point(mesh, h),
        VertexOrigin::Face(_) => generator_mean(mesh, origin),
    })?;
    log::debug!(
        "Loop subdivision: {} -> {} vertices",
        mesh.num_vertices(),
        refined.num_vertices()
    );
    Ok(refined)
}

/// The point across edge `h` inside its face, as seen from the edge.
fn opposite_point(mesh: &HalfEdgeMesh, h: HalfEdgeId, face: FaceId) -> MeshResult<Vec3> {
    let (head, tail) = mesh.edge_vertices(h)?;
    let rest = mesh
        .face_vertices(face)?
        .iter()
        .filter(|&&v| v != head && v != tail)
        .map(|&v| mesh.position(v))
        .collect::<MeshResult<SVec<_>>>()?;
    mean_point(rest).ok_or_else(|| MeshError::corrupt(format!("{face:?} has fewer than 3 sides")))
}

fn loop_edge_point(mesh: &HalfEdgeMesh, h: HalfEdgeId) -> MeshResult<Vec3> {
    let conn = mesh.read_connectivity();
    let pair = conn.at_halfedge(h).pair().try_end()?;
    let (head, tail) = mesh.edge_vertices(h)?;
    let (a, b) = (mesh.position(head)?, mesh.position(tail)?);

    match (
        conn.at_halfedge(h).face_or_boundary()?,
        conn.at_halfedge(pair).face_or_boundary()?,
    ) {
        (Some(f1), Some(f2)) => {
            let o1 = opposite_point(mesh, h, f1)?;
            let o2 = opposite_point(mesh, pair, f2)?;
            Ok((a + b) * (3.0 / 8.0) + (o1 + o2) * (1.0 / 8.0))
        }
        _ => Ok((a + b) * 0.5),
    }
}

fn loop_vertex_point(mesh: &HalfEdgeMesh, v: VertexId) -> MeshResult<Vec3> {
    let conn = mesh.read_connectivity();
    let p = mesh.position(v)?;
    let outgoing = conn.at_vertex(v).outgoing_halfedges()?;
    if outgoing.is_empty() {
        return Ok(p);
    }

    let mut ghost = None;
    for h in outgoing.iter_cpy() {
        if conn.at_halfedge(h).is_boundary()? {
            ghost = Some(h);
            break;
        }
    }
    if let Some(g) = ghost {
        // The boundary neighbours: where the outgoing ghost goes, and where
        // the incoming one comes from.
        let b0 = conn.at_halfedge(g).head().try_end()?;
        let b1 = conn.at_halfedge(g).prev().tail().try_end()?;
        return Ok(p * 0.75 + (mesh.position(b0)? + mesh.position(b1)?) * 0.125);
    }

    let n = outgoing.len();
    let beta = if n == 3 { 3.0 / 16.0 } else { 3.0 / (8.0 * n as f32) };
    let mut sum = Vec3::ZERO;
    for w in mesh.vertex_neighbors(v)? {
        sum += mesh.position(w)?;
    }
    Ok(p * (1.0 - n as f32 * beta) + sum * beta)
}

impl SubdivisionScheme {
    pub fn apply(self, mesh: &HalfEdgeMesh) -> MeshResult<HalfEdgeMesh> {
        match self {
            SubdivisionScheme::Topological => subdivide_topological(mesh),
            SubdivisionScheme::Linear => subdivide_linear(mesh),
            SubdivisionScheme::Loop => subdivide_loop(mesh),
        }
    }
}
