// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::prelude::*;

use slotmap::{SecondaryMap, SlotMap};

/// Implements indexing traits so the mesh data structure can be used to access
/// vertex, face or halfedge information using ids as indices.
pub mod mesh_index_impls;

/// Type-safe wrappers over the internal allocator indices used as pointers
pub mod id_types;
pub use id_types::*;

/// An API to represent type-safe and error-handled graph traversals over a mesh
pub mod traversals;
pub use traversals::*;

/// Dense integer indices for mesh elements
pub mod mappings;
use mappings::MeshMapping;

/// Normals, areas and centroids
pub mod geometry;

/// Boundaries, connected components, genus and hole filling
pub mod topology;

/// Edit operations that move vertices but never change connectivity
pub mod edit_ops;

/// Primitive shapes, like cubes, tori or surfaces of revolution
pub mod primitives;

/// Cuts every vertex of a mesh, replacing it with a new face
pub mod truncation;

/// Topological, linear and Loop subdivision
pub mod subdivision;

/// Generate vertex and index buffers suitable to be uploaded to the GPU for rendering
pub mod buffer_generation;
pub use buffer_generation::*;

/// Neighbourhood queries, as requested by a parameter panel
pub mod traversal_query;
pub use traversal_query::*;

/// Structural invariants of the halfedge graph
pub mod validation;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HalfEdge {
    head: Option<VertexId>,
    face: Option<FaceId>,
    pair: Option<HalfEdgeId>,
    next: Option<HalfEdgeId>,
    prev: Option<HalfEdgeId>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Vertex {
    halfedge: Option<HalfEdgeId>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Face {
    halfedge: Option<HalfEdgeId>,
}

impl HalfEdge {
    pub fn head(&self) -> Option<VertexId> {
        self.head
    }
    /// `None` for boundary (ghost) halfedges.
    pub fn face(&self) -> Option<FaceId> {
        self.face
    }
    pub fn pair(&self) -> Option<HalfEdgeId> {
        self.pair
    }
    pub fn next(&self) -> Option<HalfEdgeId> {
        self.next
    }
    pub fn prev(&self) -> Option<HalfEdgeId> {
        self.prev
    }
}

impl Vertex {
    pub fn halfedge(&self) -> Option<HalfEdgeId> {
        self.halfedge
    }
}

impl Face {
    pub fn halfedge(&self) -> Option<HalfEdgeId> {
        self.halfedge
    }
}

/// The halfedge graph. Elements are only ever added, never removed.
#[derive(Debug, Clone, Default)]
pub struct MeshConnectivity {
    vertices: SlotMap<VertexId, Vertex>,
    faces: SlotMap<FaceId, Face>,
    halfedges: SlotMap<HalfEdgeId, HalfEdge>,
}

pub type Positions = SecondaryMap<VertexId, Vec3>;
pub type Colors = SecondaryMap<VertexId, Vec3>;

#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    connectivity: MeshConnectivity,
    positions: Positions,
    colors: Colors,
    /// Set whenever positions or connectivity change, cleared by the renderer
    /// once it has uploaded fresh buffers.
    needs_display_update: bool,
}

impl MeshConnectivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter_vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.iter()
    }

    pub fn iter_faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces.iter()
    }

    pub fn iter_halfedges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdge)> {
        self.halfedges.iter()
    }

    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Follows `next` from `h0` until it comes back. Gives up after visiting
    /// as many halfedges as the mesh has.
    pub fn halfedge_loop(&self, h0: HalfEdgeId) -> Result<SVec<HalfEdgeId>, TraversalError> {
        let max_steps = self.num_halfedges();
        let mut halfedges = SVec::new();
        let mut h = h0;
        loop {
            if halfedges.len() >= max_steps {
                return Err(TraversalError::HalfedgeBadLoop(h0));
            }
            halfedges.push(h);
            h = self.at_halfedge(h).next().try_end()?;
            if h == h0 {
                break;
            }
        }
        Ok(halfedges)
    }

    pub fn face_edges(&self, face_id: FaceId) -> Result<SVec<HalfEdgeId>, TraversalError> {
        self.at_face(face_id).halfedges()
    }

    pub fn face_vertices(&self, face_id: FaceId) -> Result<SVec<VertexId>, TraversalError> {
        self.at_face(face_id).vertices()
    }

    pub fn vertex_mapping(&self) -> MeshMapping<VertexId> {
        MeshMapping::new(&self.vertices)
    }

    pub fn face_mapping(&self) -> MeshMapping<FaceId> {
        MeshMapping::new(&self.faces)
    }

    pub fn halfedge_mapping(&self) -> MeshMapping<HalfEdgeId> {
        MeshMapping::new(&self.halfedges)
    }

    fn alloc_vertex(&mut self, halfedge: Option<HalfEdgeId>) -> VertexId {
        self.vertices.insert(Vertex { halfedge })
    }

    fn alloc_face(&mut self, halfedge: Option<HalfEdgeId>) -> FaceId {
        self.faces.insert(Face { halfedge })
    }

    fn alloc_halfedge(&mut self, halfedge: HalfEdge) -> HalfEdgeId {
        self.halfedges.insert(halfedge)
    }
}

impl HalfEdgeMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_connectivity(&self) -> &MeshConnectivity {
        &self.connectivity
    }

    pub fn positions(&self) -> &Positions {
        &self.positions
    }

    /// Mutable access to vertex positions. Marks the mesh as dirty.
    pub fn write_positions(&mut self) -> &mut Positions {
        self.needs_display_update = true;
        &mut self.positions
    }

    pub fn colors(&self) -> &Colors {
        &self.colors
    }

    pub fn position(&self, v: VertexId) -> MeshResult<Vec3> {
        self.positions
            .get(v)
            .copied()
            .ok_or_else(|| MeshError::invalid_parameter(format!("{v:?} has no position")))
    }

    pub fn color(&self, v: VertexId) -> Vec3 {
        self.colors.get(v).copied().unwrap_or(DEFAULT_COLOR)
    }

    pub fn is_dirty(&self) -> bool {
        self.needs_display_update
    }

    pub fn mark_dirty(&mut self) {
        self.needs_display_update = true;
    }

    pub fn mark_clean(&mut self) {
        self.needs_display_update = false;
    }

    pub fn num_vertices(&self) -> usize {
        self.connectivity.num_vertices()
    }

    pub fn num_faces(&self) -> usize {
        self.connectivity.num_faces()
    }

    pub fn num_halfedges(&self) -> usize {
        self.connectivity.num_halfedges()
    }

    /// Number of undirected edges. Every edge is made of two halfedges, one of
    /// which may be a ghost.
    pub fn num_edges(&self) -> usize {
        self.connectivity.num_halfedges() / 2
    }

    /// Returns the vertex at the given 0-based insertion index.
    pub fn vertex_at_index(&self, index: usize) -> MeshResult<VertexId> {
        self.connectivity
            .iter_vertices()
            .nth(index)
            .map(|(v, _)| v)
            .ok_or_else(|| {
                MeshError::invalid_parameter(format!(
                    "Vertex index {index} out of range, the mesh has {} vertices",
                    self.num_vertices()
                ))
            })
    }

    /// Returns the face at the given 0-based insertion index.
    pub fn face_at_index(&self, index: usize) -> MeshResult<FaceId> {
        self.connectivity
            .iter_faces()
            .nth(index)
            .map(|(f, _)| f)
            .ok_or_else(|| {
                MeshError::invalid_parameter(format!(
                    "Face index {index} out of range, the mesh has {} faces",
                    self.num_faces()
                ))
            })
    }

    /// Returns the `(head, tail)` vertices of a halfedge.
    pub fn edge_vertices(&self, h: HalfEdgeId) -> MeshResult<(VertexId, VertexId)> {
        Ok(self.connectivity.at_halfedge(h).head_tail_pair()?)
    }

    pub fn face_vertices(&self, f: FaceId) -> MeshResult<SVec<VertexId>> {
        Ok(self.connectivity.face_vertices(f)?)
    }

    pub fn face_edges(&self, f: FaceId) -> MeshResult<SVec<HalfEdgeId>> {
        Ok(self.connectivity.face_edges(f)?)
    }

    /// The heads of the outgoing halfedges of `v`, in rotation order.
    pub fn vertex_neighbors(&self, v: VertexId) -> MeshResult<SVec<VertexId>> {
        Ok(self.connectivity.at_vertex(v).neighbors()?)
    }

    pub fn attached_faces(&self, v: VertexId) -> MeshResult<SVec<FaceId>> {
        Ok(self.connectivity.at_vertex(v).adjacent_faces()?)
    }

    pub fn vertex_degree(&self, v: VertexId) -> MeshResult<usize> {
        Ok(self.connectivity.at_vertex(v).outgoing_halfedges()?.len())
    }

    pub fn is_boundary_vertex(&self, v: VertexId) -> MeshResult<bool> {
        for h in self.connectivity.at_vertex(v).outgoing_halfedges()? {
            if self.connectivity.at_halfedge(h).is_boundary()? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Builds this mesh from a list of vertices, and a list of polygons,
    /// containing indices that reference those vertices. Every vertex gets
    /// the default color.
    ///
    /// - Generic over Index: Use as much precision as you need / want.
    /// - Generic over Polygon: Use whatever input layout you want.
    ///
    /// If unsure, you can pass `Vec<Vec<u32>>` as `polygons`. You can also use
    /// `[[u32;3]]` or `&[&[u32]]`. Same for `u8`, `u16` or `usize` indices.
    pub fn build_from_polygons<Index, Polygon>(
        positions: &[Vec3],
        polygons: &[Polygon],
    ) -> MeshResult<Self>
    where
        Index: num_traits::AsPrimitive<usize> + 'static + Copy,
        Polygon: AsRef<[Index]>,
    {
        let colors = vec![DEFAULT_COLOR; positions.len()];
        Self::build_from_polygons_with_colors(positions, &colors, polygons)
    }

    /// Same as [`HalfEdgeMesh::build_from_polygons`], with one color per
    /// position.
    ///
    /// Polygons must be wound consistently: two faces may not traverse the
    /// same edge in the same direction. Input positions that no polygon
    /// references become isolated vertices.
    #[profiling::function]
    pub fn build_from_polygons_with_colors<Index, Polygon>(
        positions: &[Vec3],
        colors: &[Vec3],
        polygons: &[Polygon],
    ) -> MeshResult<Self>
    where
        Index: num_traits::AsPrimitive<usize> + 'static + Copy,
        Polygon: AsRef<[Index]>,
    {
        if colors.len() != positions.len() {
            return Err(MeshError::invalid_parameter(format!(
                "Got {} colors for {} positions",
                colors.len(),
                positions.len()
            )));
        }

        // Sanity checks first, so we never start building a mesh we can't finish
        for (i, polygon) in polygons.iter().map(|p| p.as_ref()).enumerate() {
            if polygon.len() < 3 {
                return Err(MeshError::invalid_parameter(format!(
                    "Face {i} has {} vertices, at least three are needed",
                    polygon.len()
                )));
            }
            if let Some(dup) = polygon.iter().map(|idx| idx.as_()).duplicates().next() {
                return Err(MeshError::invalid_parameter(format!(
                    "Face {i} references vertex {dup} more than once"
                )));
            }
            if let Some(idx) = polygon.iter().map(|idx| idx.as_()).find(|&idx| idx >= positions.len()) {
                return Err(MeshError::invalid_parameter(format!(
                    "Face {i} references vertex {idx}, but there are only {} vertices",
                    positions.len()
                )));
            }
        }

        let mut mesh = Self::new();
        let conn = &mut mesh.connectivity;

        let index_to_vertex = positions
            .iter()
            .zip(colors)
            .map(|(&position, &color)| {
                let v = conn.alloc_vertex(None);
                mesh.positions.insert(v, position);
                mesh.colors.insert(v, color);
                v
            })
            .collect_vec();

        // How many faces each vertex belongs to. Used for the manifold check below.
        let mut vertex_degree = vec![0usize; positions.len()];

        // Maps oriented index pairs to mesh halfedges
        let mut pair_to_halfedge = HashMap::<(usize, usize), HalfEdgeId>::new();
        // The same halfedges in creation order, so ghosts are created in a
        // deterministic order.
        let mut created = Vec::<(usize, usize, HalfEdgeId)>::new();

        for polygon in polygons.iter().map(|p| p.as_ref()) {
            let face = conn.alloc_face(None);
            let mut half_edges_in_face = SVec::new();

            for (a, b) in polygon.iter().map(|idx| idx.as_()).circular_tuple_windows() {
                if pair_to_halfedge.contains_key(&(a, b)) {
                    return Err(MeshError::InconsistentOrientation { from: a, to: b });
                }
                vertex_degree[a] += 1;

                let h = conn.alloc_halfedge(HalfEdge {
                    head: Some(index_to_vertex[b]),
                    face: Some(face),
                    ..Default::default()
                });
                conn[index_to_vertex[a]].halfedge = Some(h);
                // The face keeps the last created halfedge, whose head is the
                // first polygon vertex. Face loops then start where the input did.
                conn[face].halfedge = Some(h);

                if let Some(&other) = pair_to_halfedge.get(&(b, a)) {
                    conn[h].pair = Some(other);
                    conn[other].pair = Some(h);
                }
                pair_to_halfedge.insert((a, b), h);
                created.push((a, b, h));
                half_edges_in_face.push(h);
            }

            for (&h1, &h2) in half_edges_in_face.iter().circular_tuple_windows() {
                conn[h1].next = Some(h2);
                conn[h2].prev = Some(h1);
            }
        }

        // Edges with a single face get a ghost halfedge as their pair. Ghosts
        // are staged by their tail so they can be chained into loops after.
        let mut ghost_by_tail = HashMap::<VertexId, HalfEdgeId>::new();
        let mut ghosts = Vec::new();
        for &(a, b, h) in &created {
            if conn[h].pair.is_some() {
                continue;
            }
            let ghost = conn.alloc_halfedge(HalfEdge {
                head: Some(index_to_vertex[a]),
                face: None,
                pair: Some(h),
                ..Default::default()
            });
            conn[h].pair = Some(ghost);
            if ghost_by_tail.insert(index_to_vertex[b], ghost).is_some() {
                return Err(MeshError::corrupt(format!(
                    "Vertex {b} has more than one outgoing boundary edge"
                )));
            }
            ghosts.push(ghost);
        }
        for &ghost in &ghosts {
            let head = conn.at_halfedge(ghost).head().try_end()?;
            let next = *ghost_by_tail.get(&head).ok_or_else(|| {
                MeshError::corrupt("A boundary loop does not close".to_string())
            })?;
            conn[ghost].next = Some(next);
            conn[next].prev = Some(ghost);
        }

        // Each vertex must be a single polygon fan: rotating around it visits
        // every face that contains it.
        for (i, &v) in index_to_vertex.iter().enumerate() {
            let fan_faces = conn.at_vertex(v).adjacent_faces()?.len();
            if fan_faces != vertex_degree[i] {
                return Err(MeshError::corrupt(format!(
                    "Vertex {i} is not a polygon fan, but some other nonmanifold structure instead"
                )));
            }
        }

        mesh.needs_display_update = true;
        validation::check_invariants(&mesh)?;
        log::debug!(
            "Built halfedge mesh: {} vertices, {} faces, {} halfedges ({} on the boundary)",
            mesh.num_vertices(),
            mesh.num_faces(),
            mesh.num_halfedges(),
            ghosts.len()
        );
        Ok(mesh)
    }
}
