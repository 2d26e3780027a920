// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

pub trait Location {}

impl Location for VertexId {}
impl Location for FaceId {}
impl Location for HalfEdgeId {}

/// The error of a traversal chain. Each variant names the element whose
/// pointer was missing, or whose loop never closed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraversalError {
    VertexHasNoHalfedge(VertexId),
    FaceHasNoHalfedge(FaceId),
    HalfEdgeHasNoNext(HalfEdgeId),
    HalfEdgeHasNoPrev(HalfEdgeId),
    HalfEdgeHasNoPair(HalfEdgeId),
    HalfEdgeHasNoHead(HalfEdgeId),
    HalfEdgeHasNoFace(HalfEdgeId),
    /// Following `next` from this halfedge did not come back to it.
    HalfedgeBadLoop(HalfEdgeId),
    /// Rotating around this vertex did not come back to the first halfedge.
    VertexBadFan(VertexId),
}
impl std::fmt::Display for TraversalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{self:?}"))
    }
}
impl std::error::Error for TraversalError {}

#[derive(Clone, Copy)]
pub struct ValidTraversal<'a, L>
where
    L: Location,
{
    inner: &'a MeshConnectivity,
    location: L,
}

pub type Traversal<'a, L> = Result<ValidTraversal<'a, L>, TraversalError>;

/* ===================== */
/* Traversal on vertices */
/* ===================== */

pub trait VertexTraversal<'a> {
    /// The stored outgoing halfedge of the vertex.
    fn halfedge(&'a self) -> Traversal<'a, HalfEdgeId>;
}

impl<'a> VertexTraversal<'a> for Traversal<'a, VertexId> {
    fn halfedge(&'a self) -> Traversal<'a, HalfEdgeId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .halfedge
                    .ok_or(TraversalError::VertexHasNoHalfedge(valid.location))?,
            })
        })
    }
}

/* ================== */
/* Traversal on faces */
/* ================== */

pub trait FaceTraversal<'a> {
    fn halfedge(&'a self) -> Traversal<'a, HalfEdgeId>;
}
impl<'a> FaceTraversal<'a> for Traversal<'a, FaceId> {
    fn halfedge(&'a self) -> Traversal<'a, HalfEdgeId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .halfedge
                    .ok_or(TraversalError::FaceHasNoHalfedge(valid.location))?,
            })
        })
    }
}

/* ====================== */
/* Traversal on halfedges */
/* ====================== */

pub trait HalfEdgeTraversal<'a> {
    fn pair(&'a self) -> Traversal<'a, HalfEdgeId>;
    fn next(&'a self) -> Traversal<'a, HalfEdgeId>;
    fn prev(&'a self) -> Traversal<'a, HalfEdgeId>;
    fn face(&'a self) -> Traversal<'a, FaceId>;
    /// The vertex this halfedge points to.
    fn head(&'a self) -> Traversal<'a, VertexId>;
    fn face_or_boundary(&'a self) -> Result<Option<FaceId>, TraversalError>;
}

impl<'a> HalfEdgeTraversal<'a> for Traversal<'a, HalfEdgeId> {
    fn pair(&'a self) -> Traversal<'a, HalfEdgeId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .pair
                    .ok_or(TraversalError::HalfEdgeHasNoPair(valid.location))?,
            })
        })
    }

    fn next(&'a self) -> Traversal<'a, HalfEdgeId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .next
                    .ok_or(TraversalError::HalfEdgeHasNoNext(valid.location))?,
            })
        })
    }

    fn prev(&'a self) -> Traversal<'a, HalfEdgeId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .prev
                    .ok_or(TraversalError::HalfEdgeHasNoPrev(valid.location))?,
            })
        })
    }

    fn face(&'a self) -> Traversal<'a, FaceId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .face
                    .ok_or(TraversalError::HalfEdgeHasNoFace(valid.location))?,
            })
        })
    }

    fn head(&'a self) -> Traversal<'a, VertexId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .head
                    .ok_or(TraversalError::HalfEdgeHasNoHead(valid.location))?,
            })
        })
    }

    fn face_or_boundary(&'a self) -> Result<Option<FaceId>, TraversalError> {
        self.and_then(|valid| Ok(valid.inner[valid.location].face))
    }
}

/* =================== */
/*  Generic traversal  */
/* =================== */

pub trait AnyTraversal<'a, L> {
    fn end(&'a self) -> L;
    fn try_end(&'a self) -> Result<L, TraversalError>;
}
impl<'a, L> AnyTraversal<'a, L> for Traversal<'a, L>
where
    L: Location + Copy,
{
    fn end(&'a self) -> L {
        self.map(|valid| valid.location)
            .unwrap_or_else(|err| panic!("Error during traversal: {err:?}"))
    }

    fn try_end(&'a self) -> Result<L, TraversalError> {
        self.map(|valid| valid.location)
    }
}

/* ============ */
/*  Initiators  */
/* ============ */

impl MeshConnectivity {
    pub fn at_halfedge(&self, halfedge_id: HalfEdgeId) -> Traversal<'_, HalfEdgeId> {
        Ok(ValidTraversal {
            inner: self,
            location: halfedge_id,
        })
    }

    pub fn at_face(&self, face_id: FaceId) -> Traversal<'_, FaceId> {
        Ok(ValidTraversal {
            inner: self,
            location: face_id,
        })
    }

    pub fn at_vertex(&self, vertex_id: VertexId) -> Traversal<'_, VertexId> {
        Ok(ValidTraversal {
            inner: self,
            location: vertex_id,
        })
    }
}

/* ================ */
/*  Vertex Helpers  */
/* ================ */

pub trait VertexTraversalHelpers<'a> {
    fn outgoing_halfedges(&'a self) -> Result<SVec<HalfEdgeId>, TraversalError>;
    fn neighbors(&'a self) -> Result<SVec<VertexId>, TraversalError>;
    fn adjacent_faces(&'a self) -> Result<SVec<FaceId>, TraversalError>;
}

impl<'a> VertexTraversalHelpers<'a> for Traversal<'a, VertexId> {
    /// Rotates around the vertex with `h <- h.pair.next`, starting at its
    /// stored halfedge.
    fn outgoing_halfedges(&'a self) -> Result<SVec<HalfEdgeId>, TraversalError> {
        self.and_then(|valid| {
            let mut halfedges = SVec::new();
            // Unreferenced vertices have an empty fan.
            if let Some(h0) = valid.inner[valid.location].halfedge {
                let max_steps = valid.inner.num_halfedges();
                let mut h = h0;
                loop {
                    if halfedges.len() >= max_steps {
                        return Err(TraversalError::VertexBadFan(valid.location));
                    }
                    halfedges.push(h);
                    h = valid.inner.at_halfedge(h).cycle_around_fan().try_end()?;
                    if h == h0 {
                        break;
                    }
                }
            }
            Ok(halfedges)
        })
    }

    fn neighbors(&'a self) -> Result<SVec<VertexId>, TraversalError> {
        self.and_then(|valid| {
            self.outgoing_halfedges()?
                .iter()
                .map(|h| valid.inner.at_halfedge(*h).head().try_end())
                .collect()
        })
    }

    fn adjacent_faces(&'a self) -> Result<SVec<FaceId>, TraversalError> {
        self.and_then(|valid| {
            let mut faces = SVec::new();
            for h in self.outgoing_halfedges()? {
                // Ghost halfedges have no face. Not an error.
                if let Some(f) = valid.inner.at_halfedge(h).face_or_boundary()? {
                    faces.push(f);
                }
            }
            Ok(faces)
        })
    }
}

/* ============== */
/*  Face Helpers  */
/* ============== */

pub trait FaceTraversalHelpers<'a> {
    fn halfedges(&'a self) -> Result<SVec<HalfEdgeId>, TraversalError>;
    fn vertices(&'a self) -> Result<SVec<VertexId>, TraversalError>;
}

impl<'a> FaceTraversalHelpers<'a> for Traversal<'a, FaceId> {
    fn halfedges(&'a self) -> Result<SVec<HalfEdgeId>, TraversalError> {
        self.and_then(|valid| {
            let h0 = self.halfedge().try_end()?;
            valid.inner.halfedge_loop(h0)
        })
    }

    /// The heads of the face halfedges, starting at the head of the face's
    /// stored halfedge.
    fn vertices(&'a self) -> Result<SVec<VertexId>, TraversalError> {
        self.and_then(|valid| {
            self.halfedges()?
                .iter()
                .map(|h| valid.inner.at_halfedge(*h).head().try_end())
                .collect::<Result<SVec<_>, TraversalError>>()
        })
    }
}

/* ================== */
/*  Halfedge Helpers  */
/* ================== */

pub trait HalfedgeTraversalHelpers<'a> {
    fn cycle_around_fan(&'a self) -> Traversal<HalfEdgeId>;
    /// The vertex this halfedge leaves from.
    fn tail(&'a self) -> Traversal<VertexId>;
    fn head_tail_pair(&'a self) -> Result<(VertexId, VertexId), TraversalError>;
    fn is_boundary(&'a self) -> Result<bool, TraversalError>;
}
impl<'a> HalfedgeTraversalHelpers<'a> for Traversal<'a, HalfEdgeId> {
    fn cycle_around_fan(&'a self) -> Traversal<HalfEdgeId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: self.pair().next().try_end()?,
            })
        })
    }

    fn tail(&'a self) -> Traversal<VertexId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: self.prev().head().try_end()?,
            })
        })
    }

    fn head_tail_pair(&'a self) -> Result<(VertexId, VertexId), TraversalError> {
        Ok((self.head().try_end()?, self.tail().try_end()?))
    }

    fn is_boundary(&'a self) -> Result<bool, TraversalError> {
        Ok(self.face_or_boundary()?.is_none())
    }
}
