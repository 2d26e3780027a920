// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::mesh::halfedge::TraversalError;

pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur while building, querying or editing a mesh.
///
/// Construction and generator errors abort the whole operation: meshes are
/// always built into a scratch value, so a failed operation never leaves a
/// half-built mesh behind.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Two faces traverse the same oriented edge. Either the input faces are
    /// not uniformly wound, or the surface is non-manifold.
    #[error("Inconsistent orientation: oriented edge ({from}, {to}) belongs to more than one face")]
    InconsistentOrientation { from: usize, to: usize },

    /// A traversal needed a pointer that has not been set.
    #[error("Incomplete topology: {0}")]
    IncompleteTopology(TraversalError),

    /// A traversal loop did not close, or some other structural invariant of
    /// the halfedge graph does not hold.
    #[error("Corrupt topology: {message}")]
    CorruptTopology { message: String },

    /// An operator or query was invoked with a value outside its domain.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Malformed text input.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl MeshError {
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::CorruptTopology {
            message: message.into(),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

impl From<TraversalError> for MeshError {
    fn from(err: TraversalError) -> Self {
        match err {
            TraversalError::HalfedgeBadLoop(_) | TraversalError::VertexBadFan(_) => {
                MeshError::corrupt(format!("{err}"))
            }
            _ => MeshError::IncompleteTopology(err),
        }
    }
}
