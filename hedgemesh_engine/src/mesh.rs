// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// The HalfEdge data structure, with different kinds of topological and geometric operations.
pub mod halfedge;

/// A plain face / vertex list representation. Used as the import-time
/// intermediate before building a halfedge mesh.
pub mod polygon;

/// Reading and writing the indexed face-list (OFF) text format.
pub mod off_format;
