// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Some useful re-exports
pub mod prelude;

/// The error types returned by mesh construction, queries and operators
pub mod error;

/// Display constants, import options and default operator parameters
pub mod config;

/// Small collection and iterator helpers shared by the mesh modules
pub mod utils;

/// The halfedge graph data structure, its polygon soup counterpart and the
/// main edit operations
pub mod mesh;
