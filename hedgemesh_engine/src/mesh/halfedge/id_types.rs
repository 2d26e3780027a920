// Copyright (C) 2022 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Elements are never removed from a mesh, so keys are handed out in insertion
// order and iterating an arena visits elements in the order they were created.
slotmap::new_key_type! { pub struct HalfEdgeId; }
slotmap::new_key_type! { pub struct VertexId; }
slotmap::new_key_type! { pub struct FaceId; }
