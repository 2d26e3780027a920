// Copyright (C) 2022 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ops::Index;

use slotmap::{SecondaryMap, SlotMap};

/// Maps the opaque ids of one arena to dense, 0-based integer indices that
/// follow the arena's insertion order. These are the indices used in index
/// buffers and in exported files.
pub struct MeshMapping<K: slotmap::Key>(pub SecondaryMap<K, u32>);

impl<K: slotmap::Key> Index<K> for MeshMapping<K> {
    type Output = u32;
    fn index(&self, index: K) -> &Self::Output {
        &self.0[index]
    }
}

impl<K: slotmap::Key> MeshMapping<K> {
    pub fn new<V>(arena: &SlotMap<K, V>) -> Self {
        let mut mapping = SecondaryMap::with_capacity(arena.len());
        for (idx, (k, _)) in arena.iter().enumerate() {
            mapping.insert(k, idx as u32);
        }
        Self(mapping)
    }

    pub fn get(&self, key: K) -> Option<u32> {
        self.0.get(key).copied()
    }

    pub fn map_seq(&self, seq: &[K]) -> Vec<u32> {
        seq.iter().map(|x| self[*x]).collect()
    }
}
