// Copyright (C) 2023 Loglet, Inc.
//
// Loglet is offered under the AGPL v3.0 and as commercial software.
// For commercial licensing, contact us at hello@loglet.io.
//
// AGPL:
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

use std::collections::HashMap;

use loglet_proto::{HashRange, ShardAssignment};
use tracing::info;

/// The shard assignments currently known to a client, indexed by shard id.
#[derive(Debug, Default)]
pub struct ShardTable {
    assignments: HashMap<u32, ShardAssignment>,
}

impl ShardTable {
    /// Applies a batch of assignments received from the coordinator.
    ///
    /// An incoming assignment with an unknown id first evicts every known
    /// assignment whose hash range overlaps the incoming one: those shards
    /// were split or merged away. Known ids are overwritten in place
    /// without overlap scanning.
    pub fn update(&mut self, updates: Vec<ShardAssignment>) {
        for update in updates {
            if !self.assignments.contains_key(&update.shard_id) {
                self.assignments.retain(|_, existing| {
                    let evict = overlap(existing.hash_range, update.hash_range);
                    if evict {
                        info!(
                            evicted_shard = existing.shard_id,
                            incoming_shard = update.shard_id,
                            "evicting shard assignment overlapping an incoming one"
                        );
                    }
                    !evict
                });
            }
            self.assignments.insert(update.shard_id, update);
        }
    }

    pub fn get(&self, shard_id: u32) -> Option<&ShardAssignment> {
        self.assignments.get(&shard_id)
    }

    pub fn shard_ids(&self) -> Vec<u32> {
        self.assignments.keys().copied().collect()
    }

    pub fn assignments(&self) -> impl Iterator<Item = &ShardAssignment> {
        self.assignments.values()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

fn overlap(left: Option<HashRange>, right: Option<HashRange>) -> bool {
    let (Some(left), Some(right)) = (left, right) else {
        return false;
    };
    !(left.min_inclusive > right.max_inclusive || left.max_inclusive < right.min_inclusive)
}
