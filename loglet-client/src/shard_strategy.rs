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

use loglet_proto::ShardAssignment;

/// Decides which shard owns a key.
pub trait ShardStrategy: Send + Sync + 'static {
    /// Returns the predicate matching the shard that owns `key`.
    fn selector(&self, key: &str) -> Box<dyn Fn(&ShardAssignment) -> bool + Send>;
}

/// Routes keys by hashing them into the 32-bit hash space and matching the
/// assignment whose inclusive hash range contains the hash.
#[derive(Clone, Copy, Debug, Default)]
pub struct HashRangeShardStrategy;

pub(crate) fn hash_key(key: &str) -> u32 {
    crc32fast::hash(key.as_bytes())
}

impl ShardStrategy for HashRangeShardStrategy {
    fn selector(&self, key: &str) -> Box<dyn Fn(&ShardAssignment) -> bool + Send> {
        let hash = hash_key(key);
        Box::new(move |assignment| {
            assignment.hash_range.map_or(false, |hash_range| {
                hash_range.min_inclusive <= hash && hash <= hash_range.max_inclusive
            })
        })
    }
}
