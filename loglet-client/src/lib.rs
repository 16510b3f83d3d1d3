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

//! Client-side shard routing for loglet.
//!
//! The [`ShardManager`] streams shard assignments from the coordinator and
//! answers two questions for the data plane: which shard owns a key, and
//! which server leads a shard.

mod shard_manager;
mod shard_strategy;
mod shard_table;

pub use shard_manager::ShardManager;
pub use shard_strategy::{HashRangeShardStrategy, ShardStrategy};
pub use shard_table::ShardTable;
