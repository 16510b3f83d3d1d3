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

//! Leader-side replication primitives for loglet shards.
//!
//! The write path of a shard leader reserves an offset from the
//! [`QuorumAckTracker`], appends the entry to its write-ahead log, and
//! advances the head offset once the entry is locally durable. Follower
//! replication loops acknowledge entries through their [`CursorAcker`];
//! once enough followers have confirmed an entry, the tracker advances the
//! commit offset and releases the request handlers parked on it.

mod error;
mod tracker;

pub use error::ReplicationError;
pub use tracker::{CommitCallback, CursorAcker, QuorumAckTracker};

pub type Result<T> = std::result::Result<T, ReplicationError>;
