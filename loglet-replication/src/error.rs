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

use loglet_common::Cancelled;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ReplicationError {
    #[error("too many cursors: the replication set already has {max_cursors} followers")]
    TooManyCursors { max_cursors: u32 },
    #[error(
        "invalid head offset: cursor ack offset `{ack_offset}` is ahead of head offset \
         `{head_offset}`"
    )]
    InvalidHeadOffset { ack_offset: i64, head_offset: i64 },
    #[error("already closed")]
    AlreadyClosed,
    #[error("wait cancelled")]
    Cancelled,
}

impl From<Cancelled> for ReplicationError {
    fn from(_: Cancelled) -> Self {
        ReplicationError::Cancelled
    }
}

impl From<ReplicationError> for tonic::Status {
    fn from(error: ReplicationError) -> tonic::Status {
        let code = match &error {
            ReplicationError::TooManyCursors { .. } => tonic::Code::FailedPrecondition,
            ReplicationError::InvalidHeadOffset { .. } => tonic::Code::InvalidArgument,
            ReplicationError::AlreadyClosed => tonic::Code::Unavailable,
            ReplicationError::Cancelled => tonic::Code::Cancelled,
        };
        let message = error.to_string();
        tonic::Status::new(code, message)
    }
}
