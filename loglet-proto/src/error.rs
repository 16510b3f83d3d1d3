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

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum CoordinatorError {
    #[error("coordinator transport error: {0}")]
    Transport(String),
    #[error("shard assignments stream closed by the coordinator")]
    StreamClosed,
    #[error("request cancelled")]
    Cancelled,
    #[error("an internal error occurred: {0}")]
    Internal(String),
}

impl CoordinatorError {
    /// Cancellation is the only error the shard-assignment receiver does
    /// not retry.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoordinatorError::Cancelled)
    }
}

impl From<tonic::Status> for CoordinatorError {
    fn from(status: tonic::Status) -> Self {
        match status.code() {
            tonic::Code::Cancelled | tonic::Code::DeadlineExceeded => CoordinatorError::Cancelled,
            tonic::Code::Unavailable => CoordinatorError::Transport(status.message().to_string()),
            _ => CoordinatorError::Internal(status.message().to_string()),
        }
    }
}

impl From<CoordinatorError> for tonic::Status {
    fn from(error: CoordinatorError) -> tonic::Status {
        let code = match &error {
            CoordinatorError::Transport(_) | CoordinatorError::StreamClosed => {
                tonic::Code::Unavailable
            }
            CoordinatorError::Cancelled => tonic::Code::Cancelled,
            CoordinatorError::Internal(_) => tonic::Code::Internal,
        };
        let message = error.to_string();
        tonic::Status::new(code, message)
    }
}
