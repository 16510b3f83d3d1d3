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

//! Wire types and service seams for the loglet coordinator.
//!
//! The message structs and the gRPC client are committed codegen; the
//! [`CoordinatorService`] trait is the seam the rest of the client stack
//! consumes, keeping the transport swappable (and mockable in tests).

mod codegen;
mod error;

pub use codegen::*;
pub use error::CoordinatorError;

pub type Result<T> = std::result::Result<T, CoordinatorError>;
