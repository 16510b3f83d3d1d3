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

use parking_lot::MutexGuard;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Error returned by [`Condition::wait`] when the caller's cancellation
/// token fires before a notification arrives.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("wait cancelled")]
pub struct Cancelled;

/// A condition variable for predicates guarded by a [`parking_lot::Mutex`],
/// cooperating with a [`CancellationToken`].
///
/// The waiter is registered before the mutex guard is released, so a
/// [`Condition::notify_all`] racing with the release is never lost. As with
/// any condition variable, callers must re-check their predicate in a loop
/// after `wait` returns.
#[derive(Debug, Default)]
pub struct Condition {
    notify: Notify,
}

impl Condition {
    /// Wakes every task currently parked in [`Condition::wait`].
    pub fn notify_all(&self) {
        self.notify.notify_waiters();
    }

    /// Releases `guard` and parks until notified or until `token` fires,
    /// whichever happens first.
    pub async fn wait<T>(
        &self,
        guard: MutexGuard<'_, T>,
        token: &CancellationToken,
    ) -> Result<(), Cancelled> {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register as a waiter while the lock is still held.
        notified.as_mut().enable();
        drop(guard);

        tokio::select! {
            _ = notified => Ok(()),
            _ = token.cancelled() => Err(Cancelled),
        }
    }
}
