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

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use loglet_common::ExponentialBackoff;
use loglet_proto::{
    CoordinatorError, CoordinatorService, CoordinatorServiceClient, ShardAssignmentsRequest,
};
use parking_lot::RwLock;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::shard_strategy::ShardStrategy;
use crate::shard_table::ShardTable;

/// Maintains the shard routing table of a client by streaming assignment
/// updates from the coordinator.
///
/// A single receiver task applies every update. On any stream error other
/// than cancellation, it reopens the stream with exponential backoff,
/// resetting the backoff after each successfully applied message.
/// [`ShardManager::close`] cancels the shutdown token and returns
/// immediately; the receiver observes the token at its suspension points
/// and exits.
#[derive(Clone)]
pub struct ShardManager {
    inner: Arc<Inner>,
}

struct Inner {
    strategy: Box<dyn ShardStrategy>,
    coordinator: CoordinatorServiceClient,
    shard_table: RwLock<ShardTable>,
    shutdown: CancellationToken,
}

impl fmt::Debug for ShardManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardManager").finish()
    }
}

impl ShardManager {
    /// Spawns the receiver task and resolves once the first assignment
    /// batch has been applied.
    pub async fn start(
        strategy: Box<dyn ShardStrategy>,
        coordinator: CoordinatorServiceClient,
    ) -> Self {
        Self::start_with_backoff(strategy, coordinator, ExponentialBackoff::default()).await
    }

    /// Same as [`ShardManager::start`], with an explicit reconnect pacing
    /// policy.
    pub async fn start_with_backoff(
        strategy: Box<dyn ShardStrategy>,
        coordinator: CoordinatorServiceClient,
        backoff: ExponentialBackoff,
    ) -> Self {
        let inner = Arc::new(Inner {
            strategy,
            coordinator,
            shard_table: RwLock::new(ShardTable::default()),
            shutdown: CancellationToken::new(),
        });
        let (ready_tx, ready_rx) = oneshot::channel();
        let receiver_inner = inner.clone();
        tokio::spawn(async move {
            receiver_inner.receive_with_recovery(backoff, ready_tx).await;
        });
        // The sender is dropped without firing only when the manager is
        // closed before the first batch arrives.
        let _ = ready_rx.await;
        Self { inner }
    }

    /// Returns the id of the shard owning `key`.
    ///
    /// # Panics
    ///
    /// Panics when no known shard matches: the assignments are expected to
    /// cover the entire hash space.
    pub fn get(&self, key: &str) -> u32 {
        let shard_table = self.inner.shard_table.read();
        let selector = self.inner.strategy.selector(key);
        let shard_id = shard_table
            .assignments()
            .find(|assignment| selector(assignment))
            .map(|assignment| assignment.shard_id)
            .expect("the shard assignments should cover the entire hash space");
        shard_id
    }

    /// Returns all known shard ids.
    pub fn get_all(&self) -> Vec<u32> {
        self.inner.shard_table.read().shard_ids()
    }

    /// Returns the address of the leader of `shard_id`.
    ///
    /// # Panics
    ///
    /// Panics when the shard is unknown.
    pub fn leader(&self, shard_id: u32) -> String {
        self.inner
            .shard_table
            .read()
            .get(shard_id)
            .map(|assignment| assignment.leader.clone())
            .expect("the shard should be known")
    }

    /// Stops the receiver task. Returns immediately.
    pub fn close(&self) {
        self.inner.shutdown.cancel();
    }
}

impl Inner {
    async fn receive_with_recovery(
        self: Arc<Self>,
        mut backoff: ExponentialBackoff,
        ready_tx: oneshot::Sender<()>,
    ) {
        let mut ready_tx = Some(ready_tx);
        loop {
            let error = match self.receive(&mut backoff, &mut ready_tx).await {
                Ok(never) => match never {},
                Err(error) => error,
            };
            if self.shutdown.is_cancelled() || error.is_cancelled() {
                debug!("stopped receiving shard assignments");
                return;
            }
            let retry_after = backoff.next_delay();
            warn!(
                error = %error,
                retry_after = ?retry_after,
                "failed receiving shard assignments, retrying later"
            );
            tokio::select! {
                _ = tokio::time::sleep(retry_after) => {}
                _ = self.shutdown.cancelled() => {
                    debug!("stopped receiving shard assignments");
                    return;
                }
            }
        }
    }

    async fn receive(
        &self,
        backoff: &mut ExponentialBackoff,
        ready_tx: &mut Option<oneshot::Sender<()>>,
    ) -> Result<Infallible, CoordinatorError> {
        let mut coordinator = self.coordinator.clone();
        let mut assignments_stream = tokio::select! {
            open_result = coordinator.shard_assignments(ShardAssignmentsRequest {}) => open_result?,
            _ = self.shutdown.cancelled() => return Err(CoordinatorError::Cancelled),
        };
        loop {
            let response = tokio::select! {
                message = assignments_stream.next() => {
                    message.ok_or(CoordinatorError::StreamClosed)??
                }
                _ = self.shutdown.cancelled() => return Err(CoordinatorError::Cancelled),
            };
            self.shard_table.write().update(response.assignments);
            if let Some(ready_tx) = ready_tx.take() {
                let _ = ready_tx.send(());
            }
            backoff.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use loglet_common::ServiceStream;
    use loglet_proto::{HashRange, ShardAssignment, ShardAssignmentsResponse};
    use tokio::time::timeout;

    use super::*;
    use crate::shard_strategy::{hash_key, HashRangeShardStrategy};

    fn assignment(shard_id: u32, leader: &str, min_inclusive: u32, max_inclusive: u32) -> ShardAssignment {
        ShardAssignment {
            shard_id,
            leader: leader.to_string(),
            hash_range: Some(HashRange {
                min_inclusive,
                max_inclusive,
            }),
        }
    }

    fn response(assignments: Vec<ShardAssignment>) -> ShardAssignmentsResponse {
        ShardAssignmentsResponse { assignments }
    }

    #[tokio::test]
    async fn test_shard_manager_routes_keys() {
        let (assignments_tx, assignments_stream) = ServiceStream::new_bounded(5);
        assignments_tx
            .try_send(Ok(response(vec![
                assignment(0, "server-0", 0, u32::MAX / 2),
                assignment(1, "server-1", u32::MAX / 2 + 1, u32::MAX),
            ])))
            .unwrap();

        let mut coordinator_mock = CoordinatorServiceClient::mock();
        coordinator_mock
            .expect_shard_assignments()
            .return_once(move |_request| Ok(assignments_stream));

        let shard_manager = ShardManager::start(
            Box::new(HashRangeShardStrategy),
            coordinator_mock.into(),
        )
        .await;

        let expected_shard_id = if hash_key("test-key") <= u32::MAX / 2 {
            0
        } else {
            1
        };
        assert_eq!(shard_manager.get("test-key"), expected_shard_id);
        assert_eq!(
            shard_manager.leader(expected_shard_id),
            format!("server-{expected_shard_id}")
        );

        let mut shard_ids = shard_manager.get_all();
        shard_ids.sort_unstable();
        assert_eq!(shard_ids, vec![0, 1]);

        shard_manager.close();
    }

    #[tokio::test]
    async fn test_shard_manager_applies_updates() {
        let (assignments_tx, assignments_stream) = ServiceStream::new_bounded(5);
        assignments_tx
            .try_send(Ok(response(vec![assignment(0, "server-a", 0, u32::MAX)])))
            .unwrap();

        let mut coordinator_mock = CoordinatorServiceClient::mock();
        coordinator_mock
            .expect_shard_assignments()
            .return_once(move |_request| Ok(assignments_stream));

        let shard_manager = ShardManager::start(
            Box::new(HashRangeShardStrategy),
            coordinator_mock.into(),
        )
        .await;
        assert_eq!(shard_manager.leader(0), "server-a");

        assignments_tx
            .send(Ok(response(vec![assignment(0, "server-b", 0, u32::MAX)])))
            .await
            .unwrap();

        timeout(Duration::from_secs(1), async {
            while shard_manager.leader(0) != "server-b" {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();

        shard_manager.close();
    }

    #[tokio::test]
    async fn test_shard_manager_reconnects_after_stream_error() {
        let (first_tx, first_stream) = ServiceStream::new_bounded(5);
        first_tx
            .try_send(Ok(response(vec![assignment(0, "server-a", 0, u32::MAX)])))
            .unwrap();
        first_tx
            .try_send(Err(CoordinatorError::Transport(
                "connection reset".to_string(),
            )))
            .unwrap();
        drop(first_tx);

        let (second_tx, second_stream) = ServiceStream::new_bounded(5);
        second_tx
            .try_send(Ok(response(vec![assignment(0, "server-b", 0, u32::MAX)])))
            .unwrap();

        let mut coordinator_mock = CoordinatorServiceClient::mock();
        let mut call_sequence = mockall::Sequence::new();
        coordinator_mock
            .expect_shard_assignments()
            .times(1)
            .in_sequence(&mut call_sequence)
            .return_once(move |_request| Ok(first_stream));
        coordinator_mock
            .expect_shard_assignments()
            .times(1)
            .in_sequence(&mut call_sequence)
            .return_once(move |_request| Ok(second_stream));

        let shard_manager = ShardManager::start_with_backoff(
            Box::new(HashRangeShardStrategy),
            coordinator_mock.into(),
            ExponentialBackoff::new(Duration::from_millis(1), Duration::from_millis(1)),
        )
        .await;

        timeout(Duration::from_secs(1), async {
            while shard_manager.leader(0) != "server-b" {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();

        shard_manager.close();
        drop(second_tx);
    }

    #[tokio::test]
    async fn test_shard_manager_close_stops_receiver() {
        let (assignments_tx, assignments_stream) = ServiceStream::new_bounded(5);
        assignments_tx
            .try_send(Ok(response(vec![assignment(0, "server-a", 0, u32::MAX)])))
            .unwrap();

        let mut coordinator_mock = CoordinatorServiceClient::mock();
        coordinator_mock
            .expect_shard_assignments()
            .return_once(move |_request| Ok(assignments_stream));

        let shard_manager = ShardManager::start(
            Box::new(HashRangeShardStrategy),
            coordinator_mock.into(),
        )
        .await;
        shard_manager.close();

        // The receiver drops the stream on its way out.
        timeout(Duration::from_secs(1), async {
            while assignments_tx
                .send(Ok(response(Vec::new())))
                .await
                .is_ok()
            {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    #[should_panic(expected = "cover the entire hash space")]
    async fn test_shard_manager_get_panics_without_matching_shard() {
        let key_hash = hash_key("unroutable-key");
        let excluded_range = if key_hash == 0 {
            (1, u32::MAX)
        } else {
            (0, key_hash - 1)
        };
        let (assignments_tx, assignments_stream) = ServiceStream::new_bounded(5);
        assignments_tx
            .try_send(Ok(response(vec![assignment(
                0,
                "server-0",
                excluded_range.0,
                excluded_range.1,
            )])))
            .unwrap();

        let mut coordinator_mock = CoordinatorServiceClient::mock();
        coordinator_mock
            .expect_shard_assignments()
            .return_once(move |_request| Ok(assignments_stream));

        let shard_manager = ShardManager::start(
            Box::new(HashRangeShardStrategy),
            coordinator_mock.into(),
        )
        .await;
        shard_manager.get("unroutable-key");
    }
}
