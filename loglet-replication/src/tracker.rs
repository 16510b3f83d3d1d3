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

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use loglet_common::{BitSet, Condition};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use super::error::ReplicationError;
use super::Result;

/// Callback invoked exactly once when a commit waiter is resolved: with
/// `Ok` once the commit offset has reached the requested offset, or with
/// the error that released the waiter instead.
pub type CommitCallback = Box<dyn FnOnce(Result<()>) + Send + 'static>;

/// Tracks the replication state of a single shard for one leader term.
///
/// The tracker keeps two watermarks over the shard's log:
/// - the head offset, the last entry written to the leader's local WAL;
/// - the commit offset, the last entry that has received enough follower
///   acknowledgments to be durable on a quorum.
///
/// It hands out offsets for new entries, collects per-follower
/// acknowledgments through [`CursorAcker`] handles, and parks waiters until
/// either watermark reaches a requested offset.
///
/// The ack quorum counts follower acks only: the leader already stores one
/// copy locally, so `replication_factor / 2` follower copies complete a
/// majority.
///
/// Nothing is persisted here; the watermarks are rebuilt from the WAL and
/// the commit marker when a leader takes its term.
pub struct QuorumAckTracker {
    replication_factor: u32,
    required_acks: u32,

    next_offset: AtomicI64,
    head_offset: AtomicI64,
    commit_offset: AtomicI64,

    head_offset_advanced: Condition,
    state: Mutex<TrackerState>,
}

struct TrackerState {
    /// Follower acks received for each offset in `(commit_offset,
    /// head_offset]`. An entry is removed the moment it crosses the ack
    /// threshold.
    pending_acks: HashMap<i64, BitSet>,
    /// Commit waiters, in insertion order.
    waiting_requests: VecDeque<WaitingRequest>,
    next_cursor_idx: u32,
    closed: bool,
}

struct WaitingRequest {
    min_offset: i64,
    callback: CommitCallback,
}

impl fmt::Debug for QuorumAckTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuorumAckTracker")
            .field("replication_factor", &self.replication_factor)
            .field("head_offset", &self.head_offset())
            .field("commit_offset", &self.commit_offset())
            .finish()
    }
}

impl QuorumAckTracker {
    pub fn new(replication_factor: u32, head_offset: i64, commit_offset: i64) -> Self {
        debug_assert!(replication_factor >= 1);
        debug_assert!(commit_offset <= head_offset);

        // Entries past the commit offset are not yet known to be durable on
        // a quorum and must collect acks again.
        let mut pending_acks = HashMap::new();
        for offset in commit_offset + 1..=head_offset {
            pending_acks.insert(offset, BitSet::default());
        }
        Self {
            replication_factor,
            required_acks: replication_factor / 2,
            next_offset: AtomicI64::new(head_offset),
            head_offset: AtomicI64::new(head_offset),
            commit_offset: AtomicI64::new(commit_offset),
            head_offset_advanced: Condition::default(),
            state: Mutex::new(TrackerState {
                pending_acks,
                waiting_requests: VecDeque::new(),
                next_cursor_idx: 0,
                closed: false,
            }),
        }
    }

    /// Reserves the offset for the next entry to write.
    ///
    /// The returned offset can run ahead of the head offset: multiple
    /// writes may be in flight between offset reservation and WAL
    /// persistence.
    pub fn next_offset(&self) -> i64 {
        self.next_offset.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn head_offset(&self) -> i64 {
        self.head_offset.load(Ordering::Acquire)
    }

    pub fn commit_offset(&self) -> i64 {
        self.commit_offset.load(Ordering::Acquire)
    }

    /// Records that the leader's WAL has persisted every entry up to and
    /// including `new_head`, and wakes head-offset waiters.
    ///
    /// Offsets at or below the current head are ignored, which tolerates
    /// out-of-order completion of in-flight writes.
    pub fn advance_head_offset(&self, new_head: i64) {
        let mut state = self.state.lock();
        let old_head = self.head_offset.load(Ordering::Acquire);
        if new_head <= old_head {
            return;
        }
        self.head_offset.store(new_head, Ordering::Release);
        self.head_offset_advanced.notify_all();

        let fired = if self.required_acks == 0 {
            // Single-copy shards: everything in the local WAL is committed.
            self.advance_commit_offset(&mut state, new_head)
        } else {
            for offset in old_head + 1..=new_head {
                state.pending_acks.insert(offset, BitSet::default());
            }
            Vec::new()
        };
        drop(state);
        complete_waiters(fired, Ok(()));
    }

    /// Waits until the head offset reaches `offset`.
    ///
    /// Returns `AlreadyClosed` when the tracker is closed first and
    /// `Cancelled` when `token` fires first.
    pub async fn wait_for_head_offset(
        &self,
        token: &CancellationToken,
        offset: i64,
    ) -> Result<()> {
        loop {
            let state = self.state.lock();
            if self.head_offset.load(Ordering::Acquire) >= offset {
                return Ok(());
            }
            if state.closed {
                return Err(ReplicationError::AlreadyClosed);
            }
            self.head_offset_advanced.wait(state, token).await?;
        }
    }

    /// Registers `callback` to run once the commit offset reaches
    /// `offset`. Never suspends.
    ///
    /// The callback runs exactly once, outside the tracker lock:
    /// immediately when the offset is already committed or the tracker is
    /// closed, otherwise from the acknowledgment that advances the commit
    /// offset past it, or from [`QuorumAckTracker::close`].
    pub fn wait_for_commit_offset_async(&self, offset: i64, callback: CommitCallback) {
        let mut state = self.state.lock();
        if state.closed {
            drop(state);
            callback(Err(ReplicationError::AlreadyClosed));
            return;
        }
        if self.required_acks == 0 || self.commit_offset.load(Ordering::Acquire) >= offset {
            drop(state);
            callback(Ok(()));
            return;
        }
        state.waiting_requests.push_back(WaitingRequest {
            min_offset: offset,
            callback,
        });
    }

    /// Waits until the commit offset reaches `offset`, then invokes
    /// `callback` with the outcome.
    ///
    /// When `token` fires first, the callback runs with `Cancelled` on the
    /// cancelling path instead. Whichever path wins the race, the callback
    /// runs exactly once.
    pub async fn wait_for_commit_offset(
        &self,
        token: &CancellationToken,
        offset: i64,
        callback: CommitCallback,
    ) {
        let slot = Arc::new(Mutex::new(Some(callback)));
        let (completed_tx, completed_rx) = oneshot::channel();
        let commit_slot = slot.clone();
        self.wait_for_commit_offset_async(
            offset,
            Box::new(move |result| {
                if let Some(callback) = commit_slot.lock().take() {
                    callback(result);
                }
                let _ = completed_tx.send(());
            }),
        );
        tokio::select! {
            _ = completed_rx => {}
            _ = token.cancelled() => {
                if let Some(callback) = slot.lock().take() {
                    callback(Err(ReplicationError::Cancelled));
                }
            }
        }
    }

    /// Registers a new follower cursor whose last acknowledged offset is
    /// `ack_offset` and returns its acker.
    ///
    /// Entries the follower has already acknowledged, up to `ack_offset`,
    /// are replayed through the regular ack path before the acker is handed
    /// out, so a caught-up follower immediately counts toward the quorum.
    pub fn new_cursor_acker(self: &Arc<Self>, ack_offset: i64) -> Result<CursorAcker> {
        let mut state = self.state.lock();
        if state.next_cursor_idx >= self.replication_factor - 1 {
            return Err(ReplicationError::TooManyCursors {
                max_cursors: self.replication_factor - 1,
            });
        }
        let head_offset = self.head_offset.load(Ordering::Acquire);
        if ack_offset > head_offset {
            return Err(ReplicationError::InvalidHeadOffset {
                ack_offset,
                head_offset,
            });
        }
        let cursor_idx = state.next_cursor_idx;
        state.next_cursor_idx += 1;

        let mut fired = Vec::new();
        for offset in self.commit_offset.load(Ordering::Acquire) + 1..=ack_offset {
            fired.extend(self.ack(&mut state, cursor_idx, offset));
        }
        drop(state);
        complete_waiters(fired, Ok(()));

        Ok(CursorAcker {
            tracker: self.clone(),
            cursor_idx,
        })
    }

    /// Marks the end of the leader term.
    ///
    /// Head-offset waiters wake and observe the closed flag; pending commit
    /// waiters are completed with `AlreadyClosed`.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        self.head_offset_advanced.notify_all();
        let drained: Vec<CommitCallback> = state
            .waiting_requests
            .drain(..)
            .map(|request| request.callback)
            .collect();
        drop(state);
        complete_waiters(drained, Err(ReplicationError::AlreadyClosed));
    }

    fn ack(&self, state: &mut TrackerState, cursor_idx: u32, offset: i64) -> Vec<CommitCallback> {
        let Some(acks) = state.pending_acks.get_mut(&offset) else {
            // The entry already reached the quorum earlier.
            return Vec::new();
        };
        acks.set(cursor_idx);
        if acks.count() != self.required_acks {
            return Vec::new();
        }
        state.pending_acks.remove(&offset);
        self.advance_commit_offset(state, offset)
    }

    /// Precondition: every offset in `(commit_offset, new_commit]` has
    /// reached the ack threshold and left `pending_acks`. Followers
    /// acknowledge their entries in log order, so threshold crossings are
    /// observed in log order too.
    fn advance_commit_offset(
        &self,
        state: &mut TrackerState,
        new_commit: i64,
    ) -> Vec<CommitCallback> {
        debug_assert!(new_commit > self.commit_offset.load(Ordering::Acquire));
        self.commit_offset.store(new_commit, Ordering::Release);

        let mut fired = Vec::new();
        while state
            .waiting_requests
            .front()
            .map_or(false, |request| request.min_offset <= new_commit)
        {
            if let Some(request) = state.waiting_requests.pop_front() {
                fired.push(request.callback);
            }
        }
        fired
    }
}

/// Per-follower handle recording that follower's acknowledgments into the
/// tracker. Created by [`QuorumAckTracker::new_cursor_acker`].
pub struct CursorAcker {
    tracker: Arc<QuorumAckTracker>,
    cursor_idx: u32,
}

impl fmt::Debug for CursorAcker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorAcker")
            .field("cursor_idx", &self.cursor_idx)
            .finish()
    }
}

impl CursorAcker {
    /// Records that this follower has persisted the entry at `offset`.
    ///
    /// Acknowledging the same offset twice, or an offset that already
    /// reached the quorum, is a no-op.
    pub fn ack(&self, offset: i64) {
        let mut state = self.tracker.state.lock();
        let fired = self.tracker.ack(&mut state, self.cursor_idx, offset);
        drop(state);
        complete_waiters(fired, Ok(()));
    }
}

fn complete_waiters(callbacks: Vec<CommitCallback>, result: Result<()>) {
    for callback in callbacks {
        callback(result.clone());
    }
}
