// SPDX-License-Identifier: MIT

//! In-process playback ordering (`spec.md` §4.3): guarantees that within a
//! single daemon, requests are played back in the order they were admitted,
//! even though several may be generating audio concurrently.
//!
//! The teacher's own queues are all `tokio::sync::mpsc` (see
//! `oj-daemon::listener`), but that primitive can't express "block until
//! ticket N's predecessor has finished" without an extra layer of
//! bookkeeping. `spec.md` §9 calls out "mutex + condvar, re-check the
//! predicate on wake" explicitly as the idiom to reach for, so this module
//! is a direct, synchronous `std::sync::{Mutex, Condvar}` implementation of
//! that idiom rather than an async one: `wait_turn` is meant to be called
//! from inside a `spawn_blocking` body, alongside the blocking playback
//! subprocess wait it orders.

use std::sync::{Condvar, Mutex};

/// A monotonically increasing ticket handed out by [`InProcessCoordinator::issue`].
pub type Ticket = u64;

struct State {
    next_ticket: Ticket,
    serving: Ticket,
}

/// Orders playback across concurrently-generating requests within one
/// process. `issue` hands out tickets in call order; `wait_turn` blocks
/// until its ticket is the one currently being served; `finish_turn`
/// advances to the next ticket and wakes all other waiters so they can
/// re-check their predicate.
pub struct InProcessCoordinator {
    state: Mutex<State>,
    turn_changed: Condvar,
}

impl InProcessCoordinator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_ticket: 0,
                serving: 0,
            }),
            turn_changed: Condvar::new(),
        }
    }

    /// Reserve the next playback slot. Call this as early as possible (at
    /// admission time), before any generation work, so that submission
    /// order — not generation-completion order — determines playback
    /// order.
    pub fn issue(&self) -> Ticket {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let ticket = state.next_ticket;
        state.next_ticket += 1;
        ticket
    }

    /// Block the calling thread until `ticket` is the one currently being
    /// served. Re-checks the predicate on every wake to guard against
    /// spurious wakeups and against other waiters' `finish_turn` calls
    /// advancing past (but not to) our ticket.
    pub fn wait_turn(&self, ticket: Ticket) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        while state.serving != ticket {
            state = self
                .turn_changed
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Release the current turn and wake every other waiter so they can
    /// re-check whether it's now theirs. Must be called exactly once for
    /// every ticket issued, on every exit path (success, error, panic-safe
    /// via the caller's own `Drop` guard if needed).
    pub fn finish_turn(&self, ticket: Ticket) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        debug_assert_eq!(state.serving, ticket, "finish_turn called out of order");
        state.serving = ticket + 1;
        drop(state);
        self.turn_changed.notify_all();
    }
}

impl Default for InProcessCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "in_process_tests.rs"]
mod tests;
