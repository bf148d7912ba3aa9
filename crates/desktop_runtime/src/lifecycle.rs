//! Deferred lifecycle transitions: the clock, the ticket type, and the per-window scheduler.
//!
//! Every transient lifecycle state is closed by exactly one pending [`TransitionTicket`]. A
//! window holds at most one ticket; scheduling again replaces it, and dropping the window
//! cancels it. Tickets that no longer match the scheduler are stale and are discarded.

use std::{cell::Cell, collections::HashMap, rc::Rc};

use crate::model::WindowId;

/// Millisecond time source driving lifecycle and persistence timers.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
/// Wall clock backed by the host.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        platform_host::unix_time_ms_now()
    }
}

#[derive(Debug, Clone, Default)]
/// Hand-advanced clock; clones share the same time.
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What happens when a ticket comes due.
pub enum TransitionKind {
    /// Return a transient lifecycle to `Normal`.
    Settle,
    /// Finish a minimize: hide the window, drop focus, return to `Normal`.
    CompleteMinimize,
    /// Finish a close: delete the record.
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTicket {
    pub window_id: WindowId,
    pub generation: u64,
    pub due_at_ms: u64,
    pub kind: TransitionKind,
}

#[derive(Debug, Default)]
pub struct TransitionScheduler {
    pending: HashMap<WindowId, TransitionTicket>,
    next_generation: u64,
}

impl TransitionScheduler {
    /// Schedules `kind` for `window_id`, replacing any ticket the window already holds.
    pub fn schedule(
        &mut self,
        window_id: WindowId,
        kind: TransitionKind,
        due_at_ms: u64,
    ) -> TransitionTicket {
        self.next_generation = self.next_generation.wrapping_add(1);
        let ticket = TransitionTicket {
            window_id: window_id.clone(),
            generation: self.next_generation,
            due_at_ms,
            kind,
        };
        self.pending.insert(window_id, ticket.clone());
        ticket
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Whether `ticket` is still the one its window is waiting on.
    pub fn is_current(&self, ticket: &TransitionTicket) -> bool {
        self.pending
            .get(&ticket.window_id)
            .is_some_and(|pending| pending.generation == ticket.generation)
    }

    /// Consumes `ticket` if it is current; returns whether it was.
    pub fn take_if_current(&mut self, ticket: &TransitionTicket) -> bool {
        if self.is_current(ticket) {
            self.pending.remove(&ticket.window_id);
            true
        } else {
            false
        }
    }

    /// Removes and returns every ticket due by `now_ms`, earliest first, ties in scheduling
    /// order.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<TransitionTicket> {
        let mut due = self
            .pending
            .values()
            .filter(|t| t.due_at_ms <= now_ms)
            .cloned()
            .collect::<Vec<_>>();
        due.sort_by_key(|t| (t.due_at_ms, t.generation));
        for ticket in &due {
            self.pending.remove(&ticket.window_id);
        }
        due
    }

    pub fn pending_for(&self, window_id: &WindowId) -> Option<&TransitionTicket> {
        self.pending.get(window_id)
    }

    pub fn next_due_at(&self) -> Option<u64> {
        self.pending.values().map(|t| t.due_at_ms).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
