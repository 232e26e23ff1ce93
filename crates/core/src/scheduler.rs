//! Virtual-time timer queue.
//!
//! Stands in for the host event loop's `setTimeout`: callers schedule
//! [`Task`]s at a delay from "now" and the owner drains them with
//! [`Scheduler::pop_due`]. Time is a [`Duration`] since the player started,
//! so tests can drive it without sleeping.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::markup::NodeId;
use crate::typer::RevealToken;

/// Deferred work, stored as data rather than closures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Reveal the next character of the run identified by `token`
    Type { token: RevealToken },
    /// Drop a transient class from an element
    RemoveClass { node: NodeId, class: String },
}

/// Timer queue ordered by deadline, FIFO among equal deadlines
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BTreeMap<(Duration, u64), Task>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to run `delay` after `now`
    pub fn schedule(&mut self, now: Duration, delay: Duration, task: Task) {
        let deadline = now.saturating_add(delay);
        self.queue.insert((deadline, self.next_seq), task);
        self.next_seq += 1;
    }

    /// Remove and return the earliest task due at or before `now`, with its deadline
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, Task)> {
        let entry = self.queue.first_entry()?;
        if entry.key().0 > now {
            return None;
        }
        let ((deadline, _), task) = entry.remove_entry();
        Some((deadline, task))
    }

    /// Deadline of the earliest pending task
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
