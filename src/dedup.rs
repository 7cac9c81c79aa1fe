//! Suppression of already-seen alert ids.
//!
//! The transport is at-least-once and reconnection backfill replays history,
//! so the same id can reach the processor several times. One session-scoped
//! guard decides whether an id is new.

use std::collections::{HashSet, VecDeque};

use uuid::Uuid;

/// Tracks alert ids already presented to the user.
///
/// Unbounded by default, which is fine for a single app-foreground session.
/// Long-running agents can set a bound, evicting the oldest-observed ids
/// first.
#[derive(Debug, Default)]
pub struct DedupGuard {
    seen: HashSet<Uuid>,
    order: VecDeque<Uuid>,
    bound: Option<usize>,
}

impl DedupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A guard that never holds more than `bound` ids.
    pub fn with_capacity_bound(bound: usize) -> Self {
        Self {
            bound: Some(bound.max(1)),
            ..Self::default()
        }
    }

    /// Returns `true` the first time an id is observed; the caller should
    /// act on the alert. Returns `false` for every repeat.
    pub fn observe(&mut self, id: Uuid) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        self.order.push_back(id);
        if let Some(bound) = self.bound {
            while self.order.len() > bound {
                if let Some(oldest) = self.order.pop_front() {
                    self.seen.remove(&oldest);
                }
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
