use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

/// Identifier handed out per solve request. Later requests get larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Tracks the latest issued request so results of superseded requests can be dropped.
///
/// Only the result belonging to the most recently issued id is published;
/// whichever request finishes last no longer wins by accident.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new id, superseding every earlier one.
    pub fn issue(&self) -> RequestId {
        RequestId(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest.load(Ordering::SeqCst) == id.0
    }

    /// Hand back `value` if `id` is still current, otherwise discard it.
    pub fn publish<T>(&self, id: RequestId, value: T) -> Option<T> {
        if self.is_current(id) {
            Some(value)
        } else {
            debug!(request = id.0, "discarding stale result");
            None
        }
    }
}
