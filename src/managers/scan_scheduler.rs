use std::time::Duration;

use tokio::time::Instant;

use crate::types::dom::MutationRecord;

/// Default period of the periodic re-scan.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_millis(1000);
/// Default quiet window after the last mutation before a deferred scan runs.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Why a scan is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTrigger {
    Initial,
    Periodic,
    Debounced,
}

/// Two-trigger scan clock: a fixed periodic tick plus a debounced
/// mutation tick. Pure state, driven by the caller's notion of `now`.
#[derive(Debug, Clone)]
pub struct ScanScheduler {
    interval: Duration,
    debounce: Duration,
    next_tick: Option<Instant>,
    pending: Option<Instant>,
}

impl ScanScheduler {
    pub fn new(interval: Duration, debounce: Duration) -> Self {
        Self {
            interval,
            debounce,
            next_tick: None,
            pending: None,
        }
    }

    /// Starts the periodic clock. The caller scans immediately.
    pub fn start(&mut self, now: Instant) -> ScanTrigger {
        self.next_tick = Some(now + self.interval);
        ScanTrigger::Initial
    }

    /// Records a mutation. A batch with added nodes (re)arms the debounce
    /// deadline, cancelling any earlier pending one.
    pub fn on_mutation(&mut self, record: MutationRecord, now: Instant) -> bool {
        if record.added_nodes == 0 {
            return false;
        }
        self.pending = Some(now + self.debounce);
        true
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Earliest instant at which [`poll`](Self::poll) may return a trigger.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.next_tick, self.pending) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Returns the trigger due at `now`, if any. When both are due a single
    /// scan covers them.
    pub fn poll(&mut self, now: Instant) -> Option<ScanTrigger> {
        let tick_due = self.next_tick.is_some_and(|t| t <= now);
        let debounce_due = self.pending.is_some_and(|t| t <= now);

        if tick_due {
            self.next_tick = Some(now + self.interval);
        }
        if debounce_due {
            self.pending = None;
            return Some(ScanTrigger::Debounced);
        }
        tick_due.then_some(ScanTrigger::Periodic)
    }
}

impl Default for ScanScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_INTERVAL, DEFAULT_DEBOUNCE_WINDOW)
    }
}
