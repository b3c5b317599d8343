//! Per-loop metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a single listening loop
#[derive(Debug, Default)]
pub struct LoopMetrics {
    /// Events received from the stream
    events: AtomicU64,
    /// Frames handed to the display sink
    displayed: AtomicU64,
    /// Events skipped because they could not be decoded
    decode_failures: AtomicU64,
    /// Frames the display sink rejected
    display_failures: AtomicU64,
}

impl LoopMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }

    pub fn inc_events(&self) {
        self.events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn displayed(&self) -> u64 {
        self.displayed.load(Ordering::Relaxed)
    }

    pub fn inc_displayed(&self) {
        self.displayed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decode_failures(&self) -> u64 {
        self.decode_failures.load(Ordering::Relaxed)
    }

    pub fn inc_decode_failures(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn display_failures(&self) -> u64 {
        self.display_failures.load(Ordering::Relaxed)
    }

    pub fn inc_display_failures(&self) {
        self.display_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        LoopMetricsSnapshot {
            events: self.events(),
            displayed: self.displayed(),
            decode_failures: self.decode_failures(),
            display_failures: self.display_failures(),
        }
    }
}

/// Snapshot of loop metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopMetricsSnapshot {
    pub events: u64,
    pub displayed: u64,
    pub decode_failures: u64,
    pub display_failures: u64,
}
