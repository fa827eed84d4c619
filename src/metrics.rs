//! Lock-free counters for the cascade hot path.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative counters kept by a [`RuleStore`](crate::RuleStore). All
/// updates are relaxed atomics; the snapshot is not a consistent cut but is
/// close enough for monitoring.
#[derive(Debug, Default)]
pub struct CascadeMetrics {
    /// External writes that actually changed a value
    pub writes_applied: AtomicU64,
    /// Rule evaluations, fired or not
    pub rules_evaluated: AtomicU64,
    /// Rule evaluations that changed their target
    pub rules_fired: AtomicU64,
    /// Cascade invocations (one per trigger level)
    pub cascade_levels: AtomicU64,
    /// Deepest recursion observed since construction
    pub max_depth: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub writes_applied: u64,
    pub rules_evaluated: u64,
    pub rules_fired: u64,
    pub cascade_levels: u64,
    pub max_depth: u64,
}

impl CascadeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_write(&self) {
        self.writes_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evaluation(&self, fired: bool) {
        self.rules_evaluated.fetch_add(1, Ordering::Relaxed);
        if fired {
            self.rules_fired.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_level(&self, depth: u32) {
        self.cascade_levels.fetch_add(1, Ordering::Relaxed);
        self.max_depth.fetch_max(depth as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            writes_applied: self.writes_applied.load(Ordering::Relaxed),
            rules_evaluated: self.rules_evaluated.load(Ordering::Relaxed),
            rules_fired: self.rules_fired.load(Ordering::Relaxed),
            cascade_levels: self.cascade_levels.load(Ordering::Relaxed),
            max_depth: self.max_depth.load(Ordering::Relaxed),
        }
    }
}
