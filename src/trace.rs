//! Observability hooks for the cascade.
//!
//! Every rule firing emits one event carrying the rule, the property whose
//! change triggered it and the root instance. The default sink discards
//! events; [`LogTrace`] forwards them to `tracing`, and [`CollectingTrace`]
//! keeps them in memory for tests and debugging sessions.

use crate::rule::Rule;
use serde::Serialize;
use std::sync::Mutex;
use tracing::debug;

/// Snapshot of one rule firing, detached from the rule's closures so it can
/// be stored and serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiredRule {
    /// Dotted path of the property the rule wrote
    pub target: String,
    /// Property change that triggered the rule; empty for the first pass of
    /// a full re-evaluation
    pub trigger: String,
}

/// Receives one event per rule firing. Implementations must be cheap:
/// they run inside the cascade on the caller's thread.
pub trait TraceSink<R>: Send + Sync {
    fn rule_fired(&self, rule: &Rule<R>, trigger: &str, root: &R);
}

/// Default sink; does nothing.
pub struct NoopTrace;

impl<R> TraceSink<R> for NoopTrace {
    fn rule_fired(&self, _rule: &Rule<R>, _trigger: &str, _root: &R) {}
}

/// Forwards firings to the `tracing` subscriber at debug level.
pub struct LogTrace;

impl<R> TraceSink<R> for LogTrace {
    fn rule_fired(&self, rule: &Rule<R>, trigger: &str, _root: &R) {
        debug!(target: "cascade_rules", trigger = trigger, rule = %rule, "rule fired");
    }
}

/// Accumulates firings in memory, in order.
#[derive(Default)]
pub struct CollectingTrace {
    events: Mutex<Vec<FiredRule>>,
}

impl CollectingTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<FiredRule> {
        std::mem::take(&mut self.events.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R> TraceSink<R> for CollectingTrace {
    fn rule_fired(&self, rule: &Rule<R>, trigger: &str, _root: &R) {
        self.events.lock().unwrap().push(FiredRule {
            target: rule.target().to_string(),
            trigger: trigger.to_string(),
        });
    }
}
