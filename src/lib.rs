//! # cascade-rules — dependency-triggered derived fields
//!
//! A small incremental-recomputation engine for live mutable object
//! graphs. A caller declares, once, rules of the form "property P is
//! recomputed from trigger properties T1..Tn, optionally guarded by a
//! condition, whenever any Ti changes". The engine then guarantees that
//! every external write transitively and deterministically re-evaluates
//! all dependent rules until the object reaches a fixed point, with an
//! optional recursion limit protecting against circular dependencies.
//!
//! ## Quick start
//!
//! ```
//! use cascade_rules::{
//!     AccessorCache, EngineResult, Interceptable, RuleStoreBuilder, Value, Wrapped,
//! };
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Order {
//!     quantity: i64,
//!     unit_price: f64,
//!     total: f64,
//! }
//!
//! impl Interceptable for Order {
//!     fn type_name(&self) -> &'static str { "Order" }
//!     fn property_names(&self) -> &'static [&'static str] {
//!         &["quantity", "unit_price", "total"]
//!     }
//!     fn get_value(&self, property: &str) -> Option<Value> {
//!         match property {
//!             "quantity" => Some(self.quantity.into()),
//!             "unit_price" => Some(self.unit_price.into()),
//!             "total" => Some(self.total.into()),
//!             _ => None,
//!         }
//!     }
//!     fn set_value(&mut self, property: &str, value: Value) -> EngineResult<()> {
//!         match property {
//!             "quantity" => self.quantity = value.as_int().unwrap_or_default(),
//!             "unit_price" => self.unit_price = value.as_float().unwrap_or_default(),
//!             "total" => self.total = value.as_float().unwrap_or_default(),
//!             _ => {}
//!         }
//!         Ok(())
//!     }
//!     fn composite(&self, _: &str) -> Option<&dyn Interceptable> { None }
//!     fn composite_mut(&mut self, _: &str) -> Option<&mut dyn Interceptable> { None }
//! }
//!
//! fn main() -> EngineResult<()> {
//!     let mut builder = RuleStoreBuilder::<Order>::new();
//!     builder
//!         .set("total")?
//!         .with(|o| Value::from(o.quantity as f64 * o.unit_price))
//!         .on_changed(&["quantity", "unit_price"])?;
//!
//!     let store = Arc::new(builder.build(Arc::new(AccessorCache::new())));
//!     let order = Wrapped::new(Order::default(), store);
//!
//!     order.set("quantity", 3)?;
//!     order.set("unit_price", 2.5)?;
//!     assert_eq!(order.get("total")?, Value::Float(7.5));
//!     Ok(())
//! }
//! ```
//!
//! ## Semantics worth knowing
//!
//! - **Smart writes**: a write that does not change the value (by value
//!   equality) fires nothing and returns an empty modified set.
//! - **No visited-set**: the same property may be reprocessed across
//!   different branches of one cascade. Only the recursion limit bounds a
//!   genuinely cyclic rule graph; without a limit such a graph recurses
//!   until stack exhaustion. Configure a limit whenever acyclicity is not
//!   statically guaranteed.
//! - **`trigger_all` asymmetry**: the first unconditional pass over all
//!   rules is *not* included in the returned modified set; only what
//!   cascades from it is. `set_property` does include its own seed write.
//! - **Threading**: a built store is immutable and freely shared across
//!   threads, each operating on its own root instance. Concurrent access
//!   to one root must be serialized by the caller (a [`Wrapped`] boundary
//!   does this with an internal lock).

pub mod accessor;
pub mod builder;
pub mod config;
pub mod error;
pub mod explain;
pub mod intercept;
pub mod metrics;
pub mod path;
pub mod rule;
pub mod trace;
pub mod value;

pub use crate::accessor::AccessorCache;
pub use crate::builder::{RuleStoreBuilder, RuleToken};
pub use crate::config::CascadeConfig;
pub use crate::error::{EngineError, EngineResult};
pub use crate::intercept::{Interceptable, Wrapped};
pub use crate::metrics::{CascadeMetrics, MetricsSnapshot};
pub use crate::path::PropertyPath;
pub use crate::rule::Rule;
pub use crate::trace::{CollectingTrace, FiredRule, LogTrace, NoopTrace, TraceSink};
pub use crate::value::Value;

use crate::trace::TraceSink as Sink;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// The rule store and cascade engine.
///
/// Owns every declared rule for one root type, indexed by trigger leaf
/// name in declaration order. Stateless with respect to any particular
/// instance: it holds no reference to target objects between calls and is
/// safe to share across threads once built.
pub struct RuleStore<R> {
    rules: Vec<Arc<Rule<R>>>,
    rules_by_trigger: HashMap<String, Vec<Arc<Rule<R>>>>,
    recursion_limit: u32,
    accessors: Arc<AccessorCache>,
    trace_sink: Arc<dyn Sink<R>>,
    metrics: CascadeMetrics,
}

impl<R: Interceptable> RuleStore<R> {
    /// Start declaring a rule set.
    pub fn builder() -> RuleStoreBuilder<R> {
        RuleStoreBuilder::new()
    }

    pub(crate) fn from_parts(
        rules: Vec<Arc<Rule<R>>>,
        recursion_limit: u32,
        accessors: Arc<AccessorCache>,
        trace_sink: Arc<dyn Sink<R>>,
    ) -> Self {
        let mut rules_by_trigger: HashMap<String, Vec<Arc<Rule<R>>>> = HashMap::new();
        for rule in &rules {
            for trigger in rule.trigger_properties() {
                rules_by_trigger
                    .entry(trigger.clone())
                    .or_default()
                    .push(Arc::clone(rule));
            }
        }

        RuleStore {
            rules,
            rules_by_trigger,
            recursion_limit,
            accessors,
            trace_sink,
            metrics: CascadeMetrics::new(),
        }
    }

    /// Write one property and cascade every rule transitively triggered by
    /// the change. `owner` addresses the object carrying the property as a
    /// path from `root` ([`PropertyPath::root()`] for the root itself).
    ///
    /// Returns the set of modified leaf property names, empty when the
    /// write did not change the value. Writes applied before a recursion
    /// error are kept.
    pub fn set_property(
        &self,
        root: &mut R,
        owner: &PropertyPath,
        property: &str,
        value: Value,
    ) -> EngineResult<BTreeSet<String>> {
        let mut modified = BTreeSet::new();

        let changed = self
            .accessors
            .smart_set_path(root, &owner.child(property), value)?;
        if !changed {
            return Ok(modified);
        }

        self.metrics.record_write();
        trace!(target: "cascade_rules", property = property, owner = %owner, "external write applied");

        modified.insert(property.to_string());
        self.cascade(property, root, &mut modified, 1)?;
        Ok(modified)
    }

    /// Evaluate every declared rule once, unconditionally in declaration
    /// order (guards still apply, trigger membership is ignored), then
    /// cascade from each change. Useful when an object was filled by direct
    /// field assignment rather than interactively.
    ///
    /// The returned set covers only the cascaded changes, not the first
    /// pass itself; this asymmetry with [`set_property`](Self::set_property)
    /// is long-standing observable behavior and is kept.
    pub fn trigger_all(&self, root: &mut R) -> EngineResult<BTreeSet<String>> {
        let mut seed: Vec<String> = Vec::new();

        for rule in &self.rules {
            let fired = rule.apply(root, &self.accessors)?;
            self.metrics.record_evaluation(fired);
            if fired {
                self.trace_sink.rule_fired(rule, "", root);
                let leaf = rule.target().leaf();
                if !seed.iter().any(|name| name == leaf) {
                    seed.push(leaf.to_string());
                }
            }
        }

        debug!(target: "cascade_rules", seeded = seed.len(), "full re-evaluation first pass done");

        let mut modified = BTreeSet::new();
        for name in seed {
            self.cascade(&name, root, &mut modified, 1)?;
        }
        Ok(modified)
    }

    /// One cascade level: run every rule indexed under `trigger`, then
    /// recurse once per distinct property changed at this level. Recursion
    /// is bounded only by `recursion_limit`; a property may legitimately be
    /// reprocessed via different branches within one call.
    fn cascade(
        &self,
        trigger: &str,
        root: &mut R,
        modified: &mut BTreeSet<String>,
        depth: u32,
    ) -> EngineResult<()> {
        if self.recursion_limit > 0 && depth > self.recursion_limit {
            warn!(
                target: "cascade_rules",
                limit = self.recursion_limit,
                trigger = trigger,
                "recursion limit exceeded, aborting cascade"
            );
            return Err(EngineError::RecursionLimitExceeded {
                limit: self.recursion_limit,
                depth,
                trigger: trigger.to_string(),
            });
        }

        self.metrics.record_level(depth);

        let Some(rules) = self.rules_by_trigger.get(trigger) else {
            return Ok(());
        };

        // Preserves first-change order, so recursion below is deterministic
        // for a given declaration order.
        let mut just_changed: Vec<String> = Vec::new();

        for rule in rules {
            let fired = rule.apply(root, &self.accessors)?;
            self.metrics.record_evaluation(fired);
            if fired {
                self.trace_sink.rule_fired(rule, trigger, root);
                trace!(target: "cascade_rules", rule = %rule, trigger = trigger, depth = depth, "rule fired");

                let leaf = rule.target().leaf();
                modified.insert(leaf.to_string());
                if !just_changed.iter().any(|name| name == leaf) {
                    just_changed.push(leaf.to_string());
                }
            }
        }

        for name in just_changed {
            self.cascade(&name, root, modified, depth + 1)?;
        }
        Ok(())
    }

    /// All rules, in declaration order.
    pub fn rules(&self) -> &[Arc<Rule<R>>] {
        &self.rules
    }

    /// Rules indexed by trigger leaf name, declaration order preserved
    /// within each list.
    pub fn rules_by_trigger(&self) -> &HashMap<String, Vec<Arc<Rule<R>>>> {
        &self.rules_by_trigger
    }

    pub fn rules_count(&self) -> usize {
        self.rules.len()
    }

    pub fn recursion_limit(&self) -> u32 {
        self.recursion_limit
    }

    /// The accessor cache this store was built with.
    pub fn accessors(&self) -> &AccessorCache {
        &self.accessors
    }

    /// Cumulative evaluation counters.
    pub fn metrics(&self) -> &CascadeMetrics {
        &self.metrics
    }
}
