//! Fluent rule declaration.
//!
//! Rule sets are declared once, at construction time, in a builder block:
//!
//! ```
//! use cascade_rules::{AccessorCache, RuleStoreBuilder, Value};
//! # use cascade_rules::{EngineError, EngineResult, Interceptable};
//! # struct Bingo { x: i64, y: i64 }
//! # impl Interceptable for Bingo {
//! #     fn type_name(&self) -> &'static str { "Bingo" }
//! #     fn property_names(&self) -> &'static [&'static str] { &["x", "y"] }
//! #     fn get_value(&self, p: &str) -> Option<Value> {
//! #         match p { "x" => Some(self.x.into()), "y" => Some(self.y.into()), _ => None }
//! #     }
//! #     fn set_value(&mut self, p: &str, v: Value) -> EngineResult<()> {
//! #         let i = v.as_int().unwrap();
//! #         match p { "x" => self.x = i, "y" => self.y = i, _ => unreachable!() }
//! #         Ok(())
//! #     }
//! #     fn composite(&self, _: &str) -> Option<&dyn Interceptable> { None }
//! #     fn composite_mut(&mut self, _: &str) -> Option<&mut dyn Interceptable> { None }
//! # }
//! # fn main() -> EngineResult<()> {
//! let mut builder = RuleStoreBuilder::<Bingo>::new();
//! builder
//!     .set("y")?
//!     .with(|b| Value::from(b.x * 2))
//!     .when(|b| b.x < 100)
//!     .on_changed(&["x"])?;
//!
//! let store = builder.build(std::sync::Arc::new(AccessorCache::new()));
//! assert_eq!(store.rules_count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! Selector problems (empty or malformed paths) surface here, at build
//! time. Accessor problems (a path that parses but does not exist on the
//! actual type) surface later, at first use.

use crate::error::{EngineError, EngineResult};
use crate::intercept::Interceptable;
use crate::path::PropertyPath;
use crate::rule::{Compute, Guard, Rule};
use crate::trace::{LogTrace, NoopTrace, TraceSink};
use crate::value::Value;
use crate::{CascadeConfig, RuleStore};
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct RuleStoreBuilder<R> {
    rules: Vec<Arc<Rule<R>>>,
    recursion_limit: u32,
    trace: Option<Arc<dyn TraceSink<R>>>,
}

impl<R: Interceptable> RuleStoreBuilder<R> {
    pub fn new() -> Self {
        RuleStoreBuilder {
            rules: Vec::new(),
            recursion_limit: 0,
            trace: None,
        }
    }

    /// Abort any cascade deeper than `limit` levels. 0 disables the check.
    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Install an observability sink; defaults to a no-op.
    pub fn trace_sink(mut self, sink: Arc<dyn TraceSink<R>>) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Apply file-loaded tunables.
    pub fn with_config(mut self, config: &CascadeConfig) -> Self {
        self.recursion_limit = config.recursion_limit;
        if config.log_fired_rules && self.trace.is_none() {
            self.trace = Some(Arc::new(LogTrace));
        }
        self
    }

    /// Start declaring a rule by naming its target property. The selector
    /// may be a nested dotted path; it is validated now.
    pub fn set(&mut self, target: &str) -> EngineResult<RuleToken<'_, R>> {
        let target = PropertyPath::parse(target)?;
        Ok(RuleToken {
            builder: self,
            target,
            compute: None,
            guard: None,
            guard_explained: None,
            value_explained: None,
        })
    }

    pub fn build(self, accessors: Arc<crate::AccessorCache>) -> RuleStore<R> {
        RuleStore::from_parts(
            self.rules,
            self.recursion_limit,
            accessors,
            self.trace.unwrap_or_else(|| Arc::new(NoopTrace)),
        )
    }

    fn push(&mut self, rule: Rule<R>) {
        self.rules.push(Arc::new(rule));
    }
}

impl<R: Interceptable> Default for RuleStoreBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Chains the statements of one rule declaration. Finished by
/// [`on_changed`](RuleToken::on_changed), which materializes the rule.
pub struct RuleToken<'a, R> {
    builder: &'a mut RuleStoreBuilder<R>,
    target: PropertyPath,
    compute: Option<Compute<R>>,
    guard: Option<Guard<R>>,
    guard_explained: Option<String>,
    value_explained: Option<String>,
}

impl<'a, R: Interceptable> RuleToken<'a, R> {
    /// The function that computes the value of the target property.
    pub fn with(mut self, compute: impl Fn(&R) -> Value + Send + Sync + 'static) -> Self {
        self.compute = Some(Arc::new(compute));
        self
    }

    /// Like [`with`](Self::with), plus a human-readable description for the
    /// explain facility.
    pub fn with_explain(
        mut self,
        compute: impl Fn(&R) -> Value + Send + Sync + 'static,
        explained: &str,
    ) -> Self {
        self.compute = Some(Arc::new(compute));
        self.value_explained = Some(explained.to_string());
        self
    }

    /// Optional applicability condition; a false guard blocks the rule.
    pub fn when(mut self, guard: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        self.guard = Some(Arc::new(guard));
        self
    }

    /// Like [`when`](Self::when), plus a human-readable description.
    pub fn when_explain(
        mut self,
        guard: impl Fn(&R) -> bool + Send + Sync + 'static,
        explained: &str,
    ) -> Self {
        self.guard = Some(Arc::new(guard));
        self.guard_explained = Some(explained.to_string());
        self
    }

    /// Finish the declaration by naming the trigger properties. Selectors
    /// may be dotted paths; rules are indexed by the leaf name. An empty
    /// list declares a rule reachable only through
    /// [`trigger_all`](crate::RuleStore::trigger_all).
    pub fn on_changed(self, triggers: &[&str]) -> EngineResult<()> {
        let compute = self.compute.ok_or_else(|| EngineError::IncompleteRule {
            target: self.target.to_string(),
        })?;

        let mut trigger_names = BTreeSet::new();
        for selector in triggers {
            let path = PropertyPath::parse(selector)?;
            trigger_names.insert(path.leaf().to_string());
        }

        self.builder.push(Rule::new(
            self.target,
            trigger_names,
            self.guard,
            compute,
            self.guard_explained,
            self.value_explained,
        ));
        Ok(())
    }
}
