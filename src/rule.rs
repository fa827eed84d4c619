//! The rule record.
//!
//! A rule assigns a value to exactly one target property. It is considered
//! whenever one of its trigger properties changes, from an external write
//! or from a previous rule firing. The closure that computes the value and
//! the path that locates the target are deliberately separate fields: one
//! is *what* to write, the other is *where*.

use crate::accessor::AccessorCache;
use crate::error::EngineResult;
use crate::intercept::Interceptable;
use crate::path::PropertyPath;
use crate::value::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Applicability predicate evaluated against the root object.
pub type Guard<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Pure function computing the candidate value for the target property.
pub type Compute<R> = Arc<dyn Fn(&R) -> Value + Send + Sync>;

/// Immutable after construction; built by the
/// [`RuleStoreBuilder`](crate::builder::RuleStoreBuilder).
pub struct Rule<R> {
    target: PropertyPath,
    triggers: BTreeSet<String>,
    guard: Option<Guard<R>>,
    compute: Compute<R>,
    guard_explained: Option<String>,
    value_explained: Option<String>,
}

impl<R> Rule<R> {
    pub(crate) fn new(
        target: PropertyPath,
        triggers: BTreeSet<String>,
        guard: Option<Guard<R>>,
        compute: Compute<R>,
        guard_explained: Option<String>,
        value_explained: Option<String>,
    ) -> Self {
        Rule {
            target,
            triggers,
            guard,
            compute,
            guard_explained,
            value_explained,
        }
    }

    /// Dotted path of the property this rule assigns, relative to the root.
    pub fn target(&self) -> &PropertyPath {
        &self.target
    }

    /// Unqualified leaf names whose changes trigger this rule. Empty only
    /// for rules invoked exclusively through full re-evaluation.
    pub fn trigger_properties(&self) -> &BTreeSet<String> {
        &self.triggers
    }

    /// Human-readable description of the guard, if one was provided.
    pub fn guard_explained(&self) -> Option<&str> {
        self.guard_explained.as_deref()
    }

    /// Human-readable description of the value computation.
    pub fn value_explained(&self) -> Option<&str> {
        self.value_explained.as_deref()
    }

    pub fn has_guard(&self) -> bool {
        self.guard.is_some()
    }
}

impl<R: Interceptable> Rule<R> {
    /// Evaluate the rule against the root: guard, compute, compare the
    /// current target value, write if different. Returns whether the target
    /// changed.
    pub(crate) fn apply(&self, root: &mut R, accessors: &AccessorCache) -> EngineResult<bool> {
        if let Some(guard) = &self.guard {
            if !guard(root) {
                return Ok(false);
            }
        }

        let candidate = (self.compute)(root);
        let current = accessors.get_path(root, &self.target)?;
        if current == candidate {
            return Ok(false);
        }

        accessors.set_path(root, &self.target, candidate)?;
        Ok(true)
    }
}

impl<R> fmt::Display for Rule<R> {
    /// `(x y)\t => message` — triggers on the left, target on the right.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let triggers: Vec<&str> = self.triggers.iter().map(String::as_str).collect();
        write!(f, "({})\t => {}", triggers.join(" "), self.target)
    }
}

impl<R> fmt::Debug for Rule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("target", &self.target.to_string())
            .field("triggers", &self.triggers)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}
