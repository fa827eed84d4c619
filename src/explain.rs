//! Human-readable rendering of declared rules.
//!
//! Diagnostic only: this module consumes rule metadata the engine already
//! carries (target, triggers, optional explanation strings) and never
//! influences evaluation.

use crate::intercept::Interceptable;
use crate::rule::Rule;
use crate::RuleStore;
use std::fmt::Write;

/// One-line description of a single rule, e.g.
/// `message = "BINGO" if x >= 100 or y >= 100, on change of (x y)`.
pub fn explain_rule<R: Interceptable>(rule: &Rule<R>) -> String {
    let mut out = String::new();

    match rule.value_explained() {
        Some(text) => {
            let _ = write!(out, "{} = {}", rule.target(), text);
        }
        None => {
            let _ = write!(out, "{} = <computed>", rule.target());
        }
    }

    if let Some(guard) = rule.guard_explained() {
        let _ = write!(out, " if {}", guard);
    } else if rule.has_guard() {
        out.push_str(" if <condition>");
    }

    let triggers: Vec<&str> = rule
        .trigger_properties()
        .iter()
        .map(String::as_str)
        .collect();
    if triggers.is_empty() {
        out.push_str(", on full re-evaluation only");
    } else {
        let _ = write!(out, ", on change of ({})", triggers.join(" "));
    }

    out
}

/// All rules in declaration order, one per line.
pub fn explain_store<R: Interceptable>(store: &RuleStore<R>) -> String {
    let mut out = String::new();
    for rule in store.rules() {
        out.push_str(&explain_rule(rule));
        out.push('\n');
    }
    out
}
