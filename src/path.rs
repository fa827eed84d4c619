//! Dotted property paths.
//!
//! A rule carries two distinct descriptions of its target: the closure that
//! computes the new value and a [`PropertyPath`] that says *where* the value
//! lives relative to the root object. Paths are also how the interception
//! boundary addresses the owner of a nested write, so the engine never has
//! to hold two live references into the same object graph.
//!
//! `"cds_product.ref_entity"` parses into the segments
//! `["cds_product", "ref_entity"]` with leaf `"ref_entity"` — the leaf name
//! is what the trigger index is keyed by.

use crate::error::{EngineError, EngineResult};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    /// The empty path, addressing the root object itself.
    pub fn root() -> Self {
        PropertyPath {
            segments: Vec::new(),
        }
    }

    /// Parse a dotted selector. Selector problems are configuration errors
    /// and are raised here, at declaration time.
    pub fn parse(path: &str) -> EngineResult<Self> {
        if path.is_empty() {
            return Err(EngineError::InvalidPath {
                path: path.to_string(),
                reason: "empty selector".to_string(),
            });
        }

        let segments: Vec<String> = path.split('.').map(str::to_string).collect();

        for segment in &segments {
            if !is_identifier(segment) {
                return Err(EngineError::InvalidPath {
                    path: path.to_string(),
                    reason: format!("'{}' is not a valid property name", segment),
                });
            }
        }

        Ok(PropertyPath { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The unqualified name of the most specific property,
    /// e.g. `"a.b.c"` → `"c"`.
    ///
    /// # Panics
    ///
    /// Panics on the root path, which has no leaf.
    pub fn leaf(&self) -> &str {
        self.segments
            .last()
            .expect("root path has no leaf property")
    }

    /// All segments above the leaf, in order from the root.
    pub fn ancestors(&self) -> &[String] {
        match self.segments.len() {
            0 => &[],
            n => &self.segments[..n - 1],
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Extend the path by one nesting level.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        PropertyPath { segments }
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
