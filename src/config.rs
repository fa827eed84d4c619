//! Engine configuration.

use crate::error::EngineResult;
use serde::Deserialize;
use std::path::Path;

/// Tunables applied at [`RuleStore`](crate::RuleStore) build time.
#[derive(Debug, Deserialize, Clone)]
pub struct CascadeConfig {
    /// Maximum cascade depth before the call is aborted with a recursion
    /// error. 0 means unlimited; set a limit whenever the rule graph's
    /// acyclicity is not statically guaranteed.
    #[serde(default)]
    pub recursion_limit: u32,
    /// Log every rule firing through `tracing` at debug level
    #[serde(default)]
    pub log_fired_rules: bool,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            recursion_limit: 0,
            log_fired_rules: false,
        }
    }
}

impl CascadeConfig {
    pub fn from_yaml_str(yaml: &str) -> EngineResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }
}
