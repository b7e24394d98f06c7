//! Configuration types for Archflow model compilation.
//!
//! This module provides configuration structures that control how conflicting
//! declarations are settled and how the model is written out. All types
//! implement [`serde::Deserialize`] for loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`PolicyConfig`] - Which [`ConflictPolicy`] applies to merges and event publishers.
//! - [`OutputConfig`] - Output formatting options.
//!
//! # Example
//!
//! ```
//! # use archflow::config::AppConfig;
//! # use archflow::policy::ConflictPolicy;
//! let config = AppConfig::default();
//! assert_eq!(config.policies().merge(), ConflictPolicy::FirstWins);
//! assert_eq!(config.policies().publishers(), ConflictPolicy::LastWins);
//! assert!(config.output().pretty());
//! ```

use serde::Deserialize;

use archflow_core::policy::ConflictPolicy;
use archflow_parser::AssembleConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Conflict policy section.
    #[serde(default)]
    policies: PolicyConfig,

    /// Output section.
    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(policies: PolicyConfig, output: OutputConfig) -> Self {
        Self { policies, output }
    }

    /// Returns the policy configuration.
    pub fn policies(&self) -> &PolicyConfig {
        &self.policies
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }
}

/// Tie-break policies used while assembling the model.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Scalar conflicts between declarations of the same domain or service.
    #[serde(default = "default_merge_policy")]
    merge: ConflictPolicy,

    /// Events published by more than one domain.
    #[serde(default = "default_publisher_policy")]
    publishers: ConflictPolicy,
}

fn default_merge_policy() -> ConflictPolicy {
    ConflictPolicy::FirstWins
}

fn default_publisher_policy() -> ConflictPolicy {
    ConflictPolicy::LastWins
}

impl PolicyConfig {
    pub fn new(merge: ConflictPolicy, publishers: ConflictPolicy) -> Self {
        Self { merge, publishers }
    }

    pub fn merge(&self) -> ConflictPolicy {
        self.merge
    }

    pub fn publishers(&self) -> ConflictPolicy {
        self.publishers
    }

    /// The assembly settings these policies describe.
    pub fn assemble_config(&self) -> AssembleConfig {
        AssembleConfig::new(self.merge, self.publishers)
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::new(default_merge_policy(), default_publisher_policy())
    }
}

/// Output formatting options.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    #[serde(default = "default_pretty")]
    pretty: bool,
}

fn default_pretty() -> bool {
    true
}

impl OutputConfig {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(default_pretty())
    }
}
