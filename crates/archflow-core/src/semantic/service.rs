//! Deployable services and their deployment strategies.

use std::fmt;

use indexmap::IndexSet;
use serde::Serialize;

use crate::identifier::Id;

/// One traffic split of a deployment strategy, e.g. `10% -> staging`.
///
/// The percentage is kept verbatim; it is not validated or summed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeploymentRule {
    percentage: String,
    target: Id,
}

impl DeploymentRule {
    pub fn new(percentage: impl Into<String>, target: Id) -> Self {
        Self {
            percentage: percentage.into(),
            target,
        }
    }

    pub fn percentage(&self) -> &str {
        &self.percentage
    }

    pub fn target(&self) -> Id {
        self.target
    }
}

impl fmt::Display for DeploymentRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.percentage, self.target)
    }
}

/// How a service is rolled out (`canary`, `blue_green`, `rolling`, ...).
///
/// Rules are an ordered set keyed by the `(percentage, target)` pair, so the
/// same split can never appear twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentStrategy {
    kind: Option<String>,
    rules: IndexSet<DeploymentRule>,
}

impl DeploymentStrategy {
    pub fn new(kind: impl Into<String>, rules: impl IntoIterator<Item = DeploymentRule>) -> Self {
        Self {
            kind: Some(kind.into()),
            rules: rules.into_iter().collect(),
        }
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn rules(&self) -> &IndexSet<DeploymentRule> {
        &self.rules
    }

    /// Returns `true` when no strategy has been declared.
    pub fn is_unset(&self) -> bool {
        self.kind.is_none()
    }
}

/// A deployable unit owning domains and data stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    name: Id,
    domains: IndexSet<Id>,
    data_stores: IndexSet<Id>,
    language: Option<String>,
    deployment: DeploymentStrategy,
}

impl Service {
    /// Creates a service with no domains, data stores, language, or deployment.
    pub fn new(name: Id) -> Self {
        Self {
            name,
            domains: IndexSet::new(),
            data_stores: IndexSet::new(),
            language: None,
            deployment: DeploymentStrategy::default(),
        }
    }

    pub fn with_domains(mut self, domains: impl IntoIterator<Item = Id>) -> Self {
        self.domains = domains.into_iter().collect();
        self
    }

    pub fn with_data_stores(mut self, data_stores: impl IntoIterator<Item = Id>) -> Self {
        self.data_stores = data_stores.into_iter().collect();
        self
    }

    /// Sets the implementation language; an empty string clears it.
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|lang| !lang.is_empty());
        self
    }

    pub fn with_deployment(mut self, deployment: DeploymentStrategy) -> Self {
        self.deployment = deployment;
        self
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn domains(&self) -> &IndexSet<Id> {
        &self.domains
    }

    pub fn data_stores(&self) -> &IndexSet<Id> {
        &self.data_stores
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn deployment(&self) -> &DeploymentStrategy {
        &self.deployment
    }

    /// Returns `true` if `domain` is one of this service's domains.
    pub fn owns(&self, domain: Id) -> bool {
        self.domains.contains(&domain)
    }
}
