//! Model assembly.
//!
//! Runs the engine phases in order over a complete program:
//! normalize, merge, resolve scenarios, correlate events. Every phase is
//! order-sensitive, so declarations are processed strictly in source order.

use log::info;

use archflow_core::{policy::ConflictPolicy, semantic::ArchitectureModel};

use crate::{
    correlate,
    declarations::Declaration,
    merge, normalize,
    resolve::{self, ServiceIndex},
};

/// Policies applied while assembling the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleConfig {
    /// Scalar conflicts between declarations of the same domain or service.
    pub merge_policy: ConflictPolicy,
    /// Events published by more than one domain.
    pub publisher_policy: ConflictPolicy,
}

impl AssembleConfig {
    pub fn new(merge_policy: ConflictPolicy, publisher_policy: ConflictPolicy) -> Self {
        Self {
            merge_policy,
            publisher_policy,
        }
    }

    pub fn with_merge_policy(mut self, policy: ConflictPolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    pub fn with_publisher_policy(mut self, policy: ConflictPolicy) -> Self {
        self.publisher_policy = policy;
        self
    }
}

impl Default for AssembleConfig {
    /// First declaration wins on merge; last publisher wins on events.
    fn default() -> Self {
        Self::new(ConflictPolicy::FirstWins, ConflictPolicy::LastWins)
    }
}

/// Assemble a model from declaration records.
///
/// Never fails: every ambiguity left in the declarations is settled by the
/// policies in `config`.
pub fn assemble(
    declarations: impl IntoIterator<Item = Declaration>,
    config: AssembleConfig,
) -> ArchitectureModel {
    let normalized = normalize::normalize(declarations);

    let domains = merge::merge_domains(normalized.domains);
    let services = merge::merge_services(normalized.services, config.merge_policy);
    info!(
        domains = domains.len(),
        services = services.len(),
        policy = config.merge_policy.as_str();
        "Merged entities"
    );

    let index = ServiceIndex::new(&services);
    let resolve::Resolution {
        mut flows,
        service_dependencies,
    } = resolve::resolve_use_cases(&normalized.use_cases, &index);

    let correlation =
        correlate::correlate(&normalized.use_cases, &mut flows, config.publisher_policy);
    info!(
        flows = flows.len(),
        event_links = correlation.event_links.len();
        "Resolved flows"
    );

    ArchitectureModel::default()
        .with_actors(normalized.actors)
        .with_domains(domains)
        .with_services(services)
        .with_exposures(normalized.exposures)
        .with_architectures(normalized.architectures)
        .with_use_cases(normalized.use_cases)
        .with_flows(flows)
        .with_event_links(correlation.event_links)
        .with_publishers(correlation.publishers)
        .with_service_dependencies(service_dependencies)
}
