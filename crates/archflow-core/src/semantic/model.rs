//! The resolved architecture model.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    identifier::Id,
    semantic::{
        Actor, Architecture, Domain, EventLink, Exposure, ScenarioFlow, Service,
        ServiceDependency, UseCase,
    },
};

/// Aggregate produced by the assembly engine and consumed by renderers.
///
/// Domains and services hold exactly one entry per name. Everything else
/// keeps declaration order.
///
/// # Example
///
/// ```
/// use archflow_core::{identifier::Id, semantic::{ArchitectureModel, Domain, Service}};
///
/// let model = ArchitectureModel::default()
///     .with_domains(vec![Domain::new(Id::new("Payments"), [])])
///     .with_services(vec![
///         Service::new(Id::new("Billing")).with_domains([Id::new("Payments")]),
///     ]);
///
/// assert!(model.domain(Id::new("Payments")).is_some());
/// assert_eq!(
///     model.service_for_domain(Id::new("Payments")).map(Service::name),
///     Some(Id::new("Billing"))
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureModel {
    actors: Vec<Actor>,
    domains: Vec<Domain>,
    services: Vec<Service>,
    exposures: Vec<Exposure>,
    architectures: Vec<Architecture>,
    use_cases: Vec<UseCase>,
    flows: Vec<ScenarioFlow>,
    event_links: Vec<EventLink>,
    publishers: IndexMap<String, Id>,
    service_dependencies: Vec<ServiceDependency>,
}

impl ArchitectureModel {
    pub fn with_actors(mut self, actors: Vec<Actor>) -> Self {
        self.actors = actors;
        self
    }

    pub fn with_domains(mut self, domains: Vec<Domain>) -> Self {
        self.domains = domains;
        self
    }

    pub fn with_services(mut self, services: Vec<Service>) -> Self {
        self.services = services;
        self
    }

    pub fn with_exposures(mut self, exposures: Vec<Exposure>) -> Self {
        self.exposures = exposures;
        self
    }

    pub fn with_architectures(mut self, architectures: Vec<Architecture>) -> Self {
        self.architectures = architectures;
        self
    }

    pub fn with_use_cases(mut self, use_cases: Vec<UseCase>) -> Self {
        self.use_cases = use_cases;
        self
    }

    pub fn with_flows(mut self, flows: Vec<ScenarioFlow>) -> Self {
        self.flows = flows;
        self
    }

    pub fn with_event_links(mut self, event_links: Vec<EventLink>) -> Self {
        self.event_links = event_links;
        self
    }

    /// Sets the event name to publishing domain table.
    pub fn with_publishers(mut self, publishers: IndexMap<String, Id>) -> Self {
        self.publishers = publishers;
        self
    }

    pub fn with_service_dependencies(mut self, dependencies: Vec<ServiceDependency>) -> Self {
        self.service_dependencies = dependencies;
        self
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn exposures(&self) -> &[Exposure] {
        &self.exposures
    }

    pub fn architectures(&self) -> &[Architecture] {
        &self.architectures
    }

    pub fn use_cases(&self) -> &[UseCase] {
        &self.use_cases
    }

    /// Resolved flows, one per scenario, in declaration order.
    pub fn flows(&self) -> &[ScenarioFlow] {
        &self.flows
    }

    pub fn event_links(&self) -> &[EventLink] {
        &self.event_links
    }

    pub fn publishers(&self) -> &IndexMap<String, Id> {
        &self.publishers
    }

    pub fn service_dependencies(&self) -> &[ServiceDependency] {
        &self.service_dependencies
    }

    pub fn domain(&self, name: Id) -> Option<&Domain> {
        self.domains.iter().find(|domain| domain.name() == name)
    }

    pub fn service(&self, name: Id) -> Option<&Service> {
        self.services.iter().find(|service| service.name() == name)
    }

    /// The first service, in declaration order, that lists `domain`.
    pub fn service_for_domain(&self, domain: Id) -> Option<&Service> {
        self.services.iter().find(|service| service.owns(domain))
    }

    /// The flow resolved for the scenario with the given id.
    pub fn flow(&self, scenario_id: &str) -> Option<&ScenarioFlow> {
        self.flows
            .iter()
            .find(|flow| flow.scenario_id() == scenario_id)
    }
}
