//! Resolved control and event flow between actors, domains, and channels.
//!
//! A [`ScenarioFlow`] is the edge list the scenario resolver produces for one
//! scenario; the event correlator later prepends the inbound `listen` edge of
//! scenarios triggered by another domain's event.

use std::fmt;

use indexmap::IndexSet;
use serde::Serialize;

use crate::identifier::Id;

/// Display name of the endpoint that receives unmatched returns.
pub const EXTERNAL_SENTINEL: &str = "External";

/// Name of the notification channel owned by `domain`.
///
/// The channel is identified by its producing domain, never by the event.
///
/// ```
/// use archflow_core::{identifier::Id, semantic::channel_name};
///
/// assert_eq!(channel_name(Id::new("User Profile")), "user_profile_queue");
/// ```
pub fn channel_name(domain: Id) -> String {
    let base = domain.with_str(|name| name.to_lowercase().replace(' ', "_"));
    format!("{base}_queue")
}

/// One end of a flow edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum FlowEndpoint {
    Actor(Id),
    Domain(Id),
    /// Notification channel owned by the given domain.
    Channel(Id),
    /// Caller outside the scenario, used when a return has nobody to return to.
    External,
}

impl FlowEndpoint {
    /// The domain behind this endpoint, if it is a domain.
    pub fn domain(&self) -> Option<Id> {
        match self {
            FlowEndpoint::Domain(domain) => Some(*domain),
            _ => None,
        }
    }
}

impl fmt::Display for FlowEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowEndpoint::Actor(name) | FlowEndpoint::Domain(name) => write!(f, "{name}"),
            FlowEndpoint::Channel(owner) => f.write_str(&channel_name(*owner)),
            FlowEndpoint::External => f.write_str(EXTERNAL_SENTINEL),
        }
    }
}

/// Why an edge exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// External actor starting the scenario.
    Trigger,
    Sync,
    Async,
    Return,
    /// Channel delivering an event to a listening domain.
    Listen,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Trigger => "trigger",
            EdgeKind::Sync => "sync",
            EdgeKind::Async => "async",
            EdgeKind::Return => "return",
            EdgeKind::Listen => "listen",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed, labeled edge of a resolved flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowEdge {
    from: FlowEndpoint,
    to: FlowEndpoint,
    label: String,
    kind: EdgeKind,
}

impl FlowEdge {
    pub fn new(
        from: FlowEndpoint,
        to: FlowEndpoint,
        label: impl Into<String>,
        kind: EdgeKind,
    ) -> Self {
        Self {
            from,
            to,
            label: label.into(),
            kind,
        }
    }

    pub fn source(&self) -> FlowEndpoint {
        self.from
    }

    pub fn target(&self) -> FlowEndpoint {
        self.to
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }
}

impl fmt::Display for FlowEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)?;
        if !self.label.is_empty() {
            write!(f, ": {}", self.label)?;
        }
        Ok(())
    }
}

/// Resolved edges of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFlow {
    use_case: String,
    scenario_id: String,
    edges: Vec<FlowEdge>,
    visited_domains: IndexSet<Id>,
    services: IndexSet<Id>,
}

impl ScenarioFlow {
    pub fn new(
        use_case: impl Into<String>,
        scenario_id: impl Into<String>,
        edges: Vec<FlowEdge>,
        visited_domains: IndexSet<Id>,
        services: IndexSet<Id>,
    ) -> Self {
        Self {
            use_case: use_case.into(),
            scenario_id: scenario_id.into(),
            edges,
            visited_domains,
            services,
        }
    }

    pub fn use_case(&self) -> &str {
        &self.use_case
    }

    pub fn scenario_id(&self) -> &str {
        &self.scenario_id
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    /// Domains in first-visit order, including internal-only visits.
    pub fn visited_domains(&self) -> &IndexSet<Id> {
        &self.visited_domains
    }

    /// Services owning the visited domains, in first-visit order.
    pub fn services(&self) -> &IndexSet<Id> {
        &self.services
    }

    /// Places an inbound edge ahead of every resolved edge.
    pub fn prepend_edge(&mut self, edge: FlowEdge) {
        self.edges.insert(0, edge);
    }
}

/// A `listens` trigger wired to the domain that publishes its event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLink {
    event: String,
    publisher: Id,
    listener: Id,
    use_case: String,
    scenario_id: String,
}

impl EventLink {
    pub fn new(
        event: impl Into<String>,
        publisher: Id,
        listener: Id,
        use_case: impl Into<String>,
        scenario_id: impl Into<String>,
    ) -> Self {
        Self {
            event: event.into(),
            publisher,
            listener,
            use_case: use_case.into(),
            scenario_id: scenario_id.into(),
        }
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn publisher(&self) -> Id {
        self.publisher
    }

    pub fn listener(&self) -> Id {
        self.listener
    }

    pub fn use_case(&self) -> &str {
        &self.use_case
    }

    pub fn scenario_id(&self) -> &str {
        &self.scenario_id
    }
}

/// A synchronous call that crosses a service boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ServiceDependency {
    from: Id,
    to: Id,
    label: String,
}

impl ServiceDependency {
    pub fn new(from: Id, to: Id, label: impl Into<String>) -> Self {
        Self {
            from,
            to,
            label: label.into(),
        }
    }

    pub fn source(&self) -> Id {
        self.from
    }

    pub fn target(&self) -> Id {
        self.to
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_name() {
        assert_eq!(channel_name(Id::new("Authentication")), "authentication_queue");
        assert_eq!(channel_name(Id::new("Order Intake")), "order_intake_queue");
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(FlowEndpoint::Actor(Id::new("Customer")).to_string(), "Customer");
        assert_eq!(FlowEndpoint::Domain(Id::new("Billing")).to_string(), "Billing");
        assert_eq!(
            FlowEndpoint::Channel(Id::new("Billing")).to_string(),
            "billing_queue"
        );
        assert_eq!(FlowEndpoint::External.to_string(), EXTERNAL_SENTINEL);
    }

    #[test]
    fn test_edge_display() {
        let edge = FlowEdge::new(
            FlowEndpoint::Domain(Id::new("Orders")),
            FlowEndpoint::Domain(Id::new("Stock")),
            "to reserve items",
            EdgeKind::Sync,
        );
        assert_eq!(edge.to_string(), "Orders -> Stock: to reserve items");

        let unlabeled = FlowEdge::new(
            FlowEndpoint::Domain(Id::new("Stock")),
            FlowEndpoint::External,
            "",
            EdgeKind::Return,
        );
        assert_eq!(unlabeled.to_string(), "Stock -> External");
    }

    #[test]
    fn test_prepend_edge() {
        let mut flow = ScenarioFlow::new(
            "Checkout",
            "scenario_1",
            vec![FlowEdge::new(
                FlowEndpoint::Domain(Id::new("Shipping")),
                FlowEndpoint::Domain(Id::new("Carrier")),
                "book",
                EdgeKind::Sync,
            )],
            IndexSet::new(),
            IndexSet::new(),
        );
        flow.prepend_edge(FlowEdge::new(
            FlowEndpoint::Channel(Id::new("Orders")),
            FlowEndpoint::Domain(Id::new("Shipping")),
            "Order Placed",
            EdgeKind::Listen,
        ));

        assert_eq!(flow.edges().len(), 2);
        assert_eq!(flow.edges()[0].kind(), EdgeKind::Listen);
    }

    #[test]
    fn test_endpoint_serialization() {
        let json = serde_json::to_value(FlowEndpoint::Channel(Id::new("Orders"))).unwrap();
        assert_eq!(json["type"], "channel");
        assert_eq!(json["name"], "Orders");

        let external = serde_json::to_value(FlowEndpoint::External).unwrap();
        assert_eq!(external["type"], "external");
    }
}
