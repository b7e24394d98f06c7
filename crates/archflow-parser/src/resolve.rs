//! Scenario resolution.
//!
//! Walks the actions of every scenario in declaration order and turns them
//! into directed flow edges. Returns without an explicit target are bound to
//! the most recent unmatched caller through a per-scenario call stack.
//!
//! Resolution never fails: a return with nobody left to return to goes to
//! [`FlowEndpoint::External`], and callers still on the stack when the
//! scenario ends are discarded.

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use archflow_core::{
    identifier::Id,
    semantic::{
        ActionKind, EdgeKind, FlowEdge, FlowEndpoint, Scenario, ScenarioFlow, Service,
        ServiceDependency, Trigger, UseCase,
    },
};

/// Flows of every scenario plus the service dependencies they imply.
#[derive(Debug, Default)]
pub(crate) struct Resolution {
    pub flows: Vec<ScenarioFlow>,
    pub service_dependencies: Vec<ServiceDependency>,
}

/// Maps each domain to the first service that lists it.
#[derive(Debug, Default)]
pub(crate) struct ServiceIndex {
    owners: IndexMap<Id, Id>,
}

impl ServiceIndex {
    pub fn new(services: &[Service]) -> Self {
        let mut owners = IndexMap::new();
        for service in services {
            for domain in service.domains() {
                owners.entry(*domain).or_insert(service.name());
            }
        }
        Self { owners }
    }

    pub fn owner(&self, domain: Id) -> Option<Id> {
        self.owners.get(&domain).copied()
    }
}

/// LIFO of callers still waiting for a return.
#[derive(Debug, Default)]
struct CallStack {
    frames: Vec<FlowEndpoint>,
}

impl CallStack {
    /// An external trigger leaves its actor waiting for the final answer.
    fn for_trigger(trigger: &Trigger) -> Self {
        let mut stack = Self::default();
        if let Trigger::External { actor, .. } = trigger {
            stack.push(FlowEndpoint::Actor(*actor));
        }
        stack
    }

    fn push(&mut self, caller: FlowEndpoint) {
        self.frames.push(caller);
    }

    fn pop(&mut self) -> Option<FlowEndpoint> {
        self.frames.pop()
    }

    fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Resolve every scenario of every use case, in declaration order.
pub(crate) fn resolve_use_cases(use_cases: &[UseCase], services: &ServiceIndex) -> Resolution {
    let mut flows = Vec::new();
    let mut dependencies = IndexSet::new();

    for use_case in use_cases {
        for scenario in use_case.scenarios() {
            let flow = resolve_scenario(use_case.name(), scenario, services);
            dependencies.extend(service_dependencies(scenario, services));
            flows.push(flow);
        }
    }

    debug!(
        flows = flows.len(),
        service_dependencies = dependencies.len();
        "Resolved scenarios"
    );

    Resolution {
        flows,
        service_dependencies: dependencies.into_iter().collect(),
    }
}

/// Resolve one scenario into its edge list.
pub(crate) fn resolve_scenario(
    use_case: &str,
    scenario: &Scenario,
    services: &ServiceIndex,
) -> ScenarioFlow {
    let trigger = scenario.trigger();
    let mut stack = CallStack::for_trigger(trigger);
    let mut edges = Vec::new();
    let mut visited = IndexSet::new();

    match trigger {
        Trigger::External {
            actor,
            verb,
            phrase,
        } => {
            if let Some(first) = scenario.actions().first() {
                edges.push(FlowEdge::new(
                    FlowEndpoint::Actor(*actor),
                    FlowEndpoint::Domain(first.domain()),
                    joined(verb, phrase),
                    EdgeKind::Trigger,
                ));
            }
        }
        Trigger::DomainListen { domain, .. } => {
            visited.insert(*domain);
        }
        Trigger::Event { .. } => {}
    }

    for action in scenario.actions() {
        match action.kind() {
            ActionKind::Internal { domain, .. } => {
                visited.insert(*domain);
            }
            ActionKind::Sync {
                domain,
                target,
                connector,
                phrase,
            } => {
                visited.insert(*domain);
                visited.insert(*target);
                edges.push(FlowEdge::new(
                    FlowEndpoint::Domain(*domain),
                    FlowEndpoint::Domain(*target),
                    joined(connector.as_deref().unwrap_or_default(), phrase),
                    EdgeKind::Sync,
                ));
                stack.push(FlowEndpoint::Domain(*domain));
            }
            ActionKind::Async { domain, event } => {
                visited.insert(*domain);
                edges.push(FlowEdge::new(
                    FlowEndpoint::Domain(*domain),
                    FlowEndpoint::Channel(*domain),
                    event.as_str(),
                    EdgeKind::Async,
                ));
            }
            ActionKind::Return {
                domain,
                target,
                phrase,
            } => {
                visited.insert(*domain);
                // An explicit target leaves the stack untouched.
                let to = match target {
                    Some(target) => {
                        visited.insert(*target);
                        FlowEndpoint::Domain(*target)
                    }
                    None => stack.pop().unwrap_or(FlowEndpoint::External),
                };
                edges.push(FlowEdge::new(
                    FlowEndpoint::Domain(*domain),
                    to,
                    phrase.as_str(),
                    EdgeKind::Return,
                ));
            }
        }
    }

    if stack.depth() > 0 {
        trace!(
            scenario = scenario.id(),
            pending = stack.depth();
            "Discarding unmatched callers"
        );
    }

    let owners = visited
        .iter()
        .filter_map(|domain| services.owner(*domain))
        .collect();

    ScenarioFlow::new(use_case, scenario.id(), edges, visited, owners)
}

/// Sync calls that cross a service boundary.
fn service_dependencies<'a>(
    scenario: &'a Scenario,
    services: &'a ServiceIndex,
) -> impl Iterator<Item = ServiceDependency> + 'a {
    scenario
        .actions()
        .iter()
        .filter_map(move |action| match action.kind() {
            ActionKind::Sync {
                domain,
                target,
                phrase,
                ..
            } => {
                let from = services.owner(*domain)?;
                let to = services.owner(*target)?;
                (from != to).then(|| ServiceDependency::new(from, to, phrase.as_str()))
            }
            _ => None,
        })
}

/// Join two label parts, skipping empty ones.
fn joined(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

#[cfg(test)]
mod tests {
    use archflow_core::semantic::Action;

    use super::*;

    fn external(actor: &str, verb: &str, phrase: &str) -> Trigger {
        Trigger::External {
            actor: Id::new(actor),
            verb: verb.to_string(),
            phrase: phrase.to_string(),
        }
    }

    fn sync(domain: &str, target: &str, phrase: &str) -> ActionKind {
        ActionKind::Sync {
            domain: Id::new(domain),
            target: Id::new(target),
            connector: Some("to".to_string()),
            phrase: phrase.to_string(),
        }
    }

    fn ret(domain: &str, target: Option<&str>, phrase: &str) -> ActionKind {
        ActionKind::Return {
            domain: Id::new(domain),
            target: target.map(Id::new),
            phrase: phrase.to_string(),
        }
    }

    fn scenario(trigger: Trigger, actions: Vec<ActionKind>) -> Scenario {
        let actions = actions
            .into_iter()
            .enumerate()
            .map(|(n, kind)| Action::new(format!("action_{}", n + 2), kind))
            .collect();
        Scenario::new("scenario_1", trigger, actions)
    }

    fn endpoints(flow: &ScenarioFlow) -> Vec<(String, String)> {
        flow.edges()
            .iter()
            .map(|edge| (edge.source().to_string(), edge.target().to_string()))
            .collect()
    }

    fn pair(from: &str, to: &str) -> (String, String) {
        (from.to_string(), to.to_string())
    }

    #[test]
    fn test_return_goes_to_caller() {
        let scenario = scenario(
            external("User", "triggers", "checkout"),
            vec![sync("A", "B", "X"), ret("B", None, "result")],
        );
        let flow = resolve_scenario("Checkout", &scenario, &ServiceIndex::default());

        assert_eq!(
            endpoints(&flow),
            vec![pair("User", "A"), pair("A", "B"), pair("B", "A")]
        );
        assert_eq!(flow.edges()[0].kind(), EdgeKind::Trigger);
        assert_eq!(flow.edges()[0].label(), "triggers checkout");
        assert_eq!(flow.edges()[1].label(), "to X");
        assert_eq!(flow.edges()[2].kind(), EdgeKind::Return);
    }

    #[test]
    fn test_nested_returns_unwind_to_actor() {
        let scenario = scenario(
            external("User", "places", "order"),
            vec![
                sync("A", "B", "charge"),
                sync("B", "C", "reserve"),
                ret("C", None, "ok"),
                ret("B", None, "ok"),
                ret("A", None, "confirmation"),
            ],
        );
        let flow = resolve_scenario("Checkout", &scenario, &ServiceIndex::default());

        let edges = endpoints(&flow);
        assert_eq!(edges[3], pair("C", "B"));
        assert_eq!(edges[4], pair("B", "A"));
        assert_eq!(edges[5], pair("A", "User"));
    }

    #[test]
    fn test_explicit_return_overrides_stack() {
        let scenario = scenario(
            external("User", "triggers", "flow"),
            vec![
                sync("A", "B", "work"),
                ret("B", Some("C"), "result"),
                ret("B", None, "late"),
            ],
        );
        let flow = resolve_scenario("Flow", &scenario, &ServiceIndex::default());

        let edges = endpoints(&flow);
        assert_eq!(edges[2], pair("B", "C"));
        // The caller pushed by the sync is still waiting.
        assert_eq!(edges[3], pair("B", "A"));
    }

    #[test]
    fn test_empty_stack_returns_to_external() {
        let scenario = scenario(
            Trigger::Event {
                event: "Nightly".to_string(),
            },
            vec![ret("Reports", None, "summary")],
        );
        let flow = resolve_scenario("Reports", &scenario, &ServiceIndex::default());

        assert_eq!(flow.edges().len(), 1);
        assert_eq!(flow.edges()[0].target(), FlowEndpoint::External);
        assert_eq!(flow.edges()[0].target().to_string(), "External");
    }

    #[test]
    fn test_async_goes_to_own_channel() {
        let scenario = scenario(
            Trigger::Event {
                event: "Tick".to_string(),
            },
            vec![ActionKind::Async {
                domain: Id::new("User Profile"),
                event: "Profile Updated".to_string(),
            }],
        );
        let flow = resolve_scenario("Profiles", &scenario, &ServiceIndex::default());

        let edge = &flow.edges()[0];
        assert_eq!(
            edge.target(),
            FlowEndpoint::Channel(Id::new("User Profile"))
        );
        assert_eq!(edge.target().to_string(), "user_profile_queue");
        assert_eq!(edge.label(), "Profile Updated");
    }

    #[test]
    fn test_internal_actions_are_visited_without_edges() {
        let scenario = scenario(
            Trigger::DomainListen {
                domain: Id::new("Shipping"),
                event: "Order Placed".to_string(),
            },
            vec![ActionKind::Internal {
                domain: Id::new("Warehouse"),
                verb: "packs".to_string(),
                connector: None,
                phrase: "the parcel".to_string(),
            }],
        );
        let flow = resolve_scenario("Shipping", &scenario, &ServiceIndex::default());

        assert!(flow.edges().is_empty());
        let visited: Vec<String> = flow.visited_domains().iter().map(|d| d.to_text()).collect();
        assert_eq!(visited, vec!["Shipping", "Warehouse"]);
    }

    #[test]
    fn test_services_and_dependencies() {
        let services = vec![
            Service::new(Id::new("Storefront")).with_domains([Id::new("A")]),
            Service::new(Id::new("Billing")).with_domains([Id::new("B"), Id::new("C")]),
            Service::new(Id::new("Legacy")).with_domains([Id::new("B")]),
        ];
        let index = ServiceIndex::new(&services);
        assert_eq!(index.owner(Id::new("B")), Some(Id::new("Billing")));

        let use_case = UseCase::new(
            "Pay",
            vec![scenario(
                external("User", "pays", ""),
                vec![
                    sync("A", "B", "charge"),
                    sync("B", "C", "record"),
                    sync("A", "B", "charge"),
                    ret("B", None, "ok"),
                ],
            )],
        );
        let resolution = resolve_use_cases(&[use_case], &index);

        let flow = &resolution.flows[0];
        let owners: Vec<String> = flow.services().iter().map(|s| s.to_text()).collect();
        assert_eq!(owners, vec!["Storefront", "Billing"]);
        assert_eq!(flow.edges()[0].label(), "pays");

        assert_eq!(
            resolution.service_dependencies,
            vec![ServiceDependency::new(
                Id::new("Storefront"),
                Id::new("Billing"),
                "charge"
            )]
        );
    }
}
