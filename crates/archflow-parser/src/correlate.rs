//! Event correlation.
//!
//! Listens may appear before the scenario that publishes their event, so
//! correlation runs in two passes over the whole program. The first pass maps
//! every event name to its publishing domain; the second wires each
//! `when <Domain> listens "<event>"` trigger to that publisher's channel.

use indexmap::{IndexMap, map::Entry};
use log::{debug, warn};

use archflow_core::{
    identifier::Id,
    policy::ConflictPolicy,
    semantic::{
        ActionKind, EdgeKind, EventLink, FlowEdge, FlowEndpoint, ScenarioFlow, Trigger, UseCase,
    },
};

/// Publisher map and the listen links resolved against it.
#[derive(Debug, Default)]
pub(crate) struct Correlation {
    pub publishers: IndexMap<String, Id>,
    pub event_links: Vec<EventLink>,
}

/// Correlate listens with publishers and insert the inbound `listen` edge at
/// the front of each listening scenario's flow.
///
/// `policy` settles events published by more than one domain. Listens whose
/// event nobody publishes are dropped.
pub(crate) fn correlate(
    use_cases: &[UseCase],
    flows: &mut [ScenarioFlow],
    policy: ConflictPolicy,
) -> Correlation {
    let publishers = collect_publishers(use_cases, policy);

    let flow_positions: IndexMap<String, usize> = flows
        .iter()
        .enumerate()
        .map(|(position, flow)| (flow.scenario_id().to_string(), position))
        .collect();

    let mut event_links = Vec::new();
    for use_case in use_cases {
        for scenario in use_case.scenarios() {
            let Trigger::DomainListen { domain, event } = scenario.trigger() else {
                continue;
            };
            let Some(publisher) = publishers.get(event).copied() else {
                debug!(
                    event = event.as_str(),
                    listener = domain.to_string();
                    "No publisher for event, listen dropped"
                );
                continue;
            };

            if let Some(flow) = flow_positions
                .get(scenario.id())
                .and_then(|position| flows.get_mut(*position))
            {
                flow.prepend_edge(FlowEdge::new(
                    FlowEndpoint::Channel(publisher),
                    FlowEndpoint::Domain(*domain),
                    event.as_str(),
                    EdgeKind::Listen,
                ));
            }
            event_links.push(EventLink::new(
                event.as_str(),
                publisher,
                *domain,
                use_case.name(),
                scenario.id(),
            ));
        }
    }

    debug!(
        events = publishers.len(),
        links = event_links.len();
        "Correlated events"
    );

    Correlation {
        publishers,
        event_links,
    }
}

/// First pass: every `notifies` action across all use cases, in source order.
fn collect_publishers(use_cases: &[UseCase], policy: ConflictPolicy) -> IndexMap<String, Id> {
    let notifications = use_cases
        .iter()
        .flat_map(UseCase::scenarios)
        .flat_map(|scenario| scenario.actions())
        .filter_map(|action| match action.kind() {
            ActionKind::Async { domain, event } => Some((event, *domain)),
            _ => None,
        });

    let mut publishers = IndexMap::new();
    for (event, domain) in notifications {
        match publishers.entry(event.clone()) {
            Entry::Occupied(mut slot) => {
                let current: Id = *slot.get();
                if current != domain {
                    let kept = policy.pick(current, domain);
                    warn!(
                        event = event.as_str(),
                        first = current.to_string(),
                        second = domain.to_string(),
                        kept = kept.to_string();
                        "Event published by more than one domain"
                    );
                    slot.insert(kept);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(domain);
            }
        }
    }
    publishers
}
