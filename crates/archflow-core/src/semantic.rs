//! Semantic model of an architecture description.
//!
//! The types in this module are the output of the assembly engine: merged
//! entities, normalized use cases, and the resolved flow edges that
//! renderers draw. They are immutable once built and serialize with `serde`.

mod actor;
mod architecture;
mod domain;
mod exposure;
mod flow;
mod model;
mod service;
mod use_case;

pub use actor::{Actor, ActorKind};
pub use architecture::{Architecture, Component, ComponentNode, Modifier};
pub use domain::Domain;
pub use exposure::Exposure;
pub use flow::{
    EXTERNAL_SENTINEL, EdgeKind, EventLink, FlowEdge, FlowEndpoint, ScenarioFlow,
    ServiceDependency, channel_name,
};
pub use model::ArchitectureModel;
pub use service::{DeploymentRule, DeploymentStrategy, Service};
pub use use_case::{Action, ActionKind, Scenario, Trigger, UseCase};

/// Joins the non-empty parts with single spaces.
pub(crate) fn join_words<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
