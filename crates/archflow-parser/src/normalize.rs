//! Declaration normalization.
//!
//! Turns parsed declaration records into the canonical entity values of the
//! semantic model. Single-entity and block forms produce identical entities.
//! Domains and services come out unmerged, in source order; merging runs
//! afterwards over the whole program.

use log::{debug, trace};

use archflow_core::{
    identifier::Id,
    policy::ConflictPolicy,
    semantic::{
        Action, ActionKind, Actor, ActorKind, Architecture, Component, ComponentNode,
        DeploymentRule, DeploymentStrategy, Domain, Exposure, Modifier, Scenario, Service, Trigger,
        UseCase,
    },
};

use crate::{
    declarations::{
        ActionDecl, ActorDecl, ArchDecl, ComponentDecl, Declaration, DeploymentDecl, DomainDecl,
        ExposureDecl, ServiceDecl, ServiceProperty, Text, TriggerDecl, UseCaseDecl,
    },
    merge,
};

/// Canonical entities of one program, before merging.
#[derive(Debug, Default)]
pub(crate) struct Normalized {
    pub actors: Vec<Actor>,
    pub domains: Vec<Domain>,
    pub services: Vec<Service>,
    pub exposures: Vec<Exposure>,
    pub architectures: Vec<Architecture>,
    pub use_cases: Vec<UseCase>,
}

/// Hands out `scenario_N` / `action_N` identifiers from one shared counter.
#[derive(Debug)]
struct IdGenerator {
    next: usize,
}

impl IdGenerator {
    fn new() -> Self {
        Self { next: 1 }
    }

    fn generate(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}_{}", self.next);
        self.next += 1;
        id
    }
}

/// Normalize a whole program.
pub(crate) fn normalize(declarations: impl IntoIterator<Item = Declaration>) -> Normalized {
    Normalizer::new().build(declarations)
}

struct Normalizer {
    ids: IdGenerator,
    output: Normalized,
}

impl Normalizer {
    fn new() -> Self {
        Self {
            ids: IdGenerator::new(),
            output: Normalized::default(),
        }
    }

    fn build(mut self, declarations: impl IntoIterator<Item = Declaration>) -> Normalized {
        for declaration in declarations {
            self.push(declaration);
        }

        debug!(
            actors = self.output.actors.len(),
            domains = self.output.domains.len(),
            services = self.output.services.len(),
            use_cases = self.output.use_cases.len();
            "Normalized declarations"
        );
        self.output
    }

    fn push(&mut self, declaration: Declaration) {
        match declaration {
            Declaration::Actor(actor) => self.output.actors.push(build_actor(&actor)),
            Declaration::Actors(actors) => {
                self.output.actors.extend(actors.iter().map(build_actor));
            }
            Declaration::Domain(domain) => self.output.domains.push(build_domain(&domain)),
            Declaration::Domains(domains) => {
                self.output.domains.extend(domains.iter().map(build_domain));
            }
            Declaration::Service(service) => self.output.services.push(build_service(&service)),
            Declaration::Services(services) => {
                self.output
                    .services
                    .extend(services.iter().map(build_service));
            }
            Declaration::Exposure(exposure) => {
                self.output.exposures.push(build_exposure(&exposure));
            }
            Declaration::Arch(arch) => self.output.architectures.push(build_architecture(&arch)),
            Declaration::UseCase(use_case) => {
                let use_case = self.build_use_case(&use_case);
                self.output.use_cases.push(use_case);
            }
        }
    }

    // ============================================================================
    // Use Cases
    // ============================================================================

    fn build_use_case(&mut self, decl: &UseCaseDecl) -> UseCase {
        trace!(use_case = decl.name.inner().as_str(); "Normalizing use case");

        let scenarios = decl
            .scenarios
            .iter()
            .map(|scenario| {
                // The scenario id is drawn before its actions' ids.
                let id = self.ids.generate("scenario");
                let trigger = build_trigger(scenario.trigger.inner());
                let actions = scenario
                    .actions
                    .iter()
                    .map(|action| Action::new(self.ids.generate("action"), build_action(action)))
                    .collect();
                Scenario::new(id, trigger, actions)
            })
            .collect();

        UseCase::new(decl.name.inner().clone(), scenarios)
    }
}

fn id_of(text: &Text) -> Id {
    Id::new(text.inner())
}

fn ids_of(texts: &[Text]) -> Vec<Id> {
    texts.iter().map(id_of).collect()
}

/// Join phrase words with single spaces.
fn phrase_text(words: &[String]) -> String {
    words.join(" ")
}

fn connector_of(connector: &Option<String>) -> Option<String> {
    connector.clone().filter(|word| !word.is_empty())
}

// ============================================================================
// Entities
// ============================================================================

fn build_actor(decl: &ActorDecl) -> Actor {
    let kind = match ActorKind::from_keyword(decl.kind.inner()) {
        Some(kind) => kind,
        None => {
            debug!(
                kind = decl.kind.inner().as_str(),
                actor = decl.name.inner().as_str();
                "Unknown actor kind, defaulting to user"
            );
            ActorKind::User
        }
    };
    Actor::new(id_of(&decl.name), kind)
}

fn build_domain(decl: &DomainDecl) -> Domain {
    Domain::new(id_of(&decl.name), ids_of(&decl.sub_domains))
}

/// Fold the property lines of one service block into a single service.
///
/// Repeated lines combine the same way separate declarations of the service
/// would, with the first value winning on scalar conflicts.
fn build_service(decl: &ServiceDecl) -> Service {
    let name = id_of(&decl.name);
    decl.properties
        .iter()
        .fold(Service::new(name), |service, property| {
            let partial = match property {
                ServiceProperty::Domains(domains) => {
                    Service::new(name).with_domains(ids_of(domains))
                }
                ServiceProperty::DataStores(stores) => {
                    Service::new(name).with_data_stores(ids_of(stores))
                }
                ServiceProperty::Language(language) => {
                    Service::new(name).with_language(Some(language.inner().clone()))
                }
                ServiceProperty::Deployment(deployment) => {
                    Service::new(name).with_deployment(build_deployment(deployment))
                }
            };
            merge::merge_service(&service, partial, ConflictPolicy::FirstWins)
        })
}

fn build_deployment(decl: &DeploymentDecl) -> DeploymentStrategy {
    DeploymentStrategy::new(
        decl.kind.inner().clone(),
        decl.rules
            .iter()
            .map(|rule| DeploymentRule::new(rule.percentage.inner().clone(), id_of(&rule.target))),
    )
}

fn build_exposure(decl: &ExposureDecl) -> Exposure {
    Exposure::new(
        id_of(&decl.name),
        ids_of(&decl.to),
        ids_of(&decl.of),
        ids_of(&decl.through),
    )
}

fn build_architecture(decl: &ArchDecl) -> Architecture {
    Architecture::new(
        decl.name.as_ref().map(id_of),
        build_components(&decl.presentation),
        build_components(&decl.gateway),
    )
}

fn build_components(decls: &[ComponentDecl]) -> Vec<Component> {
    decls
        .iter()
        .filter_map(|component| {
            let nodes = component
                .chain
                .iter()
                .map(|node| {
                    let modifiers = node
                        .modifiers
                        .iter()
                        .map(|modifier| {
                            Modifier::new(
                                modifier.key.inner().clone(),
                                modifier.value.as_ref().map(|value| value.inner().clone()),
                            )
                        })
                        .collect();
                    ComponentNode::new(id_of(&node.name), modifiers)
                })
                .collect();
            Component::from_chain(nodes)
        })
        .collect()
}

// ============================================================================
// Triggers and Actions
// ============================================================================

fn build_trigger(decl: &TriggerDecl) -> Trigger {
    match decl {
        TriggerDecl::External {
            actor,
            verb,
            phrase,
        } => Trigger::External {
            actor: Id::new(actor),
            verb: verb.clone(),
            phrase: phrase_text(phrase),
        },
        TriggerDecl::Event { event } => Trigger::Event {
            event: event.clone(),
        },
        TriggerDecl::DomainListen { domain, event } => Trigger::DomainListen {
            domain: Id::new(domain),
            event: event.clone(),
        },
    }
}

fn build_action(decl: &ActionDecl) -> ActionKind {
    match decl {
        ActionDecl::Internal {
            domain,
            verb,
            connector,
            phrase,
        } => ActionKind::Internal {
            domain: Id::new(domain),
            verb: verb.clone(),
            connector: connector_of(connector),
            phrase: phrase_text(phrase),
        },
        ActionDecl::Sync {
            domain,
            target,
            connector,
            phrase,
        } => ActionKind::Sync {
            domain: Id::new(domain),
            target: Id::new(target),
            connector: connector_of(connector),
            phrase: phrase_text(phrase),
        },
        ActionDecl::Async { domain, event } => ActionKind::Async {
            domain: Id::new(domain),
            event: event.clone(),
        },
        ActionDecl::Return {
            domain,
            target,
            phrase,
        } => ActionKind::Return {
            domain: Id::new(domain),
            target: target.as_deref().map(Id::new),
            phrase: phrase_text(phrase),
        },
    }
}
