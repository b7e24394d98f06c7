//! Declaration records produced by the parser.
//!
//! These are the raw, per-construct shapes of the source language, before
//! normalization. Leaf values are wrapped in [`Spanned`]; composite records
//! derive their span from their leaves. Single-entity and block forms stay
//! distinct here so the normalizer can prove they produce the same entities.
//!
//! The records own their text, so a caller with a different front end can
//! build them by hand and hand them to [`assemble`](crate::assemble).

use crate::span::{Span, Spanned};

/// Text with the span it was read from.
pub type Text = Spanned<String>;

/// One top-level construct of a source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// `actor user Customer`
    Actor(ActorDecl),
    /// `actors { user Customer system Scheduler }`
    Actors(Vec<ActorDecl>),
    /// `domain Payments { Invoicing Refunds }`
    Domain(DomainDecl),
    /// `domains { Payments { Invoicing } Orders { } }`
    Domains(Vec<DomainDecl>),
    /// `service Billing { ... }`
    Service(ServiceDecl),
    /// `services { Billing { ... } Shipping { ... } }`
    Services(Vec<ServiceDecl>),
    Exposure(ExposureDecl),
    Arch(ArchDecl),
    UseCase(UseCaseDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActorDecl {
    /// Kind keyword as written; unknown kinds are tolerated.
    pub kind: Text,
    pub name: Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainDecl {
    pub name: Text,
    pub sub_domains: Vec<Text>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDecl {
    pub name: Text,
    /// Property lines in source order. The same property may repeat.
    pub properties: Vec<ServiceProperty>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceProperty {
    Domains(Vec<Text>),
    DataStores(Vec<Text>),
    Language(Text),
    Deployment(DeploymentDecl),
}

/// `canary(10% -> staging, 90% -> production)` or a bare `blue_green`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentDecl {
    pub kind: Text,
    pub rules: Vec<DeploymentRuleDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentRuleDecl {
    /// Percentage as written, including the `%` sign.
    pub percentage: Text,
    pub target: Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExposureDecl {
    pub name: Text,
    pub to: Vec<Text>,
    pub of: Vec<Text>,
    pub through: Vec<Text>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchDecl {
    pub name: Option<Text>,
    pub presentation: Vec<ComponentDecl>,
    pub gateway: Vec<ComponentDecl>,
}

/// One node, or a `>` chain of nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDecl {
    pub chain: Vec<NodeDecl>,
}

impl ComponentDecl {
    pub fn span(&self) -> Span {
        self.chain
            .iter()
            .map(NodeDecl::span)
            .reduce(|acc, span| acc.union(span))
            .unwrap_or_default()
    }
}

/// `APIGateway[type: nginx, ssl]`
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDecl {
    pub name: Text,
    pub modifiers: Vec<ModifierDecl>,
}

impl NodeDecl {
    pub fn span(&self) -> Span {
        self.modifiers
            .iter()
            .map(ModifierDecl::span)
            .fold(self.name.span(), |acc, span| acc.union(span))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifierDecl {
    pub key: Text,
    pub value: Option<Text>,
}

impl ModifierDecl {
    pub fn span(&self) -> Span {
        match &self.value {
            Some(value) => self.key.span().union(value.span()),
            None => self.key.span(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UseCaseDecl {
    pub name: Text,
    pub scenarios: Vec<ScenarioDecl>,
}

/// A `when` line followed by its action lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioDecl {
    pub trigger: Spanned<TriggerDecl>,
    pub actions: Vec<Spanned<ActionDecl>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TriggerDecl {
    /// `when Customer places order`
    External {
        actor: String,
        verb: String,
        phrase: Vec<String>,
    },
    /// `when "Order Placed"`
    Event { event: String },
    /// `when Shipping listens "Order Placed"`
    DomainListen { domain: String, event: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionDecl {
    /// `Orders validates the cart`
    Internal {
        domain: String,
        verb: String,
        connector: Option<String>,
        phrase: Vec<String>,
    },
    /// `Orders asks Payments to charge the card`
    Sync {
        domain: String,
        target: String,
        connector: Option<String>,
        phrase: Vec<String>,
    },
    /// `Payments notifies "Payment Captured"`
    Async { domain: String, event: String },
    /// `Payments returns receipt` or `Payments returns to Orders receipt`
    Return {
        domain: String,
        target: Option<String>,
        phrase: Vec<String>,
    },
}
