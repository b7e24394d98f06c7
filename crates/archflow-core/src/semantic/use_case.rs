//! Use cases, their scenarios, triggers, and actions.

use serde::Serialize;

use crate::{identifier::Id, semantic::join_words};

/// What starts a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// `when <actor> <verb> <phrase>`
    External { actor: Id, verb: String, phrase: String },
    /// `when "<event>"`
    Event { event: String },
    /// `when <domain> listens "<event>"`
    DomainListen { domain: Id, event: String },
}

impl Trigger {
    /// Human-readable form of the trigger line.
    pub fn description(&self) -> String {
        match self {
            Trigger::External {
                actor,
                verb,
                phrase,
            } => {
                let actor = actor.to_text();
                format!("when {}", join_words([actor.as_str(), verb.as_str(), phrase.as_str()]))
            }
            Trigger::Event { event } => format!("when \"{event}\""),
            Trigger::DomainListen { domain, event } => {
                format!("when {domain} listens \"{event}\"")
            }
        }
    }

    /// The event this trigger reacts to, if any.
    pub fn event(&self) -> Option<&str> {
        match self {
            Trigger::External { .. } => None,
            Trigger::Event { event } | Trigger::DomainListen { event, .. } => Some(event),
        }
    }
}

/// The shape of a single action line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// `<domain> <verb> [connector] <phrase>`
    Internal {
        domain: Id,
        verb: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        connector: Option<String>,
        phrase: String,
    },
    /// `<domain> asks <target> [connector] <phrase>`
    Sync {
        domain: Id,
        target: Id,
        #[serde(skip_serializing_if = "Option::is_none")]
        connector: Option<String>,
        phrase: String,
    },
    /// `<domain> notifies "<event>"`
    Async { domain: Id, event: String },
    /// `<domain> returns [to <target>] <phrase>`
    Return {
        domain: Id,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<Id>,
        phrase: String,
    },
}

impl ActionKind {
    /// The domain performing the action.
    pub fn domain(&self) -> Id {
        match self {
            ActionKind::Internal { domain, .. }
            | ActionKind::Sync { domain, .. }
            | ActionKind::Async { domain, .. }
            | ActionKind::Return { domain, .. } => *domain,
        }
    }

    fn describe(&self) -> String {
        let domain = self.domain().to_text();
        match self {
            ActionKind::Internal {
                verb,
                connector,
                phrase,
                ..
            } => join_words([
                domain.as_str(),
                verb.as_str(),
                connector.as_deref().unwrap_or_default(),
                phrase.as_str(),
            ]),
            ActionKind::Sync {
                target,
                connector,
                phrase,
                ..
            } => {
                let target = target.to_text();
                join_words([
                    domain.as_str(),
                    "asks",
                    target.as_str(),
                    connector.as_deref().unwrap_or_default(),
                    phrase.as_str(),
                ])
            }
            ActionKind::Async { event, .. } => format!("{domain} notifies \"{event}\""),
            ActionKind::Return { target, phrase, .. } => {
                let returned = join_words([domain.as_str(), "returns", phrase.as_str()]);
                match target {
                    Some(target) => format!("{returned} to {target}"),
                    None => returned,
                }
            }
        }
    }
}

/// One action line of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    id: String,
    description: String,
    #[serde(flatten)]
    kind: ActionKind,
}

impl Action {
    pub fn new(id: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            id: id.into(),
            description: kind.describe(),
            kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn domain(&self) -> Id {
        self.kind.domain()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// One trigger-to-completion flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    id: String,
    trigger: Trigger,
    actions: Vec<Action>,
}

impl Scenario {
    pub fn new(id: impl Into<String>, trigger: Trigger, actions: Vec<Action>) -> Self {
        Self {
            id: id.into(),
            trigger,
            actions,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

/// A named group of scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UseCase {
    name: String,
    scenarios: Vec<Scenario>,
}

impl UseCase {
    pub fn new(name: impl Into<String>, scenarios: Vec<Scenario>) -> Self {
        Self {
            name: name.into(),
            scenarios,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_descriptions() {
        let external = Trigger::External {
            actor: Id::new("Business_User"),
            verb: "creates".to_string(),
            phrase: "Account".to_string(),
        };
        assert_eq!(external.description(), "when Business_User creates Account");

        let event = Trigger::Event {
            event: "Nightly Run".to_string(),
        };
        assert_eq!(event.description(), "when \"Nightly Run\"");

        let listen = Trigger::DomainListen {
            domain: Id::new("Profile"),
            event: "User Registered".to_string(),
        };
        assert_eq!(
            listen.description(),
            "when Profile listens \"User Registered\""
        );
        assert_eq!(listen.event(), Some("User Registered"));
        assert_eq!(external.event(), None);
    }

    #[test]
    fn test_sync_description_with_and_without_connector() {
        let with_connector = Action::new(
            "action_1",
            ActionKind::Sync {
                domain: Id::new("Authentication"),
                target: Id::new("Database"),
                connector: Some("to".to_string()),
                phrase: "check email uniqueness".to_string(),
            },
        );
        assert_eq!(
            with_connector.description(),
            "Authentication asks Database to check email uniqueness"
        );

        let without = Action::new(
            "action_2",
            ActionKind::Sync {
                domain: Id::new("Orders"),
                target: Id::new("Stock"),
                connector: None,
                phrase: "reserve items".to_string(),
            },
        );
        assert_eq!(without.description(), "Orders asks Stock reserve items");
    }

    #[test]
    fn test_return_descriptions() {
        let explicit = Action::new(
            "action_3",
            ActionKind::Return {
                domain: Id::new("BankGateway"),
                target: Some(Id::new("PaymentService")),
                phrase: "payment result".to_string(),
            },
        );
        assert_eq!(
            explicit.description(),
            "BankGateway returns payment result to PaymentService"
        );

        let implicit = Action::new(
            "action_4",
            ActionKind::Return {
                domain: Id::new("PaymentService"),
                target: None,
                phrase: "confirmation status".to_string(),
            },
        );
        assert_eq!(
            implicit.description(),
            "PaymentService returns confirmation status"
        );
    }

    #[test]
    fn test_async_and_internal_descriptions() {
        let notify = Action::new(
            "action_5",
            ActionKind::Async {
                domain: Id::new("Authentication"),
                event: "User Registered".to_string(),
            },
        );
        assert_eq!(
            notify.description(),
            "Authentication notifies \"User Registered\""
        );

        let internal = Action::new(
            "action_6",
            ActionKind::Internal {
                domain: Id::new("Profile"),
                verb: "marks".to_string(),
                connector: Some("the".to_string()),
                phrase: "user as verified".to_string(),
            },
        );
        assert_eq!(internal.description(), "Profile marks the user as verified");
    }

    #[test]
    fn test_action_serializes_flat() {
        let action = Action::new(
            "action_1",
            ActionKind::Async {
                domain: Id::new("Orders"),
                event: "Order Placed".to_string(),
            },
        );
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["id"], "action_1");
        assert_eq!(json["type"], "async");
        assert_eq!(json["domain"], "Orders");
        assert_eq!(json["event"], "Order Placed");
    }
}
