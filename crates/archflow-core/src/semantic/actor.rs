use std::fmt;

use serde::Serialize;

use crate::identifier::Id;

/// Category of an actor taking part in use cases.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// A human user of the system.
    #[default]
    User,
    /// An external or scheduled system.
    System,
    /// A supporting service such as a database.
    Service,
}

impl ActorKind {
    /// Maps a declaration keyword to a kind, or `None` if it is not recognized.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "user" => Some(ActorKind::User),
            "system" => Some(ActorKind::System),
            "service" => Some(ActorKind::Service),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActorKind::User => "user",
            ActorKind::System => "system",
            ActorKind::Service => "service",
        }
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A participant that triggers scenarios.
///
/// Actors are never merged: two declarations with the same name produce two
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    name: Id,
    kind: ActorKind,
}

impl Actor {
    pub fn new(name: Id, kind: ActorKind) -> Self {
        Self { name, kind }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn kind(&self) -> ActorKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keyword() {
        assert_eq!(ActorKind::from_keyword("user"), Some(ActorKind::User));
        assert_eq!(ActorKind::from_keyword("system"), Some(ActorKind::System));
        assert_eq!(ActorKind::from_keyword("service"), Some(ActorKind::Service));
        assert_eq!(ActorKind::from_keyword("robot"), None);
        assert_eq!(ActorKind::from_keyword("User"), None);
    }

    #[test]
    fn test_default_kind_is_user() {
        assert_eq!(ActorKind::default(), ActorKind::User);
    }
}
