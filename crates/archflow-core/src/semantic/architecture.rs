//! Presentation and gateway layering of an architecture block.

use serde::Serialize;

use crate::identifier::Id;

/// A `key` or `key:value` annotation on a component, e.g. `[ssl:true]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modifier {
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

impl Modifier {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// A single named node with its modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentNode {
    name: Id,
    modifiers: Vec<Modifier>,
}

impl ComponentNode {
    pub fn new(name: Id, modifiers: Vec<Modifier>) -> Self {
        Self { name, modifiers }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Looks up a modifier by key.
    pub fn modifier(&self, key: &str) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| m.key == key)
    }
}

/// Either a lone node or an ordered chain of nodes joined by `>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Component {
    Node(ComponentNode),
    Flow { chain: Vec<ComponentNode> },
}

impl Component {
    /// Builds a component from parsed nodes; a single node is never a flow.
    pub fn from_chain(mut chain: Vec<ComponentNode>) -> Option<Self> {
        match chain.len() {
            0 => None,
            1 => chain.pop().map(Component::Node),
            _ => Some(Component::Flow { chain }),
        }
    }

    pub fn is_flow(&self) -> bool {
        matches!(self, Component::Flow { .. })
    }

    /// All nodes of this component in declaration order.
    pub fn nodes(&self) -> &[ComponentNode] {
        match self {
            Component::Node(node) => std::slice::from_ref(node),
            Component::Flow { chain } => chain,
        }
    }
}

/// An `arch` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Architecture {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<Id>,
    presentation: Vec<Component>,
    gateway: Vec<Component>,
}

impl Architecture {
    pub fn new(name: Option<Id>, presentation: Vec<Component>, gateway: Vec<Component>) -> Self {
        Self {
            name,
            presentation,
            gateway,
        }
    }

    pub fn name(&self) -> Option<Id> {
        self.name
    }

    pub fn presentation(&self) -> &[Component] {
        &self.presentation
    }

    pub fn gateway(&self) -> &[Component] {
        &self.gateway
    }
}
