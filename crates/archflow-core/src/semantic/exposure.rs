use serde::Serialize;

use crate::identifier::Id;

/// Declares which actors reach which domains through which gateways.
///
/// Exposures are never merged; each declaration stands alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exposure {
    name: Id,
    to: Vec<Id>,
    of: Vec<Id>,
    through: Vec<Id>,
}

impl Exposure {
    pub fn new(name: Id, to: Vec<Id>, of: Vec<Id>, through: Vec<Id>) -> Self {
        Self {
            name,
            to,
            of,
            through,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn to(&self) -> &[Id] {
        &self.to
    }

    pub fn of(&self) -> &[Id] {
        &self.of
    }

    pub fn through(&self) -> &[Id] {
        &self.through
    }
}
