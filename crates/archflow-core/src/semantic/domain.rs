use indexmap::IndexSet;
use serde::Serialize;

use crate::identifier::Id;

/// A named business capability with optional subdomains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    name: Id,
    sub_domains: IndexSet<Id>,
}

impl Domain {
    /// Creates a domain; duplicate subdomains keep their first position.
    pub fn new(name: Id, sub_domains: impl IntoIterator<Item = Id>) -> Self {
        Self {
            name,
            sub_domains: sub_domains.into_iter().collect(),
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn sub_domains(&self) -> &IndexSet<Id> {
        &self.sub_domains
    }
}
