//! Named policies for resolving conflicting declarations.
//!
//! The assembly engine never reports a conflict as an error. Instead, every
//! place where two declarations disagree consults a [`ConflictPolicy`] so the
//! tie-break is explicit and testable.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tie-break rule applied when two declarations disagree.
///
/// # Examples
///
/// ```
/// use archflow_core::policy::ConflictPolicy;
///
/// let policy: ConflictPolicy = "last_wins".parse().unwrap();
/// assert_eq!(policy.pick("existing", "incoming"), "incoming");
/// assert_eq!(ConflictPolicy::FirstWins.pick("existing", "incoming"), "existing");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The value seen first in source order is kept.
    FirstWins,
    /// The value seen last in source order replaces earlier ones.
    LastWins,
}

impl ConflictPolicy {
    /// Returns `true` when a conflicting incoming value replaces the existing one.
    pub fn prefers_incoming(self) -> bool {
        matches!(self, ConflictPolicy::LastWins)
    }

    /// Chooses between an existing and an incoming value.
    pub fn pick<T>(self, existing: T, incoming: T) -> T {
        if self.prefers_incoming() {
            incoming
        } else {
            existing
        }
    }

    /// Returns the configuration spelling of this policy.
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictPolicy::FirstWins => "first_wins",
            ConflictPolicy::LastWins => "last_wins",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a policy name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown conflict policy `{0}`, expected `first_wins` or `last_wins`")]
pub struct UnknownPolicyError(String);

impl FromStr for ConflictPolicy {
    type Err = UnknownPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "first_wins" => Ok(ConflictPolicy::FirstWins),
            "last_wins" => Ok(ConflictPolicy::LastWins),
            _ => Err(UnknownPolicyError(s.to_string())),
        }
    }
}
