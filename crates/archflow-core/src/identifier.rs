//! Entity names backed by a global string interner.
//!
//! Every named thing in an architecture description (actors, domains,
//! services, data stores, events) is referred to by an [`Id`]. Interning keeps
//! merge keys and call-stack entries `Copy` and makes comparison cheap.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        // A poisoned interner still holds valid symbols.
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Interned entity name.
///
/// # Examples
///
/// ```
/// use archflow_core::identifier::Id;
///
/// let payments = Id::new("Payments");
/// assert_eq!(payments, "Payments");
/// assert_eq!(payments, Id::new("Payments"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Returns an owned copy of the interned text.
    pub fn to_text(self) -> String {
        interner().resolve(self.0).unwrap_or_default().to_string()
    }

    /// Runs `f` against the interned text without allocating.
    pub fn with_str<R>(self, f: impl FnOnce(&str) -> R) -> R {
        let guard = interner();
        f(guard.resolve(self.0).unwrap_or_default())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|name| f.write_str(name))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<&String> for Id {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.with_str(|name| name == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
