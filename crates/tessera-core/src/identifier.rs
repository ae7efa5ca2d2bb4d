//! Interned identifiers for element, object and enum type names.
//!
//! Type names are compared constantly while resolving descriptors and
//! checking assignability, so they are interned once and compared by symbol.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner backing every [`Id`].
///
/// # Thread Safety
///
/// Access goes through a `Mutex`, so ids may be created from any thread.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Separator between namespace segments of a fully-qualified type name.
const NAMESPACE_SEPARATOR: char = '.';

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Interned fully-qualified type name.
///
/// # Examples
///
/// ```
/// use tessera_core::identifier::Id;
///
/// let button = Id::new("ui.Button");
/// assert_eq!(button, "ui.Button");
/// assert_eq!(button.short_name(), "Button");
///
/// let qualified = Id::qualified("ui", "Slider");
/// assert_eq!(qualified, "ui.Slider");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Builds `namespace.name`. An empty namespace yields `name` unchanged.
    pub fn qualified(namespace: &str, name: &str) -> Self {
        if namespace.is_empty() {
            return Self::new(name);
        }
        Self::new(&format!("{namespace}{NAMESPACE_SEPARATOR}{name}"))
    }

    /// Returns the last namespace segment, e.g. `Button` for `ui.Button`.
    pub fn short_name(&self) -> String {
        let full = self.to_string();
        match full.rsplit_once(NAMESPACE_SEPARATOR) {
            Some((_, short)) => short.to_string(),
            None => full,
        }
    }

    /// Returns the namespace part, or `None` for an unqualified name.
    pub fn namespace(&self) -> Option<String> {
        self.to_string()
            .rsplit_once(NAMESPACE_SEPARATOR)
            .map(|(namespace, _)| namespace.to_string())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let name = interner.resolve(self.0).unwrap_or_default();
        write!(f, "{name}")
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        interner().resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}
