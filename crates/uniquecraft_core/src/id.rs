//! # Recipe Identifiers
//!
//! A unique recipe is known internally by its [`RecipeId`] (the ledger key)
//! and externally by a [`RecipeKey`]: `<namespace>:<prefix><id>`.
//!
//! The prefix convention lives only here. Notifications from the host carry a
//! [`RecipeKey`]; [`KeyScheme::resolve`] turns it into a [`RecipeId`] once, at
//! the boundary, and the rest of the crate never looks at the raw key again.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default reserved prefix for registered recipe keys.
pub const DEFAULT_KEY_PREFIX: &str = "unique_craft_";

/// Default registration namespace.
pub const DEFAULT_NAMESPACE: &str = "uniquecrafts";

/// Stable name of a unique-craft definition.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(String);

impl RecipeId {
    /// Creates an identifier from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RecipeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecipeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecipeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Namespaced key under which a recipe is registered with the host.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecipeKey {
    /// Owner of the recipe (this plugin, or another source).
    pub namespace: String,
    /// Key within the namespace.
    pub key: String,
}

impl RecipeKey {
    /// Creates a key.
    #[must_use]
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for RecipeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

/// The namespacing contract between this registry and the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyScheme {
    namespace: String,
    prefix: String,
}

impl Default for KeyScheme {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE, DEFAULT_KEY_PREFIX)
    }
}

impl KeyScheme {
    /// Creates a scheme. The namespace is lowercased, as hosts key on it.
    #[must_use]
    pub fn new(namespace: &str, prefix: impl Into<String>) -> Self {
        Self {
            namespace: namespace.to_lowercase(),
            prefix: prefix.into(),
        }
    }

    /// Namespace owned by this registry.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Reserved key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Builds the host key for a recipe.
    #[must_use]
    pub fn key_for(&self, id: &RecipeId) -> RecipeKey {
        RecipeKey::new(self.namespace.clone(), format!("{}{}", self.prefix, id))
    }

    /// Resolves a host key back to a recipe identifier.
    ///
    /// Returns `None` for keys that do not carry the reserved prefix, or
    /// whose identifier part is empty. The namespace is not checked: the
    /// prefix alone marks an artifact as ours.
    #[must_use]
    pub fn resolve(&self, key: &RecipeKey) -> Option<RecipeId> {
        key.key
            .strip_prefix(self.prefix.as_str())
            .filter(|id| !id.is_empty())
            .map(RecipeId::from)
    }

    /// Returns true if the key belongs to this registry's namespace.
    #[must_use]
    pub fn owns(&self, key: &RecipeKey) -> bool {
        key.namespace == self.namespace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        let scheme = KeyScheme::default();
        let id = RecipeId::from("golden_sword");
        let key = scheme.key_for(&id);

        assert_eq!(key.to_string(), "uniquecrafts:unique_craft_golden_sword");
        assert_eq!(scheme.resolve(&key), Some(id));
        assert!(scheme.owns(&key));
    }

    #[test]
    fn test_foreign_keys_are_ignored() {
        let scheme = KeyScheme::default();

        assert_eq!(scheme.resolve(&RecipeKey::new("minecraft", "golden_sword")), None);
        assert_eq!(scheme.resolve(&RecipeKey::new("uniquecrafts", "unique_craft_")), None);
        assert!(!scheme.owns(&RecipeKey::new("minecraft", "unique_craft_x")));
    }

    #[test]
    fn test_namespace_is_lowercased() {
        let scheme = KeyScheme::new("UniqueCrafts", "uc_");
        assert_eq!(scheme.namespace(), "uniquecrafts");
        assert_eq!(scheme.key_for(&"a".into()).key, "uc_a");
    }
}
