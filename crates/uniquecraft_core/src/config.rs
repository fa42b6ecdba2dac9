//! # Plugin Configuration
//!
//! Loaded once from `uniquecraft.toml`. Every field has a default, so a
//! missing file or a partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CraftError, CraftResult};
use crate::id::{KeyScheme, DEFAULT_KEY_PREFIX, DEFAULT_NAMESPACE};
use crate::item::translate_color_codes;

/// Placeholder replaced by the acting party's name in broadcast templates.
pub const PLAYER_PLACEHOLDER: &str = "%player%";

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniqueCraftConfig {
    /// Path of the crafts document (recipes plus crafted flags).
    pub store_path: PathBuf,
    /// Host namespace recipes are registered under.
    pub namespace: String,
    /// Reserved key prefix marking our recipes.
    pub key_prefix: String,
    /// Player-facing messages.
    pub messages: Messages,
    /// Durable store flush policy.
    pub persistence: PersistenceConfig,
}

impl Default for UniqueCraftConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("crafts.toml"),
            namespace: DEFAULT_NAMESPACE.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            messages: Messages::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl UniqueCraftConfig {
    /// Loads the configuration, falling back to defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file exists but cannot be read, `Parse` if it is
    /// not valid TOML for this schema.
    pub fn load(path: impl AsRef<Path>) -> CraftResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| CraftError::io(path, e))?;
        Self::from_toml_str(&text).map_err(|source| CraftError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error for malformed input.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// The key scheme derived from `namespace` and `key_prefix`.
    #[must_use]
    pub fn key_scheme(&self) -> KeyScheme {
        KeyScheme::new(&self.namespace, self.key_prefix.clone())
    }
}

/// Player-facing message templates. `&` color codes are allowed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Sent when a recipe is withheld or a completion is rejected.
    pub already_crafted: String,
    /// Sent to the party whose claim succeeded.
    pub claim_success: String,
    /// Broadcast used when a recipe has no message of its own.
    pub default_broadcast: String,
    /// Reply to a successful reload.
    pub reloaded: String,
    /// Reply when the sender lacks a permission.
    pub no_permission: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            already_crafted: "&cThis item has already been crafted on the server!".to_string(),
            claim_success: "&aYou crafted a unique item!".to_string(),
            default_broadcast: "&aThe unique item has been crafted by %player%!".to_string(),
            reloaded: "&aConfiguration reloaded!".to_string(),
            no_permission: "&cYou do not have permission!".to_string(),
        }
    }
}

/// Renders a template: substitutes `%player%` and translates color codes.
#[must_use]
pub fn render_template(template: &str, player: &str) -> String {
    translate_color_codes(&template.replace(PLAYER_PLACEHOLDER, player))
}

/// Flush retry policy for the durable store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Attempts per flush before giving up. Zero is treated as one.
    pub flush_attempts: u32,
    /// Pause between attempts, in milliseconds.
    pub flush_backoff_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            flush_attempts: 3,
            flush_backoff_ms: 25,
        }
    }
}

impl PersistenceConfig {
    /// Pause between attempts.
    #[must_use]
    pub const fn backoff(&self) -> Duration {
        Duration::from_millis(self.flush_backoff_ms)
    }
}
