//! # UniqueCraft Error Types
//!
//! All errors that can occur in the craft-once registry.
//!
//! Configuration errors are scoped to a single recipe: the loader logs them
//! and moves on to the next entry. Persistence errors are surfaced to the
//! caller, which logs them and keeps the in-memory claim.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the craft-once registry.
#[derive(Error, Debug)]
pub enum CraftError {
    /// A required recipe field is absent.
    #[error("recipe {recipe}: missing field `{field}`")]
    MissingField {
        /// Recipe the field belongs to.
        recipe: String,
        /// Dotted path of the missing field.
        field: &'static str,
    },

    /// The recipe section could not be read as a recipe.
    #[error("recipe {recipe}: malformed section: {reason}")]
    MalformedRecipe {
        /// Recipe identifier.
        recipe: String,
        /// Deserializer message.
        reason: String,
    },

    /// The shape is not three rows of one to three symbols.
    #[error("recipe {recipe}: invalid shape: {reason}")]
    InvalidShape {
        /// Recipe identifier.
        recipe: String,
        /// What is wrong with the shape.
        reason: String,
    },

    /// The shape uses a symbol with no ingredient mapping.
    #[error("recipe {recipe}: shape symbol '{symbol}' has no ingredient")]
    UnknownSymbol {
        /// Recipe identifier.
        recipe: String,
        /// The unmapped symbol.
        symbol: char,
    },

    /// A material name is not known to the host.
    #[error("recipe {recipe}: unknown material `{material}`")]
    UnknownMaterial {
        /// Recipe identifier.
        recipe: String,
        /// The material as written.
        material: String,
    },

    /// An enchantment name is not recognized.
    #[error("recipe {recipe}: unknown enchantment `{enchantment}`")]
    UnknownEnchantment {
        /// Recipe identifier.
        recipe: String,
        /// The enchantment as written.
        enchantment: String,
    },

    /// An attribute name is not recognized.
    #[error("recipe {recipe}: unknown attribute `{attribute}`")]
    UnknownAttribute {
        /// Recipe identifier.
        recipe: String,
        /// The attribute as written.
        attribute: String,
    },

    /// Result amount outside `1..=64`.
    #[error("recipe {recipe}: amount {amount} out of range 1..=64")]
    InvalidAmount {
        /// Recipe identifier.
        recipe: String,
        /// The configured amount.
        amount: i64,
    },

    /// Enchantment level outside `1..=255`.
    #[error("recipe {recipe}: enchantment {enchantment} level {level} out of range 1..=255")]
    InvalidLevel {
        /// Recipe identifier.
        recipe: String,
        /// Enchantment the level belongs to.
        enchantment: String,
        /// The configured level.
        level: i64,
    },

    /// The host already has a recipe under this key.
    #[error("recipe {0} is already registered")]
    DuplicateRecipe(String),

    /// The host refused the recipe.
    #[error("host rejected recipe {recipe}: {reason}")]
    RegistrationRejected {
        /// Recipe identifier.
        recipe: String,
        /// Host-supplied reason.
        reason: String,
    },

    /// Filesystem failure on the durable store or config.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },

    /// The document could not be rendered back to TOML.
    #[error("failed to serialize crafts document: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl CraftError {
    /// Wraps an I/O error with the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors that only invalidate a single recipe.
    #[must_use]
    pub fn is_recipe_scoped(&self) -> bool {
        !matches!(self, Self::Io { .. } | Self::Parse { .. } | Self::Serialize(_))
    }
}

/// Result type for craft registry operations.
pub type CraftResult<T> = Result<T, CraftError>;
