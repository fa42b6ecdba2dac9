//! # Host Boundary
//!
//! Traits through which the registry talks to the hosting game server.
//!
//! ```text
//!   Host crafting UI ──> PrepareCraft ──┐
//!                                       ├──> CraftingInterceptor ──> Guard / Ledger
//!   Host crafting UI ──> CompleteCraft ─┘            │
//!                                                    ▼
//!                                 Party::send_message / CraftingHost::broadcast
//! ```
//!
//! Nothing in the core depends on a concrete server. Integrations implement
//! these traits; tests use in-memory doubles.

use crate::error::CraftError;
use crate::id::RecipeKey;
use crate::item::{ItemSpec, Material};

/// A player or console that can receive messages.
pub trait Party {
    /// Display name, substituted for `%player%`.
    fn name(&self) -> &str;

    /// Sends a chat message to this party.
    fn send_message(&self, message: &str);

    /// Returns true if the party holds `permission`.
    fn has_permission(&self, _permission: &str) -> bool {
        false
    }
}

/// Answers whether a material name exists on the host.
pub trait MaterialLookup {
    /// Returns true if `material` is a valid host material.
    fn is_known(&self, material: &Material) -> bool;
}

/// Accepts every syntactically valid material. Used by offline tooling.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyMaterial;

impl MaterialLookup for AnyMaterial {
    fn is_known(&self, _material: &Material) -> bool {
        true
    }
}

/// A shaped recipe handed to the host for registration.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapedRegistration {
    /// Namespaced key, `<namespace>:<prefix><id>`.
    pub key: RecipeKey,
    /// Three rows of symbols; space is an empty slot.
    pub shape: [String; 3],
    /// Symbol → ingredient material.
    pub ingredients: Vec<(char, Material)>,
    /// Produced item.
    pub result: ItemSpec,
}

/// The host crafting subsystem and server-wide chat.
pub trait CraftingHost: MaterialLookup {
    /// Registers a shaped recipe.
    ///
    /// # Errors
    ///
    /// `DuplicateRecipe` or `RegistrationRejected` when the host refuses it.
    fn register_recipe(&self, recipe: &ShapedRegistration) -> Result<(), CraftError>;

    /// Removes every recipe registered under `namespace`, leaving other
    /// sources untouched. Returns the number removed.
    fn unregister_namespace(&self, namespace: &str) -> usize;

    /// Keys of every shaped recipe currently registered, from all sources.
    fn registered_keys(&self) -> Vec<RecipeKey>;

    /// Sends a message to every connected party.
    fn broadcast(&self, message: &str);
}

impl MaterialLookup for &dyn CraftingHost {
    fn is_known(&self, material: &Material) -> bool {
        (**self).is_known(material)
    }
}

/// Fired when the crafting grid changes and the host has matched a recipe.
pub trait PrepareCraft {
    /// Key of the tentatively matched recipe, if any.
    fn recipe_key(&self) -> Option<&RecipeKey>;

    /// First party viewing the crafting UI.
    fn first_viewer(&self) -> Option<&dyn Party>;

    /// Clears the previewed result so it cannot be taken.
    fn withhold_result(&mut self);
}

/// Fired when a party withdraws the crafted result.
pub trait CompleteCraft {
    /// Key of the recipe being completed, if any.
    fn recipe_key(&self) -> Option<&RecipeKey>;

    /// Party that triggered completion.
    fn actor(&self) -> &dyn Party;

    /// Cancels the transaction; the item is not delivered.
    fn cancel(&mut self);
}
