//! # Crafting Interceptor
//!
//! **Two-phase gate between the host crafting UI and the guard.**
//!
//! ```text
//! grid changes ──> on_prepare()  ──> is_available? ── no ──> withhold result, tell viewer
//!                                          └── yes ─> leave preview alone
//!
//! result taken ──> on_complete() ──> try_claim ── lost ──> cancel, tell actor
//!                                        └── won ──> persist + flush ──> confirm + broadcast
//! ```
//!
//! The pre-check is advisory: two players can both see a preview. Only the
//! claim at completion decides who gets the item.
//!
//! Keys without the reserved prefix, and identifiers missing from the current
//! catalogue, pass through untouched.

use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::catalogue::Catalogue;
use crate::config::render_template;
use crate::host::{CompleteCraft, CraftingHost, PrepareCraft};
use crate::id::{RecipeId, RecipeKey};
use crate::registry::{ClaimOutcome, CraftRegistry};

/// What the pre-check did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrepareOutcome {
    /// Not one of our recipes.
    Ignored,
    /// Recipe is available; preview shown as normal.
    Available,
    /// Recipe already crafted; result withheld.
    Withheld,
}

/// What the completion handler did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Not one of our recipes.
    Ignored,
    /// Someone else claimed it first; completion cancelled.
    Rejected,
    /// This completion claimed the recipe.
    Claimed {
        /// Whether the claim reached the durable store.
        persisted: bool,
    },
}

/// Handles crafting notifications from the host.
#[derive(Clone)]
pub struct CraftingInterceptor {
    registry: Arc<CraftRegistry>,
}

impl CraftingInterceptor {
    /// Creates an interceptor over `registry`.
    #[must_use]
    pub fn new(registry: Arc<CraftRegistry>) -> Self {
        Self { registry }
    }

    /// Resolves a host key to a recipe in the current catalogue.
    fn recognize(&self, key: Option<&RecipeKey>) -> Option<(RecipeId, Arc<Catalogue>)> {
        let key = key?;
        let Some(id) = self.registry.scheme().resolve(key) else {
            trace!("recipe {key} is not a unique craft");
            return None;
        };
        let catalogue = self.registry.catalogue();
        if !catalogue.contains(id.as_str()) {
            debug!("recipe {key} resolves to {id}, which is not in the catalogue");
            return None;
        }
        Some((id, catalogue))
    }

    /// Pre-check, run whenever the crafting grid is recomputed.
    pub fn on_prepare(&self, event: &mut dyn PrepareCraft) -> PrepareOutcome {
        let Some((id, _)) = self.recognize(event.recipe_key()) else {
            return PrepareOutcome::Ignored;
        };

        if self.registry.is_available(id.as_str()) {
            trace!("prepare {id}: available");
            return PrepareOutcome::Available;
        }

        event.withhold_result();
        if let Some(viewer) = event.first_viewer() {
            let messages = &self.registry.config().messages;
            viewer.send_message(&render_template(&messages.already_crafted, viewer.name()));
            debug!("prepare {id}: withheld from {}", viewer.name());
        }
        PrepareOutcome::Withheld
    }

    /// Completion, run when a party takes the crafted result.
    pub fn on_complete(
        &self,
        event: &mut dyn CompleteCraft,
        host: &dyn CraftingHost,
    ) -> CompletionOutcome {
        let Some((id, catalogue)) = self.recognize(event.recipe_key()) else {
            return CompletionOutcome::Ignored;
        };
        let messages = &self.registry.config().messages;

        match self.registry.claim(&id) {
            ClaimOutcome::AlreadyClaimed => {
                event.cancel();
                let actor = event.actor();
                actor.send_message(&render_template(&messages.already_crafted, actor.name()));
                info!("craft {id} by {} cancelled: already crafted", actor.name());
                CompletionOutcome::Rejected
            }
            ClaimOutcome::Claimed { persisted } => {
                let actor = event.actor();
                let announcement = match catalogue.get(id.as_str()) {
                    Some(recipe) => recipe.broadcast_message(actor.name(), &messages.default_broadcast),
                    None => render_template(&messages.default_broadcast, actor.name()),
                };
                host.broadcast(&announcement);
                actor.send_message(&render_template(&messages.claim_success, actor.name()));
                info!("craft {id} claimed by {}", actor.name());
                CompletionOutcome::Claimed { persisted }
            }
        }
    }

    /// The registry this interceptor consults.
    #[must_use]
    pub fn registry(&self) -> &Arc<CraftRegistry> {
        &self.registry
    }
}
