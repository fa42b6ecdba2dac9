//! # UniqueCraft Core
//!
//! Craft-once recipe registry for a hosting game server.
//!
//! ## Design Principles
//!
//! 1. **Exactly once** - a recipe is claimed by one completion, ever, until reset
//! 2. **Durable store is truth** - the in-memory set is rebuilt from it on every load
//! 3. **Never freeze the server** - persistence failures are logged, not fatal
//! 4. **External configuration** - recipes and flags live in one TOML document
//!
//! ## Thread Safety
//!
//! [`UniquenessGuard::try_claim`] is safe to call from any number of threads.
//! Everything else takes `&self` and synchronizes internally.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use uniquecraft_core::{CraftRegistry, CraftingInterceptor, UniqueCraftConfig};
//!
//! let config = UniqueCraftConfig::load("uniquecraft.toml")?;
//! let (registry, _report) = CraftRegistry::open(config, &host)?;
//! let interceptor = CraftingInterceptor::new(Arc::new(registry));
//!
//! // Host callbacks
//! interceptor.on_prepare(&mut prepare_event);
//! interceptor.on_complete(&mut complete_event, &host);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod catalogue;
pub mod config;
pub mod error;
pub mod guard;
pub mod host;
pub mod id;
pub mod interceptor;
pub mod item;
pub mod ledger;
pub mod registry;
pub mod store;

pub use catalogue::{Catalogue, CatalogueLoad, RecipeDefinition};
pub use config::{Messages, PersistenceConfig, UniqueCraftConfig};
pub use error::{CraftError, CraftResult};
pub use guard::UniquenessGuard;
pub use host::{
    AnyMaterial, CompleteCraft, CraftingHost, MaterialLookup, Party, PrepareCraft,
    ShapedRegistration,
};
pub use id::{KeyScheme, RecipeId, RecipeKey};
pub use interceptor::{CompletionOutcome, CraftingInterceptor, PrepareOutcome};
pub use item::{Attribute, Enchantment, EquipmentSlot, ItemFlag, ItemSpec, Material};
pub use ledger::{CraftedLedger, LedgerSnapshot};
pub use registry::{ClaimOutcome, CraftRegistry, LoadReport, RecipeStatus, ResetOutcome};
