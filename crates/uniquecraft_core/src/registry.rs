//! # Craft Registry
//!
//! **The single owner of craft-once state.**
//!
//! Ties the catalogue, ledger and guard together and drives their shared
//! lifecycle. Every collaborator (interceptor, admin commands) receives an
//! `Arc<CraftRegistry>`; there is no global instance.
//!
//! ## Lifecycle
//!
//! ```text
//! open()   ──> seed store if missing ──> ledger.load() ──> catalogue ──> guard.reload() ──> register
//! reload() ──> flush ──> ledger.load() ──> catalogue ──> guard.reload() ──> unregister ns ──> register
//! claim()  ──> guard.try_claim() ──> ledger.persist_claim() ──> ledger.flush_all()
//! reset()  ──> guard.release() ──> ledger.persist_release() ──> ledger.flush_all()
//! shutdown() ──> ledger.flush_all()
//! ```
//!
//! ## Locking
//!
//! `transition` serializes every change to claim state: `try_claim` with
//! `persist_claim`, `release` with `persist_release`, and the ledger read
//! with `guard.reload`. Guard and ledger therefore never disagree once the
//! lock is released. `is_available` reads the guard only and never takes it.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::catalogue::Catalogue;
use crate::config::UniqueCraftConfig;
use crate::error::{CraftError, CraftResult};
use crate::guard::UniquenessGuard;
use crate::host::{CraftingHost, MaterialLookup};
use crate::id::{KeyScheme, RecipeId};
use crate::ledger::CraftedLedger;
use crate::store;

/// Summary of a load or reload.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Recipes that passed validation.
    pub loaded: usize,
    /// Recipes skipped for configuration errors.
    pub skipped: Vec<CraftError>,
    /// Recipes the host accepted.
    pub registered: usize,
    /// Recipes the host refused.
    pub rejected: Vec<CraftError>,
    /// Recipes already crafted according to the ledger.
    pub crafted: usize,
}

/// Result of a claim attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This call claimed the recipe.
    Claimed {
        /// Whether the claim reached the durable store.
        persisted: bool,
    },
    /// Someone claimed it first.
    AlreadyClaimed,
}

/// Result of an administrative reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The recipe was claimed and is now available.
    Released {
        /// Whether the release reached the durable store.
        persisted: bool,
    },
    /// The recipe was not claimed; nothing changed.
    NotClaimed,
}

/// Availability of one catalogue recipe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipeStatus {
    /// Recipe identifier.
    pub id: RecipeId,
    /// True if it can still be crafted.
    pub available: bool,
}

/// Owner of the catalogue, ledger and guard.
pub struct CraftRegistry {
    config: UniqueCraftConfig,
    scheme: KeyScheme,
    catalogue: RwLock<Arc<Catalogue>>,
    guard: UniquenessGuard,
    ledger: CraftedLedger,
    transition: Mutex<()>,
}

impl CraftRegistry {
    /// Creates an empty registry. Nothing is read until [`load`](Self::load).
    #[must_use]
    pub fn new(config: UniqueCraftConfig) -> Self {
        let scheme = config.key_scheme();
        let ledger = CraftedLedger::new(config.store_path.clone(), config.persistence.clone());
        Self {
            config,
            scheme,
            catalogue: RwLock::new(Arc::new(Catalogue::default())),
            guard: UniquenessGuard::new(),
            ledger,
            transition: Mutex::new(()),
        }
    }

    /// Creates a registry, seeding the store if missing, and registers every
    /// valid recipe with the host.
    ///
    /// # Errors
    ///
    /// `Io` or `Parse` if the store cannot be created or read.
    pub fn open(config: UniqueCraftConfig, host: &dyn CraftingHost) -> CraftResult<(Self, LoadReport)> {
        store::ensure_exists(&config.store_path)?;
        let registry = Self::new(config);
        let mut report = registry.load(&host)?;
        let (registered, rejected) = registry.register_all(host);
        report.registered = registered;
        report.rejected = rejected;
        info!(
            "unique crafts enabled: {} recipes registered, {} already crafted",
            report.registered, report.crafted
        );
        Ok((registry, report))
    }

    /// Reads the durable store and rebuilds catalogue and guard from it.
    ///
    /// Does not touch host registrations. On error the previous state is kept.
    ///
    /// # Errors
    ///
    /// `Io` or `Parse` if the store cannot be read.
    pub fn load(&self, materials: &dyn MaterialLookup) -> CraftResult<LoadReport> {
        let _transition = self.transition.lock();
        self.load_locked(materials)
    }

    fn load_locked(&self, materials: &dyn MaterialLookup) -> CraftResult<LoadReport> {
        let snapshot = self.ledger.load()?;
        let section = self.ledger.recipes_section();
        let load = Catalogue::from_section(section.as_ref(), materials);

        self.guard.reload(&snapshot);
        let loaded = load.catalogue.len();
        *self.catalogue.write() = Arc::new(load.catalogue);

        Ok(LoadReport {
            loaded,
            skipped: load.errors,
            crafted: self.guard.claimed_count(),
            ..LoadReport::default()
        })
    }

    /// Re-reads everything from the durable store and re-registers with the host.
    ///
    /// Pending ledger changes are flushed first. If that flush fails the
    /// reload is abandoned, since re-reading the store would forget them.
    ///
    /// # Errors
    ///
    /// The flush error, or `Io`/`Parse` if the store cannot be read.
    /// Claim state and registrations are left as they were in both cases.
    pub fn reload(&self, host: &dyn CraftingHost) -> CraftResult<LoadReport> {
        let mut report = {
            let _transition = self.transition.lock();
            if let Err(e) = self.ledger.flush_all() {
                warn!("reload abandoned, pending claims could not be saved: {e}");
                return Err(e);
            }
            self.load_locked(&host)?
        };

        let removed = host.unregister_namespace(self.scheme.namespace());
        info!("removed {removed} previously registered recipes");
        let (registered, rejected) = self.register_all(host);
        report.registered = registered;
        report.rejected = rejected;

        info!(
            "reload complete: {} loaded, {} skipped, {} registered, {} crafted",
            report.loaded,
            report.skipped.len(),
            report.registered,
            report.crafted
        );
        Ok(report)
    }

    /// Registers every catalogue recipe. Refusals are logged and collected.
    pub fn register_all(&self, host: &dyn CraftingHost) -> (usize, Vec<CraftError>) {
        let catalogue = self.catalogue();
        let mut registered = 0;
        let mut rejected = Vec::new();
        for recipe in catalogue.recipes() {
            let registration = recipe.registration(&self.scheme);
            match host.register_recipe(&registration) {
                Ok(()) => {
                    registered += 1;
                    info!("registered craft {} as {}", recipe.id, registration.key);
                }
                Err(e) => {
                    error!("failed to register craft {}: {e}", recipe.id);
                    rejected.push(e);
                }
            }
        }
        (registered, rejected)
    }

    /// Atomically claims `id` and persists the claim.
    ///
    /// A flush failure does not undo the claim: the item stands, and the
    /// flag is retried on the next flush.
    pub fn claim(&self, id: &RecipeId) -> ClaimOutcome {
        {
            let _transition = self.transition.lock();
            if !self.guard.try_claim(id) {
                return ClaimOutcome::AlreadyClaimed;
            }
            self.ledger.persist_claim(id);
        }
        let persisted = match self.ledger.flush_all() {
            Ok(()) => true,
            Err(e) => {
                error!("claim of {id} is held in memory only, flush failed: {e}");
                false
            }
        };
        ClaimOutcome::Claimed { persisted }
    }

    /// Makes `id` craftable again.
    pub fn reset(&self, id: &RecipeId) -> ResetOutcome {
        {
            let _transition = self.transition.lock();
            if !self.guard.release(id.as_str()) {
                return ResetOutcome::NotClaimed;
            }
            self.ledger.persist_release(id);
        }
        let persisted = match self.ledger.flush_all() {
            Ok(()) => true,
            Err(e) => {
                error!("reset of {id} is held in memory only, flush failed: {e}");
                false
            }
        };
        info!("craft {id} reset");
        ResetOutcome::Released { persisted }
    }

    /// Returns true if `id` has not been crafted.
    #[must_use]
    pub fn is_available(&self, id: &str) -> bool {
        self.guard.is_available(id)
    }

    /// Status of every catalogue recipe, in identifier order.
    #[must_use]
    pub fn statuses(&self) -> Vec<RecipeStatus> {
        self.catalogue()
            .ids()
            .map(|id| RecipeStatus {
                id: id.clone(),
                available: self.guard.is_available(id.as_str()),
            })
            .collect()
    }

    /// Flushes pending ledger changes. Call on graceful shutdown.
    ///
    /// # Errors
    ///
    /// The flush error once retries are exhausted.
    pub fn shutdown(&self) -> CraftResult<()> {
        self.ledger.flush_all()?;
        info!("unique crafts disabled, ledger saved");
        Ok(())
    }

    /// Current catalogue.
    #[must_use]
    pub fn catalogue(&self) -> Arc<Catalogue> {
        Arc::clone(&self.catalogue.read())
    }

    /// The guard.
    #[must_use]
    pub fn guard(&self) -> &UniquenessGuard {
        &self.guard
    }

    /// The ledger.
    #[must_use]
    pub fn ledger(&self) -> &CraftedLedger {
        &self.ledger
    }

    /// Key scheme used for host registration.
    #[must_use]
    pub fn scheme(&self) -> &KeyScheme {
        &self.scheme
    }

    /// Loaded configuration.
    #[must_use]
    pub fn config(&self) -> &UniqueCraftConfig {
        &self.config
    }
}
