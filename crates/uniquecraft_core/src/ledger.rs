//! # Crafted Ledger
//!
//! Durable record of which recipes have been produced.
//!
//! The ledger owns the in-memory copy of the crafts document. Claims and
//! releases edit that copy; [`CraftedLedger::flush_all`] writes it out.
//!
//! ## Guarantees
//!
//! 1. **Durability**: once `flush_all()` returns `Ok`, the flag is on disk
//! 2. **Atomic writes**: the document is replaced via rename, never torn
//! 3. **Bounded flush**: a failing flush retries a fixed number of times,
//!    then returns the error; it never blocks indefinitely
//!
//! A crash between a claim and its flush loses that claim. The recipe can then
//! be claimed again after restart.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use toml::Table;
use tracing::{debug, error, info, warn};

use crate::config::PersistenceConfig;
use crate::error::CraftResult;
use crate::id::RecipeId;
use crate::store::CraftsDocument;

/// Identifier → produced flag, as read from the durable store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    flags: BTreeMap<RecipeId, bool>,
}

impl LedgerSnapshot {
    /// Wraps a flag map.
    #[must_use]
    pub fn new(flags: BTreeMap<RecipeId, bool>) -> Self {
        Self { flags }
    }

    /// Identifiers flagged as produced.
    pub fn produced(&self) -> impl Iterator<Item = &RecipeId> {
        self.flags
            .iter()
            .filter_map(|(id, &flag)| flag.then_some(id))
    }

    /// Flag for `id`; absent means not produced.
    #[must_use]
    pub fn is_produced(&self, id: &str) -> bool {
        self.flags.get(id).copied().unwrap_or(false)
    }

    /// Number of entries, including false ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FromIterator<(RecipeId, bool)> for LedgerSnapshot {
    fn from_iter<I: IntoIterator<Item = (RecipeId, bool)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

struct LedgerState {
    document: CraftsDocument,
    dirty: bool,
}

/// File-backed crafted ledger.
pub struct CraftedLedger {
    path: PathBuf,
    policy: PersistenceConfig,
    state: Mutex<LedgerState>,
}

impl CraftedLedger {
    /// Creates a ledger for the document at `path`. Nothing is read until
    /// [`load`](Self::load).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, policy: PersistenceConfig) -> Self {
        Self {
            path: path.into(),
            policy,
            state: Mutex::new(LedgerState {
                document: CraftsDocument::default(),
                dirty: false,
            }),
        }
    }

    /// Path of the durable store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the durable store and returns every crafted flag.
    ///
    /// Unflushed in-memory edits are discarded. A missing store is an empty
    /// snapshot.
    ///
    /// # Errors
    ///
    /// `Io` or `Parse` if the store exists but cannot be read. The previous
    /// in-memory document is kept in that case.
    pub fn load(&self) -> CraftResult<LedgerSnapshot> {
        // Read under the state lock so no flush lands between read and swap.
        let mut state = self.state.lock();
        let document = CraftsDocument::read(&self.path)?;
        let snapshot = LedgerSnapshot::new(document.crafted_flags());

        if state.dirty {
            warn!("discarding unflushed ledger changes on reload");
        }
        state.document = document;
        state.dirty = false;
        drop(state);

        info!(
            "ledger loaded from {}: {} recipes already crafted",
            self.path.display(),
            snapshot.produced().count()
        );
        Ok(snapshot)
    }

    /// The recipe definitions section of the last loaded document.
    #[must_use]
    pub fn recipes_section(&self) -> Option<Table> {
        self.state.lock().document.crafts().cloned()
    }

    /// Records that `id` has been produced. Durable after [`flush_all`](Self::flush_all).
    pub fn persist_claim(&self, id: &RecipeId) {
        let mut state = self.state.lock();
        state.document.mark_crafted(id);
        state.dirty = true;
        debug!("ledger: {id} marked crafted");
    }

    /// Clears the produced flag for `id`. Durable after [`flush_all`](Self::flush_all).
    pub fn persist_release(&self, id: &RecipeId) {
        let mut state = self.state.lock();
        if state.document.clear_crafted(id) {
            state.dirty = true;
            debug!("ledger: {id} cleared");
        }
    }

    /// Writes pending changes to the durable store.
    ///
    /// Retries up to `flush_attempts` times with `flush_backoff_ms` between
    /// attempts. Holds the ledger lock for the duration so flushes land in
    /// order.
    ///
    /// # Errors
    ///
    /// The last write error once all attempts are exhausted. The changes stay
    /// pending and are retried by the next flush.
    pub fn flush_all(&self) -> CraftResult<()> {
        let mut state = self.state.lock();
        if !state.dirty {
            return Ok(());
        }

        let attempts = self.policy.flush_attempts.max(1);
        let mut attempt = 1;
        loop {
            match state.document.write_atomic(&self.path) {
                Ok(()) => {
                    state.dirty = false;
                    debug!("ledger flushed to {}", self.path.display());
                    return Ok(());
                }
                Err(e) if attempt < attempts => {
                    warn!("ledger flush attempt {attempt}/{attempts} failed: {e}");
                    attempt += 1;
                    std::thread::sleep(self.policy.backoff());
                }
                Err(e) => {
                    error!("ledger flush failed after {attempts} attempts: {e}");
                    return Err(e);
                }
            }
        }
    }

    /// Returns true if there are changes not yet written.
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        self.state.lock().dirty
    }
}
