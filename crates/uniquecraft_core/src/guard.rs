//! # Uniqueness Guard
//!
//! **The in-memory authority over claim state.**
//!
//! Holds the set of recipe identifiers already produced and serializes every
//! change to it behind one lock.
//!
//! ## Guarantees
//!
//! 1. **Exactly once**: for any identifier, concurrent [`try_claim`] calls
//!    yield exactly one `true` until the identifier is released
//! 2. **Cheap reads**: [`is_available`] takes a shared lock, so the pre-check
//!    path never waits on other readers
//! 3. **Cache of the ledger**: after [`reload`], the set equals the ledger
//!    entries flagged true, whatever the set held before
//!
//! The guard has no notion of which identifiers are legitimate. Unknown
//! identifiers are simply available.
//!
//! ## Lifecycle
//!
//! ```text
//! new() ──> reload(snapshot) ──> { is_available / try_claim / release }* ──> reload(snapshot) ...
//! ```
//!
//! [`try_claim`]: UniquenessGuard::try_claim
//! [`is_available`]: UniquenessGuard::is_available
//! [`reload`]: UniquenessGuard::reload

use std::collections::HashSet;

use parking_lot::RwLock;
use tracing::debug;

use crate::id::RecipeId;
use crate::ledger::LedgerSnapshot;

/// Global crafted set with an atomic check-and-claim.
#[derive(Debug, Default)]
pub struct UniquenessGuard {
    crafted: RwLock<HashSet<RecipeId>>,
}

impl UniquenessGuard {
    /// Creates a guard with nothing claimed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a guard mirroring a ledger snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Self {
        let guard = Self::new();
        guard.reload(snapshot);
        guard
    }

    /// Returns true if `id` has not been claimed. No side effects.
    #[inline]
    #[must_use]
    pub fn is_available(&self, id: &str) -> bool {
        !self.crafted.read().contains(id)
    }

    /// Claims `id` if nobody has yet.
    ///
    /// **ATOMIC**: the membership test and the insert happen under one write
    /// lock. Returns `true` if this call claimed the identifier, `false` if it
    /// was already claimed (state unchanged).
    #[must_use]
    pub fn try_claim(&self, id: &RecipeId) -> bool {
        let mut crafted = self.crafted.write();
        if crafted.contains(id.as_str()) {
            return false;
        }
        crafted.insert(id.clone())
    }

    /// Makes `id` available again. Releasing an unclaimed identifier is a no-op.
    ///
    /// Returns true if the identifier was claimed before the call.
    pub fn release(&self, id: &str) -> bool {
        let removed = self.crafted.write().remove(id);
        if removed {
            debug!("guard: {id} released");
        }
        removed
    }

    /// Replaces the crafted set with the identifiers flagged true in `snapshot`.
    pub fn reload(&self, snapshot: &LedgerSnapshot) {
        let fresh: HashSet<RecipeId> = snapshot.produced().cloned().collect();
        let count = fresh.len();
        *self.crafted.write() = fresh;
        debug!("guard reloaded with {count} crafted recipes");
    }

    /// Number of claimed identifiers.
    #[must_use]
    pub fn claimed_count(&self) -> usize {
        self.crafted.read().len()
    }

    /// Sorted copy of the claimed identifiers.
    #[must_use]
    pub fn claimed(&self) -> Vec<RecipeId> {
        let mut ids: Vec<RecipeId> = self.crafted.read().iter().cloned().collect();
        ids.sort();
        ids
    }
}
