//! # Views State
//!
//! The in-memory copy of everything the screens display: products, sales,
//! purchases and the shop profile. Commands read derived views (ledger,
//! reports, catalog filters) from here; writes go to the database and are
//! followed by a reload.
//!
//! Reads vastly outnumber reloads, so this is an `RwLock` rather than the
//! `Mutex` billing uses.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use kade_core::{Product, ShopProfile};
use kade_db::Snapshot;

#[derive(Debug, Default)]
pub struct ViewsState {
    snapshot: RwLock<Snapshot>,
    loaded: AtomicBool,
}

impl ViewsState {
    /// Empty views; nothing is shown until the first successful load.
    pub fn new() -> Self {
        ViewsState::default()
    }

    /// Executes a function with read access to the snapshot.
    pub fn with_snapshot<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Snapshot) -> R,
    {
        let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        f(&snapshot)
    }

    /// Swaps in a freshly loaded snapshot.
    pub fn replace(&self, snapshot: Snapshot) {
        let mut current = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        *current = snapshot;
        self.loaded.store(true, Ordering::Release);
    }

    /// Whether any load has succeeded yet.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub fn product(&self, id: &str) -> Option<Product> {
        self.with_snapshot(|s| s.products.iter().find(|p| p.id == id).cloned())
    }

    pub fn profile(&self) -> ShopProfile {
        self.with_snapshot(|s| s.profile.clone())
    }
}
