//! Tracked-Asset Registry
//!
//! Authoritative in-memory record of which assets are currently tracked and
//! the cancellation handle for each asset's collector task.
//!
//! # Invariants
//!
//! - At most one entry exists per symbol at any time.
//! - An entry exists exactly while a collector task for that symbol is
//!   running or in the process of starting.
//! - Every membership operation is a single atomic read-modify-write under
//!   one mutex; there is no check-then-act window for concurrent callers to
//!   interleave into.
//! - `remove` transfers ownership of the cancellation handle to its caller
//!   and never returns the same handle twice, which is what makes
//!   "cancel exactly once" structurally enforceable upstream.
//!
//! The mutex guards membership metadata alone. It is held only for O(1) map
//! operations and never across a network or disk call.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Registry mapping tracked symbols to their collector cancellation handles.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    entries: Mutex<HashMap<String, CancellationToken>>,
}

impl WatchRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Whether an entry currently exists for `symbol`.
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.lock().contains_key(symbol)
    }

    /// Atomically insert `symbol` iff absent.
    ///
    /// Returns `false` (and leaves the registry unchanged) when the symbol
    /// is already tracked.
    pub fn insert(&self, symbol: &str, cancel: CancellationToken) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(symbol) {
            return false;
        }
        entries.insert(symbol.to_string(), cancel);
        true
    }

    /// Atomically remove `symbol`, returning its cancellation handle.
    ///
    /// Returns `None` when the symbol is not tracked. The removal and the
    /// read of the handle happen under one lock acquisition, so a handle is
    /// handed out at most once across all callers.
    pub fn remove(&self, symbol: &str) -> Option<CancellationToken> {
        self.entries.lock().remove(symbol)
    }

    /// Number of tracked symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Snapshot of the tracked symbols.
    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }
}
