//! Capacity-bounded token roster with merge-on-duplicate upserts.
//!
//! Invariants:
//! - at most one record per mint
//! - a genuinely new mint is inserted at the front
//! - an update to a known mint merges in place and never moves it
//! - the capacity cap is enforced only on insertion of a new mint

use mintwatch_core::TokenRecord;
use parking_lot::RwLock;
use tracing::debug;

/// Default roster capacity.
pub const DEFAULT_CAPACITY: usize = 50;

/// Ordered, deduplicated, capacity-bounded collection of token records.
///
/// Interior locking so the roster can be shared behind an `Arc` between
/// the feed path, the manual lookup path, and the display layer. All
/// mutation goes through `upsert`.
pub struct TokenRoster {
    capacity: usize,
    tokens: RwLock<Vec<TokenRecord>>,
}

impl TokenRoster {
    /// Create a roster with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            tokens: RwLock::new(Vec::new()),
        }
    }

    /// Create a roster with the default capacity of 50.
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Insert a new record or merge into an existing one.
    ///
    /// Unseen mint: insert at the front, then truncate the tail down to
    /// capacity. Known mint: shallow-merge in place, position unchanged.
    pub fn upsert(&self, record: TokenRecord) {
        let mut tokens = self.tokens.write();

        if let Some(existing) = tokens.iter_mut().find(|t| t.mint == record.mint) {
            existing.merge(record);
            return;
        }

        debug!(mint = %record.mint, "New token inserted");
        tokens.insert(0, record);
        if tokens.len() > self.capacity {
            tokens.truncate(self.capacity);
        }
    }

    /// Full ordered sequence, newest-first, for display.
    pub fn snapshot(&self) -> Vec<TokenRecord> {
        self.tokens.read().clone()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.read().is_empty()
    }

    /// Check whether a mint is currently present.
    pub fn contains(&self, mint: &str) -> bool {
        self.tokens.read().iter().any(|t| t.mint == mint)
    }
}

impl Default for TokenRoster {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}
