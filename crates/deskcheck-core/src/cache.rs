//! In-memory price cache keyed by `(symbol, date)`.

use std::collections::HashMap;
use std::sync::Arc;

use time::Date;

use crate::{PriceQuote, Symbol};

/// Thread-safe close-price cache.
///
/// Only successful fetches are stored. Inserts are idempotent: two workers
/// racing to cache the same `(symbol, date)` write interchangeable values,
/// so either writer winning is safe. Owned by an engine instance, never
/// process-global.
#[derive(Debug, Clone, Default)]
pub struct PriceCache {
    inner: Arc<tokio::sync::RwLock<HashMap<(Symbol, Date), PriceQuote>>>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached close price.
    pub async fn get(&self, symbol: &Symbol, date: Date) -> Option<PriceQuote> {
        let map = self.inner.read().await;
        map.get(&(symbol.clone(), date)).cloned()
    }

    /// Cache a successful fetch.
    pub async fn put(&self, symbol: Symbol, date: Date, quote: PriceQuote) {
        let mut map = self.inner.write().await;
        map.insert((symbol, date), quote);
    }

    pub async fn len(&self) -> usize {
        let map = self.inner.read().await;
        map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let mut map = self.inner.write().await;
        map.clear();
    }
}
