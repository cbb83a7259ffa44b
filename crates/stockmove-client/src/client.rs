//! Cached, cancellable stock client.
//!
//! `fetch` never fails: a transport or parse failure degrades to an empty
//! snapshot so the form keeps working without stock data. Successful
//! snapshots are cached for the life of the process and never invalidated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use stockmove_core::snapshot::StockSnapshot;
use tokio_util::sync::CancellationToken;

use crate::lookup::StockLookup;

/// Result of [`StockClient::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Snapshot for the requested product, possibly empty.
    Resolved(Arc<StockSnapshot>),
    /// The request was superseded before it produced a result.
    Cancelled,
}

impl FetchOutcome {
    pub fn snapshot(&self) -> Option<&Arc<StockSnapshot>> {
        match self {
            Self::Resolved(snapshot) => Some(snapshot),
            Self::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Stock client shared by every refresh of the form.
pub struct StockClient {
    lookup: Arc<dyn StockLookup>,
    cache: Mutex<HashMap<String, Arc<StockSnapshot>>>,
}

impl StockClient {
    pub fn new(lookup: Arc<dyn StockLookup>) -> Self {
        Self {
            lookup,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the snapshot for `product_id`.
    ///
    /// - blank id: empty snapshot, no request
    /// - cancelled token: `Cancelled`, no request
    /// - cache hit: cached snapshot, no request
    /// - otherwise one lookup, raced against `cancel`; dropping the lookup
    ///   abandons the request and nothing is cached
    pub async fn fetch(&self, product_id: &str, cancel: &CancellationToken) -> FetchOutcome {
        if product_id.trim().is_empty() {
            return FetchOutcome::Resolved(Arc::new(StockSnapshot::empty(product_id)));
        }
        if cancel.is_cancelled() {
            return FetchOutcome::Cancelled;
        }
        if let Some(hit) = self.cached(product_id) {
            tracing::debug!(product_id, "stock cache hit");
            return FetchOutcome::Resolved(hit);
        }

        tracing::debug!(product_id, "stock lookup started");
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(product_id, "stock lookup cancelled");
                return FetchOutcome::Cancelled;
            }
            result = self.lookup.lookup(product_id) => result,
        };

        match result {
            Ok(rows) => {
                let snapshot = Arc::new(StockSnapshot::new(product_id, rows));
                tracing::debug!(
                    product_id,
                    locations = snapshot.rows().len(),
                    "stock lookup resolved"
                );
                self.store(snapshot.clone());
                FetchOutcome::Resolved(snapshot)
            }
            Err(err) => {
                tracing::warn!(
                    product_id,
                    error = %err,
                    retryable = err.is_retryable(),
                    "stock lookup failed; using empty snapshot"
                );
                FetchOutcome::Resolved(Arc::new(StockSnapshot::empty(product_id)))
            }
        }
    }

    /// Cached snapshot for `product_id`, if any.
    pub fn cached(&self, product_id: &str) -> Option<Arc<StockSnapshot>> {
        match self.cache.lock() {
            Ok(guard) => guard.get(product_id).cloned(),
            Err(poisoned) => poisoned.into_inner().get(product_id).cloned(),
        }
    }

    /// Seed the cache, e.g. with stock rendered into the page by the server.
    pub fn prime(&self, snapshot: StockSnapshot) {
        self.store(Arc::new(snapshot));
    }

    pub fn cache_len(&self) -> usize {
        match self.cache.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn store(&self, snapshot: Arc<StockSnapshot>) {
        let key = snapshot.product_id().to_string();
        match self.cache.lock() {
            Ok(mut guard) => {
                guard.insert(key, snapshot);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(key, snapshot);
            }
        }
    }
}
