//! Marketplace operations on top of the store and the query cache.
//!
//! Reads are cached under a [`QueryKey`]; writes go straight to the store and,
//! only when the store accepts them, invalidate the keys listed in
//! [`invalidation`].

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::CacheSettings;
use crate::query::{Cached, Invalidate, PollHandle, QueryClient, QueryKey, QueryOptions};
use crate::store::{MarketplaceStore, StoreResult};

mod admin;
pub mod invalidation;
mod listings;
mod profiles;

/// Client-side facade over one remote marketplace.
#[derive(Clone)]
pub struct Marketplace {
    store: Arc<dyn MarketplaceStore>,
    queries: QueryClient,
    cache: CacheSettings,
}

impl Marketplace {
    /// Create a marketplace client with its own query cache
    pub fn new(store: Arc<dyn MarketplaceStore>, cache: CacheSettings) -> Self {
        Self::with_client(store, QueryClient::new(), cache)
    }

    /// Create a marketplace client sharing an existing query cache
    pub fn with_client(
        store: Arc<dyn MarketplaceStore>,
        queries: QueryClient,
        cache: CacheSettings,
    ) -> Self {
        info!(store = store.store_name(), "Marketplace client ready");
        Self {
            store,
            queries,
            cache,
        }
    }

    /// The cache backing this client, for snapshots and manual invalidation
    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    fn options_for(&self, key: &QueryKey) -> QueryOptions {
        if key.is_live() {
            QueryOptions::fresh_for(self.cache.live_stale_time)
        } else {
            QueryOptions::fresh_for(self.cache.stale_time)
        }
    }

    async fn read<T, F, Fut>(&self, key: QueryKey, fetch: F) -> StoreResult<T>
    where
        T: Cached,
        F: FnOnce(Arc<dyn MarketplaceStore>) -> Fut,
        Fut: Future<Output = StoreResult<T>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let options = self.options_for(&key);
        self.queries.query(key, options, move || fetch(store)).await
    }

    fn watch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> PollHandle
    where
        T: Cached,
        F: Fn(Arc<dyn MarketplaceStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StoreResult<T>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let options = self.options_for(&key);
        info!(%key, interval = ?self.cache.live_refetch_interval, "Polling");
        self.queries.poll(key, options, self.cache.live_refetch_interval, move || {
            fetch(Arc::clone(&store))
        })
    }

    /// Invalidate `targets` when the store accepted the write; leave the cache
    /// alone otherwise.
    fn settle<T>(&self, op: &'static str, result: StoreResult<T>, targets: &[Invalidate]) -> StoreResult<T> {
        match result {
            Ok(value) => {
                let touched = self.queries.invalidate(targets);
                info!(op, touched, "Mutation applied");
                Ok(value)
            }
            Err(err) => {
                warn!(op, error = %err, "Mutation failed, cache untouched");
                Err(err)
            }
        }
    }
}
