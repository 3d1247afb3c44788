use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared, TryFutureExt};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::store::{StoreError, StoreResult};

use super::keys::{Cached, Invalidate, QueryKey, QueryValue};

type SharedFetch = Shared<BoxFuture<'static, StoreResult<QueryValue>>>;

/// Per-read cache policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a fetched value is served without going back to the store
    pub stale_time: Duration,
}

impl QueryOptions {
    pub fn fresh_for(stale_time: Duration) -> Self {
        Self { stale_time }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never fetched
    Idle,
    /// First fetch in flight, nothing to show yet
    Loading,
    Success,
    /// Last fetch failed; `data` may still hold an older value
    Error,
}

/// Point-in-time view of one cache key
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<StoreError>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub is_fetching: bool,
    pub is_stale: bool,
}

impl<T> QuerySnapshot<T> {
    fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            fetched_at: None,
            is_fetching: false,
            is_stale: true,
        }
    }
}

struct InFlight {
    id: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct Entry {
    value: Option<QueryValue>,
    fetched_at: Option<Instant>,
    fetched_at_wall: Option<DateTime<Utc>>,
    stale_time: Duration,
    invalidated: bool,
    error: Option<StoreError>,
    in_flight: Option<InFlight>,
}

impl Entry {
    fn is_fresh(&self, stale_time: Duration, now: Instant) -> bool {
        self.value.is_some()
            && !self.invalidated
            && self
                .fetched_at
                .is_some_and(|at| now.saturating_duration_since(at) < stale_time)
    }
}

#[derive(Default)]
struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    next_fetch: AtomicU64,
}

/// Process-wide cache of remote reads.
///
/// Cloning is cheap and every clone shares the same entries. Only this type
/// writes cached values: on fetch completion, on [`set`](Self::set) and on
/// invalidation.
#[derive(Clone, Default)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, op: &'static str) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        match self.inner.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(op, "Recovered from poisoned query cache lock");
                poisoned.into_inner()
            }
        }
    }

    /// Read `key`, fetching through `fetcher` when the cached value is
    /// missing, stale or invalidated.
    ///
    /// Concurrent reads of the same key share one in-flight fetch, which runs
    /// to completion even if the reader is dropped. A failed fetch is
    /// returned as an error; the previous value stays cached and is visible
    /// through [`snapshot`](Self::snapshot).
    pub async fn query<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> StoreResult<T>
    where
        T: Cached,
        F: FnOnce() -> Fut,
        Fut: Future<Output = StoreResult<T>> + Send + 'static,
    {
        let (id, fetch) = {
            let mut entries = self.lock("query");
            let entry = entries.entry(key.clone()).or_default();

            if entry.is_fresh(options.stale_time, Instant::now()) {
                if let Some(value) = entry.value.as_ref().and_then(|v| T::from_value(v)) {
                    debug!(%key, "Cache hit");
                    return Ok(value);
                }
            }

            match &entry.in_flight {
                Some(in_flight) => {
                    debug!(%key, "Joining in-flight fetch");
                    (in_flight.id, in_flight.fetch.clone())
                }
                None => {
                    let id = self.inner.next_fetch.fetch_add(1, Ordering::Relaxed);
                    let fetch = fetcher().map_ok(T::into_value).boxed().shared();
                    entry.in_flight = Some(InFlight {
                        id,
                        fetch: fetch.clone(),
                    });
                    debug!(%key, had_value = entry.value.is_some(), "Fetching");
                    self.drive(key.clone(), id, fetch.clone(), options);
                    (id, fetch)
                }
            }
        };

        let result = fetch.await;
        self.settle(&key, id, &result, options);

        let value = result?;
        T::from_value(&value).ok_or_else(|| {
            StoreError::Decode(format!("cached value for {key} has an unexpected type"))
        })
    }

    /// Run fetch `id` to completion in the background so its outcome is
    /// recorded even if every reader goes away.
    fn drive(&self, key: QueryKey, id: u64, fetch: SharedFetch, options: QueryOptions) {
        let client = self.clone();
        tokio::spawn(async move {
            let result = fetch.await;
            client.settle(&key, id, &result, options);
        });
    }

    /// Record the outcome of fetch `id`, unless it was superseded by an
    /// invalidation or already recorded by another waiter.
    fn settle(&self, key: &QueryKey, id: u64, result: &StoreResult<QueryValue>, options: QueryOptions) {
        let mut entries = self.lock("settle");
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if !entry.in_flight.as_ref().is_some_and(|f| f.id == id) {
            return;
        }

        entry.in_flight = None;
        match result {
            Ok(value) => {
                entry.value = Some(value.clone());
                entry.fetched_at = Some(Instant::now());
                entry.fetched_at_wall = Some(Utc::now());
                entry.stale_time = options.stale_time;
                entry.invalidated = false;
                entry.error = None;
            }
            Err(err) => {
                warn!(%key, error = %err, "Fetch failed");
                entry.error = Some(err.clone());
            }
        }
    }

    /// Force a fetch of `key`, ignoring any cached value.
    pub async fn refetch<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> StoreResult<T>
    where
        T: Cached,
        F: FnOnce() -> Fut,
        Fut: Future<Output = StoreResult<T>> + Send + 'static,
    {
        self.invalidate(&[Invalidate::Key(key.clone())]);
        self.query(key, options, fetcher).await
    }

    /// Re-fetch `key` every `interval` until the returned handle is dropped.
    ///
    /// Failures are logged and the next tick tries again.
    pub fn poll<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        interval: Duration,
        fetcher: F,
    ) -> PollHandle
    where
        T: Cached,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StoreResult<T>> + Send + 'static,
    {
        let client = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(err) = client
                    .refetch::<T, _, _>(key.clone(), options, || fetcher())
                    .await
                {
                    debug!(%key, error = %err, "Poll fetch failed");
                }
            }
        });
        PollHandle { task }
    }

    /// Synchronous view of what is cached under `key`.
    pub fn snapshot<T: Cached>(&self, key: &QueryKey) -> QuerySnapshot<T> {
        let entries = self.lock("snapshot");
        let Some(entry) = entries.get(key) else {
            return QuerySnapshot::idle();
        };

        let is_fetching = entry.in_flight.is_some();
        let status = if entry.error.is_some() {
            QueryStatus::Error
        } else if entry.value.is_some() {
            QueryStatus::Success
        } else if is_fetching {
            QueryStatus::Loading
        } else {
            QueryStatus::Idle
        };

        QuerySnapshot {
            status,
            data: entry.value.as_ref().and_then(|v| T::from_value(v)),
            error: entry.error.clone(),
            fetched_at: entry.fetched_at_wall,
            is_fetching,
            is_stale: !entry.is_fresh(entry.stale_time, Instant::now()),
        }
    }

    /// Seed `key` with a value, as if it had just been fetched.
    pub fn set<T: Cached>(&self, key: QueryKey, value: T, options: QueryOptions) {
        let mut entries = self.lock("set");
        let entry = entries.entry(key).or_default();
        entry.value = Some(value.into_value());
        entry.fetched_at = Some(Instant::now());
        entry.fetched_at_wall = Some(Utc::now());
        entry.stale_time = options.stale_time;
        entry.invalidated = false;
        entry.error = None;
    }

    /// Mark every key matching one of `targets` stale and detach its
    /// in-flight fetch. Returns how many keys were touched.
    pub fn invalidate(&self, targets: &[Invalidate]) -> usize {
        let mut entries = self.lock("invalidate");
        let mut touched = 0;
        for (key, entry) in entries.iter_mut() {
            if targets.iter().any(|t| t.matches(key)) {
                entry.invalidated = true;
                entry.in_flight = None;
                touched += 1;
            }
        }
        debug!(targets = ?targets, touched, "Invalidated cache keys");
        touched
    }

    /// Forget `key` entirely.
    pub fn remove(&self, key: &QueryKey) {
        self.lock("remove").remove(key);
    }

    /// Drop every cached entry.
    pub fn reset(&self) {
        self.lock("reset").clear();
    }

    pub fn len(&self) -> usize {
        self.lock("len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps a background poll running; dropping it stops the poll.
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
