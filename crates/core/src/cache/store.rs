//! In-memory resource cache with request deduplication.
//!
//! Each key holds at most one in-flight fetch. The fetch runs on its own
//! tokio task and writes its outcome back into the cache, so callers that
//! stop waiting neither cancel it nor lose its result.

use super::entry::{CacheEntry, EntryState};
use crate::{FetchOutcome, QueryError, ResourceKey};
use chrono::Utc;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};

type PendingOutcome = Shared<BoxFuture<'static, FetchOutcome>>;

struct Slot {
    entry: CacheEntry,
    /// Set exactly while `entry.state == Loading`.
    pending: Option<PendingOutcome>,
    /// Identifies the fetch (or put) that last claimed this slot.
    generation: u64,
}

impl Slot {
    fn new(key: ResourceKey) -> Self {
        Self { entry: CacheEntry::idle(key), pending: None, generation: 0 }
    }
}

enum Lookup {
    Hit(Value),
    Join(PendingOutcome),
    Miss,
}

#[derive(Default)]
struct CacheState {
    slots: HashMap<ResourceKey, Slot>,
    watchers: HashMap<ResourceKey, watch::Sender<CacheEntry>>,
    next_generation: u64,
}

impl CacheState {
    fn claim(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

/// Send `entry` to its key's watchers, dropping the sender once nobody listens.
fn publish(watchers: &mut HashMap<ResourceKey, watch::Sender<CacheEntry>>, entry: &CacheEntry) {
    let unwatched = match watchers.get(&entry.key) {
        Some(tx) if tx.receiver_count() == 0 => true,
        Some(tx) => {
            tx.send_replace(entry.clone());
            false
        }
        None => false,
    };
    if unwatched {
        watchers.remove(&entry.key);
    }
}

/// Keyed store of fetched collections.
///
/// Cheap to clone; clones share the same entries. Success entries live until
/// [`ResourceCache::invalidate`] or [`ResourceCache::invalidate_all`] unless a
/// finite stale time was configured.
#[derive(Clone)]
pub struct ResourceCache {
    state: Arc<Mutex<CacheState>>,
    stale_time: Option<Duration>,
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache")
            .field("stale_time", &self.stale_time)
            .finish_non_exhaustive()
    }
}

impl ResourceCache {
    /// Create a cache whose entries never go stale.
    pub fn new() -> Self {
        Self { state: Arc::new(Mutex::new(CacheState::default())), stale_time: None }
    }

    /// Set a finite stale time. `None` restores the infinite default.
    pub fn with_stale_time(mut self, stale_time: Option<Duration>) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn stale_time(&self) -> Option<Duration> {
        self.stale_time
    }

    fn is_stale(&self, entry: &CacheEntry) -> bool {
        match (self.stale_time, entry.fetched_at) {
            (Some(ttl), Some(fetched_at)) => (Utc::now() - fetched_at).to_std().is_ok_and(|age| age > ttl),
            _ => false,
        }
    }

    /// Serve `key` from cache, join its in-flight fetch, or start one.
    ///
    /// 1. Fresh success entry: returned without suspending on the network
    /// 2. Fetch already pending: await the same shared outcome
    /// 3. Otherwise (absent, idle, failed or stale): spawn `fetch` and await it
    ///
    /// A stale entry whose refresh fails keeps serving the old value.
    pub async fn get_or_fetch<F, Fut>(&self, key: &ResourceKey, fetch: F) -> FetchOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchOutcome> + Send + 'static,
    {
        let pending = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;

            let lookup = match state.slots.get(key) {
                Some(slot) if slot.entry.state == EntryState::Success && !self.is_stale(&slot.entry) => {
                    Lookup::Hit(slot.entry.value.clone().unwrap_or(Value::Null))
                }
                Some(Slot { pending: Some(pending), .. }) => Lookup::Join(pending.clone()),
                _ => Lookup::Miss,
            };

            match lookup {
                Lookup::Hit(value) => {
                    tracing::debug!(key = %key, "cache hit");
                    return Ok(value);
                }
                Lookup::Join(pending) => {
                    tracing::debug!(key = %key, "joining in-flight fetch");
                    pending
                }
                Lookup::Miss => self.start(state, key, fetch()),
            }
        };

        pending.await
    }

    /// Claim the slot for a new fetch and spawn it. Caller holds the lock.
    fn start<Fut>(&self, state: &mut CacheState, key: &ResourceKey, fetch: Fut) -> PendingOutcome
    where
        Fut: Future<Output = FetchOutcome> + Send + 'static,
    {
        let generation = state.claim();
        let slot = state
            .slots
            .entry(key.clone())
            .or_insert_with(|| Slot::new(key.clone()));
        slot.generation = generation;
        slot.entry.start_loading();
        publish(&mut state.watchers, &slot.entry);

        tracing::debug!(key = %key, generation, "starting fetch");

        let cache = self.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let outcome = fetch.await;
            cache.settle(&task_key, generation, outcome).await
        });

        let cache = self.clone();
        let join_key = key.clone();
        let pending = async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let err = QueryError::network(format!("fetch task failed: {e}"));
                    cache.settle(&join_key, generation, Err(err)).await
                }
            }
        }
        .boxed()
        .shared();

        slot.pending = Some(pending.clone());
        pending
    }

    /// Record the outcome of fetch `generation`, unless the slot has since
    /// been invalidated or claimed by a newer fetch or put.
    async fn settle(&self, key: &ResourceKey, generation: u64, outcome: FetchOutcome) -> FetchOutcome {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let Some(slot) = state.slots.get_mut(key) else {
            tracing::debug!(key = %key, "discarding outcome for invalidated key");
            return outcome;
        };
        if slot.generation != generation || slot.pending.is_none() {
            return outcome;
        }
        slot.pending = None;

        let outcome = match outcome {
            Ok(value) => {
                slot.entry.succeed(value.clone());
                Ok(value)
            }
            Err(err) => match slot.entry.value.clone() {
                Some(stale) => {
                    tracing::warn!(key = %key, error = %err, "refresh failed; serving stale value");
                    slot.entry.keep_stale();
                    Ok(stale)
                }
                None => {
                    tracing::debug!(key = %key, error = %err, "fetch failed");
                    slot.entry.fail(err.clone());
                    Err(err)
                }
            },
        };

        publish(&mut state.watchers, &slot.entry);
        outcome
    }

    /// Current entry for `key`, if one was ever created.
    pub async fn get(&self, key: &ResourceKey) -> Option<CacheEntry> {
        let state = self.state.lock().await;
        state.slots.get(key).map(|slot| slot.entry.clone())
    }

    /// Store an outcome directly, overriding any in-flight fetch's result.
    pub async fn put(&self, key: &ResourceKey, outcome: FetchOutcome) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let generation = state.claim();
        let slot = state
            .slots
            .entry(key.clone())
            .or_insert_with(|| Slot::new(key.clone()));
        slot.generation = generation;
        slot.pending = None;
        match outcome {
            Ok(value) => slot.entry.succeed(value),
            Err(err) => slot.entry.fail(err),
        }

        publish(&mut state.watchers, &slot.entry);
    }

    /// Drop the entry for `key`. Subscribers observe it returning to idle.
    pub async fn invalidate(&self, key: &ResourceKey) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        if state.slots.remove(key).is_some() {
            publish(&mut state.watchers, &CacheEntry::idle(key.clone()));
        }
    }

    /// Drop every entry.
    pub async fn invalidate_all(&self) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        for (key, _) in state.slots.drain() {
            publish(&mut state.watchers, &CacheEntry::idle(key));
        }
        state.watchers.retain(|_, tx| tx.receiver_count() > 0);
        tracing::debug!("cache cleared");
    }

    /// Watch every state transition of `key`.
    pub async fn subscribe(&self, key: &ResourceKey) -> watch::Receiver<CacheEntry> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let current = state
            .slots
            .get(key)
            .map(|slot| slot.entry.clone())
            .unwrap_or_else(|| CacheEntry::idle(key.clone()));

        state
            .watchers
            .entry(key.clone())
            .or_insert_with(|| watch::channel(current).0)
            .subscribe()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.slots.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    fn news() -> ResourceKey {
        ResourceKey::api("news").unwrap()
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = ResourceCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let outcome = cache
                .get_or_fetch(&news(), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!([{ "id": "1" }]))
                })
                .await;
            assert_eq!(outcome, Ok(json!([{ "id": "1" }])));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(&news()).await.unwrap().state, EntryState::Success);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_fetch() {
        let cache = ResourceCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (release, gate) = oneshot::channel::<()>();

        let first = {
            let cache = cache.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(&news(), move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        let _ = gate.await;
                        Ok(json!(["shared"]))
                    })
                    .await
            })
        };

        // wait until the first fetch has claimed the slot
        while cache.get(&news()).await.map(|e| e.state) != Some(EntryState::Loading) {
            tokio::task::yield_now().await;
        }

        let second = {
            let cache = cache.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(&news(), move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(json!(["duplicate"]))
                    })
                    .await
            })
        };

        tokio::task::yield_now().await;
        release.send(()).unwrap();

        assert_eq!(first.await.unwrap(), Ok(json!(["shared"])));
        assert_eq!(second.await.unwrap(), Ok(json!(["shared"])));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_served_from_cache() {
        let cache = ResourceCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let c = calls.clone();
        let outcome = cache
            .get_or_fetch(&news(), move || async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(QueryError::http(500, "Internal Server Error"))
            })
            .await;
        assert_eq!(outcome.unwrap_err().kind, ErrorKind::Http);
        assert_eq!(cache.get(&news()).await.unwrap().state, EntryState::Error);

        let c = calls.clone();
        let outcome = cache
            .get_or_fetch(&news(), move || async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(json!([]))
            })
            .await;
        assert_eq!(outcome, Ok(json!([])));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_abandoned_fetch_still_lands() {
        let cache = ResourceCache::new();
        let (release, gate) = oneshot::channel::<()>();

        let waiter = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(&news(), move || async move {
                        let _ = gate.await;
                        Ok(json!(["late"]))
                    })
                    .await
            })
        };

        while cache.get(&news()).await.map(|e| e.state) != Some(EntryState::Loading) {
            tokio::task::yield_now().await;
        }
        waiter.abort();

        let mut rx = cache.subscribe(&news()).await;
        release.send(()).unwrap();
        rx.wait_for(|entry| entry.state == EntryState::Success).await.unwrap();

        assert_eq!(cache.get(&news()).await.unwrap().value, Some(json!(["late"])));
    }

    #[tokio::test]
    async fn test_put_and_invalidate_all() {
        let cache = ResourceCache::new();
        let events = ResourceKey::api("events").unwrap();

        cache.put(&news(), Ok(json!(["a"]))).await;
        cache.put(&events, Err(QueryError::forbidden("Forbidden"))).await;
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&events).await.unwrap().state, EntryState::Error);

        cache.invalidate_all().await;
        assert!(cache.is_empty().await);
        assert!(cache.get(&news()).await.is_none());
    }

    #[tokio::test]
    async fn test_put_overrides_in_flight_fetch() {
        let cache = ResourceCache::new();
        let (release, gate) = oneshot::channel::<()>();

        let waiter = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(&news(), move || async move {
                        let _ = gate.await;
                        Ok(json!(["from-network"]))
                    })
                    .await
            })
        };

        while cache.get(&news()).await.map(|e| e.state) != Some(EntryState::Loading) {
            tokio::task::yield_now().await;
        }
        cache.put(&news(), Ok(json!(["seeded"]))).await;
        release.send(()).unwrap();

        assert_eq!(waiter.await.unwrap(), Ok(json!(["from-network"])));
        assert_eq!(cache.get(&news()).await.unwrap().value, Some(json!(["seeded"])));
    }

    #[tokio::test]
    async fn test_subscribe_observes_transitions() {
        let cache = ResourceCache::new();
        let mut rx = cache.subscribe(&news()).await;
        assert_eq!(rx.borrow().state, EntryState::Idle);

        cache.get_or_fetch(&news(), || async { Ok(json!([1, 2])) }).await.unwrap();
        rx.wait_for(|entry| entry.state == EntryState::Success).await.unwrap();

        cache.invalidate(&news()).await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().state, EntryState::Idle);
    }

    #[tokio::test]
    async fn test_dropped_subscribers_are_pruned() {
        let cache = ResourceCache::new();
        let events = ResourceKey::api("events").unwrap();

        let rx = cache.subscribe(&news()).await;
        let _kept = cache.subscribe(&events).await;
        assert_eq!(cache.state.lock().await.watchers.len(), 2);

        drop(rx);
        cache.put(&news(), Ok(json!([]))).await;
        assert_eq!(cache.state.lock().await.watchers.len(), 1);

        let rx = cache.subscribe(&news()).await;
        assert_eq!(rx.borrow().state, EntryState::Success);
        drop(rx);
        cache.invalidate_all().await;
        assert_eq!(cache.state.lock().await.watchers.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_entry_refetches_and_falls_back() {
        let cache = ResourceCache::new().with_stale_time(Some(Duration::from_millis(10)));

        cache.get_or_fetch(&news(), || async { Ok(json!(["v1"])) }).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let outcome = cache.get_or_fetch(&news(), || async { Ok(json!(["v2"])) }).await;
        assert_eq!(outcome, Ok(json!(["v2"])));

        tokio::time::sleep(Duration::from_millis(30)).await;
        let outcome = cache
            .get_or_fetch(&news(), || async { Err(QueryError::network("offline")) })
            .await;
        assert_eq!(outcome, Ok(json!(["v2"])));
        assert_eq!(cache.get(&news()).await.unwrap().state, EntryState::Success);
    }
}
