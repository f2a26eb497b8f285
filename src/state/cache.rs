use crate::metrics::{CACHE_HITS_TOTAL, CACHE_INVALIDATIONS_TOTAL, CACHE_MISSES_TOTAL};
use moka::future::Cache;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Read-through cache region backed by Moka.
///
/// Each region carries a generation counter bumped by every invalidation. A
/// load only publishes its value if no invalidation ran while it was talking
/// to the store, so a read that observed pre-mutation state is not cached
/// after the mutation's invalidation.
#[derive(Clone)]
pub struct AppCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    name: &'static str,
    cache: Cache<K, V>,
    generation: Arc<AtomicU64>,
}

impl<K, V> AppCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, max_capacity: u64, ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder()
            .name(name)
            .max_capacity(max_capacity)
            .support_invalidation_closures();

        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            name,
            cache: builder.build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.cache.get(key).await
    }

    /// Return the cached value or compute it with `load` and publish it.
    pub async fn read_through<F, Fut, E>(&self, key: K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.lookup(&key).await {
            return Ok(value);
        }

        let generation = self.generation();
        let value = load().await?;
        self.publish(key, value.clone(), generation).await;
        Ok(value)
    }

    /// Like [`read_through`](Self::read_through), but a `None` result is
    /// returned without being cached.
    pub async fn read_through_optional<F, Fut, E>(&self, key: K, load: F) -> Result<Option<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
    {
        if let Some(value) = self.lookup(&key).await {
            return Ok(Some(value));
        }

        let generation = self.generation();
        let loaded = load().await?;
        if let Some(ref value) = loaded {
            self.publish(key, value.clone(), generation).await;
        }
        Ok(loaded)
    }

    pub async fn invalidate(&self, key: &K) {
        self.bump_generation();
        self.cache.invalidate(key).await;
        CACHE_INVALIDATIONS_TOTAL
            .with_label_values(&[self.name, "key"])
            .inc();
    }

    /// Invalidate every entry whose key matches `predicate`.
    ///
    /// Falls back to clearing the whole region if the predicate cannot be
    /// registered; a cold refill is preferred over a stale hit.
    pub fn invalidate_matching<P>(&self, predicate: P)
    where
        P: Fn(&K) -> bool + Send + Sync + 'static,
    {
        self.bump_generation();
        match self.cache.invalidate_entries_if(move |key, _| predicate(key)) {
            Ok(_) => {
                CACHE_INVALIDATIONS_TOTAL
                    .with_label_values(&[self.name, "predicate"])
                    .inc();
            }
            Err(e) => {
                tracing::warn!(
                    cache = self.name,
                    error = %e,
                    "Predicate invalidation rejected, clearing cache"
                );
                self.invalidate_all();
            }
        }
    }

    pub fn invalidate_all(&self) {
        self.bump_generation();
        self.cache.invalidate_all();
        CACHE_INVALIDATIONS_TOTAL
            .with_label_values(&[self.name, "all"])
            .inc();
    }

    /// Approximate number of live entries
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    async fn lookup(&self, key: &K) -> Option<V> {
        match self.cache.get(key).await {
            Some(value) => {
                CACHE_HITS_TOTAL.with_label_values(&[self.name]).inc();
                tracing::trace!(cache = self.name, "Cache hit");
                Some(value)
            }
            None => {
                CACHE_MISSES_TOTAL.with_label_values(&[self.name]).inc();
                tracing::trace!(cache = self.name, "Cache miss");
                None
            }
        }
    }

    async fn publish(&self, key: K, value: V, generation: u64) {
        if self.generation() == generation {
            self.cache.insert(key, value).await;
        } else {
            tracing::debug!(
                cache = self.name,
                "Discarding value loaded across an invalidation"
            );
        }
    }
}
