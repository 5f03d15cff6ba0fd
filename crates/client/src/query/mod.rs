//! Query client: resolver, executor and cache composed behind one API.
//!
//! Pages ask for a [`ResourceKey`]; the client serves it from the cache,
//! joins an in-flight fetch for the same key, or resolves candidate URLs
//! and runs the fallback policy. Nothing refetches on its own.

pub mod page;

pub use page::PageStatus;

use crate::fetch::{FetchConfig, FetchExecutor, ReqwestTransport, Transport, TransportConfig, UrlResolver};
use bytes::Bytes;
use campus_core::models::Collection;
use campus_core::{AppConfig, CacheEntry, Error, FetchOutcome, QueryError, ResourceCache, ResourceKey};
use futures_util::future::try_join_all;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

/// Composition root for resource queries.
///
/// Owns its cache; clones share it.
#[derive(Clone)]
pub struct QueryClient {
    resolver: UrlResolver,
    executor: FetchExecutor,
    cache: ResourceCache,
}

impl QueryClient {
    /// Create a client backed by reqwest.
    pub fn new(config: &AppConfig) -> Result<Self, Error> {
        let transport = ReqwestTransport::new(&TransportConfig {
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
        })?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over any transport.
    pub fn with_transport(config: &AppConfig, transport: Arc<dyn Transport>) -> Result<Self, Error> {
        let resolver = UrlResolver::new(&config.base_url, config.environment, config.fallback_order)
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let executor = FetchExecutor::new(
            transport,
            FetchConfig { environment: config.environment, on_unauthorized: config.on_unauthorized },
        );
        let cache = ResourceCache::new().with_stale_time(config.stale_time());

        tracing::debug!(
            base_url = %resolver.base(),
            environment = ?config.environment,
            "query client ready"
        );

        Ok(Self { resolver, executor, cache })
    }

    /// Get reference to the cache.
    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Get reference to the resolver.
    pub fn resolver(&self) -> &UrlResolver {
        &self.resolver
    }

    /// Fetch `key` through the cache.
    pub async fn query(&self, key: &ResourceKey) -> FetchOutcome {
        let executor = self.executor.clone();
        let candidates = self.resolver.resolve(key);
        self.cache
            .get_or_fetch(key, move || async move { executor.execute(&candidates).await })
            .await
    }

    /// [`QueryClient::query`] decoded into `T`.
    pub async fn query_as<T: DeserializeOwned>(&self, key: &ResourceKey) -> Result<T, QueryError> {
        let value = self.query(key).await?;
        serde_json::from_value(value).map_err(|e| QueryError::decode(format!("{key}: {e}")))
    }

    /// Fetch a whole typed collection from its well-known key.
    pub async fn collection<T: Collection>(&self) -> Result<Vec<T>, Error> {
        let key = T::key()?;
        Ok(self.query_as(&key).await?)
    }

    /// Fetch every key concurrently; the first failure fails the whole set.
    pub async fn query_all(&self, keys: &[ResourceKey]) -> Result<Vec<Value>, QueryError> {
        try_join_all(keys.iter().map(|key| self.query(key))).await
    }

    /// Warm the cache for `key`, discarding the outcome.
    pub async fn prefetch(&self, key: &ResourceKey) {
        if let Err(e) = self.query(key).await {
            tracing::debug!(key = %key, error = %e, "prefetch failed");
        }
    }

    /// Seed the cache with a known value.
    pub async fn set_query_data(&self, key: &ResourceKey, value: Value) {
        self.cache.put(key, Ok(value)).await;
    }

    /// Cached entry for `key`, if it was ever requested.
    pub async fn entry(&self, key: &ResourceKey) -> Option<CacheEntry> {
        self.cache.get(key).await
    }

    /// Combined status of a page's queries as currently cached.
    pub async fn page_status(&self, keys: &[ResourceKey]) -> PageStatus {
        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            entries.push(self.cache.get(key).await);
        }
        PageStatus::from_entries(entries.iter().map(Option::as_ref))
    }

    /// Uncached request at the key's raw path (form submissions).
    pub async fn request(&self, method: Method, key: &ResourceKey, body: Option<Value>) -> FetchOutcome {
        self.executor.send(method, &self.resolver.raw(key), body).await
    }

    /// Download `/api/downloads/<filename>`. Not cached.
    pub async fn download(&self, filename: &str) -> Result<Bytes, Error> {
        let key = ResourceKey::download(filename)?;
        Ok(self.executor.fetch_bytes(&self.resolver.resolve(&key)).await?)
    }

    pub async fn subscribe(&self, key: &ResourceKey) -> watch::Receiver<CacheEntry> {
        self.cache.subscribe(key).await
    }

    pub async fn invalidate(&self, key: &ResourceKey) {
        self.cache.invalidate(key).await;
    }

    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all().await;
    }
}
