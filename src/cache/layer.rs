//! Cache layer that orchestrates pre-population and cache-first lookups.

use color_eyre::{eyre::eyre, Result};
use futures::future::try_join_all;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

use super::storage::CacheStorage;
use super::traits::{AssetRequest, AssetResponse, CacheName, RequestKey};

/// Handle on one named, versioned cache store.
///
/// The network is never reached directly from here: install and intercept
/// take the fetcher as an argument, so the same layer works against a real
/// HTTP client or a test double.
pub struct AssetCache<S: CacheStorage> {
  storage: Arc<S>,
  name: CacheName,
}

impl<S: CacheStorage> AssetCache<S> {
  /// Create a new cache handle over the given storage backend.
  pub fn new(storage: S, name: CacheName) -> Self {
    Self::shared(Arc::new(storage), name)
  }

  /// Create a cache handle over storage that is also used elsewhere.
  pub fn shared(storage: Arc<S>, name: CacheName) -> Self {
    Self { storage, name }
  }

  pub fn name(&self) -> &CacheName {
    &self.name
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Pre-populate the store with every resource.
  ///
  /// All resources are fetched first and written in a single transaction
  /// afterwards. If any fetch fails, or answers with a non-2xx status,
  /// nothing is written and the error names the failing resource.
  /// Re-running against an already populated store replaces entries in
  /// place.
  pub async fn install<F, Fut>(&self, resources: &[AssetRequest], fetcher: F) -> Result<usize>
  where
    F: Fn(AssetRequest) -> Fut,
    Fut: Future<Output = Result<AssetResponse>>,
  {
    let store = self.name.to_string();

    let mut seen: HashSet<RequestKey> = HashSet::new();
    for request in resources {
      if !seen.insert(request.key()) {
        return Err(eyre!("Duplicate resource in cache list: {}", request.key()));
      }
    }

    self.storage.open_store(&store)?;

    let fetches = resources.iter().map(|request| {
      let key = request.key();
      let response = fetcher(request.clone());
      async move {
        let response = response
          .await
          .map_err(|e| eyre!("Failed to fetch {}: {}", key.url, e))?;
        if !response.is_success() {
          return Err(eyre!(
            "Failed to fetch {}: HTTP {}",
            key.url,
            response.status
          ));
        }
        Ok((key, response))
      }
    });

    let entries = try_join_all(fetches).await?;
    self.storage.put_all(&store, &entries)?;

    info!(store = %store, entries = entries.len(), "asset cache populated");
    Ok(entries.len())
  }

  /// Answer a request from the store, falling back to the network.
  ///
  /// A hit never touches the network. A miss performs exactly one fetch and
  /// returns its response unmodified; nothing is written back. Only GET
  /// requests are matched against the store.
  pub async fn intercept<F, Fut>(&self, request: AssetRequest, fetcher: F) -> Result<AssetResponse>
  where
    F: FnOnce(AssetRequest) -> Fut,
    Fut: Future<Output = Result<AssetResponse>>,
  {
    if request.is_cacheable() {
      let key = request.key();
      if let Some(cached) = self.storage.match_request(&self.name.to_string(), &key)? {
        debug!(url = %key.url, cached_at = %cached.cached_at, "served from cache");
        return Ok(cached.response);
      }
    }

    debug!(method = %request.method, url = %request.url, "cache miss, fetching from network");
    fetcher(request).await
  }

  /// Delete every store sharing this cache's prefix but not its version.
  ///
  /// Returns the names of the deleted stores.
  pub fn remove_stale_versions(&self) -> Result<Vec<String>> {
    let mut removed = Vec::new();

    for store in self.storage.store_names()? {
      let is_stale = CacheName::parse(&store)
        .map(|other| other.is_sibling_of(&self.name))
        .unwrap_or(false);

      if is_stale && self.storage.delete_store(&store)? {
        info!(store = %store, "removed stale asset cache");
        removed.push(store);
      }
    }

    Ok(removed)
  }

  /// Request identities currently held by this store.
  pub fn keys(&self) -> Result<Vec<RequestKey>> {
    self.storage.keys(&self.name.to_string())
  }

  /// Whether the store holds an entry for every one of `resources`.
  pub fn holds_all(&self, resources: &[AssetRequest]) -> Result<bool> {
    let held: HashSet<RequestKey> = self.keys()?.into_iter().collect();
    Ok(resources.iter().all(|request| held.contains(&request.key())))
  }
}

impl<S: CacheStorage> Clone for AssetCache<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      name: self.name.clone(),
    }
  }
}
