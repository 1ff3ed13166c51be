//! Web app manifest, used to title the UI.

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::cache::{AssetRequest, AssetResponse, AssetWorker, CacheStorage, Fetch};

pub const MANIFEST_PATH: &str = "/static/manifest.json";

/// Title used when the manifest cannot be read
pub const DEFAULT_TITLE: &str = "doable";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebManifest {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub short_name: Option<String>,
}

impl WebManifest {
  pub fn from_response(response: &AssetResponse) -> Result<Self> {
    if !response.is_success() {
      return Err(eyre!("HTTP {} for {}", response.status, response.url));
    }
    serde_json::from_slice(&response.body)
      .map_err(|e| eyre!("Failed to parse manifest {}: {}", response.url, e))
  }

  /// `name`, falling back to `short_name`
  pub fn title(&self) -> Option<&str> {
    self
      .name
      .as_deref()
      .or(self.short_name.as_deref())
      .map(str::trim)
      .filter(|t| !t.is_empty())
  }
}

/// Read the app title from the manifest, going through the worker so a
/// cached copy is used when the server is unreachable.
pub async fn app_title<S: CacheStorage, N: Fetch>(worker: &AssetWorker<S, N>, origin: &Url) -> String {
  let result = async {
    let request = AssetRequest::resolve(origin, MANIFEST_PATH)?;
    let response = worker.handle_fetch(request).await?;
    WebManifest::from_response(&response)
  }
  .await;

  match result {
    Ok(manifest) => manifest.title().unwrap_or(DEFAULT_TITLE).to_string(),
    Err(e) => {
      warn!(error = %e, "could not read manifest, using default title");
      DEFAULT_TITLE.to_string()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{AssetCache, CacheName, SqliteStorage};
  use async_trait::async_trait;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::Arc;

  struct Offline;

  /// Serves the manifest until switched off
  #[derive(Clone, Default)]
  struct Switchable {
    offline: Arc<AtomicBool>,
  }

  #[async_trait]
  impl Fetch for Switchable {
    async fn fetch(&self, request: AssetRequest) -> Result<AssetResponse> {
      if self.offline.load(Ordering::SeqCst) {
        return Err(eyre!("{} unreachable", request.url));
      }
      Ok(AssetResponse::new(
        request.url.to_string(),
        200,
        r#"{"name":"To-Do List"}"#,
      ))
    }
  }

  #[async_trait]
  impl Fetch for Offline {
    async fn fetch(&self, request: AssetRequest) -> Result<AssetResponse> {
      Err(eyre!("{} unreachable", request.url))
    }
  }

  #[test]
  fn test_title_prefers_name() {
    let response = AssetResponse::new(
      "http://127.0.0.1:5000/static/manifest.json",
      200,
      r#"{"name":"To-Do List","short_name":"ToDo","display":"standalone"}"#,
    );
    let manifest = WebManifest::from_response(&response).unwrap();
    assert_eq!(manifest.title(), Some("To-Do List"));
  }

  #[test]
  fn test_title_falls_back_to_short_name() {
    let response = AssetResponse::new("http://x/m.json", 200, r#"{"name":" ","short_name":"ToDo"}"#);
    assert_eq!(WebManifest::from_response(&response).unwrap().title(), Some("ToDo"));
  }

  #[test]
  fn test_error_status_is_rejected() {
    let response = AssetResponse::new("http://x/m.json", 404, "not found");
    assert!(WebManifest::from_response(&response).is_err());
  }

  #[tokio::test]
  async fn test_unreachable_manifest_uses_default_title() {
    let cache = AssetCache::new(
      SqliteStorage::in_memory().unwrap(),
      CacheName::new("todo-list-cache", 1),
    );
    let worker = AssetWorker::new(cache, Offline, Vec::new());
    let origin = Url::parse("http://127.0.0.1:5000").unwrap();

    assert_eq!(app_title(&worker, &origin).await, DEFAULT_TITLE);
  }

  #[tokio::test]
  async fn test_title_served_from_cache_when_offline() {
    let origin = Url::parse("http://127.0.0.1:5000").unwrap();
    let cache = AssetCache::new(
      SqliteStorage::in_memory().unwrap(),
      CacheName::new("todo-list-cache", 1),
    );
    let network = Switchable::default();
    let resources = vec![AssetRequest::resolve(&origin, MANIFEST_PATH).unwrap()];
    let mut worker = AssetWorker::new(cache, network.clone(), resources);
    worker.start().await.unwrap();

    network.offline.store(true, Ordering::SeqCst);

    assert_eq!(app_title(&worker, &origin).await, "To-Do List");
  }
}
