//! Core types for the asset cache: request identity, stored responses and store names.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

/// An outgoing resource request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
  pub method: String,
  pub url: Url,
}

impl AssetRequest {
  pub fn new(method: &str, url: Url) -> Self {
    Self {
      method: method.to_ascii_uppercase(),
      url,
    }
  }

  pub fn get(url: Url) -> Self {
    Self::new("GET", url)
  }

  /// Resolve a resource identifier against an origin.
  ///
  /// Relative identifiers ("/", "/static/manifest.json") are joined onto the
  /// origin; absolute identifiers are kept as-is, so cross-origin resources
  /// keep their own host.
  pub fn resolve(origin: &Url, identifier: &str) -> Result<Self> {
    let url = origin
      .join(identifier)
      .map_err(|e| eyre!("Invalid resource '{}': {}", identifier, e))?;
    Ok(Self::get(url))
  }

  /// Only GET requests are looked up in the cache.
  pub fn is_cacheable(&self) -> bool {
    self.method == "GET"
  }

  /// Identity used to key the request in a cache store.
  pub fn key(&self) -> RequestKey {
    let mut url = self.url.clone();
    url.set_fragment(None);
    RequestKey {
      method: self.method.clone(),
      url: url.to_string(),
    }
  }
}

/// Request identity: method plus URL without fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
  pub method: String,
  pub url: String,
}

impl RequestKey {
  /// Stable, fixed-length hash used as the storage key.
  pub fn cache_hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.method.as_bytes());
    hasher.update(b" ");
    hasher.update(self.url.as_bytes());
    hex::encode(hasher.finalize())
  }
}

impl fmt::Display for RequestKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.method, self.url)
  }
}

/// A response as delivered to the caller, whether it came from cache or network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
  /// Final URL of the response (after redirects)
  pub url: String,
  pub status: u16,
  pub headers: Vec<(String, String)>,
  pub body: Vec<u8>,
}

impl AssetResponse {
  pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
    Self {
      url: url.into(),
      status,
      headers: Vec::new(),
      body: body.into(),
    }
  }

  pub fn with_header(mut self, name: &str, value: &str) -> Self {
    self.headers.push((name.to_ascii_lowercase(), value.to_string()));
    self
  }

  /// Whether the status is in the 2xx range.
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  /// Case-insensitive header lookup.
  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  pub fn text(&self) -> Result<&str> {
    std::str::from_utf8(&self.body).map_err(|e| eyre!("Response from {} is not UTF-8: {}", self.url, e))
  }
}

/// A response read back from a cache store.
#[derive(Debug, Clone)]
pub struct CachedAsset {
  pub response: AssetResponse,
  pub cached_at: DateTime<Utc>,
}

/// Versioned cache store name, rendered as `<prefix>-v<version>`.
///
/// Bumping the version produces a new store; older versions with the same
/// prefix are cleaned up on activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheName {
  prefix: String,
  version: u32,
}

impl CacheName {
  pub fn new(prefix: impl Into<String>, version: u32) -> Self {
    Self {
      prefix: prefix.into(),
      version,
    }
  }

  /// Parse a store name of the form `<prefix>-v<version>`.
  pub fn parse(name: &str) -> Option<Self> {
    let (prefix, version) = name.rsplit_once("-v")?;
    if prefix.is_empty() {
      return None;
    }
    let version = version.parse().ok()?;
    Some(Self::new(prefix, version))
  }

  pub fn prefix(&self) -> &str {
    &self.prefix
  }

  pub fn version(&self) -> u32 {
    self.version
  }

  /// Same prefix, different version.
  pub fn is_sibling_of(&self, other: &CacheName) -> bool {
    self.prefix == other.prefix && self.version != other.version
  }
}

impl fmt::Display for CacheName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-v{}", self.prefix, self.version)
  }
}
