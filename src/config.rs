use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::cache::{AssetRequest, CacheName};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub server: ServerConfig,
  #[serde(default)]
  pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// Base URL of the task server; also the origin relative assets resolve against
  #[serde(default = "default_server_url")]
  pub url: String,
  /// HTTP timeout in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      url: default_server_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
  /// Cache store name prefix; the store is named `<prefix>-v<version>`
  #[serde(default = "default_cache_prefix")]
  pub prefix: String,
  /// Bump to invalidate the previous store
  #[serde(default = "default_cache_version")]
  pub version: u32,
  /// Resources pre-cached on install, relative to the server or absolute
  #[serde(default = "default_resources")]
  pub resources: Vec<String>,
}

impl Default for AssetsConfig {
  fn default() -> Self {
    Self {
      prefix: default_cache_prefix(),
      version: default_cache_version(),
      resources: default_resources(),
    }
  }
}

fn default_server_url() -> String {
  "http://127.0.0.1:5000".to_string()
}

fn default_timeout_secs() -> u64 {
  30
}

fn default_cache_prefix() -> String {
  "todo-list-cache".to_string()
}

fn default_cache_version() -> u32 {
  1
}

fn default_resources() -> Vec<String> {
  [
    "/",
    "/static/manifest.json",
    "/static/icon-192x192.png",
    "/static/icon-512x512.png",
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css",
  ]
  .iter()
  .map(|s| s.to_string())
  .collect()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./doable.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/doable/config.yaml
  ///
  /// Falls back to built-in defaults when no file is found.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("doable.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("doable").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    config.origin()?;
    Ok(config)
  }

  /// The server origin, parsed.
  pub fn origin(&self) -> Result<Url> {
    Url::parse(&self.server.url).map_err(|e| eyre!("Invalid server url '{}': {}", self.server.url, e))
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.server.timeout_secs)
  }

  pub fn cache_name(&self) -> CacheName {
    CacheName::new(self.assets.prefix.clone(), self.assets.version)
  }

  /// The resource list, resolved against the server origin.
  pub fn resource_requests(&self) -> Result<Vec<AssetRequest>> {
    let origin = self.origin()?;
    self
      .assets
      .resources
      .iter()
      .map(|id| AssetRequest::resolve(&origin, id))
      .collect()
  }
}

/// Directory for the asset database and log files.
pub fn data_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("doable"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.server.url, "http://127.0.0.1:5000");
    assert_eq!(config.cache_name().to_string(), "todo-list-cache-v1");
    assert_eq!(config.assets.resources.len(), 5);
    assert_eq!(config.timeout(), Duration::from_secs(30));
  }

  #[test]
  fn test_parse_partial_file_keeps_defaults() {
    let config = Config::parse("server:\n  url: https://todo.example.com\nassets:\n  version: 3\n").unwrap();
    assert_eq!(config.server.url, "https://todo.example.com");
    assert_eq!(config.server.timeout_secs, 30);
    assert_eq!(config.cache_name().to_string(), "todo-list-cache-v3");
    assert_eq!(config.assets.resources.len(), 5);
  }

  #[test]
  fn test_parse_rejects_bad_url() {
    assert!(Config::parse("server:\n  url: not a url\n").is_err());
  }

  #[test]
  fn test_resource_requests_resolve_against_origin() {
    let config = Config::parse("server:\n  url: https://todo.example.com/app/\n").unwrap();
    let urls: Vec<String> = config
      .resource_requests()
      .unwrap()
      .into_iter()
      .map(|r| r.url.to_string())
      .collect();
    assert_eq!(urls[0], "https://todo.example.com/");
    assert_eq!(urls[1], "https://todo.example.com/static/manifest.json");
    assert!(urls[4].starts_with("https://cdn.jsdelivr.net/"));
  }

  #[test]
  fn test_load_missing_explicit_path_fails() {
    let err = Config::load(Some(Path::new("/nonexistent/doable.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
