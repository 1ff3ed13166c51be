//! Lifecycle driver for the asset cache.
//!
//! A worker moves through `Uninstalled -> Installing -> Installed ->
//! Activating -> Active` exactly once. Requests are only intercepted while the
//! worker is `Active`; before that they go straight to the network. A failed
//! install or activation leaves the worker `Redundant`, and a retry needs a
//! fresh worker.
//!
//! `start` is the one exception: when the update fails but the store was
//! completed by an earlier run, that copy stays in control and the worker
//! goes straight from `Installing` to `Active`.

use color_eyre::{eyre::eyre, Report, Result};
use std::fmt;
use tracing::{error, info, warn};

use super::layer::AssetCache;
use super::network::Fetch;
use super::storage::CacheStorage;
use super::traits::{AssetRequest, AssetResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
  Uninstalled,
  Installing,
  Installed,
  Activating,
  Active,
  Redundant,
}

impl fmt::Display for WorkerState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      WorkerState::Uninstalled => "uninstalled",
      WorkerState::Installing => "installing",
      WorkerState::Installed => "installed",
      WorkerState::Activating => "activating",
      WorkerState::Active => "active",
      WorkerState::Redundant => "redundant",
    };
    f.write_str(label)
  }
}

pub struct AssetWorker<S: CacheStorage, N: Fetch> {
  cache: AssetCache<S>,
  network: N,
  resources: Vec<AssetRequest>,
  state: WorkerState,
}

impl<S: CacheStorage, N: Fetch> AssetWorker<S, N> {
  pub fn new(cache: AssetCache<S>, network: N, resources: Vec<AssetRequest>) -> Self {
    Self {
      cache,
      network,
      resources,
      state: WorkerState::Uninstalled,
    }
  }

  pub fn state(&self) -> WorkerState {
    self.state
  }

  pub fn cache(&self) -> &AssetCache<S> {
    &self.cache
  }

  /// Populate the cache store. Completes only once every resource is stored.
  pub async fn install(&mut self) -> Result<usize> {
    self.begin_install()?;
    match self.populate().await {
      Ok(count) => {
        self.state = WorkerState::Installed;
        Ok(count)
      }
      Err(e) => {
        self.state = WorkerState::Redundant;
        Err(e)
      }
    }
  }

  /// Enable interception, removing older versions of the store first.
  pub fn activate(&mut self) -> Result<Vec<String>> {
    if self.state != WorkerState::Installed {
      return Err(eyre!("Cannot activate a worker that is {}", self.state));
    }

    self.state = WorkerState::Activating;
    match self.cache.remove_stale_versions() {
      Ok(removed) => {
        self.state = WorkerState::Active;
        info!(store = %self.cache.name(), removed = removed.len(), "asset cache active");
        Ok(removed)
      }
      Err(e) => {
        self.state = WorkerState::Redundant;
        Err(e)
      }
    }
  }

  /// Install then activate, falling back to a store left by an earlier run.
  pub async fn start(&mut self) -> Result<()> {
    self.begin_install()?;
    match self.populate().await {
      Ok(_) => {
        self.state = WorkerState::Installed;
        self.activate()?;
        Ok(())
      }
      Err(e) => self.resume_previous(e),
    }
  }

  fn begin_install(&mut self) -> Result<()> {
    if self.state != WorkerState::Uninstalled {
      return Err(eyre!("Cannot install a worker that is {}", self.state));
    }
    self.state = WorkerState::Installing;
    info!(store = %self.cache.name(), resources = self.resources.len(), "installing asset cache");
    Ok(())
  }

  async fn populate(&self) -> Result<usize> {
    let network = &self.network;
    self
      .cache
      .install(&self.resources, |request| network.fetch(request))
      .await
      .map_err(|e| {
        error!(store = %self.cache.name(), error = %e, "asset cache install failed");
        e
      })
  }

  /// Keep serving a complete store after a failed update
  fn resume_previous(&mut self, install_error: Report) -> Result<()> {
    match self.cache.holds_all(&self.resources) {
      Ok(true) => {
        warn!(store = %self.cache.name(), "update failed, serving the copy from an earlier install");
        self.state = WorkerState::Active;
        Ok(())
      }
      _ => {
        self.state = WorkerState::Redundant;
        Err(install_error)
      }
    }
  }

  /// Handle an outgoing request.
  pub async fn handle_fetch(&self, request: AssetRequest) -> Result<AssetResponse> {
    let network = &self.network;
    if self.state == WorkerState::Active {
      self
        .cache
        .intercept(request, |request| network.fetch(request))
        .await
    } else {
      network.fetch(request).await
    }
  }
}
