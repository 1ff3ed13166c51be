//! Command-line interface: argument parsing and the non-interactive commands.

use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::cache::{
  AssetCache, AssetRequest, AssetWorker, CacheName, CacheStorage, Fetch, HttpFetcher,
  SqliteStorage,
};
use crate::config::Config;
use crate::tasks::{TaskClient, TaskController};
use crate::ui::renderfns::truncate;
use crate::ui::views::render_plain;

#[derive(Parser, Debug)]
#[command(name = "doable")]
#[command(about = "A terminal to-do list client with an offline asset cache")]
#[command(version)]
pub struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/doable/config.yaml)
  #[arg(short, long)]
  pub config: Option<PathBuf>,

  /// Task server URL, overriding the config file
  #[arg(short, long)]
  pub server: Option<String>,

  /// Run a command instead of the interactive UI
  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
  /// Print the task list and exit
  List,
  /// Inspect and manage the offline asset cache
  #[command(subcommand)]
  Assets(AssetsCommand),
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum AssetsCommand {
  /// Populate the current store and remove older versions
  Install,
  /// Fetch a resource, answering from the cache when possible
  Get {
    /// Absolute URL or path relative to the server
    url: String,
  },
  /// List stores and the requests they hold
  List,
  /// Delete a store
  Purge { name: String },
}

/// Worker over the on-disk store, configured from `config`
pub fn asset_worker(config: &Config) -> Result<AssetWorker<SqliteStorage, HttpFetcher>> {
  let cache = AssetCache::new(SqliteStorage::open()?, config.cache_name());
  let network = HttpFetcher::new(config.timeout())?;
  Ok(AssetWorker::new(cache, network, config.resource_requests()?))
}

pub async fn list_tasks(config: &Config) -> Result<()> {
  let controller = TaskController::new(TaskClient::new(config)?);
  let table = controller.load().await?;
  print!("{}", render_plain(&table));
  Ok(())
}

pub async fn run_assets(config: &Config, action: AssetsCommand) -> Result<()> {
  match action {
    AssetsCommand::Install => {
      let mut worker = asset_worker(config)?;
      let count = worker.install().await?;
      let removed = worker.activate()?;

      println!("Installed {} resources into {}", count, worker.cache().name());
      for store in removed {
        println!("Removed {}", store);
      }
    }
    AssetsCommand::Get { url } => {
      let cache = AssetCache::new(SqliteStorage::open()?, config.cache_name());
      let network = HttpFetcher::new(config.timeout())?;
      let request = AssetRequest::resolve(&config.origin()?, &url)?;
      print!("{}", fetch_report(&cache, &network, request).await?);
    }
    AssetsCommand::List => {
      print!("{}", store_listing(&SqliteStorage::open()?)?);
    }
    AssetsCommand::Purge { name } => {
      let storage = SqliteStorage::open()?;
      if !storage.delete_store(&name)? {
        return Err(eyre!("No such store: {}", name));
      }
      println!("Deleted {}", name);
    }
  }
  Ok(())
}

/// Run an intercepted fetch and describe where the answer came from
async fn fetch_report<S: CacheStorage, N: Fetch>(
  cache: &AssetCache<S>,
  network: &N,
  request: AssetRequest,
) -> Result<String> {
  let key = request.key();
  let cached = request.is_cacheable()
    && cache
      .storage()
      .match_request(&cache.name().to_string(), &key)?
      .is_some();

  let response = cache
    .intercept(request, |request| network.fetch(request))
    .await?;

  let mut out = String::new();
  writeln!(out, "status:  {}", response.status)?;
  writeln!(out, "source:  {}", if cached { "cache" } else { "network" })?;
  writeln!(out, "url:     {}", response.url)?;
  if let Some(content_type) = response.header("content-type") {
    writeln!(out, "type:    {}", content_type)?;
  }
  writeln!(out, "bytes:   {}", response.body.len())?;
  if let Some(line) = response.text().ok().and_then(|t| t.lines().find(|l| !l.trim().is_empty())) {
    writeln!(out, "preview: {}", truncate(line.trim(), 60))?;
  }
  Ok(out)
}

/// Every store with its entries, oldest version first
fn store_listing<S: CacheStorage>(storage: &S) -> Result<String> {
  let mut names = storage.store_names()?;
  names.sort_by_key(|name| {
    CacheName::parse(name)
      .map(|n| (n.prefix().to_string(), n.version()))
      .unwrap_or_else(|| (name.clone(), 0))
  });

  if names.is_empty() {
    return Ok("No asset stores.\n".to_string());
  }

  let mut out = String::new();
  for name in names {
    let keys = storage.keys(&name)?;
    writeln!(out, "{} ({} entries)", name, keys.len())?;
    for key in keys {
      writeln!(out, "  {}", key)?;
    }
  }
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::AssetResponse;
  use async_trait::async_trait;
  use url::Url;

  struct StaticNetwork;

  #[async_trait]
  impl Fetch for StaticNetwork {
    async fn fetch(&self, request: AssetRequest) -> Result<AssetResponse> {
      Ok(AssetResponse::new(request.url.to_string(), 200, "live").with_header("Content-Type", "text/plain"))
    }
  }

  fn origin() -> Url {
    Url::parse("http://127.0.0.1:5000").unwrap()
  }

  #[test]
  fn test_parse_no_subcommand_runs_tui() {
    let args = Args::try_parse_from(["doable"]).unwrap();
    assert!(args.command.is_none());
    assert!(args.config.is_none());
  }

  #[test]
  fn test_parse_list_with_server_override() {
    let args = Args::try_parse_from(["doable", "--server", "http://todo.lan:5000", "list"]).unwrap();
    assert_eq!(args.server.as_deref(), Some("http://todo.lan:5000"));
    assert_eq!(args.command, Some(Command::List));
  }

  #[test]
  fn test_parse_assets_subcommands() {
    let args = Args::try_parse_from(["doable", "assets", "get", "/static/manifest.json"]).unwrap();
    assert_eq!(
      args.command,
      Some(Command::Assets(AssetsCommand::Get {
        url: "/static/manifest.json".to_string()
      }))
    );

    let args = Args::try_parse_from(["doable", "assets", "purge", "todo-list-cache-v1"]).unwrap();
    assert_eq!(
      args.command,
      Some(Command::Assets(AssetsCommand::Purge {
        name: "todo-list-cache-v1".to_string()
      }))
    );

    assert!(Args::try_parse_from(["doable", "assets", "purge"]).is_err());
  }

  #[tokio::test]
  async fn test_fetch_report_names_source() {
    let cache = AssetCache::new(
      SqliteStorage::in_memory().unwrap(),
      CacheName::new("todo-list-cache", 1),
    );
    let network = StaticNetwork;
    let request = AssetRequest::resolve(&origin(), "/static/manifest.json").unwrap();

    let report = fetch_report(&cache, &network, request.clone()).await.unwrap();
    assert!(report.contains("source:  network"));
    assert!(report.contains("type:    text/plain"));

    cache
      .install(&[request.clone()], |r| network.fetch(r))
      .await
      .unwrap();
    let report = fetch_report(&cache, &network, request).await.unwrap();
    assert!(report.contains("source:  cache"));
    assert!(report.contains("bytes:   4"));
    assert!(report.contains("preview: live"));
  }

  #[tokio::test]
  async fn test_store_listing() {
    let storage = std::sync::Arc::new(SqliteStorage::in_memory().unwrap());
    assert_eq!(store_listing(storage.as_ref()).unwrap(), "No asset stores.\n");

    let cache = AssetCache::shared(storage.clone(), CacheName::new("todo-list-cache", 2));
    let network = StaticNetwork;
    let request = AssetRequest::resolve(&origin(), "/").unwrap();
    cache
      .install(&[request], |r| network.fetch(r))
      .await
      .unwrap();

    let listing = store_listing(storage.as_ref()).unwrap();
    assert!(listing.starts_with("todo-list-cache-v2 (1 entries)\n"));
    assert!(listing.contains("GET http://127.0.0.1:5000/"));
  }
}
