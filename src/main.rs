mod app;
mod cache;
mod cli;
mod commands;
mod config;
mod event;
mod logging;
mod manifest;
mod tasks;
#[cfg(test)]
mod test_server;
mod ui;

use clap::Parser;
use color_eyre::Result;
use tracing::info;

use cli::{Args, Command};
use config::Config;
use tasks::{TaskClient, TaskController};

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let _log_guard = logging::init(&config::data_dir()?.join("logs"))?;

  // Load configuration
  let mut config = Config::load(args.config.as_deref())?;

  // Override server if specified on command line
  if let Some(server) = args.server {
    config.server.url = server;
    config.origin()?;
  }

  match args.command {
    None => run_tui(config).await,
    Some(Command::List) => cli::list_tasks(&config).await,
    Some(Command::Assets(action)) => cli::run_assets(&config, action).await,
  }
}

async fn run_tui(config: Config) -> Result<()> {
  info!(server = %config.server.url, "starting");

  // The worker logs install failures; requests then go straight to the network
  let mut worker = cli::asset_worker(&config)?;
  if worker.start().await.is_err() {
    info!(state = %worker.state(), "continuing without the asset cache");
  }

  let title = manifest::app_title(&worker, &config.origin()?).await;
  let controller = TaskController::new(TaskClient::new(&config)?);

  let mut app = app::App::new(controller, title, config.server.url.clone());
  app.run().await
}
