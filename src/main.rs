//! Movie challenge server
//!
//! Architecture:
//! - SeaORM for database access (SQLite), schema owned by `migration`
//! - Axum for the HTTP API with rate limiting
//! - `sv::progress` aggregates challenge progress and XP
//! - Tokio for async runtime, plugins supervised with restart backoff

mod entity;
mod error;
mod plugins;
mod prelude;
mod session;
mod state;
mod sv;
mod utils;

use std::sync::Arc;

use futures::future::join_all;
use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
  plugins::{Supervisor, server},
  prelude::*,
  state::{AppState, Config},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "cinechallenge=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env().context("Invalid configuration")?;
  info!("Starting cinechallenge v{}", env!("CARGO_PKG_VERSION"));

  let app = Arc::new(AppState::new(config).await?);
  let plugins = Supervisor::new().register(server::Plugin).spawn(app);

  tokio::select! {
    _ = join_all(plugins) => warn!("All plugins exited"),
    signal = tokio::signal::ctrl_c() => {
      signal.context("Failed to listen for shutdown signal")?;
      info!("Shutting down");
    }
  }

  Ok(())
}
