mod config;
mod entity;
mod error;
mod plugins;
mod prelude;
mod state;
mod sv;
mod utils;

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{config::Config, prelude::*, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "squad=debug,tower_http=debug,axum=trace,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  info!("Starting Squad API v{}", env!("CARGO_PKG_VERSION"));

  let config = Config::from_env()?;
  let app_state = Arc::new(AppState::new(config).await?);

  plugins::App::new()
    .register(plugins::seed::Plugin)
    .register(plugins::server::Plugin)
    .run(app_state)
    .await?;

  tokio::signal::ctrl_c().await.context("Failed to listen for shutdown")?;
  info!("Shutting down");

  Ok(())
}
