pub mod seed;
pub mod server;

use std::sync::Arc;

use crate::{prelude::*, state::AppState};

/// A unit of startup work run against the shared state.
///
/// Long-running plugins spawn their own tasks and return once ready.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    let path = std::any::type_name::<Self>();
    path.strip_prefix("squad::plugins::").unwrap_or(path)
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

/// Plugins start sequentially, so seeding finishes before the server binds.
#[derive(Default)]
pub struct App {
  plugins: Vec<Box<dyn Plugin>>,
}

impl App {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Box::new(plugin));
    self
  }

  pub async fn run(self, app: Arc<AppState>) -> anyhow::Result<()> {
    for plugin in &self.plugins {
      let name = plugin.name();
      debug!(plugin = name, "starting");

      plugin
        .start(Arc::clone(&app))
        .await
        .with_context(|| format!("Plugin `{name}` failed to start"))?;

      info!(plugin = name, "started");
    }
    Ok(())
  }
}
