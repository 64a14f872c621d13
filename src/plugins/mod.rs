pub mod server;

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::sleep};
use tracing::{error, info, warn};

use crate::state::AppState;

#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

/// Runs every registered plugin in its own task and restarts it when it
/// stops, waiting longer after each consecutive failure.
pub struct Supervisor {
  plugins: Vec<Arc<dyn Plugin>>,
  backoff: Duration,
  max_backoff: Duration,
}

impl Supervisor {
  pub fn new() -> Self {
    Self {
      plugins: Vec::new(),
      backoff: Duration::from_secs(1),
      max_backoff: Duration::from_secs(60),
    }
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Arc::new(plugin));
    self
  }

  pub fn spawn(self, app: Arc<AppState>) -> Vec<JoinHandle<()>> {
    let (backoff, max_backoff) = (self.backoff, self.max_backoff);

    self
      .plugins
      .into_iter()
      .map(|plugin| {
        let app = app.clone();
        tokio::spawn(supervise(plugin, app, backoff, max_backoff))
      })
      .collect()
  }
}

async fn supervise(
  plugin: Arc<dyn Plugin>,
  app: Arc<AppState>,
  backoff: Duration,
  max_backoff: Duration,
) {
  let name = plugin.name();
  let mut delay = backoff;
  info!("Plugin `{name}` started");

  loop {
    let handle = {
      let (plugin, app) = (plugin.clone(), app.clone());
      tokio::spawn(async move { plugin.start(app).await })
    };

    match handle.await {
      Ok(Ok(())) => {
        warn!("Plugin `{name}` returned, restarting");
        delay = backoff;
      }
      Ok(Err(err)) => error!("Plugin `{name}` failed: {err:#}"),
      Err(join_err) if join_err.is_cancelled() => {
        info!("Plugin `{name}` shut down");
        break;
      }
      Err(_) => error!("Plugin `{name}` panicked"),
    }

    sleep(delay).await;
    delay = (delay * 2).min(max_backoff);
    info!("Restarting plugin `{name}`");
  }
}
