use std::sync::Arc;

use anyhow::{Context, Result};
use mediafiler_config::{Config, ConfigWarnings};
use mediafiler_core::{MediaIndex, RETENTION_WINDOW, Sweeper, SweeperHandle};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{infra::app_state::AppState, routes::create_app};

/// Background work started once the index is open and before the listener
/// accepts connections.
pub trait StartupHooks: Send + Sync {
    fn run(&self, state: &AppState, shutdown: &CancellationToken) -> Result<BackgroundTasks>;
}

/// Starts the reconciliation sweeper.
#[derive(Debug, Default)]
pub struct ProdStartupHooks;

impl StartupHooks for ProdStartupHooks {
    fn run(&self, state: &AppState, shutdown: &CancellationToken) -> Result<BackgroundTasks> {
        let sweeper = Sweeper::new(Arc::clone(&state.index)).spawn(shutdown.child_token());
        info!(
            retention_secs = RETENTION_WINDOW.as_secs(),
            archive_enabled = state.archive_enabled(),
            "sweeper scheduled"
        );
        Ok(BackgroundTasks {
            sweeper: Some(sweeper),
        })
    }
}

#[derive(Debug, Default)]
pub struct NoopStartupHooks;

impl StartupHooks for NoopStartupHooks {
    fn run(&self, _state: &AppState, _shutdown: &CancellationToken) -> Result<BackgroundTasks> {
        Ok(BackgroundTasks::default())
    }
}

#[derive(Debug, Default)]
pub struct BackgroundTasks {
    sweeper: Option<SweeperHandle>,
}

impl BackgroundTasks {
    pub fn sweeper(&self) -> Option<&SweeperHandle> {
        self.sweeper.as_ref()
    }

    pub async fn shutdown(self) {
        if let Some(sweeper) = self.sweeper {
            sweeper.shutdown().await;
        }
    }
}

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub fn log_config_warnings(warnings: &ConfigWarnings) {
    for warning in warnings.iter() {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }
}

/// Prepare the archive directory and open the index, recovering any markers
/// left by a previous run.
pub fn open_index(config: &Config) -> Result<Arc<MediaIndex>> {
    config
        .ensure_directories()
        .context("failed to create archive directory")?;

    for root in &config.media.roots {
        info!(root = %root.display(), "media root");
    }
    match config.media.archive_dir() {
        Some(dir) => info!(archive_dir = %dir.display(), "archiving enabled"),
        None => info!("archiving disabled"),
    }

    let index = MediaIndex::with_system_clock(config.index_settings())
        .context("failed to open media index")?;
    Ok(Arc::new(index))
}

/// Bind, serve until `shutdown` is cancelled, then stop background tasks.
pub async fn serve<H>(
    config: &Config,
    index: Arc<MediaIndex>,
    hooks: &H,
    shutdown: CancellationToken,
) -> Result<()>
where
    H: StartupHooks,
{
    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(address = %listener.local_addr()?, "starting mediafiler server");

    let state = AppState::new(index);
    let tasks = hooks.run(&state, &shutdown)?;

    let signal = shutdown.clone();
    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(async move { signal.cancelled().await })
        .await
        .context("server error")?;

    shutdown.cancel();
    tasks.shutdown().await;
    info!("server stopped");
    Ok(())
}

/// Cancel `shutdown` on Ctrl-C.
pub async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                warn!(error = %err, "failed to listen for shutdown signal");
                return;
            }
            info!("shutdown requested");
            shutdown.cancel();
        }
        _ = shutdown.cancelled() => {}
    }
}
