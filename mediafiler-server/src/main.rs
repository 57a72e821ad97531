use anyhow::Context;
use clap::Parser;
use mediafiler_config::{ConfigLoad, ConfigLoader, ServeArgs, load_env_file};
use mediafiler_server::infra::startup::{
    ProdStartupHooks, init_tracing, log_config_warnings, open_index, serve, shutdown_signal,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "mediafiler-server", version)]
#[command(about = "Browse, stream, delete and archive media files over HTTP")]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before parsing so `.env` can supply MEDIAFILER_* defaults.
    let env_file_loaded = load_env_file(None).context("failed to load .env file")?;
    let cli = Cli::parse();

    init_tracing();
    if env_file_loaded {
        info!("loaded .env file");
    }

    let ConfigLoad { config, warnings } = ConfigLoader::new(cli.serve)
        .load()
        .context("failed to load configuration")?;
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    log_config_warnings(&warnings);

    let index = open_index(&config)?;

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    serve(&config, index, &ProdStartupHooks, shutdown).await
}
