mod app;
mod cache;
mod config;
mod fetcher;
mod handlers;
mod routes;
mod state;
mod views;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use folio_ssr::{Pipeline, PipelineConfig};
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    app::create_app,
    cache::init_cache_manager,
    config::Config,
    fetcher::HttpFetcher,
    routes::load_route_table,
    state::AppState,
    views::{default_documents, default_views},
};

/// Folio - Server-side rendering for headless WordPress sites
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,

    /// Base URL of the upstream site
    #[arg(long, env = "SITE_URL")]
    site_url: String,

    /// Path of the REST API under the site URL
    #[arg(long, default_value = "wp-json/wp/v2", env = "API_PREFIX")]
    api_prefix: String,

    /// JSON routes file. The built-in routes are used when unset
    #[arg(long, env = "ROUTES_PATH")]
    routes: Option<PathBuf>,

    /// Asset manifest mapping bundle names to hashed file names
    #[arg(long, env = "ASSET_MANIFEST_PATH")]
    asset_manifest: Option<PathBuf>,

    /// Manifest entry of the client bundle
    #[arg(long, default_value = "client.js", env = "CLIENT_BUNDLE")]
    client_bundle: String,

    /// Default Cache-Control max-age in seconds (0 sends no-cache)
    #[arg(long, default_value = "0", env = "CACHE_CONTROL_MAX_AGE")]
    cache_control_max_age: u64,

    /// Upstream request timeout in milliseconds
    #[arg(long, default_value = "10000", env = "FETCH_TIMEOUT_MS")]
    fetch_timeout_ms: u64,

    /// Directory served under /public
    #[arg(long, env = "PUBLIC_DIR")]
    public_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=debug,folio_ssr=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = init_state(&cli).await?;
    let app = create_app(state, cli.public_dir.clone());

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to CLI-specified host:port
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wire the cache, fetcher, routes and views into a pipeline.
async fn init_state(cli: &Cli) -> Result<AppState> {
    let config = Config::from_env();
    let cache = init_cache_manager(&config).await;

    let pipeline_config = PipelineConfig::new(
        &cli.site_url,
        &cli.api_prefix,
        &cli.client_bundle,
        cli.cache_control_max_age,
    )?;
    let fetcher = HttpFetcher::new(Duration::from_millis(cli.fetch_timeout_ms))?;

    let mut builder = Pipeline::builder(pipeline_config, Arc::new(fetcher))
        .routes(load_route_table(cli.routes.as_deref())?)
        .views(default_views())
        .documents(default_documents())
        .cache(cache.create_namespace("api", None));
    if let Some(path) = &cli.asset_manifest {
        builder = builder.manifest_path(path);
    }

    Ok(AppState::new(builder.build()?, cache))
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
