//! TripTrack - group expense tracker backend
//!
//! Binary entry point: loads configuration, wires the data service, query
//! cache and offline shell together and serves the HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use reqwest::Url;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triptrack::remote::RestBackend;
use triptrack::worker::{
    register_worker, CacheStorage, ShellCacheDir, ShellGateway, ShellWorker, UpstreamNetwork,
    SHELL_CACHE_MAX_ENTRIES,
};
use triptrack::{create_router, spawn_cleanup_task, AppState, Config, ExpenseService};

/// Main entry point for the TripTrack server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the data service client and the cached expense service
/// 4. Start background query cache sweep
/// 5. Register the offline shell (production only)
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "triptrack=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TripTrack server");

    let config = Config::from_env().context("loading configuration")?;
    info!(
        "Configuration loaded: port={}, data_service={}, query_ttl={}s, environment={:?}",
        config.server_port, config.data_service_url, config.query_ttl, config.environment
    );

    let backend = Arc::new(RestBackend::new(
        &config.data_service_url,
        &config.data_service_key,
    ));
    let service = ExpenseService::new(backend, config.query_ttl());

    let cleanup_handle = spawn_cleanup_task(
        service.cache(),
        std::time::Duration::from_secs(config.cleanup_interval),
        config.query_gc_time(),
    );
    info!("Background query cache sweep started");

    let origin = Url::parse(&config.asset_origin).context("parsing ASSET_ORIGIN")?;
    let network = Arc::new(UpstreamNetwork::new(origin.clone()));
    let cache_dir = ShellCacheDir::new(&config.shell_cache_dir);
    let storage = match cache_dir.load(SHELL_CACHE_MAX_ENTRIES).await {
        Ok(storage) => {
            info!(
                "Shell caches loaded from {}: {:?}",
                cache_dir.path().display(),
                storage.keys()
            );
            storage
        }
        Err(e) => {
            warn!("Starting with an empty shell cache: {}", e);
            CacheStorage::default()
        }
    };
    let worker = ShellWorker::new(
        Arc::new(RwLock::new(storage)),
        network.clone(),
        origin.clone(),
        config.cache_name(),
        config.api_host_fragment.clone(),
    )
    .with_cache_dir(cache_dir);
    let worker = register_worker(config.environment, worker).await;
    if worker.is_some() {
        info!("Offline shell active ({})", config.cache_name());
    }

    let state = AppState::new(service, ShellGateway::new(worker, network, origin));
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("serving HTTP")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
