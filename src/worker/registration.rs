//! Production-only registration of the shell worker.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::{ShellWorker, WorkerError};
use crate::config::Environment;

/// Installs and activates `worker` in production.
///
/// Returns the active worker, or `None` when not in production or when
/// registration failed. A failure is logged and never stops the server.
pub async fn register_worker(environment: Environment, worker: ShellWorker) -> Option<Arc<ShellWorker>> {
    if environment != Environment::Production {
        debug!("Not in production, offline shell disabled");
        return None;
    }

    match install_and_activate(&worker).await {
        Ok(()) => Some(Arc::new(worker)),
        Err(e) => {
            error!("Service worker registration failed: {}", e);
            None
        }
    }
}

async fn install_and_activate(worker: &ShellWorker) -> Result<(), WorkerError> {
    let had_controller = worker.has_previous_version().await;

    worker.install().await?;
    if had_controller {
        worker.mark_update_found();
        info!("New content available; please refresh.");
    }

    let deleted = worker.activate().await?;
    debug!(
        cache = worker.cache_name(),
        deleted = deleted.len(),
        "Offline shell active"
    );
    Ok(())
}
