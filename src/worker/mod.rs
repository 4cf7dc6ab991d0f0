//! Offline Shell Worker
//!
//! Caches the application shell from the asset origin so pages keep
//! loading without a network. Static assets and navigations are served
//! cache-first, API traffic network-first. Each deployment version owns one
//! named cache; activation drops the others.

mod gateway;
mod lru;
mod machine;
mod network;
mod persist;
mod registration;
mod request;
mod shell;
mod storage;

pub use gateway::ShellGateway;
pub use machine::{Command, Event, FetchMachine, FetchState};
pub use network::{Network, UpstreamNetwork};
pub use persist::ShellCacheDir;
pub use registration::register_worker;
pub use request::{classify, CachedResponse, RequestClass, ResponseType, ShellRequest, ShellResponse, Strategy};
pub use shell::{FetchOutcome, ShellWorker, WorkerState};
pub use storage::{CacheStorage, NamedCache};

use crate::error::TrackerError;

// == Public Constants ==
/// Paths precached on install
pub const SHELL_ASSETS: [&str; 6] = [
    "/",
    "/index.html",
    "/manifest.webmanifest",
    "/favicon.ico",
    "/icons/icon-192.png",
    "/icons/icon-512.png",
];

/// Served to navigations when the network is down
pub const OFFLINE_SHELL_DOCUMENT: &str = "/index.html";

/// Entry limit of one named cache
pub const SHELL_CACHE_MAX_ENTRIES: usize = 256;

// == Worker Error ==
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkerError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status {status} for {url}")]
    BadStatus { url: String, status: u16 },

    #[error("cache {name} is full ({capacity} entries)")]
    CacheFull { name: String, capacity: usize },

    #[error("invalid url {0}")]
    InvalidUrl(String),

    #[error("cache storage: {0}")]
    Storage(String),

    #[error("cannot activate from state {0:?}")]
    Lifecycle(WorkerState),

    #[error("no transition for {event} event in state {state:?}")]
    InvalidTransition { state: FetchState, event: &'static str },
}

impl From<WorkerError> for TrackerError {
    fn from(err: WorkerError) -> Self {
        match err {
            WorkerError::Network(_) | WorkerError::BadStatus { .. } => TrackerError::Network(err.to_string()),
            WorkerError::CacheFull { .. } => TrackerError::CacheFull(err.to_string()),
            WorkerError::InvalidUrl(_) => TrackerError::NotFound(err.to_string()),
            WorkerError::Storage(_) | WorkerError::Lifecycle(_) | WorkerError::InvalidTransition { .. } => {
                TrackerError::Internal(err.to_string())
            }
        }
    }
}
