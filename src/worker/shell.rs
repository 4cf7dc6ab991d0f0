//! Shell worker: install/activate lifecycle and fetch handling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::{Method, Url};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::machine::{Command, Event, FetchMachine};
use super::network::Network;
use super::persist::ShellCacheDir;
use super::request::{classify, RequestClass, ShellRequest, ShellResponse};
use super::storage::CacheStorage;
use super::{WorkerError, OFFLINE_SHELL_DOCUMENT, SHELL_ASSETS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; the worker never handles requests
    Redundant,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Not intercepted; the caller goes to the network itself
    Passthrough,
    Respond(ShellResponse),
}

pub struct ShellWorker {
    storage: Arc<RwLock<CacheStorage>>,
    network: Arc<dyn Network>,
    origin: Url,
    cache_name: String,
    api_host_fragment: String,
    state: RwLock<WorkerState>,
    /// Where the caches are mirrored across restarts
    cache_dir: Option<ShellCacheDir>,
    /// One writer of the cache directory at a time
    persist_lock: Mutex<()>,
    update_found: AtomicBool,
}

impl ShellWorker {
    pub fn new(
        storage: Arc<RwLock<CacheStorage>>,
        network: Arc<dyn Network>,
        origin: Url,
        cache_name: impl Into<String>,
        api_host_fragment: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            network,
            origin,
            cache_name: cache_name.into(),
            api_host_fragment: api_host_fragment.into(),
            state: RwLock::new(WorkerState::Parsed),
            cache_dir: None,
            persist_lock: Mutex::new(()),
            update_found: AtomicBool::new(false),
        }
    }

    /// Mirrors the current cache to `dir` after every change and deletes the
    /// stored copies of caches dropped at activation.
    pub fn with_cache_dir(mut self, dir: ShellCacheDir) -> Self {
        self.cache_dir = Some(dir);
        self
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn storage(&self) -> Arc<RwLock<CacheStorage>> {
        self.storage.clone()
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn set_state(&self, state: WorkerState) {
        debug!(cache = %self.cache_name, ?state, "Shell worker state change");
        *self.state.write().await = state;
    }

    fn asset_url(&self, path: &str) -> Result<Url, WorkerError> {
        self.origin
            .join(path)
            .map_err(|e| WorkerError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Whether registration found an older shell version in control.
    pub fn update_found(&self) -> bool {
        self.update_found.load(Ordering::SeqCst)
    }

    pub(super) fn mark_update_found(&self) {
        self.update_found.store(true, Ordering::SeqCst);
    }

    /// Whether caches of another version exist, i.e. an older shell was in
    /// control before this one.
    pub async fn has_previous_version(&self) -> bool {
        self.storage
            .read()
            .await
            .keys()
            .iter()
            .any(|name| name != &self.cache_name)
    }

    // == Install ==
    /// Fetches every shell asset into the current named cache.
    ///
    /// Any failed or non-success fetch aborts the install and leaves the
    /// worker redundant.
    pub async fn install(&self) -> Result<(), WorkerError> {
        self.set_state(WorkerState::Installing).await;

        match self.precache().await {
            Ok(count) => {
                info!("Cached {} shell assets in {}", count, self.cache_name);
                self.set_state(WorkerState::Installed).await;
                debug!("Skipping wait, activating immediately");
                Ok(())
            }
            Err(e) => {
                self.set_state(WorkerState::Redundant).await;
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, WorkerError> {
        let mut fetched = Vec::with_capacity(SHELL_ASSETS.len());
        for asset in SHELL_ASSETS {
            let request = ShellRequest::get(self.asset_url(asset)?);
            let response = self.network.fetch(&request).await?;
            if !response.status.is_success() {
                return Err(WorkerError::BadStatus {
                    url: request.cache_key(),
                    status: response.status.as_u16(),
                });
            }
            fetched.push((request.cache_key(), response));
        }

        let count = fetched.len();
        {
            let mut storage = self.storage.write().await;
            let cache = storage.open(&self.cache_name);
            for (key, response) in fetched {
                cache.pin(key, response)?;
            }
        }
        self.persist().await;
        Ok(count)
    }

    /// Writes the current cache to the cache directory, if there is one.
    async fn persist(&self) {
        let Some(dir) = &self.cache_dir else {
            return;
        };
        let _writer = self.persist_lock.lock().await;
        let snapshot = self.storage.read().await.get(&self.cache_name).cloned();
        if let Some(cache) = snapshot {
            if let Err(e) = dir.save(&cache).await {
                warn!("Failed to persist {}: {}", self.cache_name, e);
            }
        }
    }

    // == Activate ==
    /// Deletes every named cache but the current one and takes control.
    ///
    /// Returns the deleted cache names.
    pub async fn activate(&self) -> Result<Vec<String>, WorkerError> {
        let state = self.state().await;
        if state != WorkerState::Installed {
            return Err(WorkerError::Lifecycle(state));
        }
        self.set_state(WorkerState::Activating).await;

        let deleted: Vec<String> = {
            let mut storage = self.storage.write().await;
            let stale: Vec<String> = storage
                .keys()
                .into_iter()
                .filter(|name| name != &self.cache_name)
                .collect();
            for name in &stale {
                info!("Deleting old cache: {}", name);
                storage.delete(name);
            }
            stale
        };
        if let Some(dir) = &self.cache_dir {
            for name in &deleted {
                if let Err(e) = dir.remove(name).await {
                    warn!("Failed to remove stored cache {}: {}", name, e);
                }
            }
        }

        self.set_state(WorkerState::Activated).await;
        debug!("Claiming open clients");
        Ok(deleted)
    }

    // == Fetch ==
    /// Handles one request. Non-GET requests, and any request before
    /// activation, pass through.
    pub async fn handle_fetch(&self, request: &ShellRequest) -> Result<FetchOutcome, WorkerError> {
        if request.method != Method::GET || self.state().await != WorkerState::Activated {
            return Ok(FetchOutcome::Passthrough);
        }

        let class = classify(request, &self.api_host_fragment);
        let fallback_key = self.asset_url(OFFLINE_SHELL_DOCUMENT)?.to_string();
        let (mut machine, mut command) = FetchMachine::start(
            class.strategy(),
            class == RequestClass::Navigation,
            request.cache_key(),
            fallback_key,
        );

        loop {
            let event = match command {
                Command::LookupCache { key } => {
                    let hit = self.storage.write().await.match_in(&self.cache_name, &key);
                    Event::CacheLookup(hit)
                }
                Command::FetchNetwork => Event::Network(self.network.fetch(request).await),
                Command::Store { key, response } => {
                    let result = self.storage.write().await.put_in(&self.cache_name, key, response);
                    match &result {
                        Ok(()) => self.persist().await,
                        Err(e) => warn!("Failed to cache {}: {}", request.url, e),
                    }
                    Event::CacheWrite(result)
                }
                Command::Respond(response) => {
                    debug!(url = %request.url, ?class, states = ?machine.history(), "Fetch handled");
                    return Ok(FetchOutcome::Respond(response));
                }
                Command::Fail(e) => {
                    debug!(url = %request.url, ?class, "Fetch failed: {}", e);
                    return Err(e);
                }
            };
            command = machine.advance(event)?;
        }
    }
}
