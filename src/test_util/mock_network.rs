use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::worker::{Network, ShellRequest, ShellResponse, WorkerError};

/// Scripted asset origin. Unknown URLs answer 404.
#[derive(Default)]
pub struct MockNetwork {
    routes: Mutex<HashMap<String, ShellResponse>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, url: &str, response: ShellResponse) {
        self.routes.lock().unwrap().insert(url.to_string(), response);
    }

    /// While offline every fetch fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &ShellRequest) -> Result<ShellResponse, WorkerError> {
        let url = request.cache_key();
        self.calls.lock().unwrap().push(url.clone());

        if self.offline.load(Ordering::SeqCst) {
            return Err(WorkerError::Network("offline".to_string()));
        }
        Ok(self
            .routes
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .unwrap_or_else(|| ShellResponse::new(StatusCode::NOT_FOUND, "")))
    }
}
