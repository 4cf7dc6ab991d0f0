//! Network seam of the shell worker.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use reqwest::{Client, Url};

use super::request::{ResponseType, ShellRequest, ShellResponse};
use super::WorkerError;

#[async_trait]
pub trait Network: Send + Sync {
    /// Performs the request. Any HTTP status is a successful fetch; only
    /// transport failures are errors.
    async fn fetch(&self, request: &ShellRequest) -> Result<ShellResponse, WorkerError>;
}

/// Fetches from the real asset origin over HTTP.
pub struct UpstreamNetwork {
    http_client: Client,
    origin: Url,
}

impl UpstreamNetwork {
    pub fn new(origin: Url) -> Self {
        Self {
            http_client: Client::new(),
            origin,
        }
    }
}

fn strip_hop_headers(headers: &mut HeaderMap) {
    for name in [CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING] {
        headers.remove(name);
    }
}

#[async_trait]
impl Network for UpstreamNetwork {
    async fn fetch(&self, request: &ShellRequest) -> Result<ShellResponse, WorkerError> {
        tracing::debug!("Fetching {} {}", request.method, request.url);

        let mut headers = request.headers.clone();
        strip_hop_headers(&mut headers);

        let mut builder = self
            .http_client
            .request(request.method.clone(), request.url.clone())
            .headers(headers);
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| WorkerError::Network(e.to_string()))?;

        let response_type = if response.url().origin() == self.origin.origin() {
            ResponseType::Basic
        } else {
            ResponseType::Cors
        };
        let status = response.status();
        let mut headers = response.headers().clone();
        strip_hop_headers(&mut headers);
        let body = response
            .bytes()
            .await
            .map_err(|e| WorkerError::Network(e.to_string()))?;

        Ok(ShellResponse {
            status,
            headers,
            body,
            response_type,
        })
    }
}
