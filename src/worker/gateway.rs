//! Entry point for shell traffic that reaches the server.

use std::sync::Arc;

use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use reqwest::Url;

use super::{FetchOutcome, Network, ShellRequest, ShellResponse, ShellWorker, WorkerError};

/// Routes requests through the active shell worker, or straight to the
/// network when there is none or it passes the request through.
#[derive(Clone)]
pub struct ShellGateway {
    worker: Option<Arc<ShellWorker>>,
    network: Arc<dyn Network>,
    origin: Url,
}

impl ShellGateway {
    pub fn new(worker: Option<Arc<ShellWorker>>, network: Arc<dyn Network>, origin: Url) -> Self {
        Self {
            worker,
            network,
            origin,
        }
    }

    pub fn is_active(&self) -> bool {
        self.worker.is_some()
    }

    /// Builds the upstream request for `path_and_query` on the asset origin.
    ///
    /// The path is set on the origin, never resolved against it, so the
    /// request cannot leave the origin host.
    pub fn request(
        &self,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<ShellRequest, WorkerError> {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };
        if !path.starts_with('/') {
            return Err(WorkerError::InvalidUrl(path_and_query.to_string()));
        }

        let mut url = self.origin.clone();
        url.set_path(path);
        url.set_query(query);
        if url.origin() != self.origin.origin() {
            return Err(WorkerError::InvalidUrl(path_and_query.to_string()));
        }

        let mut request = ShellRequest::new(method, url);
        request.headers = headers;
        request.body = body;
        Ok(request)
    }

    pub async fn serve(&self, request: &ShellRequest) -> Result<ShellResponse, WorkerError> {
        if let Some(worker) = &self.worker {
            if let FetchOutcome::Respond(response) = worker.handle_fetch(request).await? {
                return Ok(response);
            }
        }
        self.network.fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::MockNetwork;
    use reqwest::StatusCode;

    #[tokio::test]
    async fn test_without_worker_goes_to_network() {
        let network = Arc::new(MockNetwork::new());
        network.route("http://app.local/app.js?v=2", ShellResponse::new(StatusCode::OK, "js"));
        let gateway = ShellGateway::new(None, network.clone(), Url::parse("http://app.local").unwrap());

        let request = gateway
            .request(Method::GET, "/app.js?v=2", HeaderMap::new(), Bytes::new())
            .unwrap();
        let response = gateway.serve(&request).await.unwrap();

        assert!(!gateway.is_active());
        assert_eq!(response.body, "js");
        assert_eq!(network.calls(), 1);
    }

    #[test]
    fn test_scheme_relative_path_stays_on_origin() {
        let network = Arc::new(MockNetwork::new());
        let gateway = ShellGateway::new(None, network, Url::parse("http://app.local").unwrap());

        let request = gateway
            .request(Method::GET, "//evil.example/steal?x=1", HeaderMap::new(), Bytes::new())
            .unwrap();

        assert_eq!(request.url.host_str(), Some("app.local"));
        assert_eq!(request.url.path(), "//evil.example/steal");
        assert_eq!(request.url.query(), Some("x=1"));
    }

    #[test]
    fn test_absolute_target_is_rejected() {
        let network = Arc::new(MockNetwork::new());
        let gateway = ShellGateway::new(None, network, Url::parse("http://app.local").unwrap());

        let err = gateway
            .request(Method::GET, "http://evil.example/steal", HeaderMap::new(), Bytes::new())
            .unwrap_err();
        assert!(matches!(err, WorkerError::InvalidUrl(_)));
    }
}
