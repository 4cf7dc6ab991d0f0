//! Requests seen by the shell worker and the responses it hands back.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};

/// Where a response came from, as far as caching is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseType {
    /// Same origin as the shell
    Basic,
    /// Another origin, readable
    Cors,
    /// Another origin, unreadable
    Opaque,
}

#[derive(Debug, Clone)]
pub struct ShellRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ShellRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    /// A top-level page load: `Sec-Fetch-Mode: navigate`, or an `Accept`
    /// asking for HTML.
    pub fn is_navigation(&self) -> bool {
        let header = |name: &str| {
            self.headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
        };

        header("sec-fetch-mode").eq_ignore_ascii_case("navigate")
            || header(ACCEPT.as_str()).contains("text/html")
    }

    /// Key under which the response is cached.
    pub fn cache_key(&self) -> String {
        self.url.as_str().to_string()
    }
}

/// A response as fetched or as stored in a named cache.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub response_type: ResponseType,
}

/// Stored entries are plain copies of fetched responses.
pub type CachedResponse = ShellResponse;

impl ShellResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            response_type: ResponseType::Basic,
        }
    }

    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Only complete same-origin responses go into the cache.
    pub fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK && self.response_type == ResponseType::Basic
    }
}

// == Classification ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    NetworkFirst,
    CacheFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Data service traffic
    Api,
    Navigation,
    Asset,
}

impl RequestClass {
    pub fn strategy(self) -> Strategy {
        match self {
            RequestClass::Api => Strategy::NetworkFirst,
            RequestClass::Navigation | RequestClass::Asset => Strategy::CacheFirst,
        }
    }
}

/// Classifies a request. Paths under `/api` and hosts containing
/// `api_host_fragment` are API traffic.
pub fn classify(request: &ShellRequest, api_host_fragment: &str) -> RequestClass {
    let api_host = !api_host_fragment.is_empty()
        && request
            .url
            .host_str()
            .is_some_and(|host| host.contains(api_host_fragment));

    if request.url.path().starts_with("/api") || api_host {
        RequestClass::Api
    } else if request.is_navigation() {
        RequestClass::Navigation
    } else {
        RequestClass::Asset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> ShellRequest {
        ShellRequest::get(Url::parse(url).unwrap())
    }

    #[test]
    fn test_api_paths_and_hosts() {
        assert_eq!(classify(&request("http://app.local/api/stats"), "supabase"), RequestClass::Api);
        assert_eq!(
            classify(&request("https://xyz.supabase.co/rest/v1/expenses"), "supabase"),
            RequestClass::Api
        );
        assert_eq!(classify(&request("http://app.local/app.js"), "supabase"), RequestClass::Asset);
    }

    #[test]
    fn test_navigation_detection() {
        let by_mode = request("http://app.local/dashboard")
            .with_header(HeaderName::from_static("sec-fetch-mode"), "navigate");
        let by_accept = request("http://app.local/dashboard")
            .with_header(ACCEPT, "text/html,application/xhtml+xml");

        assert_eq!(classify(&by_mode, "supabase"), RequestClass::Navigation);
        assert_eq!(classify(&by_accept, "supabase"), RequestClass::Navigation);
        assert_eq!(RequestClass::Navigation.strategy(), Strategy::CacheFirst);
    }

    #[test]
    fn test_cacheable_responses() {
        assert!(ShellResponse::new(StatusCode::OK, "ok").is_cacheable());
        assert!(!ShellResponse::new(StatusCode::NOT_FOUND, "").is_cacheable());
        assert!(!ShellResponse::new(StatusCode::OK, "x")
            .with_type(ResponseType::Cors)
            .is_cacheable());
    }
}
