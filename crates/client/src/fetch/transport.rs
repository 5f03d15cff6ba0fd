//! HTTP transport seam.
//!
//! The executor only needs "send one request, get status and body back";
//! [`ReqwestTransport`] is the production implementation.

use bytes::Bytes;
use campus_core::Error;
use reqwest::{Client, Method, StatusCode, Url, header};
use serde_json::Value;
use std::time::Duration;

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// User agent string (default: "campus/0.1")
    pub user_agent: String,

    /// Request timeout; `None` leaves reqwest's default (no timeout).
    pub timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { user_agent: "campus/0.1".to_string(), timeout: None }
    }
}

/// `Accept` value for collection queries and mutations.
pub const ACCEPT_JSON: &str = "application/json";

/// `Accept` value for downloads.
pub const ACCEPT_ANY: &str = "*/*";

/// A single outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub accept: &'static str,
    pub body: Option<Value>,
}

impl HttpRequest {
    /// GET expecting JSON.
    pub fn get(url: Url) -> Self {
        Self { method: Method::GET, url, accept: ACCEPT_JSON, body: None }
    }

    pub fn with_accept(mut self, accept: &'static str) -> Self {
        self.accept = accept;
        self
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Response body as text, or the canonical reason phrase when empty.
    pub fn body_or_status_text(&self) -> String {
        let text = String::from_utf8_lossy(&self.body);
        let text = text.trim();
        if text.is_empty() {
            self.status.canonical_reason().unwrap_or("Unknown Status").to_string()
        } else {
            text.to_string()
        }
    }

    /// Whether the server labelled the body as an HTML page.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("text/html"))
    }
}

/// Transport-level failures; the request never produced a status.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("request timeout")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { TransportError::Timeout } else { TransportError::Network(err.to_string()) }
    }
}

/// Sends requests on behalf of the fetch executor.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// reqwest-backed transport with a cookie store, so session cookies set by
/// the API are sent back on later requests.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::ClientBuild(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .http
            .request(request.method, request.url)
            .header(header::ACCEPT, request.accept);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.bytes().await?;

        Ok(HttpResponse { status, content_type, body })
    }
}
