//! HTTP fetch pipeline with static-hosting fallbacks.
//!
//! ### Candidate Resolution
//! - Development: the raw path only.
//! - Production: `path.json` then `path` for extension-less keys.
//!
//! ### Fallback Policy
//! - 403: try the key's other form (`path` <-> `path.json`) once, then fail
//!   with `FORBIDDEN`.
//! - 404 in production on an extension-less key: try the next candidate once
//!   (whichever form the configured order puts second), then fail with
//!   `NOT_FOUND`.
//! - 401: resolve to `null` or fail with `UNAUTHORIZED`, per configuration.
//!   Downloads always fail; there is no empty file.
//! - Anything else non-2xx fails immediately with `HTTP_ERROR`.
//! - A 2xx HTML page where JSON was expected fails with `DECODE_ERROR`.
//!
//! At most two requests are made per execution. There is no backoff.

pub mod resolver;
pub mod transport;

use bytes::Bytes;
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use std::sync::Arc;

pub use resolver::{Candidate, CandidateForm, UrlError, UrlResolver, candidate_paths, parse_base};
pub use transport::{
    ACCEPT_ANY, ACCEPT_JSON, HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportConfig, TransportError,
};

use campus_core::{Environment, FetchOutcome, QueryError, UnauthorizedPolicy};

/// Upper bound on requests for one execution.
const MAX_ATTEMPTS: usize = 2;

/// Configuration for the fetch executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchConfig {
    pub environment: Environment,
    pub on_unauthorized: UnauthorizedPolicy,
}

/// Runs the fallback policy over a resolver's candidates.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct FetchExecutor {
    transport: Arc<dyn Transport>,
    config: FetchConfig,
}

impl FetchExecutor {
    pub fn new(transport: Arc<dyn Transport>, config: FetchConfig) -> Self {
        Self { transport, config }
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch a JSON collection, applying the fallback policy.
    pub async fn execute(&self, candidates: &[Candidate]) -> FetchOutcome {
        match self.run(candidates, ACCEPT_JSON).await? {
            Some(response) => decode_json(&response),
            None => Ok(Value::Null),
        }
    }

    /// Fetch a raw body (downloads), applying the fallback policy.
    pub async fn fetch_bytes(&self, candidates: &[Candidate]) -> Result<Bytes, QueryError> {
        match self.run(candidates, ACCEPT_ANY).await? {
            Some(response) => Ok(response.body),
            None => Err(QueryError::unauthorized("Unauthorized")),
        }
    }

    /// Single request with no fallback, for mutations.
    pub async fn send(&self, method: Method, candidate: &Candidate, body: Option<Value>) -> FetchOutcome {
        let request = HttpRequest { method, url: candidate.url.clone(), accept: ACCEPT_JSON, body };
        let response = self.attempt(request).await?;
        let status = response.status;

        if status.is_success() {
            return decode_json(&response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return self.unauthorized(&response).map(|_| Value::Null);
        }
        Err(QueryError::from_status(status.as_u16(), response.body_or_status_text()))
    }

    /// Walk the candidates. `Ok(None)` is a 401 under the return-empty policy.
    async fn run(&self, candidates: &[Candidate], accept: &'static str) -> Result<Option<HttpResponse>, QueryError> {
        let Some(first) = candidates.first() else {
            return Err(QueryError::not_found("no candidate URLs"));
        };

        let mut tried: Vec<Url> = Vec::with_capacity(MAX_ATTEMPTS);
        let mut current = first.clone();
        let mut forbidden: Option<String> = None;
        let static_host = !self.config.environment.is_dev();

        loop {
            let response = self
                .attempt(HttpRequest::get(current.url.clone()).with_accept(accept))
                .await?;
            tried.push(current.url.clone());
            let status = response.status;

            if status.is_success() {
                return Ok(Some(response));
            }
            if status == StatusCode::UNAUTHORIZED {
                return self.unauthorized(&response).map(|_| None);
            }
            if let Some(message) = forbidden.take() {
                // the 403 alternate failed too
                return Err(QueryError::forbidden(message));
            }

            let untried = |c: &Candidate| !tried.contains(&c.url);
            let fallback = if tried.len() >= MAX_ATTEMPTS {
                None
            } else {
                match status {
                    StatusCode::FORBIDDEN => current.counterpart().filter(untried),
                    StatusCode::NOT_FOUND if static_host && current.form != CandidateForm::Exact => {
                        candidates.iter().find(|&c| untried(c)).cloned()
                    }
                    _ => None,
                }
            };

            let Some(next) = fallback else {
                return Err(QueryError::from_status(status.as_u16(), response.body_or_status_text()));
            };

            tracing::warn!(
                status = status.as_u16(),
                from = %current.url,
                to = %next.url,
                "retrying with fallback candidate"
            );
            if status == StatusCode::FORBIDDEN {
                forbidden = Some(response.body_or_status_text());
            }
            current = next;
        }
    }

    async fn attempt(&self, request: HttpRequest) -> Result<HttpResponse, QueryError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| QueryError::network(e.to_string()))?;
        tracing::debug!(status = response.status.as_u16(), bytes = response.body.len(), "received response");
        Ok(response)
    }

    fn unauthorized(&self, response: &HttpResponse) -> Result<(), QueryError> {
        match self.config.on_unauthorized {
            UnauthorizedPolicy::ReturnEmpty => {
                tracing::debug!("401 resolved as empty result");
                Ok(())
            }
            UnauthorizedPolicy::Raise => Err(QueryError::unauthorized(response.body_or_status_text())),
        }
    }
}

fn decode_json(response: &HttpResponse) -> FetchOutcome {
    if response.is_html() {
        return Err(QueryError::decode("expected JSON, got an HTML page"));
    }
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&response.body).map_err(|e| QueryError::decode(format!("invalid JSON body: {e}")))
}
