//! Scripted in-memory transport for unit tests.

use crate::fetch::{HttpRequest, HttpResponse, Transport, TransportError};
use bytes::Bytes;
use reqwest::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Serves queued responses per URL path and records every request.
///
/// The last queued response for a path repeats; unscripted paths get 404.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<HttpResponse>>>,
    calls: Mutex<Vec<String>>,
    accepts: Mutex<Vec<&'static str>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Self::default() }
    }

    pub(crate) fn respond(self, path: &str, status: u16, body: &str) -> Self {
        self.respond_typed(path, status, "application/json", body)
    }

    pub(crate) fn respond_typed(self, path: &str, status: u16, content_type: &str, body: &str) -> Self {
        let response = HttpResponse {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: Some(content_type.to_string()),
            body: Bytes::from(body.to_string()),
        };
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Paths requested so far, in order. Non-GET calls are prefixed with the method.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// `Accept` header of every request, in order.
    pub(crate) fn accepts(&self) -> Vec<&'static str> {
        self.accepts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let path = request.url.path().to_string();
        let label = if request.method == reqwest::Method::GET { path.clone() } else { format!("{} {path}", request.method) };
        self.calls.lock().unwrap().push(label);
        self.accepts.lock().unwrap().push(request.accept);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if path == "/unreachable" {
            return Err(TransportError::Network("connection refused".to_string()));
        }

        let mut routes = self.routes.lock().unwrap();
        let response = match routes.get_mut(&path) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        Ok(response.unwrap_or(HttpResponse {
            status: StatusCode::NOT_FOUND,
            content_type: None,
            body: Bytes::new(),
        }))
    }
}
