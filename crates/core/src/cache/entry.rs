//! Per-key cache entry and its lifecycle.

use crate::{FetchOutcome, QueryError, ResourceKey};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Lifecycle of a cache entry: `Idle -> Loading -> (Success | Error)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Last known state of one resource key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key: ResourceKey,
    pub value: Option<Value>,
    pub error: Option<QueryError>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub state: EntryState,
}

impl CacheEntry {
    pub fn idle(key: ResourceKey) -> Self {
        Self { key, value: None, error: None, fetched_at: None, state: EntryState::Idle }
    }

    /// The settled outcome, if the entry has one.
    pub fn outcome(&self) -> Option<FetchOutcome> {
        match self.state {
            EntryState::Success => Some(Ok(self.value.clone().unwrap_or(Value::Null))),
            EntryState::Error => self.error.clone().map(Err),
            EntryState::Idle | EntryState::Loading => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, EntryState::Success | EntryState::Error)
    }

    pub(crate) fn start_loading(&mut self) {
        self.state = EntryState::Loading;
    }

    pub(crate) fn succeed(&mut self, value: Value) {
        self.value = Some(value);
        self.error = None;
        self.fetched_at = Some(Utc::now());
        self.state = EntryState::Success;
    }

    pub(crate) fn fail(&mut self, error: QueryError) {
        self.value = None;
        self.error = Some(error);
        self.state = EntryState::Error;
    }

    /// Keep serving the previous value after a failed refresh.
    pub(crate) fn keep_stale(&mut self) {
        self.error = None;
        self.state = EntryState::Success;
    }
}
