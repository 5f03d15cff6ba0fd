//! Resource key to URL resolution.
//!
//! On the development server every key is served at its raw path. Static
//! hosting serves pre-rendered files, so an extension-less key is tried as
//! `path.json` and then as `path` (order configurable).

use campus_core::{Environment, FallbackOrder, ResourceKey};
use url::Url;

/// Error type for base URL parsing failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse and normalize the origin every key is resolved against.
///
/// The scheme is required, matching `AppConfig::validate`.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Lowercase the host
/// 3. Drop query string and fragment
pub fn parse_base(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let host = host.to_lowercase();
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_query(None);
    parsed.set_fragment(None);

    Ok(parsed)
}

/// Which form of the key a candidate URL uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateForm {
    /// Extension-less path with `.json` appended.
    Json,
    /// Extension-less path as-is.
    Raw,
    /// Path that already carries its own extension; has no counterpart.
    Exact,
}

/// One concrete URL to try for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: Url,
    pub form: CandidateForm,
}

impl Candidate {
    pub fn is_json_suffixed(&self) -> bool {
        self.form == CandidateForm::Json
    }

    /// The other of `{path.json, path}`, used by the 403 fallback.
    pub fn counterpart(&self) -> Option<Candidate> {
        let mut url = self.url.clone();
        let path = self.url.path();
        match self.form {
            CandidateForm::Json => {
                url.set_path(path.strip_suffix(".json")?);
                Some(Candidate { url, form: CandidateForm::Raw })
            }
            CandidateForm::Raw => {
                url.set_path(&format!("{path}.json"));
                Some(Candidate { url, form: CandidateForm::Json })
            }
            CandidateForm::Exact => None,
        }
    }
}

/// Candidate paths for `key`, in fetch order. Pure; never fails.
pub fn candidate_paths(key: &ResourceKey, env: Environment, order: FallbackOrder) -> Vec<(String, CandidateForm)> {
    let path = key.path();

    if key.has_extension() {
        return vec![(path, CandidateForm::Exact)];
    }

    if env.is_dev() {
        return vec![(path, CandidateForm::Raw)];
    }

    let json = (format!("{path}.json"), CandidateForm::Json);
    let raw = (path, CandidateForm::Raw);
    match order {
        FallbackOrder::JsonFirst => vec![json, raw],
        FallbackOrder::RawFirst => vec![raw, json],
    }
}

/// Environment-aware resolver bound to a base URL.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    base: Url,
    env: Environment,
    order: FallbackOrder,
}

impl UrlResolver {
    pub fn new(base_url: &str, env: Environment, order: FallbackOrder) -> Result<Self, UrlError> {
        Ok(Self { base: parse_base(base_url)?, env, order })
    }

    pub fn environment(&self) -> Environment {
        self.env
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Ordered candidate URLs for `key`.
    pub fn resolve(&self, key: &ResourceKey) -> Vec<Candidate> {
        candidate_paths(key, self.env, self.order)
            .into_iter()
            .map(|(path, form)| Candidate { url: self.join(&path), form })
            .collect()
    }

    /// The key at its raw path regardless of environment (mutations).
    pub fn raw(&self, key: &ResourceKey) -> Candidate {
        let form = if key.has_extension() { CandidateForm::Exact } else { CandidateForm::Raw };
        Candidate { url: self.join(&key.path()), form }
    }

    /// The `.json` form of an extension-less key, whatever the environment.
    pub fn json_variant(&self, key: &ResourceKey) -> Option<Candidate> {
        if key.has_extension() {
            return None;
        }
        Some(Candidate { url: self.join(&format!("{}.json", key.path())), form: CandidateForm::Json })
    }

    /// Append `path` to the base URL's own path, keeping any prefix.
    fn join(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let prefix = self.base.path().trim_end_matches('/');
        url.set_path(&format!("{prefix}{path}"));
        url
    }
}
