//! Logical resource keys.
//!
//! A key names a collection independently of the URL it is eventually
//! fetched from. Segments are normalized at construction so that
//! `["/api", "news"]` and `["/api/news"]` are the same key.

use crate::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Ordered path segments identifying a fetchable collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    segments: Vec<String>,
}

impl ResourceKey {
    /// Build a key from path segments.
    ///
    /// Each segment is split on `/` and empty pieces are dropped.
    pub fn new<I, S>(segments: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<String> = segments
            .into_iter()
            .flat_map(|s| {
                s.as_ref()
                    .split('/')
                    .map(str::trim)
                    .filter(|piece| !piece.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();

        if segments.is_empty() {
            return Err(Error::InvalidKey("resource key has no path segments".into()));
        }

        Ok(Self { segments })
    }

    /// `/api/<resource>`
    pub fn api(resource: &str) -> Result<Self, Error> {
        Self::new(["api", resource])
    }

    /// `/api/profiles/<id>`. See [`ResourceKey::has_extension`] for ids containing a `.`.
    pub fn profile(id: &str) -> Result<Self, Error> {
        Self::new(["api", "profiles", id])
    }

    /// `/api/downloads/<filename>`
    pub fn download(filename: &str) -> Result<Self, Error> {
        Self::new(["api", "downloads", filename])
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Joined path with a leading slash. This is the cache identity.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Whether the last segment already carries a file extension.
    ///
    /// Any `.` after the first character counts, whatever follows it. A
    /// dotted id such as `/api/profiles/j.smith` is therefore fetched only at
    /// its exact path and never as `j.smith.json`; static hosting has to
    /// publish such records under the exact name.
    pub fn has_extension(&self) -> bool {
        self.segments
            .last()
            .and_then(|last| last.rfind('.'))
            .is_some_and(|idx| idx > 0)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

impl FromStr for ResourceKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new([s])
    }
}

impl Serialize for ResourceKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.path())
    }
}

impl<'de> Deserialize<'de> for ResourceKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
