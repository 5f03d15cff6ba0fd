//! In-memory cache for fetched resource collections.
//!
//! This module provides a process-lifetime keyed store. It supports:
//!
//! - One entry per [`ResourceKey`](crate::ResourceKey)
//! - At most one in-flight fetch per key (late callers share its outcome)
//! - Infinite staleness by default, with an optional finite stale time
//! - Watch channels that observe every state transition

pub mod entry;
pub mod store;

pub use entry::{CacheEntry, EntryState};
pub use store::ResourceCache;
