//! Page-level status across a set of queries.
//!
//! A page renders once every query it depends on has succeeded; any single
//! failure is a page failure with a reload affordance.

use campus_core::{CacheEntry, EntryState, QueryError};

#[derive(Debug, Clone, PartialEq)]
pub enum PageStatus {
    Loading,
    Ready,
    /// First failure among the page's queries.
    Error(QueryError),
}

impl PageStatus {
    /// Fold per-key entries into one status. `None` means never requested.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a CacheEntry>>,
    {
        let mut loading = false;
        for entry in entries {
            match entry {
                Some(CacheEntry { state: EntryState::Error, error, .. }) => {
                    let err = error
                        .clone()
                        .unwrap_or_else(|| QueryError::network("query failed without detail"));
                    return PageStatus::Error(err);
                }
                Some(CacheEntry { state: EntryState::Success, .. }) => {}
                _ => loading = true,
            }
        }

        if loading { PageStatus::Loading } else { PageStatus::Ready }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PageStatus::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::ResourceKey;

    fn entry(resource: &str, state: EntryState) -> CacheEntry {
        let mut entry = CacheEntry::idle(ResourceKey::api(resource).unwrap());
        entry.state = state;
        if state == EntryState::Error {
            entry.error = Some(QueryError::forbidden("Forbidden"));
        }
        entry
    }

    #[test]
    fn test_all_success_is_ready() {
        let news = entry("news", EntryState::Success);
        let events = entry("events", EntryState::Success);
        assert_eq!(PageStatus::from_entries([Some(&news), Some(&events)]), PageStatus::Ready);
    }

    #[test]
    fn test_any_pending_is_loading() {
        let news = entry("news", EntryState::Success);
        let events = entry("events", EntryState::Loading);
        assert_eq!(PageStatus::from_entries([Some(&news), Some(&events)]), PageStatus::Loading);
        assert_eq!(PageStatus::from_entries([Some(&news), None]), PageStatus::Loading);
    }

    #[test]
    fn test_any_failure_wins() {
        let news = entry("news", EntryState::Loading);
        let partners = entry("partners", EntryState::Error);
        let status = PageStatus::from_entries([Some(&news), Some(&partners)]);
        assert_eq!(status, PageStatus::Error(QueryError::forbidden("Forbidden")));
        assert!(!status.is_ready());
    }

    #[test]
    fn test_empty_page_is_ready() {
        assert!(PageStatus::from_entries(std::iter::empty()).is_ready());
    }
}
