use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// One rule document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    content: Arc<str>,
}

impl Entry {
    pub fn new(key: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        Self {
            key: key.into(),
            content: content.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Immutable result of one scan: key → entry, iterated in ascending key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    entries: BTreeMap<String, Entry>,
    created_at: SystemTime,
}

impl Snapshot {
    #[must_use]
    pub fn new(entries: BTreeMap<String, Entry>, created_at: SystemTime) -> Self {
        Self {
            entries,
            created_at,
        }
    }

    #[must_use]
    pub fn empty(created_at: SystemTime) -> Self {
        Self::new(BTreeMap::new(), created_at)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Age relative to `now`; a snapshot from the future (clock moved back) counts as fresh.
    #[must_use]
    pub fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.created_at).unwrap_or_default()
    }
}
