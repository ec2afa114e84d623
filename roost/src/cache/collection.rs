use chrono::{DateTime, Utc};
use roost_core::{Request, Response};
use serde::{Deserialize, Serialize};

use super::CacheEntry;

/// Every stored variant of one resource URI.
///
/// Entries are kept in insertion order with at most one entry per distinct
/// combination of the request-header values named by `Vary`. The collection
/// is a plain value: managers swap whole collections, so readers holding a
/// snapshot never observe a partial update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheEntryCollection {
    entries: Vec<CacheEntry>,
}

impl CacheEntryCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// First entry, in insertion order, selected by `request`.
    pub fn lookup(&self, request: &Request) -> Option<&CacheEntry> {
        self.entries.iter().find(|entry| entry.matches(request))
    }

    /// Stores `response` for `request`.
    ///
    /// Entries selected by `request` are replaced by the new one, which takes
    /// the position of the first of them. Otherwise the new entry is
    /// appended. Responses carrying `Vary: *` are refused and `false` is
    /// returned.
    pub fn store(&mut self, request: Request, response: Response, stored_at: DateTime<Utc>) -> bool {
        if response.headers().get_list("vary").any(|name| name == "*") {
            return false;
        }
        let entry = CacheEntry::new(request, response, stored_at);
        match self.entries.iter().position(|e| e.matches(entry.request())) {
            Some(position) => {
                let mut index = 0;
                self.entries.retain(|e| {
                    let keep = index <= position || !e.matches(entry.request());
                    index += 1;
                    keep
                });
                self.entries[position] = entry;
            }
            None => self.entries.push(entry),
        }
        true
    }

    /// Removes every entry selected by `request`, returning how many were
    /// dropped.
    pub fn remove_matching(&mut self, request: &Request) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !entry.matches(request));
        before - self.entries.len()
    }

    /// Number of stored variants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no variant is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored variants in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.iter()
    }
}
