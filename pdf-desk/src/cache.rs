//! Listing query cache.
//!
//! One entry per `(date filter, page)` pair. Entries are never evicted;
//! they only go stale after the freshness window and get replaced by the
//! next successful fetch for the same key.

use std::collections::HashMap;
use std::time::Duration;

use pdf_archive::{Document, ListQuery, ListResponse};
use tokio::time::Instant;

pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub date: Option<time::Date>,
    pub page: u32,
}

impl CacheKey {
    pub fn new(date: Option<time::Date>, page: u32) -> Self {
        Self { date, page }
    }

    pub fn query(&self, limit: u32) -> ListQuery {
        ListQuery {
            date: self.date,
            page: self.page,
            limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub records: Vec<Document>,
    pub total_pages: u32,
    pub total: Option<u64>,
    pub fetched_at: Instant,
}

impl CacheEntry {
    pub fn from_response(response: ListResponse, fetched_at: Instant) -> Self {
        Self {
            records: response.data,
            total_pages: response.pagination.total_pages,
            total: response.pagination.total,
            fetched_at,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Lookup<'a> {
    Fresh(&'a CacheEntry),
    Stale(&'a CacheEntry),
    Miss,
}

#[derive(Debug)]
pub struct QueryCache {
    entries: HashMap<CacheKey, CacheEntry>,
    freshness: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS)
    }
}

impl QueryCache {
    pub fn new(freshness: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            freshness,
        }
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    pub fn lookup(&self, key: &CacheKey, now: Instant) -> Lookup<'_> {
        match self.entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.fetched_at) < self.freshness => {
                Lookup::Fresh(entry)
            }
            Some(entry) => Lookup::Stale(entry),
            None => Lookup::Miss,
        }
    }

    pub fn insert(&mut self, key: CacheKey, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    pub fn get(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
