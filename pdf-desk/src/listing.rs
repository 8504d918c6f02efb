//! Filtered, paginated document listing.
//!
//! The controller owns the date filter and page, derives the active
//! [`CacheKey`] from them and hands out [`FetchTicket`]s whenever the key
//! needs data from the server. Tickets run without borrowing the
//! controller; their [`FetchOutcome`] is fed back through
//! [`ListingController::apply`], which ignores outcomes for keys that are
//! no longer active.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use pdf_archive::{Document, DocumentApi, DocumentId, FetchError, ListQuery, ListResponse};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheKey, Lookup, QueryCache};
use crate::format::{format_date, format_long_date, PICK_A_DATE};
use crate::navigation::NavigationSnapshot;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingStatus {
    Idle,
    Loading,
    Ready,
    Errored(FetchError),
}

/// A listing fetch that has been decided on but not yet run.
#[must_use = "a fetch ticket does nothing unless run"]
pub struct FetchTicket {
    key: CacheKey,
    query: ListQuery,
    api: Arc<dyn DocumentApi>,
}

impl FetchTicket {
    pub fn key(&self) -> CacheKey {
        self.key
    }

    pub async fn run(self) -> FetchOutcome {
        let result = self.api.list_documents(&self.query).await;
        FetchOutcome {
            key: self.key,
            result,
        }
    }
}

impl fmt::Debug for FetchTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchTicket")
            .field("key", &self.key)
            .field("query", &self.query)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub key: CacheKey,
    pub result: Result<ListResponse, FetchError>,
}

/// A rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub id: DocumentId,
    pub date_label: String,
    pub file_url: String,
}

pub struct ListingController {
    api: Arc<dyn DocumentApi>,
    cache: QueryCache,
    date_filter: Option<time::Date>,
    page: u32,
    limit: u32,
    total_pages: u32,
    status: ListingStatus,
    records: Vec<Document>,
    revalidating: bool,
    in_flight: HashSet<CacheKey>,
}

impl ListingController {
    pub fn new(api: Arc<dyn DocumentApi>, limit: u32, freshness: Duration) -> Self {
        Self {
            api,
            cache: QueryCache::new(freshness),
            date_filter: None,
            page: 1,
            limit: limit.max(1),
            total_pages: 1,
            status: ListingStatus::Idle,
            records: Vec::new(),
            revalidating: false,
            in_flight: HashSet::new(),
        }
    }

    pub fn active_key(&self) -> CacheKey {
        CacheKey::new(self.date_filter, self.page)
    }

    /// First load of the view.
    pub fn load(&mut self) -> Option<FetchTicket> {
        self.activate()
    }

    /// Re-show the active key, revalidating it if its entry went stale.
    /// Used when the view is shown again.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.activate()
    }

    /// Replace the date filter. Always restarts at page 1.
    pub fn set_date_filter(&mut self, date: Option<time::Date>) -> Option<FetchTicket> {
        debug!(?date, "date filter changed");
        self.date_filter = date;
        self.page = 1;
        self.activate()
    }

    pub fn reset_filter(&mut self) -> Option<FetchTicket> {
        self.set_date_filter(None)
    }

    /// Move to `page`, clamped into `1..=total_pages`.
    pub fn set_page(&mut self, page: u32) -> Option<FetchTicket> {
        let clamped = page.clamp(1, self.total_pages);
        if clamped != page {
            debug!(requested = page, clamped, "page request clamped");
        }
        if clamped == self.page {
            return None;
        }
        self.page = clamped;
        self.activate()
    }

    pub fn next_page(&mut self) -> Option<FetchTicket> {
        self.set_page(self.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> Option<FetchTicket> {
        self.set_page(self.page.saturating_sub(1))
    }

    /// Apply a finished fetch. Returns a follow-up ticket when the response
    /// forced the page to be clamped onto a key that still needs data.
    pub fn apply(&mut self, outcome: FetchOutcome) -> Option<FetchTicket> {
        let FetchOutcome { key, result } = outcome;
        self.in_flight.remove(&key);
        let is_active = key == self.active_key();

        match result {
            Ok(response) => {
                let entry = CacheEntry::from_response(response, Instant::now());
                self.cache.insert(key, entry.clone());

                if !is_active {
                    debug!(?key, active = ?self.active_key(), "discarding superseded listing response");
                    return None;
                }

                if self.show(&entry) {
                    return self.activate();
                }
                None
            }
            Err(error) => {
                if !is_active {
                    debug!(?key, %error, "discarding superseded listing failure");
                    return None;
                }

                warn!(?key, %error, "listing fetch failed");
                self.revalidating = false;
                self.status = ListingStatus::Errored(error);
                None
            }
        }
    }

    /// Run `ticket` to completion, including any clamp follow-ups.
    pub async fn settle(&mut self, ticket: Option<FetchTicket>) {
        let mut next = ticket;
        while let Some(ticket) = next {
            let outcome = ticket.run().await;
            next = self.apply(outcome);
        }
    }

    fn activate(&mut self) -> Option<FetchTicket> {
        loop {
            let key = self.active_key();
            let lookup = self.cache.lookup(&key, Instant::now());

            let (entry, stale) = match lookup {
                Lookup::Fresh(entry) => (entry.clone(), false),
                Lookup::Stale(entry) => (entry.clone(), true),
                Lookup::Miss => {
                    // total_pages keeps the last server answer until the
                    // new one arrives; `show` clamps if it shrank.
                    self.records.clear();
                    self.revalidating = false;
                    self.status = ListingStatus::Loading;
                    return self.issue(key);
                }
            };

            if self.show(&entry) {
                continue;
            }
            if !stale {
                return None;
            }

            // Keep showing cached rows while the refetch runs.
            self.revalidating = true;
            return self.issue(key);
        }
    }

    /// Display `entry`. Returns true when the page had to be pulled back.
    fn show(&mut self, entry: &CacheEntry) -> bool {
        self.records = entry.records.clone();
        self.total_pages = entry.total_pages.max(1);
        self.status = ListingStatus::Ready;
        self.revalidating = false;

        if self.page > self.total_pages {
            info!(
                from = self.page,
                to = self.total_pages,
                "page beyond last page, clamping"
            );
            self.page = self.total_pages;
            return true;
        }
        false
    }

    fn issue(&mut self, key: CacheKey) -> Option<FetchTicket> {
        if !self.in_flight.insert(key) {
            debug!(?key, "fetch already in flight");
            return None;
        }

        debug!(?key, "issuing listing fetch");
        Some(FetchTicket {
            key,
            query: key.query(self.limit),
            api: Arc::clone(&self.api),
        })
    }

    pub fn status(&self) -> &ListingStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == ListingStatus::Loading
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.status {
            ListingStatus::Errored(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_revalidating(&self) -> bool {
        self.revalidating
    }

    pub fn records(&self) -> &[Document] {
        &self.records
    }

    pub fn rows(&self) -> Vec<ListingRow> {
        self.records
            .iter()
            .map(|doc| ListingRow {
                id: doc.id.clone(),
                date_label: format_date(doc.date.as_deref()),
                file_url: doc.file.clone(),
            })
            .collect()
    }

    pub fn showing_count(&self) -> usize {
        self.records.len()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn date_filter(&self) -> Option<time::Date> {
        self.date_filter
    }

    pub fn can_go_prev(&self) -> bool {
        self.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn filter_label(&self) -> String {
        self.date_filter
            .map(format_long_date)
            .unwrap_or_else(|| PICK_A_DATE.to_string())
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Navigation handoff for a displayed record.
    pub fn snapshot_for(&self, id: &DocumentId) -> Option<NavigationSnapshot> {
        self.records
            .iter()
            .find(|doc| &doc.id == id)
            .map(NavigationSnapshot::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DevBackend;
    use time::macros::date;

    fn controller(backend: &Arc<DevBackend>) -> ListingController {
        ListingController::new(
            backend.clone(),
            DEFAULT_PAGE_SIZE,
            crate::cache::DEFAULT_FRESHNESS,
        )
    }

    #[tokio::test]
    async fn starts_idle_and_loads() {
        let backend = Arc::new(DevBackend::with_generated(25, date!(2024 - 01 - 01)));
        let mut listing = controller(&backend);
        assert_eq!(listing.status(), &ListingStatus::Idle);

        let ticket = listing.load();
        assert!(listing.is_loading());
        listing.settle(ticket).await;

        assert_eq!(listing.status(), &ListingStatus::Ready);
        assert_eq!(listing.showing_count(), 10);
        assert_eq!(listing.total_pages(), 3);
    }

    #[tokio::test]
    async fn set_page_clamps_both_ends() {
        let backend = Arc::new(DevBackend::with_generated(25, date!(2024 - 01 - 01)));
        let mut listing = controller(&backend);
        let ticket = listing.load();
        listing.settle(ticket).await;

        let ticket = listing.set_page(3);
        listing.settle(ticket).await;
        assert_eq!(listing.page(), 3);

        let ticket = listing.set_page(99);
        assert!(ticket.is_none());
        assert_eq!(listing.page(), 3);

        let ticket = listing.set_page(0);
        listing.settle(ticket).await;
        assert_eq!(listing.page(), 1);
    }

    #[tokio::test]
    async fn prev_on_first_page_stays_put() {
        let backend = Arc::new(DevBackend::with_generated(25, date!(2024 - 01 - 01)));
        let mut listing = controller(&backend);
        let ticket = listing.load();
        listing.settle(ticket).await;

        assert!(!listing.can_go_prev());
        assert!(listing.prev_page().is_none());
        assert_eq!(listing.page(), 1);
    }

    #[tokio::test]
    async fn filter_change_resets_page() {
        let backend = Arc::new(DevBackend::with_generated(25, date!(2024 - 01 - 01)));
        let mut listing = controller(&backend);
        let ticket = listing.load();
        listing.settle(ticket).await;
        let ticket = listing.set_page(2);
        listing.settle(ticket).await;
        assert_eq!(listing.page(), 2);

        let ticket = listing.set_date_filter(Some(date!(2024 - 01 - 01)));
        assert_eq!(listing.page(), 1);
        listing.settle(ticket).await;
        assert_eq!(listing.page(), 1);
    }

    #[tokio::test]
    async fn failure_is_retained_for_display() {
        let backend = Arc::new(DevBackend::with_generated(5, date!(2024 - 01 - 01)));
        backend.fail_lists(true);
        let mut listing = controller(&backend);

        let ticket = listing.load();
        listing.settle(ticket).await;

        assert!(matches!(listing.error(), Some(FetchError::Status { status: 500, .. })));
        assert!(listing.records().is_empty());
    }

    #[tokio::test]
    async fn duplicate_key_while_in_flight_is_not_refetched() {
        let backend = Arc::new(DevBackend::with_generated(25, date!(2024 - 01 - 01)));
        let mut listing = controller(&backend);

        let first = listing.load();
        assert!(first.is_some());
        assert!(listing.refresh().is_none());
    }

    #[tokio::test]
    async fn rows_render_invalid_dates_as_placeholder() {
        let backend = Arc::new(DevBackend::with_documents(vec![Document {
            id: DocumentId::new("x"),
            date: Some("garbage".to_string()),
            file: "https://x/a.pdf".to_string(),
        }]));
        let mut listing = controller(&backend);
        let ticket = listing.load();
        listing.settle(ticket).await;

        assert_eq!(listing.rows()[0].date_label, crate::format::INVALID_DATE);
    }

    #[tokio::test]
    async fn filter_label_tracks_selection() {
        let backend = Arc::new(DevBackend::with_generated(1, date!(2024 - 01 - 01)));
        let mut listing = controller(&backend);
        assert_eq!(listing.filter_label(), PICK_A_DATE);

        let _ = listing.set_date_filter(Some(date!(2024 - 03 - 05)));
        assert_eq!(listing.filter_label(), "March 5th, 2024");
    }
}
