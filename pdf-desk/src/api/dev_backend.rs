use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pdf_archive::{
    Document, DocumentApi, DocumentId, EditPayload, FetchError, ListQuery, ListResponse,
    PaginationInfo, SubmitError,
};

use crate::time_utils::parse_instant;

/// An edit request as received by the dev backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEdit {
    pub id: DocumentId,
    pub payload: EditPayload,
}

/// In-memory stand-in for the document API. Edit requests are recorded
/// but never change the stored documents.
#[derive(Debug, Clone)]
pub struct DevBackend {
    store: Arc<Mutex<Vec<Document>>>,
    edits: Arc<Mutex<Vec<RecordedEdit>>>,
    list_calls: Arc<AtomicUsize>,
    submit_calls: Arc<AtomicUsize>,
    fail_lists: Arc<AtomicBool>,
    fail_submits: Arc<AtomicBool>,
}

impl Default for DevBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DevBackend {
    pub fn new() -> Self {
        Self::with_generated(25, time::macros::date!(2024 - 01 - 01))
    }

    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            store: Arc::new(Mutex::new(documents)),
            edits: Arc::new(Mutex::new(Vec::new())),
            list_calls: Arc::new(AtomicUsize::new(0)),
            submit_calls: Arc::new(AtomicUsize::new(0)),
            fail_lists: Arc::new(AtomicBool::new(false)),
            fail_submits: Arc::new(AtomicBool::new(false)),
        }
    }

    /// `count` documents, one per day starting at `first_day`.
    pub fn with_generated(count: usize, first_day: time::Date) -> Self {
        let documents = (0..count)
            .map(|i| {
                let day = first_day + time::Duration::days(i as i64);
                dev_document(&format!("dev-{:03}", i + 1), day)
            })
            .collect();
        Self::with_documents(documents)
    }

    /// Swap the stored documents, e.g. to simulate uploads or deletions by
    /// someone else.
    pub fn replace_documents(&self, documents: Vec<Document>) {
        *self.store.lock().expect("dev store lock poisoned") = documents;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn edit_requests(&self) -> Vec<RecordedEdit> {
        self.edits.lock().expect("dev edits lock poisoned").clone()
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn fail_submits(&self, fail: bool) {
        self.fail_submits.store(fail, Ordering::SeqCst);
    }
}

pub fn dev_document(id: &str, day: time::Date) -> Document {
    Document {
        id: DocumentId::new(id),
        date: Some(format!(
            "{:04}-{:02}-{:02}T00:00:00.000Z",
            day.year(),
            day.month() as u8,
            day.day()
        )),
        file: format!("https://files.localhost/pdfs/{}.pdf", id),
    }
}

fn matches_day(doc: &Document, day: Option<time::Date>) -> bool {
    let Some(day) = day else {
        return true;
    };
    doc.date
        .as_deref()
        .and_then(parse_instant)
        .is_some_and(|dt| dt.date() == day)
}

#[async_trait]
impl DocumentApi for DevBackend {
    async fn list_documents(&self, query: &ListQuery) -> Result<ListResponse, FetchError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(FetchError::Status {
                status: 500,
                message: "dev backend configured to fail".to_string(),
            });
        }

        let store = self.store.lock().expect("dev store lock poisoned");
        let matching: Vec<&Document> = store
            .iter()
            .filter(|doc| matches_day(doc, query.date))
            .collect();

        let limit = query.limit.max(1) as usize;
        let total = matching.len();
        let total_pages = total.div_ceil(limit) as u32;
        let offset = (query.page.saturating_sub(1) as usize).saturating_mul(limit);

        let data = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(ListResponse {
            data,
            pagination: PaginationInfo {
                total_pages,
                total: Some(total as u64),
            },
        })
    }

    async fn submit_edit_request(
        &self,
        id: &DocumentId,
        payload: EditPayload,
    ) -> Result<(), SubmitError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_submits.load(Ordering::SeqCst) {
            return Err(SubmitError::Status {
                status: 500,
                message: "dev backend configured to fail".to_string(),
            });
        }

        let known = self
            .store
            .lock()
            .expect("dev store lock poisoned")
            .iter()
            .any(|doc| &doc.id == id);
        if !known {
            return Err(SubmitError::Status {
                status: 404,
                message: format!("document {} not found", id),
            });
        }

        self.edits
            .lock()
            .expect("dev edits lock poisoned")
            .push(RecordedEdit {
                id: id.clone(),
                payload,
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn query(date: Option<time::Date>, page: u32) -> ListQuery {
        ListQuery {
            date,
            page,
            limit: 10,
        }
    }

    #[tokio::test]
    async fn paginates_generated_documents() {
        let backend = DevBackend::with_generated(25, date!(2024 - 01 - 01));

        let first = backend.list_documents(&query(None, 1)).await.unwrap();
        assert_eq!(first.data.len(), 10);
        assert_eq!(first.pagination.total_pages, 3);
        assert_eq!(first.pagination.total, Some(25));

        let last = backend.list_documents(&query(None, 3)).await.unwrap();
        assert_eq!(last.data.len(), 5);
        assert_eq!(last.data[0].id.as_str(), "dev-021");
        assert_eq!(backend.list_calls(), 2);
    }

    #[tokio::test]
    async fn filters_by_day() {
        let backend = DevBackend::with_generated(25, date!(2024 - 01 - 01));
        let resp = backend
            .list_documents(&query(Some(date!(2024 - 01 - 03)), 1))
            .await
            .unwrap();

        assert_eq!(resp.data.len(), 1);
        assert_eq!(resp.data[0].id.as_str(), "dev-003");
        assert_eq!(resp.pagination.total_pages, 1);
    }

    #[tokio::test]
    async fn empty_result_has_zero_pages() {
        let backend = DevBackend::with_generated(3, date!(2024 - 01 - 01));
        let resp = backend
            .list_documents(&query(Some(date!(2030 - 01 - 01)), 1))
            .await
            .unwrap();

        assert!(resp.data.is_empty());
        assert_eq!(resp.pagination.total_pages, 0);
    }

    #[tokio::test]
    async fn unknown_document_is_rejected() {
        let backend = DevBackend::with_generated(1, date!(2024 - 01 - 01));
        let err = backend
            .submit_edit_request(
                &DocumentId::new("missing"),
                EditPayload {
                    new_date: "2024-01-01T00:00:00Z".to_string(),
                    new_file: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Status { status: 404, .. }));
        assert!(backend.edit_requests().is_empty());
    }
}
