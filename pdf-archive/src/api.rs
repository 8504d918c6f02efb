//! Port for the remote document API.
//!
//! Controllers only ever talk to this trait, so the HTTP client and the
//! in-memory dev backend are interchangeable.

use async_trait::async_trait;

use crate::error::{FetchError, SubmitError};
use crate::models::{DocumentId, EditPayload, ListQuery, ListResponse};

#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Fetch one page of documents, optionally restricted to a single day.
    async fn list_documents(&self, query: &ListQuery) -> Result<ListResponse, FetchError>;

    /// Ask the server to replace the date and/or file of a document.
    ///
    /// A payload without a file means "keep the current file".
    async fn submit_edit_request(
        &self,
        id: &DocumentId,
        payload: EditPayload,
    ) -> Result<(), SubmitError>;
}
