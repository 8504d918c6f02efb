use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use url::Url;

use crate::api::DocumentApi;
use crate::error::{FetchError, SubmitError};
use crate::models::{DocumentId, EditPayload, ListQuery, ListResponse};

const LIST_PATH: &str = "api/pdfs";
const EDIT_REQUEST_PATH: &str = "api/edit-requests";

#[derive(Debug, Clone)]
pub struct PdfApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("Invalid API URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

impl PdfApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientBuildError> {
        // Trailing slash so `join` appends instead of replacing the last segment.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|source| ClientBuildError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }

    pub fn list_url(&self, query: &ListQuery) -> Result<Url, url::ParseError> {
        let mut url = self.endpoint(LIST_PATH)?;
        url.query_pairs_mut().extend_pairs(query.query_pairs());
        Ok(url)
    }

    pub fn edit_request_url(&self, id: &DocumentId) -> Result<Url, url::ParseError> {
        let mut url = self.endpoint(EDIT_REQUEST_PATH)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(id.as_str());
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn error_message(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {}>", e))
}

#[async_trait]
impl DocumentApi for PdfApiClient {
    #[tracing::instrument(skip(self), fields(page = query.page, limit = query.limit))]
    async fn list_documents(&self, query: &ListQuery) -> Result<ListResponse, FetchError> {
        let url = self
            .list_url(query)
            .map_err(|e| FetchError::Other(format!("Failed to build listing URL: {}", e)))?;

        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(FetchError::Unauthorized);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: error_message(response).await,
            });
        }

        let listing = response.json::<ListResponse>().await.map_err(|e| {
            FetchError::Parsing(format!("Failed to parse listing response as JSON: {}", e))
        })?;

        tracing::debug!(
            records = listing.data.len(),
            total_pages = listing.pagination.total_pages,
            "listing fetched"
        );
        Ok(listing)
    }

    #[tracing::instrument(skip(self, payload), fields(document_id = %id))]
    async fn submit_edit_request(
        &self,
        id: &DocumentId,
        payload: EditPayload,
    ) -> Result<(), SubmitError> {
        let url = self
            .edit_request_url(id)
            .map_err(|e| SubmitError::Other(format!("Failed to build edit URL: {}", e)))?;
        let fields = payload.field_names();
        let form = payload.into_form()?;

        let response = self
            .authorized(self.client.post(url).multipart(form))
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(SubmitError::Unauthorized);
        }
        if !status.is_success() {
            return Err(SubmitError::Status {
                status: status.as_u16(),
                message: error_message(response).await,
            });
        }

        if let Err(e) = response.bytes().await {
            tracing::debug!(error = %e, "failed to read edit request response body");
        }
        tracing::info!(?fields, "edit request accepted");
        Ok(())
    }
}
