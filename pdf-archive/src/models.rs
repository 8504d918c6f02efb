use std::fmt;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use time::macros::format_description;

use crate::error::SubmitError;

pub const NEW_DATE_FIELD: &str = "newDate";
pub const NEW_FILE_FIELD: &str = "newFile";

/// Server-assigned document identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// An uploaded document as returned by the listing endpoint.
///
/// `date` is kept as the raw server string; rendering decides what to do
/// with values that do not parse.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Document {
    #[serde(rename = "_id", alias = "id")]
    pub id: DocumentId,
    #[serde(default)]
    pub date: Option<String>,
    pub file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub date: Option<time::Date>,
    pub page: u32,
    pub limit: u32,
}

impl ListQuery {
    /// Query string parameters, `date` omitted when no filter is set.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(date) = self.date {
            pairs.push(("date", iso_date(date)));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

fn iso_date(date: time::Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(&format).unwrap_or_else(|_| date.to_string())
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub data: Vec<Document>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub total_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// A single file picked as the replacement for a document.
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Multipart body of an edit request.
///
/// `newDate` is always sent; `newFile` only when a replacement was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPayload {
    pub new_date: String,
    pub new_file: Option<FileUpload>,
}

impl EditPayload {
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = vec![NEW_DATE_FIELD];
        if self.new_file.is_some() {
            names.push(NEW_FILE_FIELD);
        }
        names
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_names().contains(&name)
    }

    pub fn into_form(self) -> Result<Form, SubmitError> {
        let form = Form::new().text(NEW_DATE_FIELD, self.new_date);

        let Some(file) = self.new_file else {
            return Ok(form);
        };

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| SubmitError::Other(format!("Invalid content type: {}", e)))?;

        Ok(form.part(NEW_FILE_FIELD, part))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn document_reads_mongo_style_id() {
        let raw = r#"{"_id":"65f0a1","date":"2024-03-05T00:00:00.000Z","file":"https://cdn/x.pdf"}"#;
        let doc: Document = serde_json::from_str(raw).unwrap();

        assert_eq!(doc.id.as_str(), "65f0a1");
        assert_eq!(doc.date.as_deref(), Some("2024-03-05T00:00:00.000Z"));
        assert_eq!(doc.file, "https://cdn/x.pdf");
    }

    #[test]
    fn document_accepts_plain_id_and_missing_date() {
        let raw = r#"{"id":"abc","file":"https://cdn/y.pdf"}"#;
        let doc: Document = serde_json::from_str(raw).unwrap();

        assert_eq!(doc.id, DocumentId::from("abc"));
        assert_eq!(doc.date, None);
    }

    #[test]
    fn list_response_parses_pagination() {
        let raw = r#"{
            "data": [{"_id":"1","date":"2024-01-01","file":"f"}],
            "pagination": {"totalPages": 3, "total": 25}
        }"#;
        let resp: ListResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(resp.data.len(), 1);
        assert_eq!(resp.pagination.total_pages, 3);
        assert_eq!(resp.pagination.total, Some(25));
    }

    #[test]
    fn total_is_optional() {
        let raw = r#"{"data": [], "pagination": {"totalPages": 1}}"#;
        let resp: ListResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.pagination.total, None);
    }

    #[test]
    fn query_pairs_omit_missing_date() {
        let query = ListQuery {
            date: None,
            page: 2,
            limit: 10,
        };
        assert_eq!(
            query.query_pairs(),
            vec![("page", "2".to_string()), ("limit", "10".to_string())]
        );
    }

    #[test]
    fn query_pairs_format_date_as_iso_day() {
        let query = ListQuery {
            date: Some(date!(2024 - 03 - 05)),
            page: 1,
            limit: 10,
        };
        assert_eq!(query.query_pairs()[0], ("date", "2024-03-05".to_string()));
    }

    #[test]
    fn payload_without_file_only_has_date() {
        let payload = EditPayload {
            new_date: "2024-01-01T00:00:00Z".to_string(),
            new_file: None,
        };
        assert_eq!(payload.field_names(), vec![NEW_DATE_FIELD]);
        assert!(!payload.has_field(NEW_FILE_FIELD));
        assert!(payload.into_form().is_ok());
    }

    #[test]
    fn payload_with_file_has_both_fields() {
        let payload = EditPayload {
            new_date: "2024-01-01T00:00:00Z".to_string(),
            new_file: Some(FileUpload::new("a.pdf", "application/pdf", vec![1, 2, 3])),
        };
        assert!(payload.has_field(NEW_DATE_FIELD));
        assert!(payload.has_field(NEW_FILE_FIELD));
        assert!(payload.into_form().is_ok());
    }

    #[test]
    fn payload_rejects_unparseable_content_type() {
        let payload = EditPayload {
            new_date: "2024-01-01T00:00:00Z".to_string(),
            new_file: Some(FileUpload::new("a.pdf", "not a mime", vec![])),
        };
        assert!(matches!(payload.into_form(), Err(SubmitError::Other(_))));
    }

    #[test]
    fn file_upload_debug_hides_bytes() {
        let file = FileUpload::new("a.pdf", "application/pdf", vec![0; 2048]);
        let rendered = format!("{:?}", file);
        assert!(rendered.contains("len: 2048"));
        assert!(!rendered.contains("[0, 0"));
    }
}
