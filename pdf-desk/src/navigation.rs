use pdf_archive::{Document, DocumentId};
use serde::{Deserialize, Serialize};

/// One-shot state handed from the listing to the edit view when the user
/// picks a record. Absent on direct navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSnapshot {
    pub date: String,
    pub file_url: String,
}

impl From<&Document> for NavigationSnapshot {
    fn from(doc: &Document) -> Self {
        Self {
            date: doc.date.clone().unwrap_or_default(),
            file_url: doc.file.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Listing,
    Edit { id: DocumentId },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Listing => "/dashboard/pdfs".to_string(),
            Route::Edit { id } => format!("/dashboard/pdfs/{}/edit", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_uses_file_url_key() {
        let snapshot: NavigationSnapshot =
            serde_json::from_str(r#"{"date":"2024-01-01","fileUrl":"https://x/a.pdf"}"#).unwrap();
        assert_eq!(snapshot.file_url, "https://x/a.pdf");
    }

    #[test]
    fn snapshot_from_record_without_date() {
        let doc = Document {
            id: DocumentId::new("1"),
            date: None,
            file: "https://x/b.pdf".to_string(),
        };
        let snapshot = NavigationSnapshot::from(&doc);
        assert_eq!(snapshot.date, "");
        assert_eq!(snapshot.file_url, "https://x/b.pdf");
    }

    #[test]
    fn routes_have_paths() {
        assert_eq!(Route::Listing.path(), "/dashboard/pdfs");
        assert_eq!(
            Route::Edit {
                id: DocumentId::new("42")
            }
            .path(),
            "/dashboard/pdfs/42/edit"
        );
    }
}
