mod api;
mod client;
mod error;
pub mod models;

pub use api::*;
pub use client::*;
pub use error::*;
pub use models::{
    Document, DocumentId, EditPayload, FileUpload, ListQuery, ListResponse, PaginationInfo,
    NEW_DATE_FIELD, NEW_FILE_FIELD,
};
