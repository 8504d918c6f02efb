//! Client-side state for browsing uploaded PDFs and filing edit requests.
//!
//! [`listing::ListingController`] keeps the remote listing query in sync
//! with the chosen date filter and page. [`edit::EditWorkflow`] prefills,
//! validates and submits an edit request. [`runtime::Desk`] drives both
//! on a tokio runtime and handles navigation between them.

pub mod api;
pub mod cache;
pub mod config;
pub mod edit;
pub mod format;
pub mod listing;
pub mod navigation;
pub mod runtime;
pub mod telemetry;
mod time_utils;

pub use config::DeskConfig;
pub use edit::{EditCompletion, EditForm, EditStatus, EditWorkflow, ValidationError};
pub use listing::{ListingController, ListingStatus};
pub use navigation::{NavigationSnapshot, Route};
pub use runtime::Desk;
