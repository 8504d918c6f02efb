use thiserror::Error;

/// Failure of a listing query. Cloneable so the listing view can keep the
/// last error around for display.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Listing returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("TransportError: {0}")]
    Transport(String),
    #[error("ParsingError: {0}")]
    Parsing(String),
    #[error("Other: {0}")]
    Other(String),
}

/// Failure of an edit request submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Edit request returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("TransportError: {0}")]
    Transport(String),
    #[error("Other: {0}")]
    Other(String),
}
