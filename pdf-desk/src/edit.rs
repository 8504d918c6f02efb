//! Edit-request workflow for a single document.
//!
//! The form is prefilled once from the navigation snapshot (or the current
//! time), validated by [`validate`], turned into a multipart payload by
//! [`build_edit_request`] and submitted through a [`SubmitTicket`].
//!
//! Submission failures are logged and kept in [`EditWorkflow::last_error`],
//! but the user-facing status falls back to idle with no message.
//! The chosen file is not checked for type or size on this side.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use pdf_archive::{DocumentApi, DocumentId, EditPayload, FileUpload, SubmitError};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, error, info, warn};

use crate::format::{format_long_date, PICK_A_DATE};
use crate::navigation::{NavigationSnapshot, Route};
use crate::time_utils::parse_instant;

pub const SUCCESS_NOTICE: &str = "Request created successfully!";

/// Process-wide submission counter. Each ticket gets a fresh number so a
/// workflow only accepts the outcome of the request it started itself.
static NEXT_SUBMISSION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    pub date: Option<OffsetDateTime>,
    pub new_file: Option<FileUpload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEdit {
    pub date: OffsetDateTime,
    pub new_file: Option<FileUpload>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Date is required")]
    MissingDate,
    #[error("Date cannot be encoded: {0}")]
    UnencodableDate(String),
}

pub fn validate(form: &EditForm) -> Result<ValidatedEdit, ValidationError> {
    let date = form.date.ok_or(ValidationError::MissingDate)?;
    Ok(ValidatedEdit {
        date,
        new_file: form.new_file.clone(),
    })
}

/// `newDate` is always sent as an RFC 3339 UTC timestamp. Leaving out
/// `newFile` tells the server to keep the current file.
pub fn build_edit_request(values: ValidatedEdit) -> Result<EditPayload, ValidationError> {
    let new_date = values
        .date
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| ValidationError::UnencodableDate(e.to_string()))?;

    Ok(EditPayload {
        new_date,
        new_file: values.new_file,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStatus {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

#[must_use = "a submit ticket does nothing unless run"]
pub struct SubmitTicket {
    id: DocumentId,
    submission: u64,
    payload: EditPayload,
    api: Arc<dyn DocumentApi>,
}

impl SubmitTicket {
    pub fn payload(&self) -> &EditPayload {
        &self.payload
    }

    pub async fn run(self) -> SubmitOutcome {
        let result = self.api.submit_edit_request(&self.id, self.payload).await;
        SubmitOutcome {
            id: self.id,
            submission: self.submission,
            result,
        }
    }
}

impl fmt::Debug for SubmitTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmitTicket")
            .field("id", &self.id)
            .field("submission", &self.submission)
            .field("payload", &self.payload)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub id: DocumentId,
    pub submission: u64,
    pub result: Result<(), SubmitError>,
}

/// Emitted once an edit request has been accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCompletion {
    pub navigate_to: Route,
    pub notice: String,
}

pub struct EditWorkflow {
    api: Arc<dyn DocumentApi>,
    target: DocumentId,
    form: EditForm,
    existing_file: Option<String>,
    status: EditStatus,
    field_error: Option<ValidationError>,
    last_error: Option<SubmitError>,
    pending_submission: Option<u64>,
}

impl EditWorkflow {
    pub fn initialize(
        api: Arc<dyn DocumentApi>,
        target: DocumentId,
        snapshot: Option<NavigationSnapshot>,
    ) -> Self {
        Self::initialize_at(api, target, snapshot, OffsetDateTime::now_utc())
    }

    /// Like [`EditWorkflow::initialize`] with an explicit "now" for the
    /// default date.
    pub fn initialize_at(
        api: Arc<dyn DocumentApi>,
        target: DocumentId,
        snapshot: Option<NavigationSnapshot>,
        now: OffsetDateTime,
    ) -> Self {
        let (date, existing_file) = match snapshot {
            Some(snapshot) if snapshot.date.trim().is_empty() => {
                debug!(document_id = %target, "navigation snapshot has no date, using now");
                let existing = Some(snapshot.file_url).filter(|url| !url.is_empty());
                (Some(now), existing)
            }
            Some(snapshot) => {
                let date = parse_instant(&snapshot.date);
                if date.is_none() {
                    warn!(
                        document_id = %target,
                        raw = %snapshot.date,
                        "navigation snapshot carries an unreadable date"
                    );
                }
                let existing = Some(snapshot.file_url).filter(|url| !url.is_empty());
                (date, existing)
            }
            None => {
                debug!(document_id = %target, "no navigation snapshot, using defaults");
                (Some(now), None)
            }
        };

        Self {
            api,
            target,
            form: EditForm {
                date,
                new_file: None,
            },
            existing_file,
            status: EditStatus::Idle,
            field_error: None,
            last_error: None,
            pending_submission: None,
        }
    }

    pub fn target(&self) -> &DocumentId {
        &self.target
    }

    pub fn form(&self) -> &EditForm {
        &self.form
    }

    pub fn set_date(&mut self, date: Option<OffsetDateTime>) {
        self.form.date = date;
        self.field_error = None;
    }

    pub fn choose_file(&mut self, file: Option<FileUpload>) {
        self.form.new_file = file;
    }

    pub fn existing_file_preview(&self) -> Option<&str> {
        self.existing_file.as_deref()
    }

    pub fn date_label(&self) -> String {
        self.form
            .date
            .map(|dt| format_long_date(dt.date()))
            .unwrap_or_else(|| PICK_A_DATE.to_string())
    }

    pub fn status(&self) -> EditStatus {
        self.status
    }

    /// Status as the form shows it. A failed submission looks idle.
    pub fn visible_status(&self) -> EditStatus {
        match self.status {
            EditStatus::Failed => EditStatus::Idle,
            other => other,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == EditStatus::Pending
    }

    pub fn field_error(&self) -> Option<&ValidationError> {
        self.field_error.as_ref()
    }

    pub fn last_error(&self) -> Option<&SubmitError> {
        self.last_error.as_ref()
    }

    /// Validate and start a submission. Returns `Ok(None)` while a previous
    /// submission is still pending or once one has succeeded.
    pub fn begin_submit(&mut self) -> Result<Option<SubmitTicket>, ValidationError> {
        match self.status {
            EditStatus::Pending => {
                debug!(document_id = %self.target, "submit suppressed while pending");
                return Ok(None);
            }
            EditStatus::Succeeded => {
                debug!(document_id = %self.target, "submit suppressed, request already created");
                return Ok(None);
            }
            EditStatus::Idle | EditStatus::Failed => {}
        }

        let payload = match validate(&self.form).and_then(build_edit_request) {
            Ok(payload) => payload,
            Err(e) => {
                self.field_error = Some(e.clone());
                return Err(e);
            }
        };

        self.field_error = None;
        self.last_error = None;
        self.status = EditStatus::Pending;
        let submission = NEXT_SUBMISSION.fetch_add(1, Ordering::Relaxed);
        self.pending_submission = Some(submission);
        debug!(
            document_id = %self.target,
            submission,
            fields = ?payload.field_names(),
            "submitting edit request"
        );

        Ok(Some(SubmitTicket {
            id: self.target.clone(),
            submission,
            payload,
            api: Arc::clone(&self.api),
        }))
    }

    pub fn finish(&mut self, outcome: SubmitOutcome) -> Option<EditCompletion> {
        if outcome.id != self.target || self.pending_submission != Some(outcome.submission) {
            debug!(
                document_id = %outcome.id,
                submission = outcome.submission,
                "ignoring submit outcome this form did not start"
            );
            return None;
        }
        self.pending_submission = None;

        match outcome.result {
            Ok(()) => {
                info!(document_id = %self.target, "edit request created");
                self.status = EditStatus::Succeeded;
                Some(EditCompletion {
                    navigate_to: Route::Listing,
                    notice: SUCCESS_NOTICE.to_string(),
                })
            }
            Err(err) => {
                // Not shown to the user; see `visible_status`.
                error!(document_id = %self.target, error = %err, "edit request failed");
                self.status = EditStatus::Failed;
                self.last_error = Some(err);
                None
            }
        }
    }

    pub async fn submit(&mut self) -> Result<Option<EditCompletion>, ValidationError> {
        let Some(ticket) = self.begin_submit()? else {
            return Ok(None);
        };
        let outcome = ticket.run().await;
        Ok(self.finish(outcome))
    }

    /// Drop all form state and go back without contacting the server.
    pub fn cancel(self) -> Route {
        debug!(document_id = %self.target, "edit cancelled");
        Route::Listing
    }
}
