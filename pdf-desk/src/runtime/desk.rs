use std::sync::Arc;

use anyhow::Result;
use pdf_archive::{DocumentApi, DocumentId};
use tracing::debug;

use super::action_queue::{channel, Action, ActionRx, ActionTx};
use crate::config::DeskConfig;
use crate::edit::{EditWorkflow, SubmitTicket, ValidationError};
use crate::listing::{FetchTicket, ListingController};
use crate::navigation::{NavigationSnapshot, Route};

/// Ties the listing and the edit workflow together.
///
/// Network calls run on spawned tasks and report back through the action
/// channel; all state changes happen in [`Desk::next_action`] /
/// [`Desk::process_actions`] on the caller's task.
pub struct Desk {
    api: Arc<dyn DocumentApi>,
    listing: ListingController,
    edit: Option<EditWorkflow>,
    route: Route,
    notices: Vec<String>,
    action_tx: ActionTx,
    action_rx: ActionRx,
    outstanding: usize,
}

impl Desk {
    pub fn new(api: Arc<dyn DocumentApi>, config: &DeskConfig) -> Self {
        let listing = ListingController::new(Arc::clone(&api), config.page_size, config.freshness());
        let (action_tx, action_rx) = channel();

        Self {
            api,
            listing,
            edit: None,
            route: Route::Listing,
            notices: Vec::new(),
            action_tx,
            action_rx,
            outstanding: 0,
        }
    }

    pub fn connect(config: &DeskConfig) -> Result<Self> {
        let api = crate::api::connect(config)?;
        Ok(Self::new(api, config))
    }

    /// Kick off the initial listing load.
    pub fn start(&mut self) {
        let ticket = self.listing.load();
        self.spawn_fetch(ticket);
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn listing(&self) -> &ListingController {
        &self.listing
    }

    pub fn edit(&self) -> Option<&EditWorkflow> {
        self.edit.as_ref()
    }

    pub fn edit_mut(&mut self) -> Option<&mut EditWorkflow> {
        self.edit.as_mut()
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn set_date_filter(&mut self, date: Option<time::Date>) {
        let ticket = self.listing.set_date_filter(date);
        self.spawn_fetch(ticket);
    }

    pub fn reset_filter(&mut self) {
        let ticket = self.listing.reset_filter();
        self.spawn_fetch(ticket);
    }

    pub fn set_page(&mut self, page: u32) {
        let ticket = self.listing.set_page(page);
        self.spawn_fetch(ticket);
    }

    pub fn next_page(&mut self) {
        let ticket = self.listing.next_page();
        self.spawn_fetch(ticket);
    }

    pub fn prev_page(&mut self) {
        let ticket = self.listing.prev_page();
        self.spawn_fetch(ticket);
    }

    /// Open the edit view for a row of the listing, handing over its date
    /// and file as the navigation snapshot.
    pub fn open_edit(&mut self, id: DocumentId) {
        let snapshot = self.listing.snapshot_for(&id);
        if snapshot.is_none() {
            debug!(document_id = %id, "record not on screen, opening edit without snapshot");
        }
        self.enter_edit(id, snapshot);
    }

    /// Open the edit view the way a page refresh would: no snapshot.
    pub fn open_edit_direct(&mut self, id: DocumentId) {
        self.enter_edit(id, None);
    }

    fn enter_edit(&mut self, id: DocumentId, snapshot: Option<NavigationSnapshot>) {
        self.edit = Some(EditWorkflow::initialize(
            Arc::clone(&self.api),
            id.clone(),
            snapshot,
        ));
        self.route = Route::Edit { id };
    }

    /// Returns `Ok(true)` when a request was sent, `Ok(false)` when there is
    /// no edit open or one is already pending.
    pub fn submit_edit(&mut self) -> Result<bool, ValidationError> {
        let Some(workflow) = self.edit.as_mut() else {
            return Ok(false);
        };

        match workflow.begin_submit()? {
            Some(ticket) => {
                self.spawn_submit(ticket);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn cancel_edit(&mut self) {
        if let Some(workflow) = self.edit.take() {
            self.route = workflow.cancel();
            self.return_to_listing();
        }
    }

    /// Number of spawned calls whose results have not been applied yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Wait for the next finished call and apply it. Returns false when
    /// nothing is outstanding.
    pub async fn next_action(&mut self) -> bool {
        if self.outstanding == 0 {
            return false;
        }
        match self.action_rx.recv().await {
            Some(action) => {
                self.apply(action);
                true
            }
            None => false,
        }
    }

    /// Apply every result that has already arrived without waiting.
    pub fn process_actions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.action_rx.try_recv() {
            self.apply(action);
            applied += 1;
        }
        applied
    }

    /// Wait until every spawned call, including follow-ups, has been applied.
    pub async fn settle(&mut self) {
        while self.next_action().await {}
    }

    fn apply(&mut self, action: Action) {
        self.outstanding = self.outstanding.saturating_sub(1);

        match action {
            Action::ListingFetched(outcome) => {
                let follow_up = self.listing.apply(outcome);
                self.spawn_fetch(follow_up);
            }
            Action::EditSubmitted(outcome) => {
                let Some(workflow) = self.edit.as_mut() else {
                    debug!(document_id = %outcome.id, "edit closed before submit finished");
                    return;
                };

                if let Some(completion) = workflow.finish(outcome) {
                    self.edit = None;
                    self.notices.push(completion.notice);
                    self.route = completion.navigate_to;
                    // The listing cache is left alone; fresh pages keep
                    // showing pre-edit data until they go stale.
                    self.return_to_listing();
                }
            }
        }
    }

    fn return_to_listing(&mut self) {
        let ticket = self.listing.refresh();
        self.spawn_fetch(ticket);
    }

    fn spawn_fetch(&mut self, ticket: Option<FetchTicket>) {
        let Some(ticket) = ticket else {
            return;
        };

        self.outstanding += 1;
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome = ticket.run().await;
            let _ = tx.send(Action::ListingFetched(outcome));
        });
    }

    fn spawn_submit(&mut self, ticket: SubmitTicket) {
        self.outstanding += 1;
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome = ticket.run().await;
            let _ = tx.send(Action::EditSubmitted(outcome));
        });
    }
}
