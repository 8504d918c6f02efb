use crate::edit::SubmitOutcome;
use crate::listing::FetchOutcome;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug)]
pub(super) enum Action {
    ListingFetched(FetchOutcome),
    EditSubmitted(SubmitOutcome),
}

pub(super) type ActionTx = UnboundedSender<Action>;
pub(super) type ActionRx = UnboundedReceiver<Action>;

pub(super) fn channel() -> (ActionTx, ActionRx) {
    mpsc::unbounded_channel()
}
