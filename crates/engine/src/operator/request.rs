use tokio::sync::oneshot;

use crate::{Action, ResultEngine};

/// A queued action waiting for a worker.
///
/// The reply channel has room for exactly one result, so a worker never
/// blocks on it even when the caller has stopped listening.
#[derive(Debug)]
pub(crate) struct Request {
    pub(crate) action: Action,
    pub(crate) reply: oneshot::Sender<ResultEngine<()>>,
}

impl Request {
    pub(crate) fn new(action: Action) -> (Self, oneshot::Receiver<ResultEngine<()>>) {
        let (reply, response) = oneshot::channel();
        (Self { action, reply }, response)
    }
}
