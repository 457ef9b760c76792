use std::sync::Arc;

use sea_orm::{DatabaseConnection, TransactionTrait};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use crate::{Action, ResultEngine};

use super::request::Request;

/// Shared end of the mutation queue. Workers take turns receiving from it.
pub(crate) type SharedReceiver = Arc<Mutex<mpsc::Receiver<Request>>>;

/// One of the interchangeable executors draining the mutation queue.
pub(crate) struct Worker {
    id: usize,
    database: DatabaseConnection,
    queue: SharedReceiver,
}

impl Worker {
    pub(crate) fn new(id: usize, database: DatabaseConnection, queue: SharedReceiver) -> Self {
        Self {
            id,
            database,
            queue,
        }
    }

    /// Process requests until the queue is closed and empty.
    pub(crate) async fn run(self) {
        debug!(worker = self.id, "worker started");
        while let Some(request) = self.next_request().await {
            self.process(request).await;
        }
        debug!(worker = self.id, "worker exiting, queue closed");
    }

    async fn next_request(&self) -> Option<Request> {
        // The lock is only held while waiting, never while applying.
        self.queue.lock().await.recv().await
    }

    async fn process(&self, request: Request) {
        let Request { action, reply } = request;

        let result = self.apply(&action).await;
        if let Err(err) = &result {
            warn!(
                worker = self.id,
                action = action.kind(),
                target = %action.target_id(),
                "action failed: {err}"
            );
        }

        if reply.send(result).is_err() {
            debug!(
                worker = self.id,
                action = action.kind(),
                target = %action.target_id(),
                "caller stopped waiting, result discarded"
            );
        }
    }

    async fn apply(&self, action: &Action) -> ResultEngine<()> {
        let db_tx = self.database.begin().await?;
        if let Err(err) = action.apply(&db_tx).await {
            if let Err(rollback_err) = db_tx.rollback().await {
                warn!(worker = self.id, "rollback failed: {rollback_err}");
            }
            return Err(err);
        }
        db_tx.commit().await?;
        Ok(())
    }
}
