//! Serialized application of mutations.
//!
//! Callers hand an [`Action`] to the [`Delegator`], which queues it on a
//! bounded channel drained by a fixed pool of workers. Each worker applies one
//! action per database transaction and replies to the caller that submitted
//! it. The queue bounds how many mutations are in flight; consistency between
//! concurrent mutations of the same account comes from the row lock taken by
//! the action itself, not from queue order.

use std::sync::{Arc, Mutex, PoisonError};

use sea_orm::DatabaseConnection;
use tokio::{sync::mpsc, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{Action, EngineError, ResultEngine};

mod request;
mod worker;

use request::Request;
use worker::{SharedReceiver, Worker};

/// Workers spawned when the builder is not told otherwise.
pub const DEFAULT_WORKERS: usize = 4;
/// Requests that can wait in the queue before submitters block.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// The single entry point for mutations.
#[derive(Debug)]
pub struct Delegator {
    database: DatabaseConnection,
    workers: usize,
    sender: Mutex<Option<mpsc::Sender<Request>>>,
    receiver: SharedReceiver,
    tasks: Mutex<Option<JoinSet<()>>>,
}

impl Delegator {
    /// Return a builder for `Delegator`. Help to build the struct.
    pub fn builder() -> DelegatorBuilder {
        DelegatorBuilder::default()
    }

    /// Spawn the workers. Calling it again while running is a no-op.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if tasks.is_some() {
            return;
        }
        if self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
        {
            debug!("operator already stopped, not starting workers");
            return;
        }

        let mut set = JoinSet::new();
        for id in 0..self.workers {
            let worker = Worker::new(id, self.database.clone(), Arc::clone(&self.receiver));
            set.spawn(worker.run());
        }
        *tasks = Some(set);
        info!(workers = self.workers, "operator started");
    }

    /// Close the queue, let the workers drain it, and wait for all of them.
    ///
    /// Requests already queued are still applied. Later submits fail with
    /// [`EngineError::QueueClosed`]. Safe to call more than once.
    pub async fn stop(&self) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if sender.is_none() {
            return;
        }
        drop(sender);

        let tasks = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(mut tasks) = tasks else {
            // Nobody will ever serve what is queued: drop it so callers get
            // an error instead of waiting forever.
            let mut receiver = self.receiver.lock().await;
            receiver.close();
            let mut dropped = 0usize;
            while receiver.try_recv().is_ok() {
                dropped += 1;
            }
            info!(dropped, "operator stopped before start");
            return;
        };
        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                error!("worker terminated abnormally: {err}");
            }
        }
        info!("operator stopped");
    }

    /// Apply `action` and wait for its outcome.
    ///
    /// Blocks while the queue is full. If `cancel` fires first, returns
    /// [`EngineError::Cancelled`]; an action that already made it into the
    /// queue is still applied and its result dropped.
    pub async fn submit(
        &self,
        cancel: &CancellationToken,
        action: impl Into<Action>,
    ) -> ResultEngine<()> {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(EngineError::QueueClosed)?;

        let action = action.into();
        let kind = action.kind();
        let (request, response) = Request::new(action);

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(action = kind, "submit cancelled before enqueue");
                return Err(EngineError::Cancelled);
            }
            sent = sender.send(request) => {
                sent.map_err(|_| EngineError::QueueClosed)?;
            }
        }
        drop(sender);

        tokio::select! {
            biased;
            reply = response => reply.unwrap_or(Err(EngineError::WorkerLost)),
            () = cancel.cancelled() => {
                debug!(action = kind, "submit cancelled while waiting for a reply");
                Err(EngineError::Cancelled)
            }
        }
    }
}

/// The builder for `Delegator`
#[derive(Debug)]
pub struct DelegatorBuilder {
    database: DatabaseConnection,
    workers: usize,
    queue_capacity: usize,
}

impl Default for DelegatorBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl DelegatorBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> DelegatorBuilder {
        self.database = db;
        self
    }

    /// Number of workers, at least one.
    pub fn workers(mut self, workers: usize) -> DelegatorBuilder {
        self.workers = workers.max(1);
        self
    }

    /// Capacity of the mutation queue, at least one.
    pub fn queue_capacity(mut self, capacity: usize) -> DelegatorBuilder {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Construct `Delegator`. Workers are not running until [`Delegator::start`].
    pub fn build(self) -> Delegator {
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        Delegator {
            database: self.database,
            workers: self.workers,
            sender: Mutex::new(Some(sender)),
            receiver: Arc::new(tokio::sync::Mutex::new(receiver)),
            tasks: Mutex::new(None),
        }
    }
}
