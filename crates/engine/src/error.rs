//! The module contains the error the engine can throw.
//!
//! The errors fall in three groups:
//!
//! - domain errors raised while applying an action or reading a page, like
//!   [`AccountNotFound`] or [`InvalidCursor`];
//! - storage errors bubbled up from sea-orm as [`Database`];
//! - delivery errors of the mutation queue: [`Cancelled`], [`QueueClosed`] and
//!   [`WorkerLost`].
//!
//!  [`AccountNotFound`]: EngineError::AccountNotFound
//!  [`InvalidCursor`]: EngineError::InvalidCursor
//!  [`Database`]: EngineError::Database
//!  [`Cancelled`]: EngineError::Cancelled
//!  [`QueueClosed`]: EngineError::QueueClosed
//!  [`WorkerLost`]: EngineError::WorkerLost
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("account not found: {0}")]
    AccountNotFound(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid account type: {0}")]
    InvalidAccountType(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("operation cancelled")]
    Cancelled,
    #[error("mutation queue closed")]
    QueueClosed,
    #[error("request dropped without a reply")]
    WorkerLost,
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::AccountNotFound(a), Self::AccountNotFound(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidAccountType(a), Self::InvalidAccountType(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::InvalidFilter(a), Self::InvalidFilter(b)) => a == b,
            (Self::Cancelled, Self::Cancelled) => true,
            (Self::QueueClosed, Self::QueueClosed) => true,
            (Self::WorkerLost, Self::WorkerLost) => true,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
