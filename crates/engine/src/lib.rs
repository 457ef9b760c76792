//! Core of the budget backend.
//!
//! Two contracts are exposed to the outer layers:
//!
//! - **submit a mutation**: build an [`Action`] and hand it to
//!   [`Delegator::submit`]. A bounded pool of workers applies it inside a
//!   database transaction and the caller gets the outcome back;
//! - **fetch a filtered page**: [`Engine::list_accounts`] and
//!   [`Engine::list_transactions`], paginated with a pinned [`Cursor`].

pub use accounts::{Account, AccountType};
pub use actions::{Action, CreateAccount, CreateTransaction};
pub use error::EngineError;
pub use operator::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS, Delegator, DelegatorBuilder};
pub use ops::{Engine, EngineBuilder, TransactionListFilter};
pub use pagination::{Cursor, DEFAULT_PAGE_LIMIT, ListFilter, MAX_PAGE_LIMIT, Page};
pub use store::connect;
pub use transactions::Transaction;
pub use tokio_util::sync::CancellationToken;

mod accounts;
mod actions;
mod error;
mod operator;
mod ops;
mod pagination;
mod store;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
