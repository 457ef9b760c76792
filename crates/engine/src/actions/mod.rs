//! Mutations the operator can apply.
//!
//! An [`Action`] is a self-contained description of one state change. It
//! knows how to apply itself against an open database transaction; the
//! worker that runs it owns begin, commit and rollback.

use sea_orm::DatabaseTransaction;
use uuid::Uuid;

use crate::ResultEngine;

mod create_account;
mod create_transaction;

pub use create_account::CreateAccount;
pub use create_transaction::CreateTransaction;

/// Closed set of mutations accepted by the [`Delegator`](crate::Delegator).
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    CreateAccount(CreateAccount),
    CreateTransaction(CreateTransaction),
}

impl Action {
    /// Apply the mutation inside `db_tx`.
    ///
    /// On error the caller must roll back: partial writes may have happened.
    pub async fn apply(&self, db_tx: &DatabaseTransaction) -> ResultEngine<()> {
        match self {
            Self::CreateAccount(action) => action.apply(db_tx).await,
            Self::CreateTransaction(action) => action.apply(db_tx).await,
        }
    }

    /// Id of the row this action creates.
    pub fn target_id(&self) -> Uuid {
        match self {
            Self::CreateAccount(action) => action.id,
            Self::CreateTransaction(action) => action.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateAccount(_) => "create_account",
            Self::CreateTransaction(_) => "create_transaction",
        }
    }
}

impl From<CreateAccount> for Action {
    fn from(value: CreateAccount) -> Self {
        Self::CreateAccount(value)
    }
}

impl From<CreateTransaction> for Action {
    fn from(value: CreateTransaction) -> Self {
        Self::CreateTransaction(value)
    }
}
