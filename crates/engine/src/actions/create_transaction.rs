use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ConnectionTrait, DatabaseTransaction, DbBackend, EntityTrait,
    QuerySelect, Select,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, accounts, transactions,
    util::{creation_now, exact_add, parse_decimal},
};

/// Record a transaction and move the owning account's balance by `amount`.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateTransaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub category_id: Uuid,
    /// Signed: negative amounts are outflows.
    pub amount: Decimal,
    pub name: String,
    /// Defaults to the apply time when unset.
    pub date: Option<DateTime<Utc>>,
}

impl CreateTransaction {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        category_id: Uuid,
        amount: Decimal,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            account_id,
            category_id,
            amount,
            name: name.into(),
            date: None,
        }
    }

    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub(super) async fn apply(&self, db_tx: &DatabaseTransaction) -> ResultEngine<()> {
        let account = locked_account(db_tx.get_database_backend(), self.account_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::AccountNotFound(self.account_id.to_string()))?;

        let created_at = creation_now();
        let tx = Transaction {
            id: self.id,
            account_id: self.account_id,
            category_id: self.category_id,
            amount: self.amount,
            name: self.name.clone(),
            transaction_date: self.date.unwrap_or(created_at),
            created_at,
        };
        transactions::ActiveModel::from(&tx).insert(db_tx).await?;

        let balance = parse_decimal(&account.balance, "balance")?;
        let new_balance = exact_add(balance, self.amount).ok_or_else(|| {
            EngineError::InvalidAmount(format!(
                "balance of account {} cannot hold {} exactly",
                self.account_id, self.amount
            ))
        })?;
        let account_model = accounts::ActiveModel {
            id: ActiveValue::Set(account.id),
            balance: ActiveValue::Set(new_balance.to_string()),
            ..Default::default()
        };
        account_model.update(db_tx).await?;

        Ok(())
    }
}

/// Account lookup that holds the row until the surrounding transaction ends.
///
/// Other transactions touching the same account block on it. SQLite has no
/// row locks; the store connector serializes its writers instead.
fn locked_account(backend: DbBackend, account_id: Uuid) -> Select<accounts::Entity> {
    let query = accounts::Entity::find_by_id(account_id.to_string());
    match backend {
        DbBackend::Sqlite => query,
        _ => query.lock_exclusive(),
    }
}
