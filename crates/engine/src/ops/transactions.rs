use uuid::Uuid;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, ListFilter, Page, ResultEngine, Transaction,
    pagination::{ApplyWindow, paginate},
    transactions,
};

use super::{Engine, with_tx};

/// Filters for listing transactions.
///
/// Predicates are not part of the cursor: pass the same ones again with every
/// page of a walk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionListFilter {
    pub page: ListFilter,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

impl TransactionListFilter {
    #[must_use]
    pub fn new(page: ListFilter) -> Self {
        Self {
            page,
            account_id: None,
            category_id: None,
        }
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> Self {
        if let Some(account_id) = filter.account_id {
            self = self.filter(transactions::Column::AccountId.eq(account_id.to_string()));
        }
        if let Some(category_id) = filter.category_id {
            self = self.filter(transactions::Column::CategoryId.eq(category_id.to_string()));
        }
        self
    }
}

impl Engine {
    /// Return a transaction snapshot from DB.
    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(transaction_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(transaction_id.to_string()))?;
            Transaction::try_from(model)
        })
    }

    /// Lists transactions newest → older by `(created_at DESC, id DESC)`.
    ///
    /// Without a pin, the returned cursor pins the window at the creation
    /// time of the newest row, so transactions created while the caller walks
    /// the pages never shift them.
    pub async fn list_transactions(
        &self,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Page<Transaction>> {
        filter.page.validate()?;

        with_tx!(self, |db_tx| {
            let rows: Vec<transactions::Model> = transactions::Entity::find()
                .apply_tx_filters(filter)
                .order_by_desc(transactions::Column::CreatedAt)
                .order_by_desc(transactions::Column::Id)
                .apply_window(&filter.page, transactions::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let page = paginate(rows, &filter.page, |model| model.created_at);
            let mut items = Vec::with_capacity(page.items.len());
            for model in page.items {
                items.push(Transaction::try_from(model)?);
            }

            Ok(Page {
                items,
                next_cursor: page.next_cursor,
            })
        })
    }
}
