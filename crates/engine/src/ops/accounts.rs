use uuid::Uuid;

use sea_orm::{QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Account, EngineError, ListFilter, Page, ResultEngine, accounts,
    pagination::{ApplyWindow, paginate},
    util::creation_now,
};

use super::{Engine, with_tx};

impl Engine {
    /// Return an account snapshot from DB.
    pub async fn account(&self, account_id: Uuid) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = accounts::Entity::find_by_id(account_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::AccountNotFound(account_id.to_string()))?;
            Account::try_from(model)
        })
    }

    /// Lists accounts by `(name ASC, id ASC)`.
    ///
    /// Names carry no time order, so the first page pins the window at the
    /// moment of the query: accounts created afterwards never show up in the
    /// following pages of the same walk.
    pub async fn list_accounts(&self, filter: &ListFilter) -> ResultEngine<Page<Account>> {
        filter.validate()?;
        let filter = filter.pinned_or(creation_now());

        with_tx!(self, |db_tx| {
            let rows: Vec<accounts::Model> = accounts::Entity::find()
                .order_by_asc(accounts::Column::Name)
                .order_by_asc(accounts::Column::Id)
                .apply_window(&filter, accounts::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let page = paginate(rows, &filter, |model| model.created_at);
            let mut items = Vec::with_capacity(page.items.len());
            for model in page.items {
                items.push(Account::try_from(model)?);
            }

            Ok(Page {
                items,
                next_cursor: page.next_cursor,
            })
        })
    }
}
