use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseTransaction};
use uuid::Uuid;

use crate::{Account, AccountType, ResultEngine, accounts, util::creation_now};

/// Create an account whose balance starts at `starting_balance`.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateAccount {
    pub id: Uuid,
    pub name: String,
    pub account_type: AccountType,
    pub sub_type: String,
    pub starting_balance: Decimal,
}

impl CreateAccount {
    #[must_use]
    pub fn new(name: impl Into<String>, account_type: AccountType, starting_balance: Decimal) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            account_type,
            sub_type: String::new(),
            starting_balance,
        }
    }

    #[must_use]
    pub fn sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = sub_type.into();
        self
    }

    pub(super) async fn apply(&self, db_tx: &DatabaseTransaction) -> ResultEngine<()> {
        let account = Account {
            id: self.id,
            name: self.name.clone(),
            account_type: self.account_type,
            sub_type: self.sub_type.clone(),
            balance: self.starting_balance,
            starting_balance: self.starting_balance,
            created_at: creation_now(),
        };
        accounts::ActiveModel::from(&account).insert(db_tx).await?;
        Ok(())
    }
}
