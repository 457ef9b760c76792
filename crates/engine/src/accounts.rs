//! The module contains `Account` struct and its implementation.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{parse_decimal, parse_uuid},
};

/// The kind of money container an account represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Cash,
    CreditCards,
    Investments,
    Loans,
    Assets,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::CreditCards => "credit_cards",
            Self::Investments => "investments",
            Self::Loans => "loans",
            Self::Assets => "assets",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AccountType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cash" => Ok(Self::Cash),
            "credit_cards" => Ok(Self::CreditCards),
            "investments" => Ok(Self::Investments),
            "loans" => Ok(Self::Loans),
            "assets" => Ok(Self::Assets),
            other => Err(EngineError::InvalidAccountType(other.to_string())),
        }
    }
}

impl FromStr for AccountType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// An account.
///
/// A bank account, a credit card, a loan or anything else that holds a
/// balance. The balance is denormalized: it is only ever written by a
/// committed `CreateTransaction` action and never recomputed by readers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub account_type: AccountType,
    pub sub_type: String,
    pub balance: Decimal,
    pub starting_balance: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub account_type: String,
    pub sub_type: String,
    pub balance: String,
    pub starting_balance: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            account_type: ActiveValue::Set(value.account_type.as_str().to_string()),
            sub_type: ActiveValue::Set(value.sub_type.clone()),
            balance: ActiveValue::Set(value.balance.to_string()),
            starting_balance: ActiveValue::Set(value.starting_balance.to_string()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            name: model.name,
            account_type: AccountType::try_from(model.account_type.as_str())?,
            sub_type: model.sub_type,
            balance: parse_decimal(&model.balance, "balance")?,
            starting_balance: parse_decimal(&model.starting_balance, "starting balance")?,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn model() -> Model {
        Model {
            id: "0192f0a4-6a3b-7cc0-8a57-1c2d3e4f5a6b".to_string(),
            name: "Checking".to_string(),
            account_type: "credit_cards".to_string(),
            sub_type: "visa".to_string(),
            balance: "74.50".to_string(),
            starting_balance: "100.00".to_string(),
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    #[test]
    fn model_into_account() {
        let account = Account::try_from(model()).unwrap();

        assert_eq!(account.name, "Checking");
        assert_eq!(account.account_type, AccountType::CreditCards);
        assert_eq!(account.balance.to_string(), "74.50");
        assert_eq!(account.starting_balance.to_string(), "100.00");
    }

    #[test]
    fn account_into_active_model_keeps_decimal_text() {
        let account = Account::try_from(model()).unwrap();
        let active = ActiveModel::from(&account);

        assert_eq!(active.balance, ActiveValue::Set("74.50".to_string()));
        assert_eq!(
            active.starting_balance,
            ActiveValue::Set("100.00".to_string())
        );
    }

    #[test]
    fn fail_unknown_account_type() {
        let mut model = model();
        model.account_type = "savings".to_string();
        assert_eq!(
            Account::try_from(model),
            Err(EngineError::InvalidAccountType("savings".to_string()))
        );
    }

    #[test]
    fn account_type_parses_from_str() {
        for kind in [
            AccountType::Cash,
            AccountType::CreditCards,
            AccountType::Investments,
            AccountType::Loans,
            AccountType::Assets,
        ] {
            assert_eq!(kind.as_str().parse::<AccountType>().unwrap(), kind);
        }
    }
}
