use std::{str::FromStr, sync::Arc};

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use engine::{
    AccountType, CancellationToken, CreateAccount, CreateTransaction, Delegator, Engine,
    EngineError, ListFilter, TransactionListFilter,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db(workers: usize) -> (Delegator, Engine, DatabaseConnection) {
    let db = engine::connect("sqlite::memory:", None).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let delegator = Delegator::builder()
        .database(db.clone())
        .workers(workers)
        .build();
    delegator.start();
    let engine = Engine::builder().database(db.clone()).build();
    (delegator, engine, db)
}

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

async fn new_account(delegator: &Delegator, name: &str, starting_balance: &str) -> Uuid {
    let action = CreateAccount::new(name, AccountType::Cash, dec(starting_balance));
    let id = action.id;
    delegator
        .submit(&CancellationToken::new(), action)
        .await
        .unwrap();
    id
}

#[tokio::test]
async fn create_account_starts_at_starting_balance() {
    let (delegator, engine, _db) = engine_with_db(1).await;
    let cancel = CancellationToken::new();

    let action = CreateAccount::new(
        "Brokerage",
        AccountType::Investments,
        dec("1234567890123456.123456789012"),
    )
    .sub_type("index funds");
    let account_id = action.id;
    delegator.submit(&cancel, action).await.unwrap();

    let account = engine.account(account_id).await.unwrap();
    assert_eq!(account.name, "Brokerage");
    assert_eq!(account.account_type, AccountType::Investments);
    assert_eq!(account.sub_type, "index funds");
    assert_eq!(account.balance, account.starting_balance);
    assert_eq!(account.balance.to_string(), "1234567890123456.123456789012");

    delegator.stop().await;
}

#[tokio::test]
async fn checking_scenario_moves_balance() {
    let (delegator, engine, _db) = engine_with_db(4).await;
    let cancel = CancellationToken::new();

    let account_id = new_account(&delegator, "Checking", "100.00").await;

    let action = CreateTransaction::new(account_id, Uuid::new_v4(), dec("-25.50"), "Groceries");
    let transaction_id = action.id;
    delegator.submit(&cancel, action).await.unwrap();

    let account = engine.account(account_id).await.unwrap();
    assert_eq!(account.balance.to_string(), "74.50");
    assert_eq!(account.starting_balance.to_string(), "100.00");

    let tx = engine.transaction(transaction_id).await.unwrap();
    assert_eq!(tx.account_id, account_id);
    assert_eq!(tx.amount.to_string(), "-25.50");
    assert_eq!(tx.name, "Groceries");

    delegator.stop().await;
}

#[tokio::test]
async fn transaction_date_defaults_to_creation_time() {
    let (delegator, engine, _db) = engine_with_db(1).await;
    let cancel = CancellationToken::new();
    let account_id = new_account(&delegator, "Wallet", "0").await;

    let undated = CreateTransaction::new(account_id, Uuid::new_v4(), dec("5"), "Coffee");
    let undated_id = undated.id;
    delegator.submit(&cancel, undated).await.unwrap();

    let date = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
    let dated =
        CreateTransaction::new(account_id, Uuid::new_v4(), dec("7"), "Book").date(date);
    let dated_id = dated.id;
    delegator.submit(&cancel, dated).await.unwrap();

    let undated = engine.transaction(undated_id).await.unwrap();
    assert_eq!(undated.transaction_date, undated.created_at);

    let dated = engine.transaction(dated_id).await.unwrap();
    assert_eq!(dated.transaction_date, date);
    assert!(dated.created_at > undated.created_at);

    delegator.stop().await;
}

#[tokio::test]
async fn missing_account_rolls_back_everything() {
    let (delegator, engine, _db) = engine_with_db(2).await;
    let cancel = CancellationToken::new();
    let account_id = new_account(&delegator, "Savings", "10.00").await;

    let ghost = Uuid::new_v4();
    let action = CreateTransaction::new(ghost, Uuid::new_v4(), dec("3.00"), "Nowhere");
    let transaction_id = action.id;

    let err = delegator.submit(&cancel, action).await.unwrap_err();
    assert_eq!(err, EngineError::AccountNotFound(ghost.to_string()));

    assert_eq!(
        engine.transaction(transaction_id).await,
        Err(EngineError::KeyNotFound(transaction_id.to_string()))
    );
    let page = engine
        .list_transactions(&TransactionListFilter::default())
        .await
        .unwrap();
    assert!(page.items.is_empty());

    let account = engine.account(account_id).await.unwrap();
    assert_eq!(account.balance.to_string(), "10.00");

    delegator.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transactions_do_not_lose_updates() {
    let (delegator, engine, _db) = engine_with_db(4).await;
    let delegator = Arc::new(delegator);
    let account_id = new_account(&delegator, "Shared", "250.00").await;

    let amounts: Vec<Decimal> = (1..=40)
        .map(|i| {
            let sign = if i % 3 == 0 { -1 } else { 1 };
            Decimal::new(sign * i * 125, 2)
        })
        .collect();
    let expected = amounts.iter().fold(dec("250.00"), |acc, a| acc + a);

    let mut handles = Vec::new();
    for (i, amount) in amounts.into_iter().enumerate() {
        let delegator = Arc::clone(&delegator);
        handles.push(tokio::spawn(async move {
            let action =
                CreateTransaction::new(account_id, Uuid::new_v4(), amount, format!("tx {i}"));
            delegator.submit(&CancellationToken::new(), action).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let account = engine.account(account_id).await.unwrap();
    assert_eq!(account.balance, expected);

    let page = engine
        .list_transactions(
            &TransactionListFilter::new(ListFilter::first_page(100)).account_id(account_id),
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 40);
    assert_eq!(page.next_cursor, None);
    let sum: Decimal = page.items.iter().map(|tx| tx.amount).sum();
    assert_eq!(account.starting_balance + sum, account.balance);

    delegator.stop().await;
}

#[tokio::test]
async fn inexact_balance_is_rejected_and_rolled_back() {
    let (delegator, engine, _db) = engine_with_db(1).await;
    let cancel = CancellationToken::new();
    let account_id = new_account(&delegator, "Precise", "1.000000000000000000000000001").await;

    let action = CreateTransaction::new(account_id, Uuid::new_v4(), dec("100"), "Too wide");
    let transaction_id = action.id;
    let err = delegator.submit(&cancel, action).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)), "{err:?}");

    let account = engine.account(account_id).await.unwrap();
    assert_eq!(account.balance.to_string(), "1.000000000000000000000000001");
    assert!(engine.transaction(transaction_id).await.is_err());

    // Trailing zeros can go, so this one still lands exactly.
    let wide = new_account(&delegator, "Wide", "1.0000000000000000000000000000").await;
    delegator
        .submit(
            &cancel,
            CreateTransaction::new(wide, Uuid::new_v4(), dec("100"), "Fits"),
        )
        .await
        .unwrap();
    assert_eq!(engine.account(wide).await.unwrap().balance, dec("101"));

    delegator.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transactions_across_accounts_stay_isolated() {
    let (delegator, engine, _db) = engine_with_db(4).await;
    let delegator = Arc::new(delegator);
    let first = new_account(&delegator, "First", "0").await;
    let second = new_account(&delegator, "Second", "1000").await;

    let mut handles = Vec::new();
    for i in 0..30 {
        let delegator = Arc::clone(&delegator);
        let (account_id, amount) = if i % 2 == 0 {
            (first, dec("1.10"))
        } else {
            (second, dec("-2.20"))
        };
        handles.push(tokio::spawn(async move {
            delegator
                .submit(
                    &CancellationToken::new(),
                    CreateTransaction::new(account_id, Uuid::new_v4(), amount, "split"),
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(engine.account(first).await.unwrap().balance, dec("16.50"));
    assert_eq!(engine.account(second).await.unwrap().balance, dec("967.00"));

    delegator.stop().await;
}
