use std::error::Error;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{
    AccountType, CancellationToken, CreateAccount, CreateTransaction, Cursor, Delegator, Engine,
    ListFilter, Page, TransactionListFilter,
};
use migration::MigratorTrait;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "budget_admin")]
#[command(about = "Admin utilities for the budget backend (accounts and transactions)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./budget.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Account(Account),
    Transaction(Transaction),
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
    Show(ShowArgs),
    List(PageArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    name: String,
    /// One of cash, credit_cards, investments, loans, assets.
    #[arg(long = "type")]
    account_type: AccountType,
    #[arg(long, default_value = "")]
    sub_type: String,
    #[arg(long, allow_hyphen_values = true, default_value = "0")]
    starting_balance: Decimal,
}

#[derive(Args, Debug)]
struct Transaction {
    #[command(subcommand)]
    command: TransactionCommand,
}

#[derive(Subcommand, Debug)]
enum TransactionCommand {
    Create(TransactionCreateArgs),
    Show(ShowArgs),
    List(TransactionListArgs),
}

#[derive(Args, Debug)]
struct TransactionCreateArgs {
    #[arg(long)]
    account: Uuid,
    #[arg(long)]
    category: Uuid,
    #[arg(long, allow_hyphen_values = true)]
    amount: Decimal,
    #[arg(long)]
    name: String,
    /// RFC 3339 timestamp; defaults to the creation time.
    #[arg(long)]
    date: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct ShowArgs {
    id: Uuid,
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = engine::DEFAULT_PAGE_LIMIT)]
    limit: u64,
    /// Token printed by a previous page; overrides `--limit`.
    #[arg(long)]
    cursor: Option<String>,
}

impl PageArgs {
    fn filter(&self) -> Result<ListFilter, engine::EngineError> {
        match &self.cursor {
            Some(token) => Ok(ListFilter::from_cursor(&Cursor::decode(token)?)),
            None => Ok(ListFilter::first_page(self.limit)),
        }
    }
}

#[derive(Args, Debug)]
struct TransactionListArgs {
    #[arg(long)]
    account: Option<Uuid>,
    #[arg(long)]
    category: Option<Uuid>,
    #[command(flatten)]
    page: PageArgs,
}

fn print_page<T: serde::Serialize>(page: &Page<T>) -> Result<(), Box<dyn Error + Send + Sync>> {
    let next = page.next_cursor.as_ref().map(Cursor::encode).transpose()?;
    let out = serde_json::json!({
        "items": page.items,
        "next": next,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// Run a mutation through the operator, cancelling it on ctrl-c.
async fn submit(
    delegator: &Delegator,
    action: impl Into<engine::Action>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let cancel = CancellationToken::new();
    let guard = cancel.clone();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            guard.cancel();
        }
    });

    delegator.start();
    let result = delegator.submit(&cancel, action).await;
    signal.abort();
    delegator.stop().await;
    Ok(result?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = engine::connect(&cli.database_url, None).await?;
    migration::Migrator::up(&db, None).await?;

    let engine = Engine::builder().database(db.clone()).build();
    let delegator = Delegator::builder().database(db).workers(1).build();

    match cli.command {
        Command::Account(Account {
            command: AccountCommand::Create(args),
        }) => {
            let action = CreateAccount::new(args.name, args.account_type, args.starting_balance)
                .sub_type(args.sub_type);
            let account_id = action.id;
            submit(&delegator, action).await?;
            println!("created account: {account_id}");
        }
        Command::Account(Account {
            command: AccountCommand::Show(args),
        }) => {
            let account = engine.account(args.id).await?;
            println!("{}", serde_json::to_string_pretty(&account)?);
        }
        Command::Account(Account {
            command: AccountCommand::List(args),
        }) => {
            let page = engine.list_accounts(&args.filter()?).await?;
            print_page(&page)?;
        }
        Command::Transaction(Transaction {
            command: TransactionCommand::Create(args),
        }) => {
            let mut action =
                CreateTransaction::new(args.account, args.category, args.amount, args.name);
            if let Some(date) = args.date {
                action = action.date(date);
            }
            let transaction_id = action.id;
            submit(&delegator, action).await?;
            println!("created transaction: {transaction_id}");
        }
        Command::Transaction(Transaction {
            command: TransactionCommand::Show(args),
        }) => {
            let transaction = engine.transaction(args.id).await?;
            println!("{}", serde_json::to_string_pretty(&transaction)?);
        }
        Command::Transaction(Transaction {
            command: TransactionCommand::List(args),
        }) => {
            let mut filter = TransactionListFilter::new(args.page.filter()?);
            filter.account_id = args.account;
            filter.category_id = args.category;
            let page = engine.list_transactions(&filter).await?;
            print_page(&page)?;
        }
    }

    Ok(())
}
