//! Connection to the transactional store shared by the workers and readers.

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::debug;

use crate::ResultEngine;

/// Open the connection pool behind `url`.
///
/// SQLite has no row-level locks, so its pool is capped at one connection:
/// write transactions then run one at a time, which is what the account row
/// lock provides on Postgres. `max_connections` only applies to other
/// backends.
pub async fn connect(url: &str, max_connections: Option<u32>) -> ResultEngine<DatabaseConnection> {
    let mut options = ConnectOptions::new(url.to_string());
    if is_sqlite(url) {
        options.max_connections(1);
    } else if let Some(max_connections) = max_connections {
        options.max_connections(max_connections);
    }
    debug!(sqlite = is_sqlite(url), "connecting to database");
    Ok(Database::connect(options).await?)
}

fn is_sqlite(url: &str) -> bool {
    url.starts_with("sqlite:")
}
