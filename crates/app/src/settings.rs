//! Handles settings for the application.
//!
//! Values are read from an optional `settings.toml` next to the binary, then
//! overridden by `BUDGET__`-prefixed environment variables
//! (`BUDGET__DATABASE__POSTGRES__PORT=5432`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
    #[serde(default = "default_pg_address")]
    pub address: String,
    #[serde(default = "default_pg_port")]
    pub port: u16,
    #[serde(default = "default_pg_db")]
    pub db: String,
    #[serde(default = "default_pg_username")]
    pub username: String,
    #[serde(default = "default_pg_password")]
    pub password: String,
}

fn default_pg_address() -> String {
    "localhost".to_string()
}

fn default_pg_port() -> u16 {
    5433
}

fn default_pg_db() -> String {
    "postgres".to_string()
}

fn default_pg_username() -> String {
    "postgres".to_string()
}

fn default_pg_password() -> String {
    "testpassword".to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct Database {
    /// Full connection string; wins over `postgres` when both are set.
    pub url: Option<String>,
    pub postgres: Option<Postgres>,
    pub max_connections: Option<u32>,
}

impl Database {
    pub fn url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        match &self.postgres {
            Some(pg) => format!(
                "postgres://{}:{}@{}:{}/{}",
                pg.username, pg.password, pg.address, pg.port, pg.db
            ),
            None => "sqlite:./budget.db?mode=rwc".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Operator {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for Operator {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_workers() -> usize {
    engine::DEFAULT_WORKERS
}

fn default_queue_capacity() -> usize {
    engine::DEFAULT_QUEUE_CAPACITY
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub operator: Operator,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("BUDGET").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
