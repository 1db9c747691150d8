//! Database configuration module.
//!
//! Connection settings come from the environment (usually via `.env`), each with
//! a default so a local MySQL instance works out of the box. A full
//! `DATABASE_URL` wins over the individual settings, which is how the loader is
//! pointed at `SQLite` instead.
//!
//! Tables are created from the entity definitions with `IF NOT EXISTS`; existing
//! tables are never altered.

use crate::entities::{Customer, Order, OrderItem, Product};
use crate::errors::{Error, Result};
use sea_orm::sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbErr, RuntimeErr, Schema, SqlxMySqlConnector,
};
use tracing::{debug, info};

/// Default database host
pub const DEFAULT_HOST: &str = "localhost";
/// Default database port
pub const DEFAULT_PORT: u16 = 3306;
/// Default database user
pub const DEFAULT_USER: &str = "root";
/// Default database name
pub const DEFAULT_DATABASE: &str = "ecommerce_analytics";

/// Connection settings for the target database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Full connection URL; overrides every other field when present
    pub url: Option<String>,
    /// Database host
    pub host: String,
    /// Database port
    pub port: u16,
    /// Database user
    pub user: String,
    /// Password for `user`, empty by default
    pub password: String,
    /// Database (schema) name
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: String::new(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Reads `DATABASE_URL`, `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` and
    /// `DB_NAME` from the environment, falling back to defaults for anything unset.
    ///
    /// # Errors
    /// Returns `Error::Config` if `DB_PORT` is set but is not a valid port number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DatabaseConfig::from_env`] but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let port = match lookup("DB_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| Error::Config {
                message: format!("Invalid DB_PORT '{raw}': {e}"),
            })?,
            None => defaults.port,
        };

        Ok(Self {
            url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            host: lookup("DB_HOST").unwrap_or(defaults.host),
            port,
            user: lookup("DB_USER").unwrap_or(defaults.user),
            password: lookup("DB_PASSWORD").unwrap_or(defaults.password),
            database: lookup("DB_NAME").unwrap_or(defaults.database),
        })
    }

    /// MySQL options built from the individual settings. Each value is passed
    /// as-is, so credentials need no URL escaping.
    #[must_use]
    pub fn mysql_options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);
        if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        }
    }

    /// A loggable description of the target that never includes the password.
    #[must_use]
    pub fn describe(&self) -> String {
        self.url.as_ref().map_or_else(
            || format!("{}@{}:{}/{}", self.user, self.host, self.port, self.database),
            |url| url.split('@').next_back().unwrap_or(url.as_str()).to_string(),
        )
    }
}

/// Opens the single connection used for a run.
///
/// A `DATABASE_URL` goes straight to the driver; otherwise a one-connection
/// MySQL pool is built from the individual settings.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", config.describe());
    if let Some(url) = &config.url {
        return Database::connect(url.as_str()).await.map_err(Into::into);
    }

    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .connect_with(config.mysql_options())
        .await
        .map_err(|e| DbErr::Conn(RuntimeErr::Internal(e.to_string())))?;
    Ok(SqlxMySqlConnector::from_sqlx_mysql_pool(pool))
}

/// Creates the four tables if they do not exist yet, parents before children so
/// foreign keys resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(Customer),
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(Order),
        schema.create_table_from_entity(OrderItem),
    ];

    for mut table in tables {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    info!("Database tables ensured.");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{CustomerModel, OrderItemModel};
    use sea_orm::{EntityTrait, QuerySelect};
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = DatabaseConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, DatabaseConfig::default());

        let options = format!("{:?}", config.mysql_options());
        assert!(options.contains(r#"host: "localhost""#), "{options}");
        assert!(options.contains("port: 3306"), "{options}");
        assert!(options.contains(r#"username: "root""#), "{options}");
        assert!(options.contains("password: None"), "{options}");
        assert!(options.contains(r#"database: Some("ecommerce_analytics")"#), "{options}");
    }

    #[test]
    fn test_individual_settings_build_options() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "3307"),
            ("DB_USER", "etl"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_NAME", "shop"),
        ]))
        .unwrap();
        let options = format!("{:?}", config.mysql_options());
        assert!(options.contains(r#"host: "db.internal""#), "{options}");
        assert!(options.contains("port: 3307"), "{options}");
        assert!(options.contains(r#"password: Some("hunter2")"#), "{options}");
        assert!(options.contains(r#"database: Some("shop")"#), "{options}");
        assert!(!config.describe().contains("hunter2"));
    }

    #[test]
    fn test_reserved_characters_in_credentials_stay_intact() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            ("DB_HOST", "db.internal"),
            ("DB_USER", "etl:loader"),
            ("DB_PASSWORD", "p@ss/w#rd"),
            ("DB_NAME", "shop"),
        ]))
        .unwrap();

        let options = format!("{:?}", config.mysql_options());
        assert!(options.contains(r#"host: "db.internal""#), "{options}");
        assert!(options.contains(r#"username: "etl:loader""#), "{options}");
        assert!(options.contains(r#"password: Some("p@ss/w#rd")"#), "{options}");
        assert!(options.contains(r#"database: Some("shop")"#), "{options}");
        assert_eq!(config.describe(), "etl:loader@db.internal:3306/shop");
    }

    #[tokio::test]
    async fn test_database_url_takes_precedence() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DB_HOST", "ignored"),
        ]))
        .unwrap();
        assert_eq!(config.url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(config.describe(), "sqlite::memory:");
        assert!(connect(&config).await.is_ok());
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let result = DatabaseConfig::from_lookup(lookup_from(&[("DB_PORT", "not-a-port")]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<CustomerModel> = Customer::find().limit(1).all(&db).await?;
        let _: Vec<OrderItemModel> = OrderItem::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_connect_failure_surfaces_error() {
        let config = DatabaseConfig {
            url: Some("sqlite://nonexistent-dir/shop.sqlite".to_string()),
            ..DatabaseConfig::default()
        };
        assert!(matches!(connect(&config).await, Err(Error::Database(_))));
    }
}
