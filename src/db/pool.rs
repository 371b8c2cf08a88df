//! Connection pool construction.
//!
//! Pools are database-specific (MySqlPool, PgPool, SqlitePool) rather than
//! `AnyPool` to keep full type support. Construction is lazy: building a pool
//! validates the descriptor and connection URL but opens no connection, so a
//! misconfigured pool fails at bootstrap while an unreachable server fails at
//! first acquisition, matching the underlying pool's own contract.

use crate::config::PoolDescriptor;
use crate::error::{RouterError, RouterResult};
use futures_util::future::BoxFuture;
use sqlx::{
    MySqlPool, PgPool, SqlitePool, mysql::MySqlConnectOptions, mysql::MySqlPoolOptions,
    pool::PoolConnection, postgres::PgConnectOptions, postgres::PgPoolOptions,
    sqlite::SqliteConnectOptions, sqlite::SqlitePoolOptions,
};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

// Pool sizing defaults
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MAX_CONNECTIONS_SQLITE: u32 = 1;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Built-in pool construction strategy identifier.
pub const SQLX_POOL_TYPE: &str = "sqlx";

/// Supported database drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Driver {
    /// Includes MariaDB
    MySql,
    Postgres,
    Sqlite,
}

impl Driver {
    /// Parse the driver from a descriptor's `driver` field.
    pub fn parse(driver: &str) -> Option<Self> {
        match driver.to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Self::MySql),
            "postgres" | "postgresql" => Some(Self::Postgres),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MySql => "MySQL",
            Self::Postgres => "PostgreSQL",
            Self::Sqlite => "SQLite",
        }
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Database-specific connection pool handle.
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Debug, Clone)]
pub enum DbPool {
    MySql(MySqlPool),
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

/// A checked-out connection from a [`DbPool`].
pub enum DbConnection {
    MySql(PoolConnection<sqlx::MySql>),
    Postgres(PoolConnection<sqlx::Postgres>),
    Sqlite(PoolConnection<sqlx::Sqlite>),
}

impl DbPool {
    /// Acquire a connection, delegating blocking and timeout behavior to the
    /// underlying pool.
    pub async fn acquire(&self) -> Result<DbConnection, sqlx::Error> {
        match self {
            DbPool::MySql(pool) => Ok(DbConnection::MySql(pool.acquire().await?)),
            DbPool::Postgres(pool) => Ok(DbConnection::Postgres(pool.acquire().await?)),
            DbPool::Sqlite(pool) => Ok(DbConnection::Sqlite(pool.acquire().await?)),
        }
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        match self {
            DbPool::MySql(pool) => pool.close().await,
            DbPool::Postgres(pool) => pool.close().await,
            DbPool::Sqlite(pool) => pool.close().await,
        }
    }

    /// Get the driver behind this pool.
    pub fn driver(&self) -> Driver {
        match self {
            DbPool::MySql(_) => Driver::MySql,
            DbPool::Postgres(_) => Driver::Postgres,
            DbPool::Sqlite(_) => Driver::Sqlite,
        }
    }

}

/// Build a pool with the stock sqlx strategy.
///
/// `pool` is the datasource name, used only in error messages.
pub fn build_sqlx_pool(pool: &str, descriptor: &PoolDescriptor) -> RouterResult<DbPool> {
    let driver = Driver::parse(&descriptor.driver)
        .ok_or_else(|| RouterError::unknown_driver(pool, &descriptor.driver))?;

    let acquire_timeout = Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS);
    let idle_timeout = Some(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS));

    debug!(pool = %pool, driver = %driver, "Building connection pool");

    match driver {
        Driver::MySql => {
            let options = MySqlConnectOptions::from_str(&descriptor.url)
                .map_err(|e| {
                    RouterError::pool_build(pool, format!("invalid MySQL URL: {}", e))
                })?
                .username(&descriptor.username)
                .password(&descriptor.password)
                .charset("utf8mb4");

            let handle = MySqlPoolOptions::new()
                .max_connections(DEFAULT_MAX_CONNECTIONS)
                .acquire_timeout(acquire_timeout)
                .idle_timeout(idle_timeout)
                .connect_lazy_with(options);
            Ok(DbPool::MySql(handle))
        }
        Driver::Postgres => {
            let options = PgConnectOptions::from_str(&descriptor.url)
                .map_err(|e| {
                    RouterError::pool_build(pool, format!("invalid PostgreSQL URL: {}", e))
                })?
                .username(&descriptor.username)
                .password(&descriptor.password);

            let handle = PgPoolOptions::new()
                .max_connections(DEFAULT_MAX_CONNECTIONS)
                .acquire_timeout(acquire_timeout)
                .idle_timeout(idle_timeout)
                .connect_lazy_with(options);
            Ok(DbPool::Postgres(handle))
        }
        Driver::Sqlite => {
            // Credentials are validated like every other field but SQLite has
            // no use for them.
            let options = SqliteConnectOptions::from_str(&descriptor.url)
                .map_err(|e| {
                    RouterError::pool_build(pool, format!("invalid SQLite URL: {}", e))
                })?
                .create_if_missing(true);

            let handle = SqlitePoolOptions::new()
                .max_connections(DEFAULT_MAX_CONNECTIONS_SQLITE)
                .acquire_timeout(acquire_timeout)
                .idle_timeout(idle_timeout)
                .connect_lazy_with(options);
            Ok(DbPool::Sqlite(handle))
        }
    }
}

/// A pool construction strategy: datasource name + descriptor in, pool out.
pub type PoolBuilder =
    Arc<dyn Fn(String, PoolDescriptor) -> BoxFuture<'static, RouterResult<DbPool>> + Send + Sync>;

/// Maps configured pool-type identifiers to construction strategies.
///
/// The `"sqlx"` strategy is always present; callers may register their own
/// (e.g. an instrumented or read-only wrapper) before bootstrap. Unknown
/// identifiers fail fast at build time.
pub struct PoolBuilderRegistry {
    builders: HashMap<String, PoolBuilder>,
}

impl PoolBuilderRegistry {
    pub fn new() -> Self {
        let mut builders: HashMap<String, PoolBuilder> = HashMap::new();
        builders.insert(
            SQLX_POOL_TYPE.to_string(),
            Arc::new(|pool, descriptor| {
                Box::pin(async move { build_sqlx_pool(&pool, &descriptor) })
            }),
        );
        Self { builders }
    }

    /// Register or replace a construction strategy.
    pub fn register(&mut self, pool_type: impl Into<String>, builder: PoolBuilder) {
        self.builders.insert(pool_type.into(), builder);
    }

    /// Build a pool for the descriptor, selecting the strategy by its
    /// `pool_type` field.
    pub async fn build(&self, pool: &str, descriptor: &PoolDescriptor) -> RouterResult<DbPool> {
        let builder = self
            .builders
            .get(&descriptor.pool_type)
            .ok_or_else(|| RouterError::unknown_pool_type(pool, &descriptor.pool_type))?;
        builder(pool.to_string(), descriptor.clone()).await
    }
}

impl Default for PoolBuilderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
