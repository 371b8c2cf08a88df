//! Dynamic Datasource Router
//!
//! Routes units of work to named sqlx connection pools at runtime: one
//! default pool, N named pools, a task-scoped routing key, and an
//! interceptor that switches and restores routing around annotated
//! operations without threading a connection through every call.

pub mod config;
pub mod db;
pub mod error;
pub mod routing;

pub use config::{PoolDescriptor, RoutingConfig};
pub use db::{DbConnection, DbPool};
pub use error::{RouterError, RouterResult};
pub use routing::{
    DEFAULT_POOL_NAME, DataSourceInterceptor, DataSourceRegistrar, PoolRegistry, RoutingContext,
    RoutingDataSource, RoutingDirective,
};
