//! The routing core.
//!
//! - Routing context: task-scoped routing key
//! - Pool registry: name to live pool mapping
//! - Routing datasource: per-acquisition pool resolution
//! - Interceptor: set/clear discipline around routed units of work
//! - Registrar: bootstrap wiring

pub mod bootstrap;
pub mod context;
pub mod datasource;
pub mod intercept;
pub mod registry;

pub use bootstrap::DataSourceRegistrar;
pub use context::RoutingContext;
pub use datasource::RoutingDataSource;
pub use intercept::{DataSourceInterceptor, RoutingDirective};
pub use registry::{DEFAULT_POOL_NAME, PoolRegistry};
