//! Bootstrap: build every configured pool and wire up the routing datasource.

use crate::config::RoutingConfig;
use crate::db::{DbPool, PoolBuilderRegistry};
use crate::error::RouterResult;
use crate::routing::datasource::RoutingDataSource;
use crate::routing::registry::{DEFAULT_POOL_NAME, PoolRegistry};
use tracing::info;

/// Builds pools from a [`RoutingConfig`] and populates a fresh registry.
///
/// All pools are constructed before any is registered: a construction failure
/// aborts bootstrap without leaving a partial registry behind.
pub struct DataSourceRegistrar {
    builders: PoolBuilderRegistry,
}

impl DataSourceRegistrar {
    pub fn new() -> Self {
        Self {
            builders: PoolBuilderRegistry::new(),
        }
    }

    /// Use a pre-populated builder registry (custom pool types).
    pub fn with_builders(builders: PoolBuilderRegistry) -> Self {
        Self { builders }
    }

    /// Build all configured pools and return the routing datasource that
    /// fronts them. The default pool is registered under
    /// [`DEFAULT_POOL_NAME`]; slaves under their configured names.
    pub async fn bootstrap(&self, config: &RoutingConfig) -> RouterResult<RoutingDataSource> {
        let default_pool = self.builders.build("default", &config.default).await?;
        info!(
            descriptor = %config.default.masked(),
            "Built default datasource"
        );

        let mut named: Vec<(String, DbPool)> = Vec::with_capacity(config.named.len());
        for (name, descriptor) in &config.named {
            let pool = self.builders.build(name, descriptor).await?;
            info!(pool = %name, descriptor = %descriptor.masked(), "Built datasource");
            named.push((name.clone(), pool));
        }

        let registry = PoolRegistry::new();
        registry.register(DEFAULT_POOL_NAME, default_pool).await;
        for (name, pool) in named {
            registry.register(name, pool).await;
        }

        let count = registry.len().await;
        info!(count, "Dynamic datasource registry ready");
        Ok(RoutingDataSource::new(registry))
    }
}

impl Default for DataSourceRegistrar {
    fn default() -> Self {
        Self::new()
    }
}
