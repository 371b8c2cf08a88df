//! Routing datasource: the single connection entry point.
//!
//! Every acquisition resolves the target pool fresh from the routing context,
//! so a key change between calls in the same unit of work (nested directives)
//! is picked up immediately. Nothing is cached across calls.

use crate::db::{DbConnection, DbPool};
use crate::error::RouterResult;
use crate::routing::context::RoutingContext;
use crate::routing::registry::{DEFAULT_POOL_NAME, PoolRegistry};
use tracing::{debug, warn};

/// Connection-pool facade that routes by the task's current routing key.
#[derive(Debug, Clone)]
pub struct RoutingDataSource {
    registry: PoolRegistry,
    default_name: String,
}

impl RoutingDataSource {
    /// Create a routing datasource with the standard default pool name.
    pub fn new(registry: PoolRegistry) -> Self {
        Self::with_default_name(registry, DEFAULT_POOL_NAME)
    }

    /// Create a routing datasource with a custom default pool name.
    pub fn with_default_name(registry: PoolRegistry, default_name: impl Into<String>) -> Self {
        Self {
            registry,
            default_name: default_name.into(),
        }
    }

    /// The registry this datasource routes over.
    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Resolve the pool for the current routing key, returning the name that
    /// was actually used.
    ///
    /// A key that is set but not registered is a configuration-integrity
    /// problem; the policy here is to warn and fall back to the default pool
    /// rather than fail the in-flight call. A missing default pool is an
    /// error: bootstrap guarantees it exists.
    pub async fn resolve_entry(&self) -> RouterResult<(String, DbPool)> {
        if let Some(name) = RoutingContext::current() {
            match self.registry.get(&name).await {
                Ok(pool) => {
                    debug!(pool = %name, "Routing to selected datasource");
                    return Ok((name, pool));
                }
                Err(_) => {
                    warn!(
                        pool = %name,
                        fallback = %self.default_name,
                        "Routing key targets an unregistered datasource, falling back to default"
                    );
                }
            }
        }

        let pool = self.registry.get(&self.default_name).await?;
        Ok((self.default_name.clone(), pool))
    }

    /// Resolve the pool for the current routing key.
    pub async fn resolve(&self) -> RouterResult<DbPool> {
        let (_, pool) = self.resolve_entry().await?;
        Ok(pool)
    }

    /// Acquire a connection from the resolved pool. Errors from the pool
    /// itself pass through unchanged.
    pub async fn acquire(&self) -> RouterResult<DbConnection> {
        let pool = self.resolve().await?;
        Ok(pool.acquire().await?)
    }
}
