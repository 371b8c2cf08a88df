//! Pool registry: live connection pools keyed by name.

use crate::db::DbPool;
use crate::error::{RouterError, RouterResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Reserved name of the default datasource.
pub const DEFAULT_POOL_NAME: &str = "dataSource";

/// Shared map from pool name to live pool handle.
///
/// Built once at bootstrap and read on every connection acquisition; writes
/// after startup are allowed (pools added dynamically) and are safe against
/// concurrent readers. Cloning shares the same registry.
#[derive(Debug, Clone)]
pub struct PoolRegistry {
    pools: Arc<RwLock<HashMap<String, DbPool>>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self {
            pools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or overwrite a pool under the given name.
    pub async fn register(&self, name: impl Into<String>, pool: DbPool) {
        let name = name.into();
        let mut pools = self.pools.write().await;
        if pools.insert(name.clone(), pool).is_some() {
            info!(pool = %name, "Replaced registered datasource");
        } else {
            info!(pool = %name, "Registered datasource");
        }
    }

    /// Check whether a pool is registered under the name.
    pub async fn contains(&self, name: &str) -> bool {
        let pools = self.pools.read().await;
        pools.contains_key(name)
    }

    /// Look up a pool by name. Not finding it is recoverable; callers decide
    /// the fallback policy.
    pub async fn get(&self, name: &str) -> RouterResult<DbPool> {
        let pools = self.pools.read().await;
        match pools.get(name) {
            Some(pool) => Ok(pool.clone()),
            None => Err(RouterError::pool_not_found(name)),
        }
    }

    /// Snapshot of all registered pools.
    pub async fn all_entries(&self) -> HashMap<String, DbPool> {
        let pools = self.pools.read().await;
        pools.clone()
    }

    /// Number of registered pools.
    pub async fn len(&self) -> usize {
        let pools = self.pools.read().await;
        pools.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Close every registered pool. Intended for shutdown paths.
    pub async fn close_all(&self) {
        let pools = self.pools.read().await;
        for (name, pool) in pools.iter() {
            info!(pool = %name, "Closing datasource");
            pool.close().await;
        }
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
