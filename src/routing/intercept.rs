//! Interception around routed units of work.
//!
//! The interceptor is the only component that mutates the routing context.
//! It validates the directive's target against the registry before switching,
//! runs the body, and guarantees the key is gone afterward: the body runs in
//! its own context scope, so the slot is dropped on every exit path,
//! panics included, and any outer key is restored.

use crate::routing::context::RoutingContext;
use crate::routing::registry::{DEFAULT_POOL_NAME, PoolRegistry};
use std::future::Future;
use tracing::{debug, warn};

/// Names the pool a unit of work wants to run under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDirective {
    target: String,
}

impl RoutingDirective {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Default for RoutingDirective {
    /// An unspecified directive targets the default pool.
    fn default() -> Self {
        Self::new(DEFAULT_POOL_NAME)
    }
}

/// Wraps routed operations with set-up and tear-down of the routing key.
#[derive(Debug, Clone)]
pub struct DataSourceInterceptor {
    registry: PoolRegistry,
}

impl DataSourceInterceptor {
    pub fn new(registry: PoolRegistry) -> Self {
        Self { registry }
    }

    /// Run `op` under the directive's target pool.
    ///
    /// If the target is not registered, a diagnostic is emitted and the body
    /// runs with the routing context untouched - degraded but non-fatal, the
    /// operation still executes under whatever routing was already in effect.
    /// The interceptor never produces an error of its own; it forwards the
    /// body's output after cleanup.
    pub async fn invoke<F, T>(&self, directive: &RoutingDirective, op: F) -> T
    where
        F: Future<Output = T>,
    {
        if !self.registry.contains(directive.target()).await {
            warn!(
                pool = %directive.target(),
                "Directive targets an unregistered datasource, keeping current routing"
            );
            return op.await;
        }

        debug!(pool = %directive.target(), "Switching datasource");
        RoutingContext::scope(async {
            RoutingContext::set_current(directive.target());
            let out = op.await;
            RoutingContext::clear();
            debug!(pool = %directive.target(), "Cleared datasource");
            out
        })
        .await
    }
}
