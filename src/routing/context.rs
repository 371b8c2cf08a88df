//! Task-scoped routing context.
//!
//! Holds the name of the pool the current unit of work should route to.
//! Storage is task-local: concurrent tasks each see only their own key, and
//! the slot is dropped when its scope exits (normal return or panic), so a
//! routing key can never leak into unrelated work picked up by the same
//! runtime worker thread.

use std::cell::RefCell;
use std::future::Future;

tokio::task_local! {
    static CURRENT_POOL: RefCell<Option<String>>;
}

/// Access to the per-task routing key.
///
/// `set_current`/`current`/`clear` only take effect inside a scope established
/// by [`RoutingContext::scope`]; outside one, `current` reports unset and the
/// mutators are no-ops. The interception layer opens a scope per routed unit
/// of work, so application code normally never calls `scope` itself.
pub struct RoutingContext;

impl RoutingContext {
    /// Run `fut` with a fresh, unset routing slot.
    ///
    /// Nested scopes shadow the outer slot and restore it on exit, which is
    /// what makes nested routing directives behave like a push/pop stack.
    pub async fn scope<F>(fut: F) -> F::Output
    where
        F: Future,
    {
        CURRENT_POOL.scope(RefCell::new(None), fut).await
    }

    /// Select the pool for the rest of this unit of work.
    pub fn set_current(name: impl Into<String>) {
        let name = name.into();
        let _ = CURRENT_POOL.try_with(|slot| {
            *slot.borrow_mut() = Some(name);
        });
    }

    /// The currently selected pool name, or `None` when unset.
    pub fn current() -> Option<String> {
        CURRENT_POOL
            .try_with(|slot| slot.borrow().clone())
            .ok()
            .flatten()
    }

    /// Unset the routing key. A no-op when already unset.
    pub fn clear() {
        let _ = CURRENT_POOL.try_with(|slot| {
            *slot.borrow_mut() = None;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unset_in_fresh_scope() {
        RoutingContext::scope(async {
            assert_eq!(RoutingContext::current(), None);
        })
        .await;
    }

    #[tokio::test]
    async fn test_set_then_clear() {
        RoutingContext::scope(async {
            RoutingContext::set_current("report_db");
            assert_eq!(RoutingContext::current(), Some("report_db".to_string()));
            RoutingContext::clear();
            assert_eq!(RoutingContext::current(), None);
        })
        .await;
    }

    #[tokio::test]
    async fn test_clear_when_unset_is_noop() {
        RoutingContext::scope(async {
            RoutingContext::clear();
            assert_eq!(RoutingContext::current(), None);
        })
        .await;
    }

    #[tokio::test]
    async fn test_outside_scope_reports_unset() {
        RoutingContext::set_current("report_db");
        assert_eq!(RoutingContext::current(), None);
    }

    #[tokio::test]
    async fn test_nested_scope_restores_outer_key() {
        RoutingContext::scope(async {
            RoutingContext::set_current("outer_db");
            RoutingContext::scope(async {
                assert_eq!(RoutingContext::current(), None);
                RoutingContext::set_current("inner_db");
            })
            .await;
            assert_eq!(RoutingContext::current(), Some("outer_db".to_string()));
        })
        .await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tasks_are_isolated() {
        let mut handles = Vec::new();
        for i in 0..16 {
            handles.push(tokio::spawn(RoutingContext::scope(async move {
                let name = format!("slave{}", i);
                RoutingContext::set_current(name.clone());
                tokio::task::yield_now().await;
                assert_eq!(RoutingContext::current(), Some(name));
            })));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
