//! Database pool plumbing.
//!
//! This module owns everything below the routing layer:
//! - Driver selection from a pool descriptor
//! - Database-specific pool handles and connections
//! - Pool construction strategies keyed by configured pool type

pub mod pool;

pub use pool::{DbConnection, DbPool, Driver, PoolBuilder, PoolBuilderRegistry};
