//! Error types for the datasource router.
//!
//! This module defines all error types using `thiserror`. The taxonomy follows
//! the routing core's propagation policy: bootstrap errors are fatal and halt
//! startup, a missing routing target is recoverable (absorbed into default
//! routing by the caller), and underlying pool errors pass through unmodified.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Datasource '{pool}' is missing required field '{field}'")]
    MissingField { pool: String, field: &'static str },

    #[error(
        "Datasource '{pool}' has unknown driver '{driver}' (expected mysql, postgres or sqlite)"
    )]
    UnknownDriver { pool: String, driver: String },

    #[error("Datasource '{pool}' requests unknown pool type '{pool_type}'")]
    UnknownPoolType { pool: String, pool_type: String },

    #[error("Failed to build pool '{pool}': {message}")]
    PoolBuild { pool: String, message: String },

    #[error("No datasource registered under '{name}'")]
    PoolNotFound { name: String },

    /// Errors from the underlying pool implementation pass through unchanged.
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

impl RouterError {
    /// Create a missing-field bootstrap error.
    pub fn missing_field(pool: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            pool: pool.into(),
            field,
        }
    }

    /// Create an unknown-driver error.
    pub fn unknown_driver(pool: impl Into<String>, driver: impl Into<String>) -> Self {
        Self::UnknownDriver {
            pool: pool.into(),
            driver: driver.into(),
        }
    }

    /// Create an unknown pool-type error.
    pub fn unknown_pool_type(pool: impl Into<String>, pool_type: impl Into<String>) -> Self {
        Self::UnknownPoolType {
            pool: pool.into(),
            pool_type: pool_type.into(),
        }
    }

    /// Create a pool construction error.
    pub fn pool_build(pool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PoolBuild {
            pool: pool.into(),
            message: message.into(),
        }
    }

    /// Create a pool-not-found error.
    pub fn pool_not_found(name: impl Into<String>) -> Self {
        Self::PoolNotFound { name: name.into() }
    }

    /// True for errors that must abort startup rather than be absorbed
    /// into fallback routing.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::UnknownDriver { .. }
                | Self::UnknownPoolType { .. }
                | Self::PoolBuild { .. }
        )
    }
}

/// Result type alias for routing operations.
pub type RouterResult<T> = Result<T, RouterError>;
