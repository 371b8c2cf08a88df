//! Datasource configuration.
//!
//! This module consumes a flat property map (the shape produced by any
//! `.properties`-style source) and turns it into validated pool descriptors:
//! one default datasource plus zero or more named "slave" datasources listed
//! under a comma-separated name key.
//!
//! Property layout:
//!
//! ```text
//! datasource.driver   = sqlite
//! datasource.url      = sqlite::memory:
//! datasource.username = app
//! datasource.password = secret
//! datasource.type     = sqlx
//! datasource.names    = report_db,archive_db
//! datasource.report_db.driver = mysql
//! datasource.report_db.url    = mysql://localhost:3306/report
//! ...
//! ```

use crate::error::{RouterError, RouterResult};
use serde::Serialize;
use std::collections::HashMap;

/// Property key prefix for the default datasource.
pub const PROPERTY_PREFIX: &str = "datasource";
/// Property key listing the named datasources, comma-separated.
pub const NAMES_KEY: &str = "datasource.names";
/// Separator between names in [`NAMES_KEY`].
pub const NAME_SEPARATOR: char = ',';

/// Everything needed to construct one connection pool.
///
/// All fields are required; bootstrap aborts if any is absent or blank.
#[derive(Debug, Clone, Serialize)]
pub struct PoolDescriptor {
    pub driver: String,
    pub url: String,
    pub username: String,
    /// Contains sensitive data - never log
    #[serde(skip_serializing)]
    pub password: String,
    /// Identifier selecting the pool construction strategy.
    pub pool_type: String,
}

impl PoolDescriptor {
    /// Read one descriptor from the property map under the given key prefix.
    ///
    /// `pool` names the datasource in error messages; the default datasource
    /// uses the bare [`PROPERTY_PREFIX`], named ones use
    /// `datasource.<name>.<field>`.
    fn from_properties(
        props: &HashMap<String, String>,
        prefix: &str,
        pool: &str,
    ) -> RouterResult<Self> {
        let field = |name: &'static str| -> RouterResult<String> {
            match props.get(&format!("{prefix}.{name}")) {
                Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
                _ => Err(RouterError::missing_field(pool, name)),
            }
        };

        Ok(Self {
            driver: field("driver")?,
            url: field("url")?,
            username: field("username")?,
            password: field("password")?,
            pool_type: field("type")?,
        })
    }

    /// Display-safe summary with the password masked.
    pub fn masked(&self) -> String {
        format!(
            "{} {} (user: {}, pool type: {})",
            self.driver, self.url, self.username, self.pool_type
        )
    }
}

/// The full routing configuration: a default datasource plus named slaves.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub default: PoolDescriptor,
    /// Named datasources in declaration order. Order is not significant for
    /// routing; it is kept only so bootstrap logs read like the config.
    pub named: Vec<(String, PoolDescriptor)>,
}

impl RoutingConfig {
    /// Build the configuration from a flat property map.
    ///
    /// Fails on the first incomplete descriptor; no pool is constructed from
    /// a configuration that does not validate as a whole.
    pub fn from_properties(props: &HashMap<String, String>) -> RouterResult<Self> {
        let default = PoolDescriptor::from_properties(props, PROPERTY_PREFIX, "default")?;

        let mut named = Vec::new();
        if let Some(names) = props.get(NAMES_KEY) {
            for name in names.split(NAME_SEPARATOR) {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                let prefix = format!("{PROPERTY_PREFIX}.{name}");
                let descriptor = PoolDescriptor::from_properties(props, &prefix, name)?;
                named.push((name.to_string(), descriptor));
            }
        }

        Ok(Self { default, named })
    }

    /// Names of all configured datasources, default excluded.
    pub fn slave_names(&self) -> Vec<&str> {
        self.named.iter().map(|(name, _)| name.as_str()).collect()
    }
}
