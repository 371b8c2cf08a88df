//! Datasource router demo binary.
//!
//! Reads a flat property file (key=value lines), bootstraps the configured
//! pools, then pings every pool through the routing datasource under a
//! directive, which exercises the full switch/acquire/restore path.

use clap::Parser;
use datasource_router::{
    DEFAULT_POOL_NAME, DataSourceInterceptor, DataSourceRegistrar, RoutingConfig, RoutingDirective,
};
use std::collections::HashMap;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(name = "datasource-router", version, about)]
struct Cli {
    /// Property file with datasource.* entries, one key=value per line.
    #[arg(long, env = "DATASOURCE_CONFIG")]
    config: Option<String>,

    /// Inline property overrides, repeatable: --set datasource.url=...
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Log level when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

/// Collect properties from the optional file plus --set overrides.
fn load_properties(cli: &Cli) -> Result<HashMap<String, String>, Box<dyn std::error::Error>> {
    let mut props = HashMap::new();

    if let Some(path) = &cli.config {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read config file '{}': {}", path, e))?;
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(format!("Malformed property line: '{}'", line).into());
            };
            props.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    for entry in &cli.set {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(format!("Malformed --set entry: '{}'", entry).into());
        };
        props.insert(key.trim().to_string(), value.trim().to_string());
    }

    Ok(props)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let props = load_properties(&cli)?;
    if props.is_empty() {
        eprintln!("Error: no datasource configuration given.");
        eprintln!();
        eprintln!("Usage: datasource-router --config datasources.properties");
        eprintln!("       datasource-router --set datasource.driver=sqlite \\");
        eprintln!("                         --set datasource.url=sqlite:data.db \\");
        eprintln!("                         --set datasource.username=app \\");
        eprintln!("                         --set datasource.password=secret \\");
        eprintln!("                         --set datasource.type=sqlx");
        std::process::exit(1);
    }

    // Fatal on any incomplete descriptor: no partial startup.
    let config = RoutingConfig::from_properties(&props)?;

    info!(
        slaves = config.named.len(),
        "Starting datasource router v{}",
        env!("CARGO_PKG_VERSION")
    );

    let datasource = match DataSourceRegistrar::new().bootstrap(&config).await {
        Ok(ds) => ds,
        Err(e) => {
            error!(error = %e, "Bootstrap failed");
            return Err(e.into());
        }
    };

    let interceptor = DataSourceInterceptor::new(datasource.registry().clone());

    let mut targets = vec![DEFAULT_POOL_NAME.to_string()];
    targets.extend(config.slave_names().iter().map(|s| s.to_string()));

    for target in targets {
        let directive = RoutingDirective::new(&target);
        let outcome = interceptor
            .invoke(&directive, datasource.acquire())
            .await;
        match outcome {
            Ok(_) => info!(pool = %target, "Acquired connection through routing datasource"),
            Err(e) => error!(pool = %target, error = %e, "Acquisition failed"),
        }
    }

    datasource.registry().close_all().await;
    info!("Shutdown complete");
    Ok(())
}
