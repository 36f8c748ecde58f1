//! MSSQL MCP Server - Main entry point.
//!
//! Exposes a Microsoft SQL Server database to AI assistants over the MCP
//! protocol on stdio. The database connection is established lazily on the
//! first tool invocation, so startup succeeds even while the server is
//! unreachable.

use std::sync::Arc;

use clap::Parser;
use mssql_mcp_server::config::Config;
use mssql_mcp_server::db::{ConnectionProvider, StatementExecutor};
use mssql_mcp_server::transport::{StdioTransport, Transport};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// All log layers write to stderr; stdout carries only protocol traffic.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    init_tracing(&config);

    if let Err(msg) = config.validate() {
        eprintln!("Error: {}", msg);
        std::process::exit(1);
    }

    info!(
        database = %config.summary(),
        "Starting MSSQL MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let executor = StatementExecutor::new(config.request_timeout_duration());
    let provider = Arc::new(ConnectionProvider::new(config));

    let transport = StdioTransport::new(provider, executor);
    info!(transport = transport.name(), "Using stdio transport");

    if let Err(e) = transport.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
