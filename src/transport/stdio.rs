//! Stdio transport for the MCP server.

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tokio::signal;
use tracing::info;

use crate::db::{ConnectionProvider, StatementExecutor};
use crate::error::{DbError, DbResult};
use crate::mcp::MssqlService;
use crate::transport::Transport;

/// Serves the MCP protocol over stdin/stdout.
pub struct StdioTransport {
    provider: Arc<ConnectionProvider>,
    executor: StatementExecutor,
}

impl StdioTransport {
    pub fn new(provider: Arc<ConnectionProvider>, executor: StatementExecutor) -> Self {
        Self { provider, executor }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> DbResult<()> {
        info!("Starting MCP server with stdio transport");

        let service = MssqlService::new(self.provider.clone(), self.executor.clone());

        let running_service = service
            .serve(stdio())
            .await
            .map_err(|e| DbError::internal(format!("Failed to start stdio transport: {}", e)))?;

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(_quit_reason) => {
                        info!("Stdio transport completed normally");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Stdio transport error");
                        return Err(DbError::internal(format!("Stdio transport error: {}", e)));
                    }
                }
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            tokio::spawn(async {
                wait_for_signal().await;
                tracing::warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });

            // tokio::select! cannot interrupt blocking stdin reads, so the
            // process exits directly once shutdown is requested.
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_stdio_transport_creation() {
        let config = Config::default_config();
        let executor = StatementExecutor::new(config.request_timeout_duration());
        let provider = Arc::new(ConnectionProvider::new(config));
        let transport = StdioTransport::new(provider, executor);
        assert_eq!(transport.name(), "stdio");
    }
}
