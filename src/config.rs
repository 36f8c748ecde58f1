//! Configuration handling for the MSSQL MCP Server.
//!
//! This module provides configuration management via CLI arguments and
//! environment variables. The `DB_*` variable names match what MCP clients
//! conventionally place in their server config blocks.

use clap::Parser;
use std::time::Duration;
use tiberius::{AuthMethod, EncryptionLevel};

pub const DEFAULT_PORT: u16 = 1433;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Pool configuration defaults
pub const DEFAULT_POOL_MAX: u32 = 10;
pub const DEFAULT_POOL_MIN: u32 = 0;
pub const DEFAULT_POOL_IDLE_TIMEOUT_SECS: u64 = 30;

/// Server configuration parsed from command line arguments and environment.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mssql-mcp-server",
    version,
    about = "MCP server exposing a Microsoft SQL Server database"
)]
pub struct Config {
    /// SQL Server hostname or IP address
    #[arg(long, default_value = "localhost", env = "DB_SERVER")]
    pub server: String,

    /// SQL Server TCP port
    #[arg(long, default_value_t = DEFAULT_PORT, env = "DB_PORT")]
    pub port: u16,

    /// Database name to connect to
    #[arg(long, default_value = "", env = "DB_DATABASE")]
    pub database: String,

    /// SQL Server login name
    #[arg(long, default_value = "", env = "DB_USERNAME")]
    pub username: String,

    /// SQL Server login password (sensitive - never logged)
    #[arg(long, default_value = "", env = "DB_PASSWORD")]
    pub password: String,

    /// Require an encrypted connection
    #[arg(long, env = "DB_ENCRYPT")]
    pub encrypt: bool,

    /// Trust the server certificate without validation
    #[arg(long, default_value_t = true, env = "DB_TRUST_CERT", action = clap::ArgAction::Set)]
    pub trust_cert: bool,

    /// Connection establishment timeout in seconds
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS, env = "DB_CONNECT_TIMEOUT")]
    pub connect_timeout: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS, env = "DB_REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    /// Maximum connections in the pool
    #[arg(long, default_value_t = DEFAULT_POOL_MAX, env = "DB_POOL_MAX")]
    pub pool_max: u32,

    /// Minimum idle connections kept in the pool
    #[arg(long, default_value_t = DEFAULT_POOL_MIN, env = "DB_POOL_MIN")]
    pub pool_min: u32,

    /// Idle connection expiry in seconds
    #[arg(long, default_value_t = DEFAULT_POOL_IDLE_TIMEOUT_SECS, env = "DB_POOL_IDLE_TIMEOUT")]
    pub pool_idle_timeout: u64,

    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self::parse_from(["mssql-mcp-server"])
    }

    /// Validate configuration values that clap cannot check on its own.
    pub fn validate(&self) -> Result<(), String> {
        if self.pool_max == 0 {
            return Err("pool_max must be greater than 0".to_string());
        }
        if self.pool_min > self.pool_max {
            return Err(format!(
                "pool_min ({}) cannot exceed pool_max ({})",
                self.pool_min, self.pool_max
            ));
        }
        Ok(())
    }

    /// Build the tiberius client configuration from these settings.
    pub fn to_tiberius(&self) -> tiberius::Config {
        let mut config = tiberius::Config::new();
        config.host(&self.server);
        config.port(self.port);
        if !self.database.is_empty() {
            config.database(&self.database);
        }
        config.authentication(AuthMethod::sql_server(&self.username, &self.password));
        if self.trust_cert {
            config.trust_cert();
        }
        if self.encrypt {
            config.encryption(EncryptionLevel::Required);
        } else {
            config.encryption(EncryptionLevel::Off);
        }
        config
    }

    /// Get the connection establishment timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Get the per-request timeout as a Duration.
    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Get the pool idle expiry as a Duration.
    pub fn pool_idle_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout)
    }

    /// Credential-free connection summary for startup logging.
    pub fn summary(&self) -> String {
        format!("{}:{}/{}", self.server, self.port, self.database)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
