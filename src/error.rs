//! Error types for the MSSQL MCP Server.
//!
//! This module defines all error types using `thiserror` for ergonomic error
//! handling. Every failure that can reach the dispatch boundary maps onto one
//! of these variants, and each variant renders the text that ends up in the
//! response envelope.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Connection establishment failed (network, auth, TLS, timeout).
    #[error("Connection failed: {message}")]
    Connection { message: String },

    /// A valid connection, but the statement or operation failed on the
    /// server (syntax error, constraint violation, missing object).
    #[error("{message}")]
    Execution { message: String },

    /// A required argument is missing or malformed. Detected before any
    /// database call is issued.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The invocation names a tool that is not in the catalog.
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u32,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create an execution error carrying the driver's message.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an unknown tool error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool { name: name.into() }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed_secs: u32) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is retryable on a later invocation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }
}

/// Convert tiberius driver errors to DbError.
impl From<tiberius::error::Error> for DbError {
    fn from(err: tiberius::error::Error) -> Self {
        use tiberius::error::Error;
        match err {
            // Server-raised faults carry the T-SQL error message verbatim.
            Error::Server(token) => DbError::execution(token.message().to_string()),
            Error::Io { message, .. } => {
                DbError::connection(format!("I/O error: {}", message))
            }
            Error::Tls(message) => DbError::connection(format!("TLS error: {}", message)),
            Error::Routing { host, port } => {
                DbError::connection(format!("Server requested rerouting to {}:{}", host, port))
            }
            other => DbError::execution(other.to_string()),
        }
    }
}

/// Convert pool checkout failures to DbError.
impl From<bb8::RunError<bb8_tiberius::Error>> for DbError {
    fn from(err: bb8::RunError<bb8_tiberius::Error>) -> Self {
        match err {
            bb8::RunError::User(e) => DbError::connection(e.to_string()),
            // The checkout deadline comes from configuration, which this
            // conversion cannot see; report the fact without a number.
            bb8::RunError::TimedOut => DbError::connection("connection pool acquire timed out"),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Convert DbError to MCP ErrorData for protocol-level failures.
///
/// Tool invocations never take this path (they produce error envelopes
/// instead); it exists for transport startup and handler-level faults.
impl From<DbError> for rmcp::ErrorData {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::InvalidInput { .. }
            | DbError::UnknownTool { .. }
            | DbError::Execution { .. } => {
                rmcp::ErrorData::invalid_params(err.to_string(), None)
            }
            DbError::Connection { .. } | DbError::Timeout { .. } | DbError::Internal { .. } => {
                rmcp::ErrorData::internal_error(err.to_string(), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DbError::connection("refused");
        assert_eq!(err.to_string(), "Connection failed: refused");
    }

    #[test]
    fn test_execution_error_is_verbatim() {
        let err = DbError::execution("Incorrect syntax near 'SELEC'.");
        assert_eq!(err.to_string(), "Incorrect syntax near 'SELEC'.");
    }

    #[test]
    fn test_unknown_tool_names_the_tool() {
        let err = DbError::unknown_tool("drop_everything");
        assert_eq!(err.to_string(), "Unknown tool: drop_everything");
    }

    #[test]
    fn test_error_retryable() {
        assert!(DbError::timeout("query", 30).is_retryable());
        assert!(DbError::connection("refused").is_retryable());
        assert!(!DbError::invalid_input("sql is required").is_retryable());
        assert!(!DbError::unknown_tool("nope").is_retryable());
    }

    #[test]
    fn test_pool_timeout_maps_to_connection_error() {
        let err: DbError = bb8::RunError::<bb8_tiberius::Error>::TimedOut.into();
        assert!(matches!(err, DbError::Connection { .. }));
        assert!(err.is_retryable());
        // The message must not claim a specific deadline; the configured
        // value is not visible here.
        assert!(!err.to_string().chars().any(|c| c.is_ascii_digit()));
    }

    // Tests for From<DbError> for rmcp::ErrorData

    #[test]
    fn test_invalid_input_maps_to_invalid_params() {
        let err = DbError::invalid_input("bad input");
        let mcp_err: rmcp::ErrorData = err.into();
        // invalid_params uses -32602
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_unknown_tool_maps_to_invalid_params() {
        let err = DbError::unknown_tool("nope");
        let mcp_err: rmcp::ErrorData = err.into();
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_connection_maps_to_internal_error() {
        let err = DbError::connection("refused");
        let mcp_err: rmcp::ErrorData = err.into();
        // internal_error uses -32603
        assert_eq!(mcp_err.code.0, -32603);
    }

    #[test]
    fn test_timeout_maps_to_internal_error() {
        let err = DbError::timeout("query", 30);
        let mcp_err: rmcp::ErrorData = err.into();
        assert_eq!(mcp_err.code.0, -32603);
    }
}
