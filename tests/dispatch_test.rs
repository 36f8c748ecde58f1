//! Integration tests for statement routing and connection behavior.
//!
//! No running SQL Server is required: routing comes from the statement
//! classifier and connection behavior from a provider pointed at an
//! unreachable address.

use std::sync::Arc;

use clap::Parser;
use mssql_mcp_server::config::Config;
use mssql_mcp_server::db::{ConnectionProvider, StatementExecutor, returns_rows};
use mssql_mcp_server::error::DbError;
use mssql_mcp_server::mcp::MssqlService;
use rmcp::ServerHandler;

fn unreachable_config() -> Config {
    Config::parse_from([
        "mssql-mcp-server",
        "--server",
        "127.0.0.1",
        "--port",
        "1",
        "--username",
        "sa",
        "--password",
        "x",
        "--connect-timeout",
        "1",
    ])
}

#[test]
fn service_advertises_tool_capability() {
    let config = Config::default_config();
    let executor = StatementExecutor::new(config.request_timeout_duration());
    let service = MssqlService::new(Arc::new(ConnectionProvider::new(config)), executor);

    let info = service.get_info();
    assert!(info.capabilities.tools.is_some());
    assert_eq!(info.server_info.name, "mssql-mcp-server");
    assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
}

#[test]
fn select_variants_route_to_the_row_path() {
    for sql in [
        "SELECT * FROM dbo.orders",
        "select top 10 * from sys.objects",
        "WITH recent AS (SELECT 1 AS n) SELECT * FROM recent",
        "EXEC sp_help 'orders'",
        "EXECUTE dbo.usp_sales_report",
        "  -- audit\n  SELECT COUNT(*) FROM dbo.audit_log",
        "/* generated */ select getdate()",
    ] {
        assert!(returns_rows(sql), "expected row path for: {sql}");
    }
}

#[test]
fn writes_and_ddl_route_to_the_count_path() {
    for sql in [
        "INSERT INTO dbo.orders (id) VALUES (1)",
        "UPDATE dbo.orders SET total = 0",
        "delete from dbo.orders where id = 1",
        "CREATE TABLE dbo.widgets (id INT PRIMARY KEY)",
        "ALTER TABLE dbo.widgets ADD name NVARCHAR(50)",
        "DROP TABLE dbo.widgets",
        "MERGE dbo.target AS t USING dbo.src AS s ON t.id = s.id \
         WHEN MATCHED THEN UPDATE SET t.v = s.v;",
    ] {
        assert!(!returns_rows(sql), "expected count path for: {sql}");
    }
}

#[tokio::test]
async fn unreachable_server_fails_without_caching_the_failure() {
    let provider = ConnectionProvider::new(unreachable_config());

    let first = provider.acquire().await;
    assert!(first.is_err());
    assert!(!provider.is_initialized().await);

    // A second attempt runs establishment again instead of replaying a
    // cached failure.
    let second = provider.acquire().await;
    match second {
        Err(DbError::Connection { .. }) | Err(DbError::Timeout { .. }) => {}
        other => panic!("expected a connection-class error, got {:?}", other.err()),
    }
    assert!(!provider.is_initialized().await);
}
