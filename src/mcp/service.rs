//! MCP service implementation using rmcp.
//!
//! `MssqlService` exposes the three database tools over the MCP protocol.
//! The tool router is generated by the rmcp macros, but `ServerHandler` is
//! implemented by hand: unknown tool names must come back as error envelopes
//! rather than protocol faults, and the catalog must list in declaration
//! order.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::{ToolCallContext, ToolRouter},
    handler::server::wrapper::Parameters,
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    schemars::JsonSchema,
    tool, tool_router,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::db::{ConnectionProvider, StatementExecutor, StatementOutcome};
use crate::error::{DbError, DbResult};
use crate::tools::{error_envelope, success_envelope};

/// Catalog order as advertised through `tools/list`.
const TOOL_ORDER: [&str; 3] = ["query", "list_tables", "describe_table"];

/// Input for the query tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryInput {
    /// The SQL statement to execute (supports SELECT for data retrieval, DDL for schema changes, and DML for data modifications)
    pub sql: String,
}

/// Input for the describe_table tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DescribeTableInput {
    /// The name of the table to describe
    pub table: String,
}

#[derive(Clone)]
pub struct MssqlService {
    provider: Arc<ConnectionProvider>,
    executor: StatementExecutor,
    tool_router: ToolRouter<Self>,
}

impl MssqlService {
    pub fn new(provider: Arc<ConnectionProvider>, executor: StatementExecutor) -> Self {
        Self {
            provider,
            executor,
            tool_router: Self::tool_router(),
        }
    }

    /// Reject missing or whitespace-only required arguments before any
    /// database work happens.
    fn require_non_empty<'a>(&self, value: &'a str, field: &str) -> DbResult<&'a str> {
        if value.trim().is_empty() {
            Err(DbError::invalid_input(format!("{} is required", field)))
        } else {
            Ok(value)
        }
    }

    /// Recover a router-level rejection (missing or malformed arguments
    /// caught during input deserialization) into an error envelope.
    fn recover_tool_error(err: McpError) -> CallToolResult {
        error_envelope(&DbError::invalid_input(err.message.to_string()))
    }

    /// Fold an operation result into the response envelope. Failures are
    /// logged and become `isError` envelopes, never protocol errors.
    fn respond(&self, tool: &str, outcome: DbResult<StatementOutcome>) -> CallToolResult {
        match outcome {
            Ok(outcome) => {
                debug!(tool, "tool call succeeded");
                success_envelope(&outcome)
            }
            Err(err) => {
                warn!(tool, error = %err, "tool call failed");
                error_envelope(&err)
            }
        }
    }
}

#[tool_router]
impl MssqlService {
    #[tool(
        description = "Execute any SQL statement (SELECT, INSERT, UPDATE, DELETE, CREATE, ALTER, DROP, etc.) and return results or status"
    )]
    async fn query(
        &self,
        Parameters(input): Parameters<QueryInput>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = async {
            let sql = self.require_non_empty(&input.sql, "sql")?;
            let pool = self.provider.acquire().await?;
            self.executor.run_sql(&pool, sql).await
        }
        .await;
        Ok(self.respond("query", outcome))
    }

    #[tool(description = "List all tables in the database")]
    async fn list_tables(&self) -> Result<CallToolResult, McpError> {
        let outcome = async {
            let pool = self.provider.acquire().await?;
            self.executor.list_tables(&pool).await
        }
        .await;
        Ok(self.respond("list_tables", outcome))
    }

    #[tool(description = "Get the schema of a specific table")]
    async fn describe_table(
        &self,
        Parameters(input): Parameters<DescribeTableInput>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = async {
            let table = self.require_non_empty(&input.table, "table")?;
            let pool = self.provider.acquire().await?;
            self.executor.describe_table(&pool, table).await
        }
        .await;
        Ok(self.respond("describe_table", outcome))
    }
}

impl ServerHandler for MssqlService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mssql-mcp-server".to_owned(),
                title: Some("MSSQL MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Tools for working with a Microsoft SQL Server database.\n\
                \n\
                - `query` executes any SQL statement; SELECT-style statements \
                return rows as JSON, writes return affected row counts\n\
                - `list_tables` enumerates tables and views\n\
                - `describe_table` returns column metadata for one table"
                    .to_owned(),
            ),
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        // Unknown names never reach the database and never become protocol
        // errors; they get the same envelope shape as every other failure.
        if !self.tool_router.has_route(request.name.as_ref()) {
            warn!(tool = %request.name, "unknown tool invoked");
            return Ok(error_envelope(&DbError::unknown_tool(
                request.name.as_ref(),
            )));
        }
        let tcc = ToolCallContext::new(self, request, context);
        match self.tool_router.call(tcc).await {
            Ok(result) => Ok(result),
            // Argument deserialization failures must stay inside the
            // envelope contract too, never surface as protocol errors.
            Err(err) => {
                warn!(error = %err, "tool arguments rejected");
                Ok(Self::recover_tool_error(err))
            }
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        // The router stores tools in a map; pin the advertised order.
        let mut tools = self.tool_router.list_all();
        tools.sort_by_key(|tool| {
            TOOL_ORDER
                .iter()
                .position(|name| *name == tool.name.as_ref())
                .unwrap_or(TOOL_ORDER.len())
        });
        Ok(ListToolsResult {
            tools,
            ..Default::default()
        })
    }
}
