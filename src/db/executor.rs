//! Statement execution against the pooled connection.
//!
//! Tiberius splits its surface between a row stream (`simple_query`) and an
//! affected-count result (`execute`), so `run_sql` routes on the statement's
//! leading keyword. The statement text itself is sent to the server
//! unmodified; routing only decides which driver entry point to use.

use serde_json::{Map, Value};
use tracing::debug;

use crate::db::pool::MssqlPool;
use crate::db::types::row_to_json;
use crate::error::{DbError, DbResult};

const LIST_TABLES_SQL: &str = "SELECT TABLE_SCHEMA, TABLE_NAME, TABLE_TYPE \
     FROM INFORMATION_SCHEMA.TABLES \
     ORDER BY TABLE_SCHEMA, TABLE_NAME";

const DESCRIBE_TABLE_SQL: &str = "SELECT COLUMN_NAME, DATA_TYPE, CHARACTER_MAXIMUM_LENGTH, \
     IS_NULLABLE, COLUMN_DEFAULT \
     FROM INFORMATION_SCHEMA.COLUMNS \
     WHERE TABLE_NAME = @P1 \
     ORDER BY ORDINAL_POSITION";

/// What a statement produced: a result set or per-batch affected counts.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementOutcome {
    Rows(Vec<Map<String, Value>>),
    Affected(Vec<u64>),
}

/// Runs statements with a per-request timeout bound.
#[derive(Debug, Clone)]
pub struct StatementExecutor {
    request_timeout: std::time::Duration,
}

impl StatementExecutor {
    pub fn new(request_timeout: std::time::Duration) -> Self {
        Self { request_timeout }
    }

    /// Execute caller-supplied SQL, routed by its leading keyword.
    pub async fn run_sql(&self, pool: &MssqlPool, sql: &str) -> DbResult<StatementOutcome> {
        debug!(returns_rows = returns_rows(sql), "executing statement");
        let mut conn = pool.get().await.map_err(DbError::from)?;
        self.bounded("query", async {
            if returns_rows(sql) {
                let stream = conn.simple_query(sql).await?;
                let results = stream.into_results().await?;
                Ok(StatementOutcome::Rows(first_result_set(results)))
            } else {
                let result = conn.execute(sql, &[]).await?;
                Ok(StatementOutcome::Affected(result.rows_affected().to_vec()))
            }
        })
        .await
    }

    /// Enumerate tables and views visible to the connected login.
    pub async fn list_tables(&self, pool: &MssqlPool) -> DbResult<StatementOutcome> {
        let mut conn = pool.get().await.map_err(DbError::from)?;
        self.bounded("list_tables", async {
            let stream = conn.simple_query(LIST_TABLES_SQL).await?;
            let results = stream.into_results().await?;
            Ok(StatementOutcome::Rows(first_result_set(results)))
        })
        .await
    }

    /// Column metadata for one table, name bound as a typed parameter.
    ///
    /// An unknown table yields zero rows, not an error.
    pub async fn describe_table(
        &self,
        pool: &MssqlPool,
        table: &str,
    ) -> DbResult<StatementOutcome> {
        let mut conn = pool.get().await.map_err(DbError::from)?;
        self.bounded("describe_table", async {
            let stream = conn.query(DESCRIBE_TABLE_SQL, &[&table]).await?;
            let results = stream.into_results().await?;
            Ok(StatementOutcome::Rows(first_result_set(results)))
        })
        .await
    }

    async fn bounded<F>(&self, operation: &str, fut: F) -> DbResult<StatementOutcome>
    where
        F: std::future::Future<Output = Result<StatementOutcome, tiberius::error::Error>>,
    {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(result) => result.map_err(DbError::from),
            Err(_) => Err(DbError::timeout(
                operation,
                self.request_timeout.as_secs() as u32,
            )),
        }
    }
}

fn first_result_set(results: Vec<Vec<tiberius::Row>>) -> Vec<Map<String, Value>> {
    results
        .into_iter()
        .next()
        .unwrap_or_default()
        .iter()
        .map(row_to_json)
        .collect()
}

/// Whether a statement goes through the row-returning driver entry point.
///
/// `SELECT`, CTE (`WITH`) and stored procedure (`EXEC`/`EXECUTE`) statements
/// produce result sets; everything else reports affected counts.
pub fn returns_rows(sql: &str) -> bool {
    let head = strip_leading_trivia(sql);
    let keyword: String = head
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    matches!(
        keyword.to_ascii_uppercase().as_str(),
        "SELECT" | "WITH" | "EXEC" | "EXECUTE"
    )
}

/// Skip leading whitespace, `--` line comments and `/* */` block comments.
fn strip_leading_trivia(sql: &str) -> &str {
    let mut rest = sql;
    loop {
        let trimmed = rest.trim_start();
        if let Some(after) = trimmed.strip_prefix("--") {
            match after.find('\n') {
                Some(pos) => rest = &after[pos + 1..],
                None => return "",
            }
        } else if let Some(after) = trimmed.strip_prefix("/*") {
            match after.find("*/") {
                Some(pos) => rest = &after[pos + 2..],
                None => return "",
            }
        } else {
            return trimmed;
        }
    }
}
