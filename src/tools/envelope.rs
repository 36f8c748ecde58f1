//! Result classification and response envelopes.
//!
//! Every tool invocation resolves to a `CallToolResult` carrying exactly one
//! text content block. Result sets render as a pretty-printed JSON array
//! (empty sets included), write statements as a structured summary object,
//! and failures as `isError` envelopes with a stable text prefix.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use crate::db::StatementOutcome;
use crate::error::DbError;

#[derive(Debug, Serialize)]
struct WriteSummary {
    success: bool,
    #[serde(rename = "rowsAffected")]
    rows_affected: Vec<u64>,
    message: String,
}

/// Build the success envelope for a statement outcome.
pub fn success_envelope(outcome: &StatementOutcome) -> CallToolResult {
    let rendered = match outcome {
        StatementOutcome::Rows(rows) => serde_json::to_string_pretty(rows),
        StatementOutcome::Affected(counts) => {
            let joined = counts
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            serde_json::to_string_pretty(&WriteSummary {
                success: true,
                rows_affected: counts.clone(),
                message: format!("Query executed successfully. Rows affected: {}", joined),
            })
        }
    };
    match rendered {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => error_envelope(&DbError::internal(format!(
            "failed to serialize result: {}",
            e
        ))),
    }
}

/// Build the error envelope for any failure kind.
///
/// Unknown tool names get their own wording; everything else renders with an
/// `Error:` prefix around the variant's message.
pub fn error_envelope(err: &DbError) -> CallToolResult {
    let text = match err {
        DbError::UnknownTool { name } => format!("Unknown tool: {}", name),
        other => format!("Error: {}", other),
    };
    CallToolResult::error(vec![Content::text(text)])
}
