//! Database layer: pooled connections, statement execution, row decoding.

pub mod executor;
pub mod pool;
pub mod types;

pub use executor::{StatementExecutor, StatementOutcome, returns_rows};
pub use pool::{ConnectionProvider, MssqlPool};
pub use types::row_to_json;
