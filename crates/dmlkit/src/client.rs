//! Database client trait.
//!
//! The core never talks to a driver directly. Anything that can run a SQL
//! string and hand back decoded [`Row`]s implements [`DbClient`].

use crate::error::SqlResult;
use crate::mapper::Row;

/// A minimal async database client.
///
/// Statements arrive fully interpolated; implementations must not rewrite
/// driver errors beyond tagging them with an [`ErrorKind`](crate::ErrorKind).
#[async_trait::async_trait]
pub trait DbClient: Send + Sync {
    /// Run a query and return all rows.
    async fn query(&self, sql: &str) -> SqlResult<Vec<Row>>;

    /// Run a statement and return the number of affected rows.
    async fn execute(&self, sql: &str) -> SqlResult<u64>;

    /// Release the underlying connection(s).
    async fn close(&self) -> SqlResult<()> {
        Ok(())
    }
}
