//! In-memory [`DbClient`] for tests.
//!
//! Expectations are consumed in order. Each one matches the incoming SQL with
//! a regular expression and answers with rows, an affected-row count or an
//! error.
//!
//! ```
//! use dmlkit::Value;
//! use dmlkit_ddl::mock::{MockClient, MockRows};
//!
//! let db = MockClient::new();
//! db.expect_query("SELECT .+ FROM information_schema.COLUMNS")
//!     .rows(MockRows::new(&["TABLE_NAME"]).row(vec![Value::String("store".into())]));
//! db.expect_exec("^DROP TABLE").affected(0);
//! assert_eq!(db.pending(), 2);
//! ```

use async_trait::async_trait;
use dmlkit::{DbClient, Row, SqlError, SqlResult, Value};
use regex::Regex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Query,
    Exec,
}

impl Call {
    fn as_str(self) -> &'static str {
        match self {
            Call::Query => "query",
            Call::Exec => "exec",
        }
    }
}

#[derive(Debug)]
enum Answer {
    Rows(Vec<Row>),
    Affected(u64),
    Error(SqlError),
}

#[derive(Debug)]
struct Expectation {
    call: Call,
    pattern: Regex,
    answer: Answer,
}

/// Scripted database client.
#[derive(Debug, Default)]
pub struct MockClient {
    expected: Mutex<VecDeque<Expectation>>,
    executed: Mutex<Vec<String>>,
    closed: AtomicBool,
}

/// Pending expectation returned by [`MockClient::expect_query`] and
/// [`MockClient::expect_exec`]. Nothing is registered until an answer is set.
#[must_use = "an expectation needs an answer"]
pub struct ExpectBuilder<'a> {
    client: &'a MockClient,
    call: Call,
    pattern: Regex,
}

impl ExpectBuilder<'_> {
    pub fn rows(self, rows: impl Into<Vec<Row>>) {
        self.push(Answer::Rows(rows.into()));
    }

    pub fn affected(self, n: u64) {
        self.push(Answer::Affected(n));
    }

    pub fn error(self, err: SqlError) {
        self.push(Answer::Error(err));
    }

    fn push(self, answer: Answer) {
        self.client.lock_expected().push_back(Expectation {
            call: self.call,
            pattern: self.pattern,
            answer,
        });
    }
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle, ready to hand to a registry.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Expect a query matching `pattern`.
    ///
    /// # Panics
    ///
    /// When `pattern` is not a valid regular expression.
    #[track_caller]
    pub fn expect_query(&self, pattern: &str) -> ExpectBuilder<'_> {
        self.expect(Call::Query, pattern)
    }

    /// Expect a statement matching `pattern`.
    ///
    /// # Panics
    ///
    /// When `pattern` is not a valid regular expression.
    #[track_caller]
    pub fn expect_exec(&self, pattern: &str) -> ExpectBuilder<'_> {
        self.expect(Call::Exec, pattern)
    }

    #[track_caller]
    fn expect(&self, call: Call, pattern: &str) -> ExpectBuilder<'_> {
        let pattern = match Regex::new(pattern) {
            Ok(re) => re,
            Err(e) => panic!("mock: invalid pattern {pattern:?}: {e}"),
        };
        ExpectBuilder {
            client: self,
            call,
            pattern,
        }
    }

    /// Number of expectations not consumed yet.
    pub fn pending(&self) -> usize {
        self.lock_expected().len()
    }

    /// Fails when expectations are left over.
    pub fn expectations_met(&self) -> SqlResult<()> {
        let expected = self.lock_expected();
        match expected.front() {
            None => Ok(()),
            Some(next) => Err(SqlError::not_valid(format!(
                "mock: {} expectation(s) not met, next is {} matching {:?}",
                expected.len(),
                next.call.as_str(),
                next.pattern.as_str()
            ))),
        }
    }

    /// Every SQL string received so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn lock_expected(&self) -> std::sync::MutexGuard<'_, VecDeque<Expectation>> {
        self.expected.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next(&self, call: Call, sql: &str) -> SqlResult<Answer> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sql.to_string());

        let mut expected = self.lock_expected();
        let Some(next) = expected.front() else {
            return Err(SqlError::not_valid(format!(
                "mock: unexpected {} {sql:?}, no expectations left",
                call.as_str()
            )));
        };
        if next.call != call || !next.pattern.is_match(sql) {
            return Err(SqlError::not_valid(format!(
                "mock: unexpected {} {sql:?}, expected {} matching {:?}",
                call.as_str(),
                next.call.as_str(),
                next.pattern.as_str()
            )));
        }
        match expected.pop_front() {
            Some(e) => Ok(e.answer),
            None => Err(SqlError::not_valid("mock: expectation vanished")),
        }
    }
}

#[async_trait]
impl DbClient for MockClient {
    async fn query(&self, sql: &str) -> SqlResult<Vec<Row>> {
        match self.next(Call::Query, sql)? {
            Answer::Rows(rows) => Ok(rows),
            Answer::Affected(_) => Ok(Vec::new()),
            Answer::Error(e) => Err(e),
        }
    }

    async fn execute(&self, sql: &str) -> SqlResult<u64> {
        match self.next(Call::Exec, sql)? {
            Answer::Affected(n) => Ok(n),
            Answer::Rows(rows) => Ok(rows.len() as u64),
            Answer::Error(e) => Err(e),
        }
    }

    async fn close(&self) -> SqlResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Builder for result rows sharing one column list.
#[derive(Debug, Clone)]
pub struct MockRows {
    columns: Arc<[String]>,
    rows: Vec<Vec<Value>>,
}

impl MockRows {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row.
    ///
    /// # Panics
    ///
    /// When the number of values differs from the number of columns.
    #[track_caller]
    pub fn row(mut self, values: Vec<Value>) -> Self {
        if values.len() != self.columns.len() {
            panic!(
                "mock: row has {} value(s) but {} column(s)",
                values.len(),
                self.columns.len()
            );
        }
        self.rows.push(values);
        self
    }

    pub fn into_rows(self) -> Vec<Row> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .filter_map(|values| Row::new(columns.clone(), values).ok())
            .collect()
    }
}

impl From<MockRows> for Vec<Row> {
    fn from(rows: MockRows) -> Self {
        rows.into_rows()
    }
}
