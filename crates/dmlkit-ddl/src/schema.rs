//! `information_schema` queries.

use crate::column::{Columns, TableColumns};
use crate::context::Context;
use dmlkit::{DbClient, Interpolate, SqlResult, scan_rows};
use std::collections::HashMap;

const COLUMNS_QUERY: &str = "SELECT TABLE_NAME, COLUMN_NAME, ORDINAL_POSITION, COLUMN_DEFAULT, \
IS_NULLABLE, DATA_TYPE, CHARACTER_MAXIMUM_LENGTH, NUMERIC_PRECISION, NUMERIC_SCALE, COLUMN_TYPE, \
COLUMN_KEY, EXTRA, COLUMN_COMMENT FROM information_schema.COLUMNS WHERE TABLE_SCHEMA=DATABASE()";

/// The column metadata query for `tables`, or for every table of the
/// current database when `tables` is empty.
pub fn columns_query<S: AsRef<str>>(tables: &[S]) -> SqlResult<String> {
    if tables.is_empty() {
        return Ok(format!(
            "{COLUMNS_QUERY} ORDER BY TABLE_NAME, ORDINAL_POSITION"
        ));
    }
    Interpolate::new(format!(
        "{COLUMNS_QUERY} AND TABLE_NAME IN (?) ORDER BY TABLE_NAME, ORDINAL_POSITION"
    ))
    .strs(tables.iter().map(|t| t.as_ref().to_string()))
    .to_sql()
}

/// Load column metadata for `tables`, keyed by table name.
pub async fn load_columns<S: AsRef<str>>(
    ctx: &Context,
    db: &dyn DbClient,
    tables: &[S],
) -> SqlResult<HashMap<String, Columns>> {
    let sql = columns_query(tables)?;
    tracing::debug!(target: "dmlkit.ddl", tables = tables.len(), "loading columns from information_schema");

    let rows = ctx.run(db.query(&sql)).await?;
    let mut grouped = TableColumns::default();
    scan_rows(&mut grouped, &rows)?;

    tracing::debug!(
        target: "dmlkit.ddl",
        rows = rows.len(),
        found = grouped.0.len(),
        "columns loaded"
    );
    Ok(grouped.into_inner())
}
