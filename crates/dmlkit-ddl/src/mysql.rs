//! [`DbClient`] on top of a sqlx MySQL pool.
//!
//! Statements go over the text protocol, so every value arrives as bytes and
//! is converted by the column's declared type.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use dmlkit::{DbClient, ErrorKind, Row, SqlError, SqlResult, Value};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MySqlClient {
    pool: MySqlPool,
}

impl MySqlClient {
    /// Connect a pool of up to `max_connections` to `url`.
    pub async fn connect(url: &str, max_connections: u32) -> SqlResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(map_err)?;
        tracing::debug!(target: "dmlkit.ddl", max_connections, "connected to MySQL");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl DbClient for MySqlClient {
    async fn query(&self, sql: &str) -> SqlResult<Vec<Row>> {
        let rows = sqlx::raw_sql(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;

        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };
        let columns: Arc<[String]> = first.columns().iter().map(|c| c.name().to_string()).collect();
        rows.iter()
            .map(|row| Row::new(columns.clone(), decode_row(row)?))
            .collect()
    }

    async fn execute(&self, sql: &str) -> SqlResult<u64> {
        let done = sqlx::raw_sql(sql)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(done.rows_affected())
    }

    async fn close(&self) -> SqlResult<()> {
        self.pool.close().await;
        Ok(())
    }
}

fn decode_row(row: &MySqlRow) -> SqlResult<Vec<Value>> {
    let mut values = Vec::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(idx).map_err(map_err)?;
        if raw.is_null() {
            values.push(Value::Null);
            continue;
        }
        let type_name = column.type_info().name().to_ascii_uppercase();
        let bytes: Vec<u8> = row.try_get_unchecked(idx).map_err(map_err)?;
        values.push(to_value(&type_name, bytes));
    }
    Ok(values)
}

/// Convert a text-protocol value by its MySQL type name.
fn to_value(type_name: &str, bytes: Vec<u8>) -> Value {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => return Value::Bytes(e.into_bytes()),
    };
    let unsigned = type_name.contains("UNSIGNED");
    let base = type_name.split_whitespace().next().unwrap_or_default();

    match base {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" | "YEAR" => {
            let parsed = if unsigned {
                text.parse().map(Value::Uint64).ok()
            } else {
                text.parse().map(Value::Int64).ok()
            };
            parsed.unwrap_or(Value::String(text))
        }
        "FLOAT" | "DOUBLE" => text.parse().map(Value::Float64).unwrap_or(Value::String(text)),
        "DATETIME" | "TIMESTAMP" => NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f")
            .map(Value::Time)
            .unwrap_or(Value::String(text)),
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" => {
            Value::Bytes(text.into_bytes())
        }
        _ => Value::String(text),
    }
}

fn map_err(e: sqlx::Error) -> SqlError {
    match e {
        sqlx::Error::PoolClosed => SqlError::driver_with_kind(ErrorKind::AlreadyClosed, e),
        sqlx::Error::PoolTimedOut => SqlError::driver_with_kind(ErrorKind::Timeout, e),
        sqlx::Error::RowNotFound => SqlError::driver_with_kind(ErrorKind::NotFound, e),
        e => SqlError::driver(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_by_signedness() {
        assert_eq!(to_value("INT", b"-7".to_vec()), Value::Int64(-7));
        assert_eq!(
            to_value("BIGINT UNSIGNED", b"18446744073709551615".to_vec()),
            Value::Uint64(u64::MAX)
        );
    }

    #[test]
    fn datetime_parses() {
        let v = to_value("DATETIME", b"2024-03-01 12:30:00".to_vec());
        assert!(matches!(v, Value::Time(_)), "{v:?}");
    }

    #[test]
    fn zero_date_stays_text() {
        let v = to_value("TIMESTAMP", b"0000-00-00 00:00:00".to_vec());
        assert_eq!(v, Value::String("0000-00-00 00:00:00".to_string()));
    }

    #[test]
    fn blobs_and_invalid_utf8_are_bytes() {
        assert_eq!(to_value("BLOB", b"ab".to_vec()), Value::Bytes(b"ab".to_vec()));
        assert_eq!(to_value("VARCHAR", vec![0xff, 0x00]), Value::Bytes(vec![0xff, 0x00]));
    }

    #[test]
    fn pool_closed_is_tagged() {
        assert!(map_err(sqlx::Error::PoolClosed).is_already_closed());
        assert_eq!(map_err(sqlx::Error::Protocol("boom".into())).kind(), ErrorKind::Other);
    }
}
