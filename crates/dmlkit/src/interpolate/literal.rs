//! Literal rendering for interpolated SQL.

use crate::argument::Value;
use crate::error::{SqlError, SqlResult};
use chrono::NaiveDateTime;
use std::fmt::Write;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Write a value; list values are written comma-joined.
pub(crate) fn write_value(buf: &mut String, value: &Value) -> SqlResult<()> {
    if !value.is_list() {
        return write_element(buf, value, 0);
    }
    if value.is_empty() {
        return Err(SqlError::not_valid(format!(
            "empty {} argument can not be written",
            value.kind_name()
        )));
    }
    for idx in 0..value.len() {
        if idx > 0 {
            buf.push(',');
        }
        write_element(buf, value, idx)?;
    }
    Ok(())
}

/// Write the `idx`-th element of a list, or the scalar itself for index 0.
pub(crate) fn write_element(buf: &mut String, value: &Value, idx: usize) -> SqlResult<()> {
    fn nth<T>(items: &[T], idx: usize) -> SqlResult<&T> {
        items
            .get(idx)
            .ok_or_else(|| SqlError::not_valid(format!("list element {idx} out of range")))
    }

    match value {
        Value::Null => buf.push_str("NULL"),
        Value::Int64(v) => write_int(buf, *v),
        Value::Uint64(v) => write_int(buf, *v),
        Value::Float64(v) => write_float(buf, *v)?,
        Value::Bool(v) => write_bool(buf, *v),
        Value::String(v) => write_str(buf, v),
        Value::Text(v) => write_text(buf, v)?,
        Value::Bytes(v) => write_bytes(buf, v),
        Value::Time(v) => write_time(buf, v),

        Value::Int64s(v) => write_int(buf, *nth(v, idx)?),
        Value::Uint64s(v) => write_int(buf, *nth(v, idx)?),
        Value::Float64s(v) => write_float(buf, *nth(v, idx)?)?,
        Value::Bools(v) => write_bool(buf, *nth(v, idx)?),
        Value::Strings(v) => write_str(buf, nth(v, idx)?),
        Value::Texts(v) => write_text(buf, nth(v, idx)?)?,
        Value::BytesList(v) => write_bytes(buf, nth(v, idx)?),
        Value::Times(v) => write_time(buf, nth(v, idx)?),

        Value::NullInt64s(v) => match nth(v, idx)? {
            Some(v) => write_int(buf, *v),
            None => buf.push_str("NULL"),
        },
        Value::NullFloat64s(v) => match nth(v, idx)? {
            Some(v) => write_float(buf, *v)?,
            None => buf.push_str("NULL"),
        },
        Value::NullBools(v) => match nth(v, idx)? {
            Some(v) => write_bool(buf, *v),
            None => buf.push_str("NULL"),
        },
        Value::NullStrings(v) => match nth(v, idx)? {
            Some(v) => write_str(buf, v),
            None => buf.push_str("NULL"),
        },
        Value::NullTimes(v) => match nth(v, idx)? {
            Some(v) => write_time(buf, v),
            None => buf.push_str("NULL"),
        },
    }
    Ok(())
}

fn write_int(buf: &mut String, v: impl std::fmt::Display) {
    let _ = write!(buf, "{v}");
}

/// Floats are written in plain decimal, never in exponent form.
fn write_float(buf: &mut String, v: f64) -> SqlResult<()> {
    if !v.is_finite() {
        return Err(SqlError::not_valid(format!(
            "float {v} has no SQL literal form"
        )));
    }
    let _ = write!(buf, "{v}");
    Ok(())
}

fn write_bool(buf: &mut String, v: bool) {
    buf.push(if v { '1' } else { '0' });
}

fn write_time(buf: &mut String, t: &NaiveDateTime) {
    let _ = write!(buf, "'{}'", t.format(TIME_FORMAT));
}

fn write_bytes(buf: &mut String, v: &[u8]) {
    if v.is_empty() {
        buf.push_str("X''");
        return;
    }
    buf.reserve(2 + v.len() * 2);
    buf.push_str("0x");
    for b in v {
        let _ = write!(buf, "{b:02x}");
    }
}

fn write_text(buf: &mut String, v: &[u8]) -> SqlResult<()> {
    let s = std::str::from_utf8(v).map_err(|e| {
        SqlError::not_valid(format!("text argument is not valid UTF-8: {e}"))
    })?;
    write_str(buf, s);
    Ok(())
}

/// Single-quote `s`, backslash-escaping quotes, backslashes and control bytes.
pub(crate) fn write_str(buf: &mut String, s: &str) {
    buf.reserve(s.len() + 2);
    buf.push('\'');
    for c in s.chars() {
        match c {
            '\0' => buf.push_str("\\x00"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\\' => buf.push_str("\\\\"),
            '\'' => buf.push_str("\\'"),
            '"' => buf.push_str("\\\""),
            '\x1a' => buf.push_str("\\x1a"),
            c => buf.push(c),
        }
    }
    buf.push('\'');
}
