use super::{MapMode, Row};
use crate::argument::{Argument, Arguments, IntoValue, Value};
use crate::error::{SqlError, SqlResult};
use chrono::NaiveDateTime;

const TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Cursor handed to [`ColumnMapper::map_columns`](super::ColumnMapper).
///
/// In scan mode the binders write the current row's value into the field;
/// in append mode they read the field and push it as an argument. In
/// describe mode binders do nothing and the mapper calls [`declare`](Self::declare).
#[derive(Debug)]
pub struct ColumnMap<'a> {
    mode: MapMode,
    columns: &'a [String],
    row: &'a [Value],
    count: u64,
    pos: usize,
    current: usize,
    args: Arguments,
    declared: Vec<String>,
}

impl<'a> ColumnMap<'a> {
    /// Scan `row`; `count` is the 1-based row number within the result set.
    pub fn scan(row: &'a Row, count: u64) -> Self {
        Self::with_mode(MapMode::Scan, row.columns(), row.values(), count)
    }

    /// Append values for `columns`, or for every field when empty.
    pub fn append(columns: &'a [String]) -> Self {
        Self::with_mode(MapMode::Append, columns, &[], 0)
    }

    pub fn describe() -> Self {
        Self::with_mode(MapMode::Describe, &[], &[], 0)
    }

    fn with_mode(mode: MapMode, columns: &'a [String], row: &'a [Value], count: u64) -> Self {
        Self {
            mode,
            columns,
            row,
            count,
            pos: 0,
            current: 0,
            args: Arguments::new(),
            declared: Vec::new(),
        }
    }

    pub fn mode(&self) -> MapMode {
        self.mode
    }

    /// 1-based row number while scanning, 0 otherwise.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Whether an explicit column list is present.
    pub fn has_columns(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Advance to the next column. Returns false once all columns were
    /// visited and rewinds so the next loop starts over.
    pub fn next_column(&mut self) -> bool {
        if self.pos < self.columns.len() {
            self.current = self.pos;
            self.pos += 1;
            true
        } else {
            self.pos = 0;
            false
        }
    }

    /// Name of the current column.
    pub fn column(&self) -> &'a str {
        self.columns
            .get(self.current)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Index of the current column.
    pub fn index(&self) -> usize {
        self.current
    }

    /// Report column names in describe mode; ignored otherwise.
    pub fn declare<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.mode == MapMode::Describe {
            self.declared.extend(columns.into_iter().map(Into::into));
        }
    }

    /// Error for a column the mapper does not know.
    pub fn unknown_column(&self, name: &str) -> SqlError {
        SqlError::not_found(format!("column {name:?} not found in mapper ({})", self.mode))
    }

    /// Error for a mode the mapper does not handle.
    pub fn unsupported_mode(&self) -> SqlError {
        SqlError::not_supported(format!("mode {} not supported by mapper", self.mode))
    }

    pub fn into_arguments(self) -> Arguments {
        self.args
    }

    pub fn into_declared(self) -> Vec<String> {
        self.declared
    }

    fn bind<T: Clone + IntoValue>(
        &mut self,
        dest: &mut T,
        type_name: &str,
        decode: impl FnOnce(&Value) -> Option<T>,
    ) -> SqlResult<()> {
        match self.mode {
            MapMode::Append => {
                self.args.push(Argument::new(dest.clone()));
                Ok(())
            }
            MapMode::Scan => {
                let value = self.current_value()?;
                *dest = decode(value).ok_or_else(|| self.conversion_error(value, type_name))?;
                Ok(())
            }
            MapMode::Describe => Ok(()),
        }
    }

    fn bind_null<T: Clone + IntoValue>(
        &mut self,
        dest: &mut Option<T>,
        type_name: &str,
        decode: impl FnOnce(&Value) -> Option<T>,
    ) -> SqlResult<()> {
        match self.mode {
            MapMode::Append => {
                self.args.push(Argument::new(dest.clone()));
                Ok(())
            }
            MapMode::Scan => {
                let value = self.current_value()?;
                *dest = if value.is_null() {
                    None
                } else {
                    Some(decode(value).ok_or_else(|| self.conversion_error(value, type_name))?)
                };
                Ok(())
            }
            MapMode::Describe => Ok(()),
        }
    }

    fn current_value(&self) -> SqlResult<&'a Value> {
        self.row.get(self.current).ok_or_else(|| {
            SqlError::not_valid(format!(
                "column index {} out of range for a row of {}",
                self.current,
                self.row.len()
            ))
        })
    }

    fn conversion_error(&self, value: &Value, type_name: &str) -> SqlError {
        SqlError::not_valid(format!(
            "column {:?}: can not scan {} into {type_name}",
            self.column(),
            value.kind_name()
        ))
    }

    pub fn int64(&mut self, dest: &mut i64) -> SqlResult<()> {
        self.bind(dest, "int64", to_i64)
    }

    pub fn int(&mut self, dest: &mut isize) -> SqlResult<()> {
        self.bind(dest, "int", |v| to_i64(v).and_then(|n| isize::try_from(n).ok()))
    }

    pub fn uint64(&mut self, dest: &mut u64) -> SqlResult<()> {
        self.bind(dest, "uint64", to_u64)
    }

    pub fn uint32(&mut self, dest: &mut u32) -> SqlResult<()> {
        self.bind(dest, "uint32", |v| to_u64(v).and_then(|n| u32::try_from(n).ok()))
    }

    pub fn uint16(&mut self, dest: &mut u16) -> SqlResult<()> {
        self.bind(dest, "uint16", |v| to_u64(v).and_then(|n| u16::try_from(n).ok()))
    }

    pub fn float64(&mut self, dest: &mut f64) -> SqlResult<()> {
        self.bind(dest, "float64", to_f64)
    }

    pub fn bool(&mut self, dest: &mut bool) -> SqlResult<()> {
        self.bind(dest, "bool", to_bool)
    }

    pub fn string(&mut self, dest: &mut String) -> SqlResult<()> {
        self.bind(dest, "string", to_string)
    }

    pub fn bytes(&mut self, dest: &mut Vec<u8>) -> SqlResult<()> {
        self.bind(dest, "bytes", to_bytes)
    }

    pub fn time(&mut self, dest: &mut NaiveDateTime) -> SqlResult<()> {
        self.bind(dest, "time", to_time)
    }

    pub fn null_int64(&mut self, dest: &mut Option<i64>) -> SqlResult<()> {
        self.bind_null(dest, "int64", to_i64)
    }

    pub fn null_uint64(&mut self, dest: &mut Option<u64>) -> SqlResult<()> {
        self.bind_null(dest, "uint64", to_u64)
    }

    pub fn null_float64(&mut self, dest: &mut Option<f64>) -> SqlResult<()> {
        self.bind_null(dest, "float64", to_f64)
    }

    pub fn null_bool(&mut self, dest: &mut Option<bool>) -> SqlResult<()> {
        self.bind_null(dest, "bool", to_bool)
    }

    pub fn null_string(&mut self, dest: &mut Option<String>) -> SqlResult<()> {
        self.bind_null(dest, "string", to_string)
    }

    pub fn null_time(&mut self, dest: &mut Option<NaiveDateTime>) -> SqlResult<()> {
        self.bind_null(dest, "time", to_time)
    }
}

// Text protocol drivers hand numbers back as strings, so every decoder
// accepts the textual form too.

fn text(v: &Value) -> Option<&str> {
    match v {
        Value::String(s) => Some(s),
        Value::Text(b) | Value::Bytes(b) => std::str::from_utf8(b).ok(),
        _ => None,
    }
}

fn to_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Int64(n) => Some(*n),
        Value::Uint64(n) => i64::try_from(*n).ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => text(v).and_then(|s| s.trim().parse().ok()),
    }
}

fn to_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Uint64(n) => Some(*n),
        Value::Int64(n) => u64::try_from(*n).ok(),
        Value::Bool(b) => Some(u64::from(*b)),
        _ => text(v).and_then(|s| s.trim().parse().ok()),
    }
}

fn to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Float64(n) => Some(*n),
        Value::Int64(n) => Some(*n as f64),
        Value::Uint64(n) => Some(*n as f64),
        _ => text(v).and_then(|s| s.trim().parse().ok()),
    }
}

fn to_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Int64(n) => Some(*n != 0),
        Value::Uint64(n) => Some(*n != 0),
        _ => match text(v)?.trim() {
            "1" | "true" | "TRUE" => Some(true),
            "0" | "false" | "FALSE" => Some(false),
            _ => None,
        },
    }
}

fn to_string(v: &Value) -> Option<String> {
    match v {
        Value::Int64(n) => Some(n.to_string()),
        Value::Uint64(n) => Some(n.to_string()),
        Value::Float64(n) => Some(n.to_string()),
        _ => text(v).map(str::to_owned),
    }
}

fn to_bytes(v: &Value) -> Option<Vec<u8>> {
    match v {
        Value::Bytes(b) | Value::Text(b) => Some(b.clone()),
        Value::String(s) => Some(s.clone().into_bytes()),
        _ => None,
    }
}

fn to_time(v: &Value) -> Option<NaiveDateTime> {
    match v {
        Value::Time(t) => Some(*t),
        _ => {
            let s = text(v)?.trim();
            TIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        }
    }
}
