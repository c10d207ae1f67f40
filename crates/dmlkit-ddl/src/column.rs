//! Column metadata as reported by `information_schema.COLUMNS`.

use dmlkit::{ColumnMap, ColumnMapper, MapMode, SqlResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// `COLUMN_KEY` of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColumnKey {
    #[serde(rename = "PRI")]
    Primary,
    #[serde(rename = "UNI")]
    Unique,
    #[serde(rename = "MUL")]
    Multiple,
    #[default]
    #[serde(rename = "")]
    None,
}

impl ColumnKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKey::Primary => "PRI",
            ColumnKey::Unique => "UNI",
            ColumnKey::Multiple => "MUL",
            ColumnKey::None => "",
        }
    }

    /// Unknown values map to [`ColumnKey::None`].
    pub fn parse(s: &str) -> Self {
        match s {
            "PRI" => ColumnKey::Primary,
            "UNI" => ColumnKey::Unique,
            "MUL" => ColumnKey::Multiple,
            _ => ColumnKey::None,
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a table or view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Column {
    /// `COLUMN_NAME`
    pub field: String,
    /// `ORDINAL_POSITION`, 1-based.
    #[serde(default)]
    pub position: u64,
    /// `COLUMN_DEFAULT`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// `IS_NULLABLE`: `"YES"` or `"NO"`.
    pub null: String,
    /// `DATA_TYPE`, e.g. `int`.
    #[serde(default)]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_max_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_precision: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_scale: Option<i64>,
    /// `COLUMN_TYPE`, e.g. `int(10) unsigned`.
    pub column_type: String,
    #[serde(default)]
    pub key: ColumnKey,
    #[serde(default)]
    pub extra: String,
    #[serde(default)]
    pub comment: String,
}

impl Column {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            null: "YES".to_string(),
            ..Default::default()
        }
    }

    pub fn column_type(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = column_type.into();
        if self.data_type.is_empty() {
            self.data_type = self
                .column_type
                .split(['(', ' '])
                .next()
                .unwrap_or_default()
                .to_string();
        }
        self
    }

    pub fn not_null(mut self) -> Self {
        self.null = "NO".to_string();
        self
    }

    pub fn key(mut self, key: ColumnKey) -> Self {
        self.key = key;
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.null == "YES"
    }

    pub fn is_primary_key(&self) -> bool {
        self.key == ColumnKey::Primary
    }

    pub fn is_unique(&self) -> bool {
        self.key == ColumnKey::Unique
    }

    pub fn is_auto_increment(&self) -> bool {
        self.extra.contains("auto_increment")
    }

    pub fn is_unsigned(&self) -> bool {
        self.column_type.contains("unsigned")
    }

    /// Map the current column of `cm` onto this column's fields.
    pub(crate) fn map_current(&mut self, cm: &mut ColumnMap<'_>) -> SqlResult<()> {
        match cm.column() {
            "COLUMN_NAME" | "field" => cm.string(&mut self.field),
            "ORDINAL_POSITION" | "position" => cm.uint64(&mut self.position),
            "COLUMN_DEFAULT" | "default" => cm.null_string(&mut self.default),
            "IS_NULLABLE" | "null" => cm.string(&mut self.null),
            "DATA_TYPE" | "data_type" => cm.string(&mut self.data_type),
            "CHARACTER_MAXIMUM_LENGTH" | "char_max_length" => {
                cm.null_int64(&mut self.char_max_length)
            }
            "NUMERIC_PRECISION" | "numeric_precision" => cm.null_int64(&mut self.numeric_precision),
            "NUMERIC_SCALE" | "numeric_scale" => cm.null_int64(&mut self.numeric_scale),
            "COLUMN_TYPE" | "column_type" => cm.string(&mut self.column_type),
            "COLUMN_KEY" | "key" => {
                let mut key = self.key.as_str().to_string();
                cm.string(&mut key)?;
                self.key = ColumnKey::parse(&key);
                Ok(())
            }
            "EXTRA" | "extra" => cm.string(&mut self.extra),
            "COLUMN_COMMENT" | "comment" => cm.string(&mut self.comment),
            other => Err(cm.unknown_column(other)),
        }
    }
}

/// The `information_schema.COLUMNS` names a [`Column`] is decoded from, in
/// query order, after `TABLE_NAME`.
pub const SCHEMA_COLUMNS: [&str; 12] = [
    "COLUMN_NAME",
    "ORDINAL_POSITION",
    "COLUMN_DEFAULT",
    "IS_NULLABLE",
    "DATA_TYPE",
    "CHARACTER_MAXIMUM_LENGTH",
    "NUMERIC_PRECISION",
    "NUMERIC_SCALE",
    "COLUMN_TYPE",
    "COLUMN_KEY",
    "EXTRA",
    "COLUMN_COMMENT",
];

impl ColumnMapper for Column {
    fn map_columns(&mut self, cm: &mut ColumnMap<'_>) -> SqlResult<()> {
        if cm.mode() == MapMode::Describe {
            cm.declare(SCHEMA_COLUMNS);
            return Ok(());
        }
        if cm.mode() == MapMode::Append && !cm.has_columns() {
            cm.string(&mut self.field)?;
            cm.uint64(&mut self.position)?;
            cm.null_string(&mut self.default)?;
            cm.string(&mut self.null)?;
            cm.string(&mut self.data_type)?;
            cm.null_int64(&mut self.char_max_length)?;
            cm.null_int64(&mut self.numeric_precision)?;
            cm.null_int64(&mut self.numeric_scale)?;
            cm.string(&mut self.column_type)?;
            let mut key = self.key.as_str().to_string();
            cm.string(&mut key)?;
            cm.string(&mut self.extra)?;
            return cm.string(&mut self.comment);
        }
        while cm.next_column() {
            self.map_current(cm)?;
        }
        Ok(())
    }
}

/// Ordered columns of one table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Columns(pub Vec<Column>);

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.0.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Column> {
        self.0.get(idx)
    }

    pub fn by_field(&self, field: &str) -> Option<&Column> {
        self.0.iter().find(|c| c.field == field)
    }

    pub fn field_names(&self) -> Vec<String> {
        self.0.iter().map(|c| c.field.clone()).collect()
    }

    pub fn primary_keys(&self) -> Columns {
        self.0.iter().filter(|c| c.is_primary_key()).cloned().collect()
    }

    /// Columns that are neither primary keys nor auto increment.
    pub fn non_primary(&self) -> Columns {
        self.0
            .iter()
            .filter(|c| !c.is_primary_key() && !c.is_auto_increment())
            .cloned()
            .collect()
    }

    /// Insert or replace by field name, keeping names unique.
    pub fn push(&mut self, column: Column) {
        match self.0.iter_mut().find(|c| c.field == column.field) {
            Some(existing) => *existing = column,
            None => self.0.push(column),
        }
    }
}

impl FromIterator<Column> for Columns {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        let mut columns = Columns::new();
        for c in iter {
            columns.push(c);
        }
        columns
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Result of the `information_schema.COLUMNS` query grouped by `TABLE_NAME`.
#[derive(Debug, Clone, Default)]
pub struct TableColumns(pub HashMap<String, Columns>);

impl TableColumns {
    pub fn into_inner(self) -> HashMap<String, Columns> {
        self.0
    }
}

impl ColumnMapper for TableColumns {
    fn map_columns(&mut self, cm: &mut ColumnMap<'_>) -> SqlResult<()> {
        match cm.mode() {
            MapMode::Scan => {
                if cm.count() == 1 {
                    self.0.clear();
                }
                let mut table = String::new();
                let mut column = Column::default();
                while cm.next_column() {
                    if cm.column() == "TABLE_NAME" {
                        cm.string(&mut table)?;
                    } else {
                        column.map_current(cm)?;
                    }
                }
                self.0.entry(table).or_default().push(column);
                Ok(())
            }
            MapMode::Describe => {
                cm.declare(["TABLE_NAME"]);
                cm.declare(SCHEMA_COLUMNS);
                Ok(())
            }
            MapMode::Append => Err(cm.unsupported_mode()),
        }
    }
}
