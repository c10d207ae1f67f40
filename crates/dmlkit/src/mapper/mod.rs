//! The ColumnMapper protocol.
//!
//! A record type implements [`ColumnMapper`] once and handles every
//! [`MapMode`] by matching on column names:
//!
//! - [`MapMode::Append`] pushes the record's values onto the statement's
//!   arguments (INSERT and bulk writes)
//! - [`MapMode::Scan`] decodes one result row into the record
//! - [`MapMode::Describe`] only reports column names
//!
//! ```
//! use dmlkit::mapper::{ColumnMap, ColumnMapper, MapMode};
//! use dmlkit::SqlResult;
//!
//! #[derive(Default)]
//! struct Store {
//!     store_id: i64,
//!     code: String,
//! }
//!
//! impl ColumnMapper for Store {
//!     fn map_columns(&mut self, cm: &mut ColumnMap<'_>) -> SqlResult<()> {
//!         if cm.mode() == MapMode::Append && !cm.has_columns() {
//!             cm.int64(&mut self.store_id)?;
//!             return cm.string(&mut self.code);
//!         }
//!         if cm.mode() == MapMode::Describe {
//!             cm.declare(["store_id", "code"]);
//!             return Ok(());
//!         }
//!         while cm.next_column() {
//!             match cm.column() {
//!                 "store_id" => cm.int64(&mut self.store_id)?,
//!                 "code" => cm.string(&mut self.code)?,
//!                 other => return Err(cm.unknown_column(other)),
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//! ```
//!
//! A collection type scans by resetting itself when [`ColumnMap::count`] is 1,
//! decoding a fresh record and appending it.

mod column_map;
mod row;

pub use column_map::ColumnMap;
pub use row::Row;

use crate::argument::Arguments;
use crate::error::{SqlError, SqlResult};
use std::fmt;

/// What a mapper is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    /// `'a'`: append field values to the arguments.
    Append,
    /// `'w'`: write the current row into the fields.
    Scan,
    /// `'r'`: report column names only.
    Describe,
}

impl MapMode {
    pub fn as_char(self) -> char {
        match self {
            MapMode::Append => 'a',
            MapMode::Scan => 'w',
            MapMode::Describe => 'r',
        }
    }
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({:?})", self, self.as_char())
    }
}

impl TryFrom<char> for MapMode {
    type Error = SqlError;

    fn try_from(c: char) -> SqlResult<Self> {
        match c {
            'a' => Ok(MapMode::Append),
            'w' => Ok(MapMode::Scan),
            'r' => Ok(MapMode::Describe),
            other => Err(SqlError::not_supported(format!("unknown mode {other:?}"))),
        }
    }
}

/// Binds a record type to named SQL columns.
pub trait ColumnMapper {
    fn map_columns(&mut self, cm: &mut ColumnMap<'_>) -> SqlResult<()>;
}

impl<M: ColumnMapper + ?Sized> ColumnMapper for &mut M {
    fn map_columns(&mut self, cm: &mut ColumnMap<'_>) -> SqlResult<()> {
        (**self).map_columns(cm)
    }
}

/// Scan `rows` into `mapper`, one call per row with a 1-based count.
pub fn scan_rows<M: ColumnMapper + ?Sized>(mapper: &mut M, rows: &[Row]) -> SqlResult<()> {
    for (i, row) in rows.iter().enumerate() {
        let mut cm = ColumnMap::scan(row, i as u64 + 1);
        mapper.map_columns(&mut cm)?;
    }
    Ok(())
}

/// Collect the mapper's values for `columns`, or for all of its fields when
/// `columns` is empty.
pub fn append_args<M: ColumnMapper + ?Sized>(
    mapper: &mut M,
    columns: &[String],
) -> SqlResult<Arguments> {
    let mut cm = ColumnMap::append(columns);
    mapper.map_columns(&mut cm)?;
    Ok(cm.into_arguments())
}

/// Column names the mapper declares.
pub fn describe<M: ColumnMapper + ?Sized>(mapper: &mut M) -> SqlResult<Vec<String>> {
    let mut cm = ColumnMap::describe();
    mapper.map_columns(&mut cm)?;
    Ok(cm.into_declared())
}

#[cfg(test)]
mod tests;
