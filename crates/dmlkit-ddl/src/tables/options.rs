use super::Inner;
use crate::column::Column;
use crate::table::Table;
use dmlkit::stmt::Listeners;
use dmlkit::{DbClient, SqlError, SqlResult, validate_identifier};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A configuration step applied to a [`Tables`](super::Tables) registry.
pub enum TableOption {
    Table { name: String, columns: Vec<Column> },
    TableNames(Vec<String>),
    Db(Arc<dyn DbClient>),
    DmlListeners { name: String, listeners: Vec<Listeners> },
}

impl TableOption {
    /// Add or update a table with static columns. Existing listeners stay.
    pub fn table(name: impl Into<String>, columns: impl IntoIterator<Item = Column>) -> Self {
        TableOption::Table {
            name: name.into(),
            columns: columns.into_iter().collect(),
        }
    }

    /// Add empty tables; names already present are left alone.
    pub fn table_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TableOption::TableNames(names.into_iter().map(Into::into).collect())
    }

    /// Default client for the registry and every table without one.
    pub fn db(db: Arc<dyn DbClient>) -> Self {
        TableOption::Db(db)
    }

    /// Attach statement listeners to a table, creating it when missing.
    pub fn dml_listeners(
        name: impl Into<String>,
        listeners: impl IntoIterator<Item = Listeners>,
    ) -> Self {
        TableOption::DmlListeners {
            name: name.into(),
            listeners: listeners.into_iter().collect(),
        }
    }

    pub(super) fn apply(self, inner: &mut Inner) -> SqlResult<()> {
        match self {
            TableOption::Table { name, columns } => {
                validate_identifier(&name)?;
                let mut table = inner.take_or_new(&name);
                table.columns = columns.into_iter().collect();
                inner.put(table);
            }
            TableOption::TableNames(names) => {
                for name in &names {
                    validate_identifier(name)?;
                }
                for name in names {
                    if !inner.tables.contains_key(&name) {
                        inner.put(Table::new(name));
                    }
                }
            }
            TableOption::Db(db) => {
                for table in inner.tables.values_mut() {
                    if table.db.is_none() {
                        Arc::make_mut(table).db = Some(db.clone());
                    }
                }
                inner.db = Some(db);
            }
            TableOption::DmlListeners { name, listeners } => {
                validate_identifier(&name)?;
                let mut table = inner.take_or_new(&name);
                for l in &listeners {
                    table.listeners.merge(l);
                }
                inner.put(table);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for TableOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableOption::Table { name, columns } => f
                .debug_struct("Table")
                .field("name", name)
                .field("columns", &columns.len())
                .finish(),
            TableOption::TableNames(names) => f.debug_tuple("TableNames").field(names).finish(),
            TableOption::Db(_) => f.write_str("Db(..)"),
            TableOption::DmlListeners { name, listeners } => f
                .debug_struct("DmlListeners")
                .field("name", name)
                .field("listeners", &listeners.len())
                .finish(),
        }
    }
}

/// Kind of object created by
/// [`Tables::with_table_or_view_from_query`](super::Tables::with_table_or_view_from_query).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Table,
    View,
}

impl ObjectKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ObjectKind::Table => "TABLE",
            ObjectKind::View => "VIEW",
        }
    }
}

impl FromStr for ObjectKind {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(ObjectKind::Table),
            "view" => Ok(ObjectKind::View),
            other => Err(SqlError::not_supported(format!(
                "object type {other:?} not supported, use \"table\" or \"view\""
            ))),
        }
    }
}
