use crate::column::{Column, Columns};
use dmlkit::stmt::Listeners;
use dmlkit::{DbClient, Delete, Select, SqlError, SqlResult};
use std::fmt;
use std::sync::Arc;

/// A table or view with its column metadata.
#[derive(Clone, Default)]
pub struct Table {
    pub name: String,
    pub columns: Columns,
    pub is_view: bool,
    pub db: Option<Arc<dyn DbClient>>,
    /// Merged into every statement built from this table.
    pub listeners: Listeners,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns = columns.into_iter().collect();
        self
    }

    pub fn view(mut self, is_view: bool) -> Self {
        self.is_view = is_view;
        self
    }

    pub fn with_db(mut self, db: Arc<dyn DbClient>) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_listeners(mut self, listeners: Listeners) -> Self {
        self.listeners = listeners;
        self
    }

    /// The client attached to this table.
    pub fn db(&self) -> SqlResult<&dyn DbClient> {
        self.db
            .as_deref()
            .ok_or_else(|| SqlError::not_valid(format!("table {:?} has no database client", self.name)))
    }

    pub fn field_names(&self) -> Vec<String> {
        self.columns.field_names()
    }

    /// SELECT of the given columns with this table's select listeners.
    pub fn select<I, S>(&self, columns: I) -> Select
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Select::new(columns)
            .from(self.name.clone())
            .listeners(&self.listeners.select)
    }

    /// SELECT of every known column.
    pub fn select_all(&self) -> Select {
        self.select(self.field_names())
    }

    pub fn delete(&self) -> Delete {
        Delete::new(self.name.clone()).listeners(&self.listeners.delete)
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("columns", &self.columns)
            .field("is_view", &self.is_view)
            .field("db", &self.db.is_some())
            .field("listeners", &self.listeners)
            .finish()
    }
}
