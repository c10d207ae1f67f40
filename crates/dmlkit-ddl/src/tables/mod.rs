//! The table registry.
//!
//! [`Tables`] maps table names to shared [`Table`] metadata. It is built from
//! [`TableOption`]s, static definitions or the live database, and read
//! concurrently afterwards. Every mutation happens under one write lock, so
//! readers never observe a half-applied option list.

mod load;
mod options;
mod validate;

pub use options::{ObjectKind, TableOption};
pub use validate::compare_columns;

use crate::snapshot::{TableSnapshot, TablesSnapshot};
use crate::table::Table;
use dmlkit::{DbClient, SqlError, SqlResult, validate_identifier};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Default)]
struct Inner {
    tables: HashMap<String, Arc<Table>>,
    db: Option<Arc<dyn DbClient>>,
    closed: bool,
}

impl Inner {
    /// Insert or replace `table`, falling back to the registry's client.
    fn put(&mut self, mut table: Table) {
        if table.db.is_none() {
            table.db = self.db.clone();
        }
        self.tables.insert(table.name.clone(), Arc::new(table));
    }

    /// Clone of the named table, or a new empty one.
    fn take_or_new(&self, name: &str) -> Table {
        self.tables
            .get(name)
            .map(|t| t.as_ref().clone())
            .unwrap_or_else(|| Table::new(name))
    }
}

/// Name-keyed registry of table metadata.
pub struct Tables {
    inner: RwLock<Inner>,
}

impl Tables {
    /// Create a registry and apply `options` in order.
    pub fn new(options: impl IntoIterator<Item = TableOption>) -> SqlResult<Self> {
        let tables = Self {
            inner: RwLock::new(Inner::default()),
        };
        tables.options(options)?;
        Ok(tables)
    }

    /// Like [`Tables::new`] but panics on an invalid option.
    #[track_caller]
    pub fn must_new(options: impl IntoIterator<Item = TableOption>) -> Self {
        match Self::new(options) {
            Ok(tables) => tables,
            Err(e) => panic!("{e}"),
        }
    }

    /// Apply options. Either all options apply or none does.
    pub fn options(&self, options: impl IntoIterator<Item = TableOption>) -> SqlResult<()> {
        let mut inner = self.write();
        let mut staged = inner.clone();
        for option in options {
            option.apply(&mut staged)?;
        }
        *inner = staged;
        Ok(())
    }

    /// Insert or replace a table by name.
    pub fn upsert(&self, table: Table) -> SqlResult<()> {
        validate_identifier(&table.name)?;
        tracing::debug!(target: "dmlkit.ddl", table = %table.name, columns = table.columns.len(), "upsert table");
        self.write().put(table);
        Ok(())
    }

    /// Look up a table.
    pub fn table(&self, name: &str) -> SqlResult<Arc<Table>> {
        self.read()
            .tables
            .get(name)
            .cloned()
            .ok_or_else(|| SqlError::not_found(format!("table {name:?} not found")))
    }

    /// Like [`Tables::table`] but panics when the table is unknown.
    #[track_caller]
    pub fn must_table(&self, name: &str) -> Arc<Table> {
        match self.table(name) {
            Ok(table) => table,
            Err(e) => panic!("{e}"),
        }
    }

    /// Remove tables by name. Unknown names are ignored.
    pub fn delete_from_cache<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inner = self.write();
        for name in names {
            if inner.tables.remove(name.as_ref()).is_some() {
                tracing::debug!(target: "dmlkit.ddl", table = name.as_ref(), "deleted table from cache");
            }
        }
    }

    pub fn delete_all_from_cache(&self) {
        let mut inner = self.write();
        tracing::debug!(target: "dmlkit.ddl", count = inner.tables.len(), "deleted all tables from cache");
        inner.tables.clear();
    }

    pub fn len(&self) -> usize {
        self.read().tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().tables.is_empty()
    }

    /// Sorted table names.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// The registry's default client.
    pub fn db(&self) -> Option<Arc<dyn DbClient>> {
        self.read().db.clone()
    }

    /// Close the default client. Loaders and validation fail afterwards.
    pub async fn close(&self) -> SqlResult<()> {
        let db = {
            let mut inner = self.write();
            if inner.closed {
                return Ok(());
            }
            inner.closed = true;
            inner.db.take()
        };
        match db {
            Some(db) => db.close().await,
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.read().closed
    }

    /// Capture the metadata of all tables.
    pub fn snapshot(&self) -> TablesSnapshot {
        let tables: BTreeMap<String, TableSnapshot> = self
            .read()
            .tables
            .values()
            .map(|t| {
                (
                    t.name.clone(),
                    TableSnapshot {
                        is_view: t.is_view,
                        columns: t.columns.clone(),
                    },
                )
            })
            .collect();
        TablesSnapshot::new(tables)
    }

    /// Build a registry from a snapshot, then apply `options`.
    pub fn from_snapshot(
        snapshot: &TablesSnapshot,
        options: impl IntoIterator<Item = TableOption>,
    ) -> SqlResult<Self> {
        let tables = Self::new(std::iter::empty())?;
        {
            let mut inner = tables.write();
            for (name, t) in &snapshot.tables {
                validate_identifier(name)?;
                let table = Table {
                    name: name.clone(),
                    columns: t.columns.clone(),
                    is_view: t.is_view,
                    ..Default::default()
                };
                inner.put(table);
            }
        }
        tables.options(options)?;
        Ok(tables)
    }

    fn ensure_open(&self) -> SqlResult<()> {
        if self.is_closed() {
            return Err(SqlError::already_closed("Tables registry is closed"));
        }
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl fmt::Debug for Tables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        let mut names: Vec<&String> = inner.tables.keys().collect();
        names.sort();
        f.debug_struct("Tables")
            .field("tables", &names)
            .field("db", &inner.db.is_some())
            .field("closed", &inner.closed)
            .finish()
    }
}
