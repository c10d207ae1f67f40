use super::Tables;
use crate::column::Columns;
use crate::context::Context;
use crate::schema::load_columns;
use dmlkit::{SqlError, SqlResult};
use std::collections::HashMap;

impl Tables {
    /// Check every registered table against `information_schema`.
    ///
    /// Columns are compared by position. The registry may declare fewer
    /// columns than the database has; the surplus is logged and accepted.
    /// A finished `ctx` returns its error unchanged.
    pub async fn validate(&self, ctx: &Context) -> SqlResult<()> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        self.ensure_open()?;

        let (db, registry) = {
            let inner = self.read();
            let registry: HashMap<String, Columns> = inner
                .tables
                .iter()
                .map(|(name, t)| (name.clone(), t.columns.clone()))
                .collect();
            (inner.db.clone(), registry)
        };
        if registry.is_empty() {
            return Ok(());
        }
        let db = db.ok_or_else(|| SqlError::not_valid("Tables registry has no database client"))?;

        let mut names: Vec<&String> = registry.keys().collect();
        names.sort();
        tracing::debug!(target: "dmlkit.ddl", tables = names.len(), "validating tables");

        let live = load_columns(ctx, db.as_ref(), &names).await?;
        if live.len() != registry.len() {
            return Err(SqlError::mismatch(format!(
                "Tables count {} does not match table count {} in database.",
                registry.len(),
                live.len()
            )));
        }

        for name in names {
            let Some(db_columns) = live.get(name.as_str()) else {
                return Err(SqlError::mismatch(format!(
                    "Table {name:?} not found in database."
                )));
            };
            compare_columns(name, &registry[name], db_columns)?;
        }

        tracing::debug!(target: "dmlkit.ddl", tables = registry.len(), "validation finished");
        Ok(())
    }
}

/// Compare the registry's columns of `table` with the database's, by position.
pub fn compare_columns(table: &str, registry: &Columns, database: &Columns) -> SqlResult<()> {
    if registry.len() > database.len() {
        return Err(SqlError::mismatch(format!(
            "Table {table:?} has more columns (count {}) than its object (column count {}) in the database.",
            registry.len(),
            database.len()
        )));
    }

    for (idx, (ours, theirs)) in registry.iter().zip(database.iter()).enumerate() {
        if ours.field != theirs.field {
            return Err(SqlError::mismatch(format!(
                "Table {table:?} with column name {:?} at index {idx} does not match database column name {:?}",
                ours.field, theirs.field
            )));
        }
        if ours.column_type != theirs.column_type {
            return Err(SqlError::mismatch(format!(
                "Table {table:?} with registry column name {:?} does not match MySQL column type. MySQL: {:?} registry: {:?}.",
                ours.field, theirs.column_type, ours.column_type
            )));
        }
        if ours.null != theirs.null {
            return Err(SqlError::mismatch(format!(
                "Table {table:?} with column name {:?} does not match MySQL null types. MySQL: {:?} registry: {:?}",
                ours.field, theirs.null, ours.null
            )));
        }
    }

    if database.len() > registry.len() {
        tracing::warn!(
            target: "dmlkit.ddl",
            table,
            registry = registry.len(),
            database = database.len(),
            "database has more columns than the registry declares"
        );
    }
    Ok(())
}
