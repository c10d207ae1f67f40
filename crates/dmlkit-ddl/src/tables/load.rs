use super::{ObjectKind, Tables};
use crate::column::Columns;
use crate::context::Context;
use crate::schema::load_columns;
use dmlkit::{DbClient, SqlError, SqlResult, quote_ident, validate_identifier};
use std::sync::Arc;

impl Tables {
    /// Load column metadata for `names` from `db` and upsert the tables.
    /// With no names every table of the current database is loaded.
    pub async fn with_table_load_columns<S: AsRef<str>>(
        &self,
        ctx: &Context,
        db: Arc<dyn DbClient>,
        names: &[S],
    ) -> SqlResult<()> {
        for name in names {
            validate_identifier(name.as_ref())?;
        }
        self.ensure_open()?;

        let mut loaded = load_columns(ctx, db.as_ref(), names).await?;
        if names.is_empty() {
            for (name, columns) in loaded {
                if let Err(e) = validate_identifier(&name) {
                    tracing::warn!(target: "dmlkit.ddl", table = %name, error = %e, "skipping table");
                    continue;
                }
                self.store_loaded(name, columns, false, &db);
            }
            return Ok(());
        }

        let mut found = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let columns = loaded
                .remove(name)
                .ok_or_else(|| SqlError::not_found(format!("table {name:?} not found in database")))?;
            found.push((name.to_string(), columns));
        }
        for (name, columns) in found {
            self.store_loaded(name, columns, false, &db);
        }
        Ok(())
    }

    /// Create a table or view from `query`, then load its columns.
    ///
    /// Runs `DROP <kind> IF EXISTS` first when `drop_if_exists` is set. Driver
    /// errors from any step are returned unchanged.
    pub async fn with_table_or_view_from_query(
        &self,
        ctx: &Context,
        db: Arc<dyn DbClient>,
        kind: ObjectKind,
        name: &str,
        query: &str,
        drop_if_exists: bool,
    ) -> SqlResult<()> {
        validate_identifier(name)?;
        self.ensure_open()?;

        let quoted = quote_ident(name);
        if drop_if_exists {
            let sql = format!("DROP {} IF EXISTS {quoted}", kind.keyword());
            tracing::debug!(target: "dmlkit.ddl", sql = %sql, "drop object");
            ctx.run(db.execute(&sql)).await?;
        }

        let sql = format!("CREATE {} {quoted} AS {query}", kind.keyword());
        tracing::debug!(target: "dmlkit.ddl", sql = %sql, "create object");
        ctx.run(db.execute(&sql)).await?;

        let mut loaded = load_columns(ctx, db.as_ref(), &[name]).await?;
        let columns = loaded
            .remove(name)
            .ok_or_else(|| SqlError::not_found(format!("{} {name:?} not found in database", kind.keyword())))?;
        self.store_loaded(name.to_string(), columns, kind == ObjectKind::View, &db);
        Ok(())
    }

    /// Replace the columns of `name`, keeping its listeners.
    fn store_loaded(&self, name: String, columns: Columns, is_view: bool, db: &Arc<dyn DbClient>) {
        tracing::debug!(target: "dmlkit.ddl", table = %name, columns = columns.len(), is_view, "store loaded table");
        let mut inner = self.write();
        let mut table = inner.take_or_new(&name);
        table.columns = columns;
        table.is_view = is_view;
        table.db = Some(db.clone());
        inner.put(table);
    }
}
