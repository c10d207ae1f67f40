use super::listener::ListenerBucket;
use super::{Alias, QueryBuilder, write_list};
use crate::argument::Arguments;
use crate::client::DbClient;
use crate::condition::{ClauseKind, IntoFragments, WhereFragments, bind_record, write_fragments};
use crate::mapper::ColumnMapper;
use crate::error::{SqlError, SqlResult};
use std::sync::Arc;

/// DELETE statement builder.
#[derive(Debug, Clone, Default)]
pub struct Delete {
    from: Alias,
    wheres: WhereFragments,
    order_by: Vec<String>,
    limit: Option<u64>,
    listeners: ListenerBucket<Delete>,
}

impl Delete {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            from: Alias::new(table),
            ..Default::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.from.alias = Some(alias.into());
        self
    }

    pub fn where_(mut self, conditions: impl IntoFragments) -> Self {
        conditions.append_to(&mut self.wheres);
        self
    }

    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by.push(expr.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Fill WHERE placeholders of columns qualified with `qualifier` from
    /// `record`, see [`Select::bind_record`](super::Select::bind_record).
    pub fn bind_record<M>(mut self, qualifier: &str, record: &mut M) -> SqlResult<Self>
    where
        M: ColumnMapper + ?Sized,
    {
        bind_record(&mut self.wheres, qualifier, record)?;
        Ok(self)
    }

    pub fn listen(mut self, f: impl Fn(&mut Delete) + Send + Sync + 'static) -> Self {
        self.listeners.push(Arc::new(f));
        self
    }

    pub fn listeners(mut self, listeners: &ListenerBucket<Delete>) -> Self {
        self.listeners.merge(listeners);
        self
    }

    pub fn table(&self) -> &Alias {
        &self.from
    }

    fn write_sql(&self, buf: &mut String, args: &mut Arguments) -> SqlResult<()> {
        if !self.listeners.is_empty() {
            let mut copy = self.clone();
            copy.listeners = ListenerBucket::new();
            self.listeners.dispatch(&mut copy);
            return copy.write_sql(buf, args);
        }

        if self.from.is_empty() {
            return Err(SqlError::not_valid("DELETE without a table name"));
        }

        buf.push_str("DELETE FROM ");
        self.from.write(buf);
        write_fragments(&self.wheres, ClauseKind::Where, buf, args)?;

        if !self.order_by.is_empty() {
            buf.push_str(" ORDER BY ");
            write_list(buf, &self.order_by);
        }
        if let Some(limit) = self.limit {
            buf.push_str(&format!(" LIMIT {limit}"));
        }
        Ok(())
    }

    /// Execute the statement; returns the affected row count.
    pub async fn exec(&self, db: &dyn DbClient) -> SqlResult<u64> {
        let sql = self.interpolate()?;
        tracing::debug!(target: "dmlkit.sql", sql = %sql, "delete");
        db.execute(&sql).await
    }
}

impl QueryBuilder for Delete {
    fn to_sql(&self) -> SqlResult<(String, Arguments)> {
        let mut buf = String::with_capacity(64);
        let mut args = Arguments::new();
        self.write_sql(&mut buf, &mut args)?;
        Ok((buf, args))
    }
}
