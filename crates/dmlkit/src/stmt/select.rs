use super::listener::ListenerBucket;
use super::{Alias, QueryBuilder, write_list};
use crate::argument::Arguments;
use crate::client::DbClient;
use crate::condition::{ClauseKind, IntoFragments, WhereFragments, bind_record, write_fragments};
use crate::error::{SqlError, SqlResult};
use crate::ident::{quote_as, write_column_or_expr};
use crate::mapper::{ColumnMapper, scan_rows};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => " INNER JOIN ",
            JoinKind::Left => " LEFT JOIN ",
            JoinKind::Right => " RIGHT JOIN ",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Join {
    pub kind: JoinKind,
    pub table: Alias,
    pub on: WhereFragments,
}

/// SELECT statement builder.
#[derive(Debug, Clone, Default)]
pub struct Select {
    distinct: bool,
    columns: Vec<String>,
    from: Alias,
    joins: Vec<Join>,
    wheres: WhereFragments,
    group_by: Vec<String>,
    havings: WhereFragments,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    listeners: ListenerBucket<Select>,
}

impl Select {
    /// Select `columns`; valid identifiers are quoted, other entries are
    /// written as expressions.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from = Alias::new(table);
        self
    }

    pub fn from_as(mut self, table: impl Into<String>, alias: impl Into<String>) -> Self {
        self.from = Alias::with_alias(table, alias);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Add `` `name` AS `alias` ``.
    pub fn column_as(mut self, column: &str, alias: &str) -> Self {
        self.columns.push(quote_as(column, Some(alias)));
        self
    }

    pub fn join(
        mut self,
        kind: JoinKind,
        table: Alias,
        conditions: impl IntoFragments,
    ) -> Self {
        let mut on = WhereFragments::new();
        conditions.append_to(&mut on);
        self.joins.push(Join { kind, table, on });
        self
    }

    pub fn inner_join(self, table: Alias, conditions: impl IntoFragments) -> Self {
        self.join(JoinKind::Inner, table, conditions)
    }

    pub fn left_join(self, table: Alias, conditions: impl IntoFragments) -> Self {
        self.join(JoinKind::Left, table, conditions)
    }

    pub fn right_join(self, table: Alias, conditions: impl IntoFragments) -> Self {
        self.join(JoinKind::Right, table, conditions)
    }

    pub fn where_(mut self, conditions: impl IntoFragments) -> Self {
        conditions.append_to(&mut self.wheres);
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    pub fn having(mut self, conditions: impl IntoFragments) -> Self {
        conditions.append_to(&mut self.havings);
        self
    }

    /// Order by a column or expression such as `"sku DESC"`.
    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by.push(expr.into());
        self
    }

    pub fn order_by_desc(mut self, column: &str) -> Self {
        let mut expr = String::new();
        write_column_or_expr(&mut expr, column);
        expr.push_str(" DESC");
        self.order_by.push(expr);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Fill the placeholders of columns qualified with `qualifier` (JOIN, WHERE
    /// and HAVING) from `record` in append mode. Only conditions already added
    /// are bound; a column the record does not know is `NotFound`.
    pub fn bind_record<M>(mut self, qualifier: &str, record: &mut M) -> SqlResult<Self>
    where
        M: ColumnMapper + ?Sized,
    {
        let mut bound = 0;
        for join in &mut self.joins {
            bound += bind_record(&mut join.on, qualifier, &mut *record)?;
        }
        bound += bind_record(&mut self.wheres, qualifier, &mut *record)?;
        bound += bind_record(&mut self.havings, qualifier, record)?;
        tracing::trace!(target: "dmlkit.sql", qualifier, bound, "bound record");
        Ok(self)
    }

    /// Run `f` on a copy of this statement before SQL is generated.
    pub fn listen(mut self, f: impl Fn(&mut Select) + Send + Sync + 'static) -> Self {
        self.listeners.push(Arc::new(f));
        self
    }

    pub fn listeners(mut self, listeners: &ListenerBucket<Select>) -> Self {
        self.listeners.merge(listeners);
        self
    }

    pub fn table(&self) -> &Alias {
        &self.from
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Write the statement into `buf`, appending arguments in placeholder order.
    pub(crate) fn write_sql(&self, buf: &mut String, args: &mut Arguments) -> SqlResult<()> {
        if !self.listeners.is_empty() {
            let mut copy = self.clone();
            copy.listeners = ListenerBucket::new();
            self.listeners.dispatch(&mut copy);
            return copy.write_sql(buf, args);
        }

        if self.from.is_empty() {
            return Err(SqlError::not_valid("SELECT without a table name"));
        }

        buf.push_str("SELECT ");
        if self.distinct {
            buf.push_str("DISTINCT ");
        }
        if self.columns.is_empty() {
            buf.push('*');
        } else {
            write_list(buf, &self.columns);
        }

        buf.push_str(" FROM ");
        self.from.write(buf);

        for join in &self.joins {
            buf.push_str(join.kind.as_sql());
            join.table.write(buf);
            write_fragments(&join.on, ClauseKind::Join, buf, args)?;
        }

        write_fragments(&self.wheres, ClauseKind::Where, buf, args)?;

        if !self.group_by.is_empty() {
            buf.push_str(" GROUP BY ");
            write_list(buf, &self.group_by);
        }

        write_fragments(&self.havings, ClauseKind::Having, buf, args)?;

        if !self.order_by.is_empty() {
            buf.push_str(" ORDER BY ");
            write_list(buf, &self.order_by);
        }
        if let Some(limit) = self.limit {
            buf.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            buf.push_str(&format!(" OFFSET {offset}"));
        }
        Ok(())
    }

    /// Run the query and scan every row into `mapper`. Returns the row count.
    pub async fn load<M>(&self, db: &dyn DbClient, mapper: &mut M) -> SqlResult<usize>
    where
        M: ColumnMapper + ?Sized,
    {
        let sql = self.interpolate()?;
        tracing::debug!(target: "dmlkit.sql", sql = %sql, "select");
        let rows = db.query(&sql).await?;
        scan_rows(mapper, &rows)?;
        Ok(rows.len())
    }
}

impl QueryBuilder for Select {
    fn to_sql(&self) -> SqlResult<(String, Arguments)> {
        let mut buf = String::with_capacity(128);
        let mut args = Arguments::new();
        self.write_sql(&mut buf, &mut args)?;
        Ok((buf, args))
    }
}
