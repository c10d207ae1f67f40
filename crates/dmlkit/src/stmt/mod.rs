//! SELECT and DELETE statement builders.
//!
//! Builders collect their parts and return `(sql, arguments)` from
//! [`QueryBuilder::to_sql`]; [`QueryBuilder::interpolate`] produces literal SQL.
//! Listeners registered on a statement run on a copy of it right before the
//! SQL is generated.

mod delete;
mod listener;
mod select;

pub use delete::Delete;
pub use listener::{Listener, ListenerBucket, Listeners};
pub use select::{Join, JoinKind, Select};

use crate::argument::Arguments;
use crate::error::SqlResult;
use crate::ident::write_quoted_as;
use crate::interpolate::Interpolate;

/// Common interface of statement builders.
pub trait QueryBuilder {
    /// SQL with `?` placeholders and the arguments in placeholder order.
    fn to_sql(&self) -> SqlResult<(String, Arguments)>;

    /// SQL with all arguments interpolated as literals.
    fn interpolate(&self) -> SqlResult<String> {
        let (sql, args) = self.to_sql()?;
        Interpolate::new(sql).arguments(args).to_sql()
    }
}

/// A table or expression with an optional alias.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub alias: Option<String>,
}

impl Alias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    pub(crate) fn write(&self, buf: &mut String) {
        write_quoted_as(buf, &self.name, self.alias.as_deref());
    }
}

/// Write `items` comma separated, quoting identifiers and keeping expressions.
fn write_list(buf: &mut String, items: &[String]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        crate::ident::write_column_or_expr(buf, item);
    }
}
