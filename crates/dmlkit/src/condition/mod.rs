//! WHERE, HAVING and JOIN condition fragments.
//!
//! A [`WhereFragment`] is one element of a condition list: a column name or a
//! raw expression, its arguments, and the logical connector joining it to the
//! fragment before it. Fragments render left to right; the connector of the
//! first fragment in a group is ignored.
//!
//! ```
//! use dmlkit::condition::{cond, column, paren_open, paren_close};
//! use dmlkit::{QueryBuilder, Select};
//!
//! let (sql, _args) = Select::new(["entity_id"])
//!     .from("catalog_product_entity")
//!     .where_(column("type_id").equal("simple"))
//!     .where_(paren_open())
//!     .where_(column("sku").like("A%"))
//!     .where_(column("sku").like("B%").or())
//!     .where_(paren_close())
//!     .where_(cond("attribute_set_id > ?", dmlkit::Arguments::new().int64(4)))
//!     .to_sql()?;
//! assert_eq!(
//!     sql,
//!     "SELECT `entity_id` FROM `catalog_product_entity` WHERE (`type_id` = ?) AND ((`sku` LIKE ?) OR (`sku` LIKE ?)) AND (attribute_set_id > ?)"
//! );
//! # Ok::<(), dmlkit::SqlError>(())
//! ```

mod render;

pub use render::{ClauseKind, write_fragments};

use crate::argument::{Argument, Arguments, IntoValue, Op, Value};
use crate::error::SqlResult;
use crate::mapper::{ColumnMapper, append_args};
use crate::stmt::Select;
use std::collections::HashMap;

/// How a fragment connects to its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Logical {
    #[default]
    And,
    Or,
    Xor,
    Not,
}

impl Logical {
    pub fn as_sql(self) -> &'static str {
        match self {
            Logical::And => " AND ",
            Logical::Or => " OR ",
            Logical::Xor => " XOR ",
            Logical::Not => " NOT ",
        }
    }
}

/// A correlated sub-select compared with the fragment's column.
#[derive(Debug, Clone)]
pub struct SubSelect {
    pub select: Box<Select>,
    pub op: Op,
}

/// Right-hand side of a comparison that is not a plain argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Another column: `` `e`.`entity_id` = `t`.`entity_id` ``.
    Column(Op, String),
    /// A `?` whose value comes from a record bound to the statement.
    Placeholder(Op),
}

/// One condition element.
#[derive(Debug, Clone, Default)]
pub struct WhereFragment {
    /// Column name (`table.column` or `column`) or raw expression.
    pub condition: String,
    pub arguments: Arguments,
    pub logical: Logical,
    pub sub: Option<SubSelect>,
    pub operand: Option<Operand>,
    /// JOIN ... USING column list.
    pub using: Vec<String>,
}

/// Ordered list of fragments.
pub type WhereFragments = Vec<WhereFragment>;

impl WhereFragment {
    /// Connect to the previous fragment with AND (the default).
    pub fn and(mut self) -> Self {
        self.logical = Logical::And;
        self
    }

    /// Connect to the previous fragment with OR.
    pub fn or(mut self) -> Self {
        self.logical = Logical::Or;
        self
    }

    pub fn xor(mut self) -> Self {
        self.logical = Logical::Xor;
        self
    }

    pub fn not(mut self) -> Self {
        self.logical = Logical::Not;
        self
    }

    fn compare(mut self, op: Op, value: Value) -> Self {
        self.arguments = Arguments::new().arg(Argument { value, op });
        self
    }

    pub fn equal(self, v: impl IntoValue) -> Self {
        self.compare(Op::Equal, v.into_value())
    }

    pub fn not_equal(self, v: impl IntoValue) -> Self {
        self.compare(Op::NotEqual, v.into_value())
    }

    pub fn greater(self, v: impl IntoValue) -> Self {
        self.compare(Op::Greater, v.into_value())
    }

    pub fn greater_or_equal(self, v: impl IntoValue) -> Self {
        self.compare(Op::GreaterOrEqual, v.into_value())
    }

    pub fn less(self, v: impl IntoValue) -> Self {
        self.compare(Op::Less, v.into_value())
    }

    pub fn less_or_equal(self, v: impl IntoValue) -> Self {
        self.compare(Op::LessOrEqual, v.into_value())
    }

    pub fn like(self, v: impl IntoValue) -> Self {
        self.compare(Op::Like, v.into_value())
    }

    pub fn not_like(self, v: impl IntoValue) -> Self {
        self.compare(Op::NotLike, v.into_value())
    }

    pub fn regexp(self, v: impl IntoValue) -> Self {
        self.compare(Op::Regexp, v.into_value())
    }

    /// NULL-safe equality `<=>`.
    pub fn null_safe_equal(self, v: impl IntoValue) -> Self {
        self.compare(Op::SpaceShip, v.into_value())
    }

    /// `IN (...)`; pass a list value such as `vec![1, 2, 3]`.
    pub fn in_list(self, v: impl IntoValue) -> Self {
        self.compare(Op::In, v.into_value())
    }

    pub fn not_in_list(self, v: impl IntoValue) -> Self {
        self.compare(Op::NotIn, v.into_value())
    }

    pub fn between(mut self, low: impl IntoValue, high: impl IntoValue) -> Self {
        self.arguments = Arguments::new()
            .arg(Argument::new(low).op(Op::Between))
            .arg(Argument::new(high).op(Op::Between));
        self
    }

    pub fn not_between(mut self, low: impl IntoValue, high: impl IntoValue) -> Self {
        self.arguments = Arguments::new()
            .arg(Argument::new(low).op(Op::NotBetween))
            .arg(Argument::new(high).op(Op::NotBetween));
        self
    }

    /// Compare with another column using `op`.
    pub fn compare_column(mut self, op: Op, other: impl Into<String>) -> Self {
        self.operand = Some(Operand::Column(op, other.into()));
        self
    }

    pub fn equal_column(self, other: impl Into<String>) -> Self {
        self.compare_column(Op::Equal, other)
    }

    /// Compare with a `?` filled later by [`Select::bind_record`].
    pub fn placeholder(mut self, op: Op) -> Self {
        self.operand = Some(Operand::Placeholder(op));
        self
    }

    pub fn is_null(self) -> Self {
        self.compare(Op::IsNull, Value::Null)
    }

    pub fn is_not_null(self) -> Self {
        self.compare(Op::IsNotNull, Value::Null)
    }

    pub(crate) fn is_paren_open(&self) -> bool {
        self.condition == "("
    }

    pub(crate) fn is_paren_close(&self) -> bool {
        self.condition == ")"
    }
}

/// A condition from a column name or raw expression and its arguments.
///
/// A valid identifier is quoted and compared using the operator of the first
/// argument. Anything else is written verbatim as an expression; callers must
/// not put untrusted input into expressions.
pub fn cond(expr: impl Into<String>, args: Arguments) -> WhereFragment {
    WhereFragment {
        condition: expr.into(),
        arguments: args,
        ..Default::default()
    }
}

/// Start a condition on a column; finish it with an operator method like
/// [`WhereFragment::equal`].
pub fn column(name: impl Into<String>) -> WhereFragment {
    cond(name, Arguments::new())
}

/// `USING (a, b)` for a JOIN; ends the join's condition list.
pub fn using<I, S>(columns: I) -> WhereFragment
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    WhereFragment {
        using: columns.into_iter().map(Into::into).collect(),
        ..Default::default()
    }
}

/// Compare a column or expression with the result of `select`. The sub-select's
/// arguments are spliced in at this fragment's position.
pub fn sub_select(expr: impl Into<String>, op: Op, select: Select) -> WhereFragment {
    WhereFragment {
        condition: expr.into(),
        sub: Some(SubSelect {
            select: Box::new(select),
            op,
        }),
        ..Default::default()
    }
}

/// Opening parenthesis marker; the next fragment is the first of its group.
pub fn paren_open() -> WhereFragment {
    cond("(", Arguments::new())
}

/// Closing parenthesis marker.
pub fn paren_close() -> WhereFragment {
    cond(")", Arguments::new())
}

/// Fill the placeholder fragments belonging to `qualifier` with values from
/// `record`, looked up by the unqualified column name. An empty qualifier
/// matches unqualified columns. Returns how many fragments were bound.
pub(crate) fn bind_record<M: ColumnMapper + ?Sized>(
    fragments: &mut [WhereFragment],
    qualifier: &str,
    record: &mut M,
) -> SqlResult<usize> {
    let mut bound = 0;
    for f in fragments {
        if !matches!(f.operand, Some(Operand::Placeholder(_))) {
            continue;
        }
        let local = match f.condition.split_once('.') {
            Some((q, local)) if q == qualifier => local,
            None if qualifier.is_empty() => f.condition.as_str(),
            _ => continue,
        };
        f.arguments = append_args(&mut *record, &[local.to_string()])?;
        bound += 1;
    }
    Ok(bound)
}

/// Anything that appends fragments to a condition list.
pub trait IntoFragments {
    fn append_to(self, fragments: &mut WhereFragments);
}

impl IntoFragments for WhereFragment {
    fn append_to(self, fragments: &mut WhereFragments) {
        fragments.push(self);
    }
}

impl IntoFragments for Vec<WhereFragment> {
    fn append_to(self, fragments: &mut WhereFragments) {
        fragments.extend(self);
    }
}

impl<const N: usize> IntoFragments for [WhereFragment; N] {
    fn append_to(self, fragments: &mut WhereFragments) {
        fragments.extend(self);
    }
}

fn equality(column: String, value: Value) -> WhereFragment {
    let op = match &value {
        Value::Null => Op::IsNull,
        v if v.is_list() => Op::In,
        _ => Op::Equal,
    };
    cond(column, Arguments::new().arg(Argument { value, op }))
}

/// Column equality conditions in insertion order, joined with AND.
///
/// A `Null` value compares with `IS NULL`, a list value with `IN`.
#[derive(Debug, Clone, Default)]
pub struct Eq {
    pairs: Vec<(String, Value)>,
}

impl Eq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, column: impl Into<String>, value: impl IntoValue) -> Self {
        self.pairs.push((column.into(), value.into_value()));
        self
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: IntoValue> FromIterator<(K, V)> for Eq {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into_value()))
                .collect(),
        }
    }
}

impl IntoFragments for Eq {
    fn append_to(self, fragments: &mut WhereFragments) {
        fragments.extend(self.pairs.into_iter().map(|(c, v)| equality(c, v)));
    }
}

/// Map-based variant of [`Eq`]. Fragments follow the map's iteration order,
/// which is unspecified; use [`Eq`] when the SQL text must be stable.
#[derive(Debug, Clone, Default)]
pub struct EqMap(pub HashMap<String, Value>);

impl IntoFragments for EqMap {
    fn append_to(self, fragments: &mut WhereFragments) {
        fragments.extend(self.0.into_iter().map(|(c, v)| equality(c, v)));
    }
}
