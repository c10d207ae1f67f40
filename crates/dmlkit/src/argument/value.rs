//! The closed set of bindable values and comparison operators.

use chrono::NaiveDateTime;

/// One bindable SQL value: a scalar or a homogeneous list.
///
/// List variants can not mix element kinds. Nullable lists keep the element
/// kind and render `None` as `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int64(i64),
    Uint64(u64),
    Float64(f64),
    Bool(bool),
    String(String),
    /// Raw bytes holding text; validated as UTF-8 and rendered as a quoted string.
    Text(Vec<u8>),
    /// Binary data, rendered as a hex literal.
    Bytes(Vec<u8>),
    Time(NaiveDateTime),

    Int64s(Vec<i64>),
    Uint64s(Vec<u64>),
    Float64s(Vec<f64>),
    Bools(Vec<bool>),
    Strings(Vec<String>),
    Texts(Vec<Vec<u8>>),
    BytesList(Vec<Vec<u8>>),
    Times(Vec<NaiveDateTime>),

    NullInt64s(Vec<Option<i64>>),
    NullFloat64s(Vec<Option<f64>>),
    NullBools(Vec<Option<bool>>),
    NullStrings(Vec<Option<String>>),
    NullTimes(Vec<Option<NaiveDateTime>>),
}

impl Value {
    /// Number of placeholder units this value fills: 1 for scalars, the
    /// element count for lists.
    pub fn len(&self) -> usize {
        match self {
            Value::Int64s(v) => v.len(),
            Value::Uint64s(v) => v.len(),
            Value::Float64s(v) => v.len(),
            Value::Bools(v) => v.len(),
            Value::Strings(v) => v.len(),
            Value::Texts(v) => v.len(),
            Value::BytesList(v) => v.len(),
            Value::Times(v) => v.len(),
            Value::NullInt64s(v) => v.len(),
            Value::NullFloat64s(v) => v.len(),
            Value::NullBools(v) => v.len(),
            Value::NullStrings(v) => v.len(),
            Value::NullTimes(v) => v.len(),
            _ => 1,
        }
    }

    /// True only for an empty list.
    pub fn is_empty(&self) -> bool {
        self.is_list() && self.len() == 0
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Value::Int64s(_)
                | Value::Uint64s(_)
                | Value::Float64s(_)
                | Value::Bools(_)
                | Value::Strings(_)
                | Value::Texts(_)
                | Value::BytesList(_)
                | Value::Times(_)
                | Value::NullInt64s(_)
                | Value::NullFloat64s(_)
                | Value::NullBools(_)
                | Value::NullStrings(_)
                | Value::NullTimes(_)
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The `idx`-th element of a list as a scalar value. Scalars return
    /// themselves for index 0.
    pub fn element(&self, idx: usize) -> Option<Value> {
        fn opt<T: Clone>(v: &[Option<T>], idx: usize, f: fn(T) -> Value) -> Option<Value> {
            v.get(idx)
                .map(|e| e.clone().map(f).unwrap_or(Value::Null))
        }
        match self {
            Value::Int64s(v) => v.get(idx).copied().map(Value::Int64),
            Value::Uint64s(v) => v.get(idx).copied().map(Value::Uint64),
            Value::Float64s(v) => v.get(idx).copied().map(Value::Float64),
            Value::Bools(v) => v.get(idx).copied().map(Value::Bool),
            Value::Strings(v) => v.get(idx).cloned().map(Value::String),
            Value::Texts(v) => v.get(idx).cloned().map(Value::Text),
            Value::BytesList(v) => v.get(idx).cloned().map(Value::Bytes),
            Value::Times(v) => v.get(idx).copied().map(Value::Time),
            Value::NullInt64s(v) => opt(v, idx, Value::Int64),
            Value::NullFloat64s(v) => opt(v, idx, Value::Float64),
            Value::NullBools(v) => opt(v, idx, Value::Bool),
            Value::NullStrings(v) => opt(v, idx, Value::String),
            Value::NullTimes(v) => opt(v, idx, Value::Time),
            scalar if idx == 0 => Some(scalar.clone()),
            _ => None,
        }
    }

    /// Flatten into scalar values, one per placeholder unit.
    pub fn flatten(&self) -> Vec<Value> {
        (0..self.len()).filter_map(|i| self.element(i)).collect()
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int64(_) => "int64",
            Value::Uint64(_) => "uint64",
            Value::Float64(_) => "float64",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Time(_) => "time",
            Value::Int64s(_) => "int64s",
            Value::Uint64s(_) => "uint64s",
            Value::Float64s(_) => "float64s",
            Value::Bools(_) => "bools",
            Value::Strings(_) => "strings",
            Value::Texts(_) => "texts",
            Value::BytesList(_) => "bytes_list",
            Value::Times(_) => "times",
            Value::NullInt64s(_) => "null_int64s",
            Value::NullFloat64s(_) => "null_float64s",
            Value::NullBools(_) => "null_bools",
            Value::NullStrings(_) => "null_strings",
            Value::NullTimes(_) => "null_times",
        }
    }
}

/// Comparison operator attached to an argument when it takes part in a
/// condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Op {
    #[default]
    Equal,
    NotEqual,
    In,
    NotIn,
    Between,
    NotBetween,
    Like,
    NotLike,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    IsNull,
    IsNotNull,
    Regexp,
    NotRegexp,
    /// NULL-safe equality `<=>`.
    SpaceShip,
}

impl Op {
    /// Operator keyword with surrounding spaces, e.g. `" IN "`.
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Equal => " = ",
            Op::NotEqual => " != ",
            Op::In => " IN ",
            Op::NotIn => " NOT IN ",
            Op::Between => " BETWEEN ",
            Op::NotBetween => " NOT BETWEEN ",
            Op::Like => " LIKE ",
            Op::NotLike => " NOT LIKE ",
            Op::Greater => " > ",
            Op::GreaterOrEqual => " >= ",
            Op::Less => " < ",
            Op::LessOrEqual => " <= ",
            Op::IsNull => " IS NULL",
            Op::IsNotNull => " IS NOT NULL",
            Op::Regexp => " REGEXP ",
            Op::NotRegexp => " NOT REGEXP ",
            Op::SpaceShip => " <=> ",
        }
    }

    /// Placeholder text that follows the operator, empty for the null checks.
    pub fn placeholder(self) -> &'static str {
        match self {
            Op::In | Op::NotIn => "(?)",
            Op::Between | Op::NotBetween => "? AND ?",
            Op::IsNull | Op::IsNotNull => "",
            _ => "?",
        }
    }

    /// Whether the operator consumes an argument.
    pub fn takes_argument(self) -> bool {
        !matches!(self, Op::IsNull | Op::IsNotNull)
    }
}
