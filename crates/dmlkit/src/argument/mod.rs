//! Typed SQL arguments.
//!
//! [`Arguments`] is an ordered list of [`Argument`]s built with a fluent,
//! consuming API. Each argument holds a [`Value`] and the [`Op`] used when the
//! argument takes part in a condition.
//!
//! ```
//! use dmlkit::Arguments;
//!
//! let args = Arguments::new().int(1).int64s([2, 3]).null();
//! assert_eq!(args.len(), 4);
//! ```

mod convert;
mod value;

pub use convert::{IntoValue, Valuer};
pub use value::{Op, Value};

use chrono::NaiveDateTime;
use std::fmt;

/// A value plus the operator it is compared with.
#[derive(Clone, PartialEq)]
pub struct Argument {
    pub value: Value,
    pub op: Op,
}

impl Argument {
    pub fn new(value: impl IntoValue) -> Self {
        Self {
            value: value.into_value(),
            op: Op::Equal,
        }
    }

    /// Set the comparison operator.
    pub fn op(mut self, op: Op) -> Self {
        self.op = op;
        self
    }

    /// Number of placeholder units, see [`Value::len`].
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_builder_call(f, &self.value)?;
        if self.op != Op::Equal {
            write!(f, ".op(Op::{:?})", self.op)?;
        }
        Ok(())
    }
}

impl<T: IntoValue> From<T> for Argument {
    fn from(value: T) -> Self {
        Argument::new(value)
    }
}

/// Ordered list of arguments for one statement.
#[derive(Clone, Default, PartialEq)]
pub struct Arguments {
    args: Vec<Argument>,
}

macro_rules! scalar_builders {
    ($( $(#[$meta:meta])* $name:ident($ty:ty) => $variant:ident ),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(self, v: $ty) -> Self {
                self.value(Value::$variant(v.into()))
            }
        )*
    };
}

macro_rules! list_builders {
    ($( $(#[$meta:meta])* $name:ident($item:ty) => $variant:ident ),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name<I>(self, values: I) -> Self
            where
                I: IntoIterator,
                I::Item: Into<$item>,
            {
                self.value(Value::$variant(values.into_iter().map(Into::into).collect()))
            }
        )*
    };
}

macro_rules! nullable_builders {
    ($( $name:ident($item:ty) => $variant:ident ),* $(,)?) => {
        $(
            pub fn $name(self, v: Option<$item>) -> Self {
                match v {
                    Some(v) => self.value(Value::$variant(v.into())),
                    None => self.null(),
                }
            }
        )*
    };
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            args: Vec::with_capacity(capacity),
        }
    }

    /// Append a value with the default `=` operator.
    pub fn value(mut self, value: impl IntoValue) -> Self {
        self.args.push(Argument::new(value));
        self
    }

    /// Append a prepared argument.
    pub fn arg(mut self, arg: impl Into<Argument>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set the operator of the most recently added argument.
    pub fn op(mut self, op: Op) -> Self {
        if let Some(last) = self.args.last_mut() {
            last.op = op;
        }
        self
    }

    pub fn null(self) -> Self {
        self.value(Value::Null)
    }

    /// Append any signed integer as `Int64`.
    pub fn int(self, v: impl Into<i64>) -> Self {
        self.value(Value::Int64(v.into()))
    }

    scalar_builders! {
        int64(i64) => Int64,
        uint64(u64) => Uint64,
        float64(f64) => Float64,
        bool(bool) => Bool,
        /// Append a string, rendered single-quoted and escaped.
        str(&str) => String,
        string(String) => String,
        /// Append text held in raw bytes; checked for UTF-8 when interpolated.
        text(Vec<u8>) => Text,
        /// Append binary data, rendered as a `0x` hex literal.
        bytes(Vec<u8>) => Bytes,
        time(NaiveDateTime) => Time,
    }

    nullable_builders! {
        null_int64(i64) => Int64,
        null_uint64(u64) => Uint64,
        null_float64(f64) => Float64,
        null_bool(bool) => Bool,
        null_string(String) => String,
        null_time(NaiveDateTime) => Time,
    }

    list_builders! {
        /// Append a list of signed integers.
        ints(i64) => Int64s,
        int64s(i64) => Int64s,
        uint64s(u64) => Uint64s,
        float64s(f64) => Float64s,
        bools(bool) => Bools,
        strs(String) => Strings,
        texts(Vec<u8>) => Texts,
        bytes_list(Vec<u8>) => BytesList,
        times(NaiveDateTime) => Times,
    }

    list_builders! {
        null_int64s(Option<i64>) => NullInt64s,
        null_float64s(Option<f64>) => NullFloat64s,
        null_bools(Option<bool>) => NullBools,
        null_strings(Option<String>) => NullStrings,
        null_times(Option<NaiveDateTime>) => NullTimes,
    }

    /// Append all arguments of `other`.
    pub fn extend(mut self, other: Arguments) -> Self {
        self.args.extend(other.args);
        self
    }

    pub fn push(&mut self, arg: impl Into<Argument>) {
        self.args.push(arg.into());
    }

    pub fn append(&mut self, other: &mut Arguments) {
        self.args.append(&mut other.args);
    }

    /// Number of placeholder units: list arguments count each element.
    pub fn len(&self) -> usize {
        self.args.iter().map(Argument::len).sum()
    }

    /// Number of arguments, counting a list as one.
    pub fn count(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.args.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Argument> {
        self.args.get(idx)
    }

    pub fn as_slice(&self) -> &[Argument] {
        &self.args
    }

    /// Remove all arguments, keeping the allocation.
    pub fn reset(&mut self) {
        self.args.clear();
    }

    /// Flatten into one scalar value per placeholder unit.
    pub fn flatten(&self) -> Vec<Value> {
        self.args.iter().flat_map(|a| a.value.flatten()).collect()
    }
}

impl fmt::Debug for Arguments {
    /// Prints the builder calls that reproduce the list, e.g.
    /// `Arguments::new().int64(1).str("S1")`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Arguments::new()")?;
        for arg in &self.args {
            write!(f, ".")?;
            write_builder_call(f, &arg.value)?;
            if arg.op != Op::Equal {
                write!(f, ".op(Op::{:?})", arg.op)?;
            }
        }
        Ok(())
    }
}

fn write_builder_call(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null()"),
        Value::Int64(v) => write!(f, "int64({v})"),
        Value::Uint64(v) => write!(f, "uint64({v})"),
        Value::Float64(v) => write!(f, "float64({v:?})"),
        Value::Bool(v) => write!(f, "bool({v})"),
        Value::String(v) => write!(f, "str({v:?})"),
        Value::Text(v) => write!(f, "text({v:?})"),
        Value::Bytes(v) => write!(f, "bytes({v:?})"),
        Value::Time(v) => write!(f, "time({v:?})"),
        Value::Int64s(v) => write!(f, "int64s({v:?})"),
        Value::Uint64s(v) => write!(f, "uint64s({v:?})"),
        Value::Float64s(v) => write!(f, "float64s({v:?})"),
        Value::Bools(v) => write!(f, "bools({v:?})"),
        Value::Strings(v) => write!(f, "strs({v:?})"),
        Value::Texts(v) => write!(f, "texts({v:?})"),
        Value::BytesList(v) => write!(f, "bytes_list({v:?})"),
        Value::Times(v) => write!(f, "times({v:?})"),
        Value::NullInt64s(v) => write!(f, "null_int64s({v:?})"),
        Value::NullFloat64s(v) => write!(f, "null_float64s({v:?})"),
        Value::NullBools(v) => write!(f, "null_bools({v:?})"),
        Value::NullStrings(v) => write!(f, "null_strings({v:?})"),
        Value::NullTimes(v) => write!(f, "null_times({v:?})"),
    }
}

impl FromIterator<Argument> for Arguments {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        Self {
            args: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Arguments {
    type Item = Argument;
    type IntoIter = std::vec::IntoIter<Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.into_iter()
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}
