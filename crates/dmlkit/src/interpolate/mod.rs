//! Placeholder interpolation.
//!
//! Turns a template with `?`, `:Name` or `@Name` placeholders plus typed
//! arguments into literal SQL text using MySQL quoting and escaping rules.
//!
//! Rules for `?`:
//!
//! - a scalar argument fills one placeholder
//! - a list argument at a placeholder written as `(?)` expands to all of its
//!   elements, comma-joined: `IN (?)` with `[1, 2, 3]` becomes `IN (1,2,3)`
//! - a list argument at any other placeholder fills one placeholder per
//!   element: `a = ? AND b = ?` with `[true, false]` becomes `a = 1 AND b = 0`
//! - an empty list, invalid UTF-8 text and a placeholder/argument imbalance are
//!   `NotValid` errors
//!
//! Before placeholders are processed, bracket identifiers are rewritten
//! (`[name]` becomes `` `name` ``), see [`rewrite_brackets`].
//!
//! ```
//! use dmlkit::Interpolate;
//!
//! let sql = Interpolate::new("SELECT * FROM [x] WHERE a IN (?) AND b = ?")
//!     .int64s([1, 2, 3])
//!     .str("a'b")
//!     .to_sql()?;
//! assert_eq!(sql, r"SELECT * FROM `x` WHERE a IN (1,2,3) AND b = 'a\'b'");
//! # Ok::<(), dmlkit::SqlError>(())
//! ```

mod literal;
mod scan;

pub use scan::rewrite_brackets;

use crate::argument::{Argument, Arguments, IntoValue, Valuer, Value};
use crate::error::{SqlError, SqlResult};
use chrono::NaiveDateTime;
use scan::{Segment, Template};
use std::fmt;
use std::sync::Arc;

pub(crate) use literal::write_value;

/// Error recorded while building, reported by the terminal call.
#[derive(Debug, Clone)]
enum Deferred {
    Template(String),
    Valuer {
        message: String,
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl Deferred {
    fn to_error(&self) -> SqlError {
        match self {
            Deferred::Template(msg) => SqlError::not_valid(msg.clone()),
            Deferred::Valuer { message, source } => {
                SqlError::aborted(message.clone(), Box::new(source.clone()))
            }
        }
    }
}

/// A compiled template plus accumulated arguments.
///
/// The template is scanned once in [`Interpolate::new`]; [`Interpolate::reset`]
/// drops the arguments and keeps the compiled template.
#[derive(Debug, Clone)]
pub struct Interpolate {
    template: Template,
    args: Arguments,
    named: Vec<(String, Value)>,
    template_err: Option<Deferred>,
    arg_err: Option<Deferred>,
}

macro_rules! forward_args {
    ($( $name:ident($ty:ty) ),* $(,)?) => {
        $(
            pub fn $name(mut self, v: $ty) -> Self {
                self.args = std::mem::take(&mut self.args).$name(v);
                self
            }
        )*
    };
}

impl Interpolate {
    pub fn new(sql: impl AsRef<str>) -> Self {
        let (template, template_err) = match Template::compile(sql.as_ref()) {
            Ok(t) => (t, None),
            Err(SqlError::NotValid(msg)) => (Template::default(), Some(Deferred::Template(msg))),
            Err(e) => (Template::default(), Some(Deferred::Template(e.to_string()))),
        };
        Self {
            template,
            args: Arguments::new(),
            named: Vec::new(),
            template_err,
            arg_err: None,
        }
    }

    /// The template after bracket rewriting.
    pub fn template(&self) -> &str {
        &self.template.sql
    }

    /// Append all of `args`.
    pub fn arguments(mut self, args: Arguments) -> Self {
        self.args = std::mem::take(&mut self.args).extend(args);
        self
    }

    pub fn arg(mut self, arg: impl Into<Argument>) -> Self {
        self.args.push(arg);
        self
    }

    pub fn value(mut self, v: impl IntoValue) -> Self {
        self.args.push(Argument::new(v));
        self
    }

    pub fn null(mut self) -> Self {
        self.args.push(Argument::new(Value::Null));
        self
    }

    forward_args! {
        int64(i64),
        uint64(u64),
        float64(f64),
        bool(bool),
        str(&str),
        string(String),
        text(Vec<u8>),
        bytes(Vec<u8>),
        time(NaiveDateTime),
        null_string(Option<String>),
        null_int64(Option<i64>),
        null_float64(Option<f64>),
        null_bool(Option<bool>),
        null_time(Option<NaiveDateTime>),
    }

    pub fn int(self, v: impl Into<i64>) -> Self {
        self.int64(v.into())
    }

    pub fn int64s(self, v: impl IntoIterator<Item = i64>) -> Self {
        self.value(Value::Int64s(v.into_iter().collect()))
    }

    pub fn uint64s(self, v: impl IntoIterator<Item = u64>) -> Self {
        self.value(Value::Uint64s(v.into_iter().collect()))
    }

    pub fn float64s(self, v: impl IntoIterator<Item = f64>) -> Self {
        self.value(Value::Float64s(v.into_iter().collect()))
    }

    pub fn bools(self, v: impl IntoIterator<Item = bool>) -> Self {
        self.value(Value::Bools(v.into_iter().collect()))
    }

    pub fn strs<I>(self, v: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.value(Value::Strings(v.into_iter().map(Into::into).collect()))
    }

    pub fn texts(self, v: impl IntoIterator<Item = Vec<u8>>) -> Self {
        self.value(Value::Texts(v.into_iter().collect()))
    }

    pub fn bytes_list(self, v: impl IntoIterator<Item = Vec<u8>>) -> Self {
        self.value(Value::BytesList(v.into_iter().collect()))
    }

    pub fn times(self, v: impl IntoIterator<Item = NaiveDateTime>) -> Self {
        self.value(Value::Times(v.into_iter().collect()))
    }

    /// Append the value produced by `valuer`. A failure is reported by
    /// [`Interpolate::to_sql`].
    pub fn valuer(mut self, valuer: &dyn Valuer) -> Self {
        match Argument::from_valuer(valuer) {
            Ok(arg) => self.args.push(arg),
            Err(SqlError::Aborted {
                message,
                source: Some(source),
            }) if self.arg_err.is_none() => {
                self.arg_err = Some(Deferred::Valuer {
                    message,
                    source: Arc::from(source),
                });
            }
            Err(_) => {}
        }
        self
    }

    /// Bind a named parameter. `name` includes its prefix, e.g. `:ArgX`.
    pub fn named(mut self, name: impl Into<String>, value: impl IntoValue) -> Self {
        self.named.push((name.into(), value.into_value()));
        self
    }

    /// Drop accumulated arguments and bindings, keep the compiled template.
    pub fn reset(&mut self) -> &mut Self {
        self.args.reset();
        self.named.clear();
        self.arg_err = None;
        self
    }

    /// Produce the final SQL.
    pub fn to_sql(&self) -> SqlResult<String> {
        let mut buf = String::with_capacity(self.template.sql.len() + self.args.len() * 8);
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Append the final SQL to `buf`, which callers may reuse across builds.
    ///
    /// On error `buf` is restored to its previous length.
    pub fn write_to(&self, buf: &mut String) -> SqlResult<()> {
        if let Some(err) = self.template_err.as_ref().or(self.arg_err.as_ref()) {
            return Err(err.to_error());
        }
        let start = buf.len();
        let res = render(&self.template, self.args.as_slice(), &self.named, buf);
        if res.is_err() {
            buf.truncate(start);
        }
        res
    }
}

impl fmt::Display for Interpolate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_sql() {
            Ok(sql) => f.write_str(&sql),
            Err(e) => write!(f, "[dmlkit] interpolate error: {e}"),
        }
    }
}

/// Interpolate `sql` with `args` in one call.
pub fn interpolate(sql: &str, args: &Arguments) -> SqlResult<String> {
    let template = Template::compile(sql)?;
    let mut buf = String::with_capacity(template.sql.len() + args.len() * 8);
    render(&template, args.as_slice(), &[], &mut buf)?;
    Ok(buf)
}

fn imbalance(placeholders: usize, args: &[Argument]) -> SqlError {
    let units: usize = args.iter().map(Argument::len).sum();
    SqlError::not_valid(format!(
        "arguments are imbalanced: {placeholders} placeholder(s) but {units} argument(s)"
    ))
}

fn render(
    template: &Template,
    args: &[Argument],
    named: &[(String, Value)],
    buf: &mut String,
) -> SqlResult<()> {
    let mut arg_idx = 0;
    // Position inside a list argument consumed one element per placeholder.
    let mut elem_idx = 0;

    for segment in &template.segments {
        match segment {
            Segment::Text(range) => buf.push_str(template.text(range)),
            Segment::Named(range) => {
                let name = template.text(range);
                match named.iter().find(|(n, _)| n == name) {
                    Some((_, value)) => write_value(buf, value)?,
                    None => buf.push_str(name),
                }
            }
            Segment::Placeholder { paren } => {
                let Some(arg) = args.get(arg_idx) else {
                    return Err(imbalance(template.placeholders, args));
                };
                let value = &arg.value;
                if !value.is_list() {
                    write_value(buf, value)?;
                    arg_idx += 1;
                    continue;
                }
                if value.is_empty() {
                    return Err(SqlError::not_valid(format!(
                        "argument {} is an empty {} list",
                        arg_idx + 1,
                        value.kind_name()
                    )));
                }
                if *paren && elem_idx == 0 {
                    write_value(buf, value)?;
                    arg_idx += 1;
                } else {
                    literal::write_element(buf, value, elem_idx)?;
                    elem_idx += 1;
                    if elem_idx == value.len() {
                        elem_idx = 0;
                        arg_idx += 1;
                    }
                }
            }
        }
    }

    if arg_idx < args.len() || elem_idx != 0 {
        return Err(imbalance(template.placeholders, args));
    }
    Ok(())
}

/// Expand each `?` bound to a list into `?,?,…` and flatten the arguments,
/// for drivers that bind positional parameters themselves.
///
/// The number of `?` must equal the number of arguments, otherwise the result
/// is a `Mismatch` error.
pub fn repeat(sql: &str, args: &Arguments) -> SqlResult<(String, Vec<Value>)> {
    let template = Template::compile(sql)?;
    if template.placeholders != args.count() {
        return Err(SqlError::mismatch(format!(
            "{} placeholder(s) do not match {} argument(s) in {sql:?}",
            template.placeholders,
            args.count()
        )));
    }

    let mut out = String::with_capacity(template.sql.len() + args.len() * 2);
    let mut values = Vec::with_capacity(args.len());
    let mut it = args.iter();
    for segment in &template.segments {
        match segment {
            Segment::Text(range) | Segment::Named(range) => out.push_str(template.text(range)),
            Segment::Placeholder { .. } => {
                let Some(arg) = it.next() else { break };
                let n = arg.value.len();
                if arg.value.is_list() && n == 0 {
                    return Err(SqlError::not_valid(format!(
                        "empty {} list can not be repeated",
                        arg.value.kind_name()
                    )));
                }
                for i in 0..n {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push('?');
                }
                values.extend(arg.value.flatten());
            }
        }
    }
    Ok((out, values))
}
