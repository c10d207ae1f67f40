use super::{Argument, Arguments, Value};
use crate::error::{BoxError, SqlError, SqlResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use std::any::Any;
use std::sync::Arc;

/// Types that convert into a [`Value`] without failure.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// A user type that produces its own storable value.
///
/// A failing valuer surfaces as an `Aborted` error carrying the original cause.
pub trait Valuer: Send + Sync {
    fn value(&self) -> Result<Value, BoxError>;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

macro_rules! into_value {
    ($variant:ident: $($ty:ty),*) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::$variant(self.into())
                }
            }
        )*
    };
}

into_value!(Int64: i8, i16, i32, i64, u8, u16, u32);
into_value!(Uint64: u64);
into_value!(Float64: f32, f64);
into_value!(Bool: bool);
into_value!(String: String, &str, &String);
into_value!(Bytes: Vec<u8>, &[u8]);
into_value!(Time: NaiveDateTime);
into_value!(Int64s: Vec<i64>);
into_value!(Uint64s: Vec<u64>);
into_value!(Float64s: Vec<f64>);
into_value!(Bools: Vec<bool>);
into_value!(Strings: Vec<String>);
into_value!(Times: Vec<NaiveDateTime>);

macro_rules! into_list_value {
    ($variant:ident<$target:ty>: $($ty:ty),*) => {
        $(
            impl IntoValue for Vec<$ty> {
                fn into_value(self) -> Value {
                    Value::$variant(self.into_iter().map(<$target>::from).collect())
                }
            }
        )*
    };
}

into_list_value!(Int64s<i64>: i8, i16, i32);
into_list_value!(Uint64s<u64>: u16, u32);
into_list_value!(Float64s<f64>: f32);

impl IntoValue for isize {
    fn into_value(self) -> Value {
        Value::Int64(self as i64)
    }
}

impl IntoValue for usize {
    fn into_value(self) -> Value {
        Value::Uint64(self as u64)
    }
}

impl IntoValue for Vec<&str> {
    fn into_value(self) -> Value {
        Value::Strings(self.into_iter().map(str::to_owned).collect())
    }
}

impl IntoValue for DateTime<Utc> {
    fn into_value(self) -> Value {
        Value::Time(self.naive_utc())
    }
}

impl IntoValue for DateTime<FixedOffset> {
    fn into_value(self) -> Value {
        Value::Time(self.naive_local())
    }
}

impl IntoValue for NaiveDate {
    fn into_value(self) -> Value {
        Value::Time(self.and_time(chrono::NaiveTime::MIN))
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl Argument {
    /// Convert the result of a [`Valuer`]. A failing valuer becomes `Aborted`.
    pub fn from_valuer(valuer: &dyn Valuer) -> SqlResult<Argument> {
        valuer
            .value()
            .map(Argument::new)
            .map_err(|e| SqlError::aborted(format!("valuer failed: {e}"), e))
    }

    /// Convert an untyped value.
    ///
    /// Integers of every width, floats, `bool`, strings, byte vectors, chrono
    /// timestamps, `Option`s of those, `()`, [`Value`] and `Arc<dyn Valuer>`
    /// are accepted. Anything else is `NotSupported`.
    pub fn from_any(v: &dyn Any) -> SqlResult<Argument> {
        macro_rules! try_types {
            ($($ty:ty),*) => {
                $(
                    if let Some(v) = v.downcast_ref::<$ty>() {
                        return Ok(Argument::new(v.clone()));
                    }
                    if let Some(v) = v.downcast_ref::<Option<$ty>>() {
                        return Ok(Argument::new(v.clone()));
                    }
                )*
            };
        }

        try_types!(
            i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, String,
            &'static str, Vec<u8>, NaiveDateTime, NaiveDate, DateTime<Utc>,
            DateTime<FixedOffset>, Vec<i64>, Vec<u64>, Vec<f64>, Vec<bool>, Vec<String>,
            Vec<NaiveDateTime>
        );

        if v.downcast_ref::<()>().is_some() {
            return Ok(Argument::new(Value::Null));
        }
        if let Some(v) = v.downcast_ref::<Value>() {
            return Ok(Argument::new(v.clone()));
        }
        if let Some(v) = v.downcast_ref::<Argument>() {
            return Ok(v.clone());
        }
        if let Some(v) = v.downcast_ref::<Arc<dyn Valuer>>() {
            return Argument::from_valuer(v.as_ref());
        }

        Err(SqlError::not_supported(format!(
            "cannot convert value of type {:?} into an argument",
            v.type_id()
        )))
    }
}

impl Arguments {
    /// Convert a list of untyped values, see [`Argument::from_any`].
    pub fn from_any(values: &[&dyn Any]) -> SqlResult<Arguments> {
        values.iter().map(|v| Argument::from_any(*v)).collect()
    }

    /// Append the value produced by `valuer`.
    pub fn valuer(self, valuer: &dyn Valuer) -> SqlResult<Self> {
        Ok(self.arg(Argument::from_valuer(valuer)?))
    }
}
