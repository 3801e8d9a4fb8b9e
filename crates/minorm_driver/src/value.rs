//! Column and parameter values.

use crate::error::{DriverError, DriverResult};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Text layout used when a date travels as text.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text layout used when a date-time travels as text.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A single SQL value, either bound as a parameter or read from a row.
///
/// Drivers may hand back a narrower set than they accept: SQLite, for
/// example, only ever returns `Null`, `Integer`, `Real`, `Text` and `Blob`.
/// [`FromValue`] coerces those storage classes into the richer types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// A signed 64-bit integer.
    Integer(i64),
    /// A double-precision float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// A boolean.
    Boolean(bool),
    /// A calendar date.
    Date(NaiveDate),
    /// A local date and time.
    DateTime(NaiveDateTime),
    /// A fixed-point decimal.
    Decimal(Decimal),
    /// A UUID.
    Uuid(Uuid),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns true for SQL `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the name of this value's kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Decimal(_) => "decimal",
            Self::Uuid(_) => "uuid",
            Self::Blob(_) => "blob",
        }
    }

    /// Converts this value into `T`.
    pub fn decode<T: FromValue>(self) -> DriverResult<T> {
        T::from_value(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
            Self::DateTime(v) => write!(f, "{}", v.format(DATETIME_FORMAT)),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Uuid(v) => write!(f, "{v}"),
            Self::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

/// Conversion from a [`Value`] into a Rust type.
///
/// Implementations widen and parse where the storage class differs from
/// the declared type: integers widen to `i64`, text parses into dates,
/// date-times, decimals and UUIDs, and integers `0`/`1` become booleans.
pub trait FromValue: Sized {
    /// Converts `value` into `Self`.
    fn from_value(value: Value) -> DriverResult<Self>;
}

fn mismatch(expected: &'static str, value: &Value) -> DriverError {
    DriverError::conversion(expected, format!("{} value {value}", value.kind()))
}

impl FromValue for Value {
    fn from_value(value: Value) -> DriverResult<Self> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> DriverResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> DriverResult<Self> {
        match value {
            Value::Integer(v) => Ok(v),
            Value::Boolean(v) => Ok(i64::from(v)),
            Value::Real(v) if v.fract() == 0.0 => Ok(v as i64),
            Value::Text(ref s) => s.trim().parse().map_err(|_| mismatch("i64", &value)),
            other => Err(mismatch("i64", &other)),
        }
    }
}

macro_rules! narrow_integer {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> DriverResult<Self> {
                    let wide = i64::from_value(value)?;
                    <$ty>::try_from(wide).map_err(|_| {
                        DriverError::conversion(stringify!($ty), format!("out of range integer {wide}"))
                    })
                }
            }
        )*
    };
}

narrow_integer!(i8, i16, i32, u8, u16, u32);

impl FromValue for f64 {
    fn from_value(value: Value) -> DriverResult<Self> {
        match value {
            Value::Real(v) => Ok(v),
            Value::Integer(v) => Ok(v as f64),
            Value::Text(ref s) => s.trim().parse().map_err(|_| mismatch("f64", &value)),
            other => Err(mismatch("f64", &other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> DriverResult<Self> {
        match value {
            Value::Boolean(v) => Ok(v),
            Value::Integer(v) => Ok(v != 0),
            Value::Text(ref s) => match s.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(mismatch("bool", &value)),
            },
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> DriverResult<Self> {
        match value {
            Value::Text(v) => Ok(v),
            Value::Null | Value::Blob(_) => Err(mismatch("String", &value)),
            other => Ok(match other {
                Value::Date(d) => d.format(DATE_FORMAT).to_string(),
                Value::DateTime(d) => d.format(DATETIME_FORMAT).to_string(),
                v => v.to_string(),
            }),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> DriverResult<Self> {
        match value {
            Value::Date(v) => Ok(v),
            Value::DateTime(v) => Ok(v.date()),
            Value::Text(ref s) => {
                NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| mismatch("NaiveDate", &value))
            }
            other => Err(mismatch("NaiveDate", &other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> DriverResult<Self> {
        match value {
            Value::DateTime(v) => Ok(v),
            Value::Text(ref s) => NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
                .map_err(|_| mismatch("NaiveDateTime", &value)),
            other => Err(mismatch("NaiveDateTime", &other)),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value) -> DriverResult<Self> {
        match value {
            Value::Decimal(v) => Ok(v),
            Value::Integer(v) => Ok(Decimal::from(v)),
            // NUMERIC affinity may have stored decimal text as a float.
            Value::Real(v) => Decimal::from_str(&v.to_string())
                .or_else(|_| Decimal::try_from(v))
                .map_err(|_| mismatch("Decimal", &value)),
            Value::Text(ref s) => Decimal::from_str(s.trim()).map_err(|_| mismatch("Decimal", &value)),
            other => Err(mismatch("Decimal", &other)),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> DriverResult<Self> {
        match value {
            Value::Uuid(v) => Ok(v),
            Value::Text(ref s) => Uuid::parse_str(s).map_err(|_| mismatch("Uuid", &value)),
            Value::Blob(ref b) => Uuid::from_slice(b).map_err(|_| mismatch("Uuid", &value)),
            other => Err(mismatch("Uuid", &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> DriverResult<Self> {
        match value {
            Value::Blob(v) => Ok(v),
            Value::Text(v) => Ok(v.into_bytes()),
            other => Err(mismatch("Vec<u8>", &other)),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v $(as $cast)?)
                }
            }
        )*
    };
}

value_from! {
    i64 => Integer,
    i32 => Integer as i64,
    i16 => Integer as i64,
    i8 => Integer as i64,
    u32 => Integer as i64,
    u16 => Integer as i64,
    u8 => Integer as i64,
    f64 => Real,
    bool => Boolean,
    String => Text,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    Decimal => Decimal,
    Uuid => Uuid,
    Vec<u8> => Blob,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
