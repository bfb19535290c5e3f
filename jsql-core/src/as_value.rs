use crate::{Context, Error, Result, Value, truncate_long};
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use std::{any, borrow::Cow, str::FromStr};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::well_known::Rfc3339,
    macros::format_description,
};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// Arguments are converted into values with `as_value`, drivers convert values
/// back into the type a statement parameter expects with `try_from_value`.
///
/// # Conversion contract
/// - The canonical variant of the type is always accepted.
/// - Other numeric variants are accepted when the value fits, range checked.
/// - Textual variants (`Varchar`, `Unknown`) are parsed, because arguments
///   extracted from a request (path, query string, form) are always text.
///
/// ```rust
/// use jsql_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert_eq!(v, Value::Int32(Some(42)));
/// assert_eq!(i64::try_from_value(Value::Varchar(Some("42".into()))).unwrap(), 42);
/// ```
pub trait AsValue {
    /// NULL value of the variant used for this type.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

fn mismatch<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {:?} to {}",
        value,
        any::type_name::<T>()
    ))
}

fn parse<T>(value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse::<T>().with_context(|| {
        format!(
            "Cannot parse `{}` as {}",
            truncate_long!(value),
            any::type_name::<T>()
        )
    })
}

macro_rules! impl_as_value_integer {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                macro_rules! narrow {
                    ($v:expr) => {
                        <$source>::try_from($v).map_err(|_| {
                            Error::msg(format!(
                                "Value {} is out of range for {}",
                                $v,
                                any::type_name::<Self>(),
                            ))
                        })
                    };
                }
                match value {
                    Value::Int8(Some(v)) => narrow!(v),
                    Value::Int16(Some(v)) => narrow!(v),
                    Value::Int32(Some(v)) => narrow!(v),
                    Value::Int64(Some(v)) => narrow!(v),
                    Value::UInt8(Some(v)) => narrow!(v),
                    Value::UInt16(Some(v)) => narrow!(v),
                    Value::UInt32(Some(v)) => narrow!(v),
                    Value::UInt64(Some(v)) => narrow!(v),
                    Value::Boolean(Some(v)) => Ok(v as _),
                    Value::Decimal(Some(v)) if v.fract().is_zero() => v
                        .to_i128()
                        .and_then(|v| <$source>::try_from(v).ok())
                        .ok_or_else(|| {
                            Error::msg(format!(
                                "Value {} is out of range for {}",
                                v,
                                any::type_name::<Self>(),
                            ))
                        }),
                    Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => parse(v),
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}
impl_as_value_integer!(i8, Value::Int8);
impl_as_value_integer!(i16, Value::Int16);
impl_as_value_integer!(i32, Value::Int32);
impl_as_value_integer!(i64, Value::Int64);
impl_as_value_integer!(u8, Value::UInt8);
impl_as_value_integer!(u16, Value::UInt16);
impl_as_value_integer!(u32, Value::UInt32);
impl_as_value_integer!(u64, Value::UInt64);

macro_rules! impl_as_value_float {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Float32(Some(v)) => Ok(v as _),
                    Value::Float64(Some(v)) => Ok(v as _),
                    Value::Int8(Some(v)) => Ok(v as _),
                    Value::Int16(Some(v)) => Ok(v as _),
                    Value::Int32(Some(v)) => Ok(v as _),
                    Value::Int64(Some(v)) => Ok(v as _),
                    Value::UInt8(Some(v)) => Ok(v as _),
                    Value::UInt16(Some(v)) => Ok(v as _),
                    Value::UInt32(Some(v)) => Ok(v as _),
                    Value::UInt64(Some(v)) => Ok(v as _),
                    Value::Decimal(Some(v)) => v.to_f64().map(|v| v as _).ok_or_else(|| {
                        Error::msg(format!(
                            "Cannot convert the Decimal value `{}` to {}",
                            v,
                            any::type_name::<Self>()
                        ))
                    }),
                    Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => parse(v),
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}
impl_as_value_float!(f32, Value::Float32);
impl_as_value_float!(f64, Value::Float64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Int8(Some(v)) => Ok(v != 0),
            Value::Int16(Some(v)) => Ok(v != 0),
            Value::Int32(Some(v)) => Ok(v != 0),
            Value::Int64(Some(v)) => Ok(v != 0),
            Value::UInt8(Some(v)) => Ok(v != 0),
            Value::UInt16(Some(v)) => Ok(v != 0),
            Value::UInt32(Some(v)) => Ok(v != 0),
            Value::UInt64(Some(v)) => Ok(v != 0),
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                match v.trim().to_ascii_lowercase().as_str() {
                    "true" | "t" | "1" => Ok(true),
                    "false" | "f" | "0" => Ok(false),
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let result = match value {
            Value::Decimal(Some(v)) => Some(v),
            Value::Int8(Some(v)) => Decimal::from_i8(v),
            Value::Int16(Some(v)) => Decimal::from_i16(v),
            Value::Int32(Some(v)) => Decimal::from_i32(v),
            Value::Int64(Some(v)) => Decimal::from_i64(v),
            Value::UInt8(Some(v)) => Decimal::from_u8(v),
            Value::UInt16(Some(v)) => Decimal::from_u16(v),
            Value::UInt32(Some(v)) => Decimal::from_u32(v),
            Value::UInt64(Some(v)) => Decimal::from_u64(v),
            Value::Float32(Some(v)) => Decimal::from_f32(v),
            Value::Float64(Some(v)) => Decimal::from_f64(v),
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => return parse(v),
            _ => None,
        };
        result.ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => Ok(v),
            Value::Blob(Some(v)) => String::from_utf8(v.into_vec())
                .context("Cannot convert a blob containing invalid UTF-8 to String"),
            v if v.is_null() => Err(mismatch::<Self>(&v)),
            v => match v.to_json()? {
                serde_json::Value::String(v) => Ok(v),
                json => Ok(json.to_string()),
            },
        }
    }
}

impl AsValue for &str {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Err(mismatch::<Self>(&value))
    }
}

impl AsValue for Cow<'_, str> {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into_owned()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        String::try_from_value(value).map(Cow::Owned)
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => Ok(v.into_bytes().into()),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Box::<[u8]>::try_from_value(value).map(Into::into)
    }
}

macro_rules! impl_as_value_parsed {
    ($source:ty, $destination:path, $parse:expr) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                        let parse: fn(&str) -> Option<Self> = $parse;
                        parse(v.trim()).ok_or_else(|| {
                            Error::msg(format!(
                                "Cannot parse `{}` as {}",
                                truncate_long!(v),
                                any::type_name::<Self>()
                            ))
                        })
                    }
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}
impl_as_value_parsed!(Date, Value::Date, |v| {
    Date::parse(v, format_description!("[year]-[month]-[day]")).ok()
});
impl_as_value_parsed!(Time, Value::Time, |v| {
    Time::parse(v, format_description!("[hour]:[minute]:[second].[subsecond]"))
        .or_else(|_| Time::parse(v, format_description!("[hour]:[minute]:[second]")))
        .or_else(|_| Time::parse(v, format_description!("[hour]:[minute]")))
        .ok()
});
impl_as_value_parsed!(PrimitiveDateTime, Value::Timestamp, |v| {
    PrimitiveDateTime::parse(
        v,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            v,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            v,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            v,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .ok()
});
impl_as_value_parsed!(OffsetDateTime, Value::TimestampWithTimezone, |v| {
    OffsetDateTime::parse(v, &Rfc3339).ok()
});
impl_as_value_parsed!(Uuid, Value::Uuid, |v| Uuid::parse_str(v).ok());

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}

impl AsValue for Value {
    fn as_empty_value() -> Value {
        Value::Null
    }
    fn as_value(self) -> Value {
        self
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl AsValue for serde_json::Value {
    fn as_empty_value() -> Value {
        Value::Null
    }
    fn as_value(self) -> Value {
        Value::from_json(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        value.to_json()
    }
}

impl Value {
    /// Converts this value into the variant of `target`, keeping NULL as a NULL of
    /// that variant. A `Value::Null` target means "any type" and returns the value as is.
    ///
    /// Drivers use it to coerce arguments to the parameter types of a statement.
    pub fn try_as(self, target: &Value) -> Result<Value> {
        macro_rules! convert {
            ($ty:ty) => {
                <Option<$ty>>::try_from_value(self).map(AsValue::as_value)
            };
        }
        if self.same_type(target) {
            return Ok(self);
        }
        match target {
            Value::Null => Ok(self),
            Value::Boolean(..) => convert!(bool),
            Value::Int8(..) => convert!(i8),
            Value::Int16(..) => convert!(i16),
            Value::Int32(..) => convert!(i32),
            Value::Int64(..) => convert!(i64),
            Value::UInt8(..) => convert!(u8),
            Value::UInt16(..) => convert!(u16),
            Value::UInt32(..) => convert!(u32),
            Value::UInt64(..) => convert!(u64),
            Value::Float32(..) => convert!(f32),
            Value::Float64(..) => convert!(f64),
            Value::Decimal(..) => convert!(Decimal),
            Value::Varchar(..) => convert!(String),
            Value::Blob(..) => convert!(Box<[u8]>),
            Value::Date(..) => convert!(Date),
            Value::Time(..) => convert!(Time),
            Value::Timestamp(..) => convert!(PrimitiveDateTime),
            Value::TimestampWithTimezone(..) => convert!(OffsetDateTime),
            Value::Uuid(..) => convert!(Uuid),
            Value::Unknown(..) => {
                <Option<String>>::try_from_value(self).map(|v| Value::Unknown(v))
            }
        }
    }
}
