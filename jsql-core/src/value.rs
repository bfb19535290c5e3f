use crate::{Error, Result};
use rust_decimal::Decimal;
use serde_json::Number;
use std::mem;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed value used for both query parameters and result cells.
///
/// Every typed variant wraps an `Option`: `None` is a NULL that still carries its
/// type, which drivers use when binding parameters. `Value::Null` is the untyped
/// NULL, bound for arguments that were not supplied.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
    /// Textual representation of a value whose type the driver does not recognize.
    Unknown(Option<String>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::UInt8(v) => v.is_none(),
            Value::UInt16(v) => v.is_none(),
            Value::UInt32(v) => v.is_none(),
            Value::UInt64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::TimestampWithTimezone(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
            Value::Unknown(v) => v.is_none(),
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    /// Text normalization applied to every row before it is emitted.
    ///
    /// Byte strings become text: the output formats do not distinguish binary
    /// payloads from strings. Invalid UTF-8 sequences are replaced.
    pub fn normalized(self) -> Value {
        match self {
            Value::Blob(v) => Value::Varchar(v.map(|v| String::from_utf8_lossy(&v).into_owned())),
            v => v,
        }
    }

    /// JSON representation of the value.
    ///
    /// Numbers stay numbers, decimals and temporal values are rendered as strings,
    /// byte strings follow [`Value::normalized`]. Non finite floats cannot be
    /// represented and produce an error.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        use serde_json::Value as Json;
        fn float(v: f64) -> Result<Json> {
            Number::from_f64(v).map(Json::Number).ok_or_else(|| {
                Error::msg(format!("Cannot represent the floating point value {v} in JSON"))
            })
        }
        fn text(v: &Option<impl ToString>) -> Json {
            v.as_ref()
                .map(|v| Json::String(v.to_string()))
                .unwrap_or(Json::Null)
        }
        Ok(match self {
            Value::Null => Json::Null,
            Value::Boolean(v) => v.map(Json::Bool).unwrap_or(Json::Null),
            Value::Int8(v) => v.map(Json::from).unwrap_or(Json::Null),
            Value::Int16(v) => v.map(Json::from).unwrap_or(Json::Null),
            Value::Int32(v) => v.map(Json::from).unwrap_or(Json::Null),
            Value::Int64(v) => v.map(Json::from).unwrap_or(Json::Null),
            Value::UInt8(v) => v.map(Json::from).unwrap_or(Json::Null),
            Value::UInt16(v) => v.map(Json::from).unwrap_or(Json::Null),
            Value::UInt32(v) => v.map(Json::from).unwrap_or(Json::Null),
            Value::UInt64(v) => v.map(Json::from).unwrap_or(Json::Null),
            Value::Float32(Some(v)) => float(*v as f64)?,
            Value::Float64(Some(v)) => float(*v)?,
            Value::Float32(None) | Value::Float64(None) => Json::Null,
            Value::Decimal(v) => text(v),
            Value::Varchar(v) | Value::Unknown(v) => text(v),
            Value::Blob(..) => return self.clone().normalized().to_json(),
            Value::Date(v) => text(v),
            Value::Time(v) => text(v),
            Value::Timestamp(v) => text(v),
            Value::TimestampWithTimezone(v) => text(v),
            Value::Uuid(v) => text(v),
        })
    }

    /// Argument value decoded from a JSON document.
    ///
    /// Integers that fit `i64` become `Int64`, larger ones `UInt64`, other numbers
    /// `Float64`. Arrays and objects are passed as their JSON text.
    pub fn from_json(value: serde_json::Value) -> Value {
        use serde_json::Value as Json;
        match value {
            Json::Null => Value::Null,
            Json::Bool(v) => Value::Boolean(Some(v)),
            Json::Number(v) => {
                if let Some(v) = v.as_i64() {
                    Value::Int64(Some(v))
                } else if let Some(v) = v.as_u64() {
                    Value::UInt64(Some(v))
                } else {
                    Value::Float64(v.as_f64())
                }
            }
            Json::String(v) => Value::Varchar(Some(v)),
            v @ (Json::Array(..) | Json::Object(..)) => Value::Varchar(Some(v.to_string())),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::from_json(value)
    }
}
