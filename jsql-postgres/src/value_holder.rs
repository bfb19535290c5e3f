use bytes::BytesMut;
use jsql_core::Value;
use postgres_types::{FromSql, IsNull, ToSql, Type, to_sql_checked};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::error::Error;

type BoxError = Box<dyn Error + Sync + Send>;

/// Bridge between [`Value`] and the postgres binary protocol.
///
/// Decoding picks the variant from the column type (see [`postgres_type_to_value`]),
/// encoding writes the value as is: arguments are expected to be coerced to the
/// parameter type beforehand.
#[derive(Debug)]
pub struct ValueHolder(pub Value);

impl From<Value> for ValueHolder {
    fn from(value: Value) -> Self {
        ValueHolder(value)
    }
}

impl From<ValueHolder> for Value {
    fn from(value: ValueHolder) -> Self {
        value.0
    }
}

fn read<'a, T: FromSql<'a>>(ty: &Type, raw: Option<&'a [u8]>) -> Result<Option<T>, BoxError> {
    raw.map(|raw| T::from_sql(ty, raw)).transpose()
}

fn decode(ty: &Type, raw: Option<&[u8]>) -> Result<Value, BoxError> {
    Ok(match postgres_type_to_value(ty) {
        Value::Boolean(..) => Value::Boolean(read(ty, raw)?),
        Value::Int8(..) => Value::Int8(read(ty, raw)?),
        Value::Int16(..) => Value::Int16(read(ty, raw)?),
        Value::Int32(..) => Value::Int32(read(ty, raw)?),
        Value::Int64(..) => Value::Int64(read(ty, raw)?),
        Value::UInt32(..) => Value::UInt32(read(ty, raw)?),
        Value::Float32(..) => Value::Float32(read(ty, raw)?),
        Value::Float64(..) => Value::Float64(read(ty, raw)?),
        Value::Decimal(..) => Value::Decimal(read(ty, raw)?),
        Value::Varchar(..) => Value::Varchar(read(ty, raw)?),
        Value::Unknown(..) => Value::Unknown(read(ty, raw)?),
        Value::Blob(..) => Value::Blob(read::<Vec<u8>>(ty, raw)?.map(Vec::into_boxed_slice)),
        Value::Date(..) => Value::Date(read(ty, raw)?),
        Value::Time(..) => Value::Time(read(ty, raw)?),
        Value::Timestamp(..) => Value::Timestamp(read(ty, raw)?),
        Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(read(ty, raw)?),
        Value::Uuid(..) => Value::Uuid(read(ty, raw)?),
        _ => match raw {
            None => Value::Null,
            Some(raw) => {
                return Err(jsql_core::Error::msg(format!(
                    "Cannot decode sql type: `{}`, value: `{}`",
                    ty,
                    String::from_utf8_lossy(raw)
                ))
                .into());
            }
        },
    })
}

impl<'a> FromSql<'a> for ValueHolder {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        decode(ty, Some(raw)).map(ValueHolder)
    }
    fn from_sql_null(ty: &Type) -> Result<Self, BoxError> {
        decode(ty, None).map(ValueHolder)
    }
    fn accepts(_ty: &Type) -> bool {
        true
    }
}

impl ToSql for ValueHolder {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError>
    where
        Self: Sized,
    {
        match &self.0 {
            Value::Null => Ok(IsNull::Yes),
            Value::Boolean(v) => v.to_sql(ty, out),
            Value::Int8(v) => v.to_sql(ty, out),
            Value::Int16(v) => v.to_sql(ty, out),
            Value::Int32(v) => v.to_sql(ty, out),
            Value::Int64(v) => v.to_sql(ty, out),
            // Postgres has no unsigned types, widen to the next signed one
            Value::UInt8(v) => v.map(i16::from).to_sql(ty, out),
            Value::UInt16(v) => v.map(i32::from).to_sql(ty, out),
            Value::UInt32(v) => v.to_sql(ty, out),
            Value::UInt64(v) => v.and_then(Decimal::from_u64).to_sql(ty, out),
            Value::Float32(v) => v.to_sql(ty, out),
            Value::Float64(v) => v.to_sql(ty, out),
            Value::Decimal(v) => v.to_sql(ty, out),
            Value::Varchar(v) | Value::Unknown(v) => v.to_sql(ty, out),
            Value::Blob(v) => v.as_deref().to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Time(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql(ty, out),
            Value::TimestampWithTimezone(v) => v.to_sql(ty, out),
            Value::Uuid(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool
    where
        Self: Sized,
    {
        true
    }

    to_sql_checked!();
}

/// NULL value of the variant a postgres type decodes to, `Value::Null` when the type is not supported.
///
/// Also the target of argument coercion for statement parameters.
pub fn postgres_type_to_value(ty: &Type) -> Value {
    match *ty {
        Type::BOOL => Value::Boolean(None),
        Type::CHAR => Value::Int8(None),
        Type::INT2 => Value::Int16(None),
        Type::INT4 => Value::Int32(None),
        Type::INT8 => Value::Int64(None),
        Type::OID => Value::UInt32(None),
        Type::FLOAT4 => Value::Float32(None),
        Type::FLOAT8 => Value::Float64(None),
        Type::NUMERIC => Value::Decimal(None),
        Type::VARCHAR | Type::TEXT | Type::NAME | Type::BPCHAR | Type::JSON | Type::XML => {
            Value::Varchar(None)
        }
        Type::UNKNOWN => Value::Unknown(None),
        Type::BYTEA => Value::Blob(None),
        Type::DATE => Value::Date(None),
        Type::TIME => Value::Time(None),
        Type::TIMESTAMP => Value::Timestamp(None),
        Type::TIMESTAMPTZ => Value::TimestampWithTimezone(None),
        Type::UUID => Value::Uuid(None),
        _ => Value::Null,
    }
}
