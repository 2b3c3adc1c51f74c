use crate::database::value::KeyValue;
use rust_decimal::Decimal;
use uuid::Uuid;

///
/// Numbers keep the narrowest lossless representation serde_json reports:
/// `i64` first, then `u64`, then `f64`.
pub fn json_to_key_value(value: &serde_json::Value) -> KeyValue {
    match value {
        serde_json::Value::Null => KeyValue::Null,
        serde_json::Value::Bool(b) => KeyValue::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                KeyValue::Integer64(i)
            } else if let Some(u) = n.as_u64() {
                KeyValue::Unsigned64(u)
            } else {
                // as_f64 only fails for arbitrary-precision numbers, which we don't enable
                n.as_f64().map_or(KeyValue::Null, KeyValue::Float64)
            }
        }
        serde_json::Value::String(s) => KeyValue::String(s.clone()),
        serde_json::Value::Array(items) => {
            KeyValue::Array(items.iter().map(json_to_key_value).collect())
        }
        serde_json::Value::Object(map) => KeyValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_key_value(v)))
                .collect(),
        ),
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for KeyValue {
                fn from(value: $ty) -> Self {
                    KeyValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i8 => Integer8,
    i16 => Integer16,
    i32 => Integer32,
    i64 => Integer64,
    u64 => Unsigned64,
    f32 => Float32,
    f64 => Float64,
    String => String,
    Vec<u8> => Bytes,
    Decimal => Decimal,
    Uuid => Uuid,
    time::Date => Date,
    time::Time => Time,
    time::PrimitiveDateTime => Timestamp,
    time::OffsetDateTime => TimestampTz,
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::String(value.to_string())
    }
}

impl From<&[u8]> for KeyValue {
    fn from(value: &[u8]) -> Self {
        KeyValue::Bytes(value.to_vec())
    }
}

impl From<&serde_json::Value> for KeyValue {
    fn from(value: &serde_json::Value) -> Self {
        json_to_key_value(value)
    }
}

impl From<serde_json::Value> for KeyValue {
    fn from(value: serde_json::Value) -> Self {
        json_to_key_value(&value)
    }
}

impl<T: Into<KeyValue>> From<Option<T>> for KeyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(KeyValue::Null, Into::into)
    }
}
