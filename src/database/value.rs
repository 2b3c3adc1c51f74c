use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use base64::{Engine as _, engine::general_purpose};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Initial state of every hash fold (builder and nested arrays alike).
pub const HASH_SEED: u64 = 17;
/// Order-sensitive combining multiplier.
pub const HASH_MULTIPLIER: u64 = 37;
/// Hash contributed by `KeyValue::Null`. No non-null value hashes to this.
pub const NULL_HASH: u64 = 1;

/// One component of a composite cache key.
#[derive(Debug, Clone)]
pub enum KeyValue {
    Object(Vec<(String, KeyValue)>), // field order is significant, kept as read
    Array(Vec<KeyValue>),
    String(String),
    Bytes(Vec<u8>),
    Integer8(i8),
    Integer16(i16),
    Integer32(i32),
    Integer64(i64),
    Unsigned64(u64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    Uuid(Uuid),
    Date(time::Date),
    Time(time::Time),
    Timestamp(time::PrimitiveDateTime),
    TimestampTz(time::OffsetDateTime),
    Bool(bool),
    Null,
}

pub(crate) fn fold(hash: u64, component: u64) -> u64 {
    hash.wrapping_mul(HASH_MULTIPLIER).wrapping_add(component)
}

impl KeyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, KeyValue::Null)
    }


    /// Hash of this value as a key component.
    ///
    /// Arrays and objects fold their elements with the same seed and
    /// multiplier as the key builder, so two arrays hash alike exactly when
    /// their element sequences do. Scalars go through `DefaultHasher::new()`,
    /// whose keys are fixed, so hashes are stable across processes.
    pub fn component_hash(&self) -> u64 {
        let hash = match self {
            KeyValue::Null => return NULL_HASH,
            KeyValue::Array(items) => items
                .iter()
                .fold(HASH_SEED, |hash, item| fold(hash, item.component_hash())),
            KeyValue::Object(fields) => fields.iter().fold(HASH_SEED, |hash, (name, value)| {
                let hash = fold(hash, scalar_hash(0xff, name));
                fold(hash, value.component_hash())
            }),
            KeyValue::String(s) => scalar_hash(1, s),
            KeyValue::Bytes(b) => scalar_hash(2, b),
            KeyValue::Integer8(i) => scalar_hash(3, i),
            KeyValue::Integer16(i) => scalar_hash(4, i),
            KeyValue::Integer32(i) => scalar_hash(5, i),
            KeyValue::Integer64(i) => scalar_hash(6, i),
            KeyValue::Unsigned64(u) => scalar_hash(7, u),
            KeyValue::Float32(f) => scalar_hash(8, &f.to_bits()),
            KeyValue::Float64(f) => scalar_hash(9, &f.to_bits()),
            KeyValue::Decimal(d) => scalar_hash(10, d),
            KeyValue::Uuid(u) => scalar_hash(11, u),
            KeyValue::Date(d) => scalar_hash(12, d),
            KeyValue::Time(t) => scalar_hash(13, t),
            KeyValue::Timestamp(t) => scalar_hash(14, t),
            KeyValue::TimestampTz(t) => scalar_hash(15, t),
            KeyValue::Bool(b) => scalar_hash(16, b),
        };
        if hash == NULL_HASH {
            NULL_HASH.wrapping_add(1)
        } else {
            hash
        }
    }
}

fn scalar_hash<T: Hash + ?Sized>(tag: u8, value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    tag.hash(&mut hasher);
    value.hash(&mut hasher);
    hasher.finish()
}

// Floats compare by bit pattern so equality agrees with `component_hash`.
impl PartialEq for KeyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (KeyValue::Object(a), KeyValue::Object(b)) => a == b,
            (KeyValue::Array(a), KeyValue::Array(b)) => a == b,
            (KeyValue::String(a), KeyValue::String(b)) => a == b,
            (KeyValue::Bytes(a), KeyValue::Bytes(b)) => a == b,
            (KeyValue::Integer8(a), KeyValue::Integer8(b)) => a == b,
            (KeyValue::Integer16(a), KeyValue::Integer16(b)) => a == b,
            (KeyValue::Integer32(a), KeyValue::Integer32(b)) => a == b,
            (KeyValue::Integer64(a), KeyValue::Integer64(b)) => a == b,
            (KeyValue::Unsigned64(a), KeyValue::Unsigned64(b)) => a == b,
            (KeyValue::Float32(a), KeyValue::Float32(b)) => a.to_bits() == b.to_bits(),
            (KeyValue::Float64(a), KeyValue::Float64(b)) => a.to_bits() == b.to_bits(),
            (KeyValue::Decimal(a), KeyValue::Decimal(b)) => a == b,
            (KeyValue::Uuid(a), KeyValue::Uuid(b)) => a == b,
            (KeyValue::Date(a), KeyValue::Date(b)) => a == b,
            (KeyValue::Time(a), KeyValue::Time(b)) => a == b,
            (KeyValue::Timestamp(a), KeyValue::Timestamp(b)) => a == b,
            (KeyValue::TimestampTz(a), KeyValue::TimestampTz(b)) => a == b,
            (KeyValue::Bool(a), KeyValue::Bool(b)) => a == b,
            (KeyValue::Null, KeyValue::Null) => true,
            _ => false,
        }
    }
}

impl Eq for KeyValue {}

impl Hash for KeyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.component_hash());
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Object(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}={value}")?;
                }
                f.write_str("}")
            }
            KeyValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            KeyValue::String(s) => f.write_str(s),
            KeyValue::Bytes(b) => f.write_str(&general_purpose::STANDARD.encode(b)),
            KeyValue::Integer8(i) => write!(f, "{i}"),
            KeyValue::Integer16(i) => write!(f, "{i}"),
            KeyValue::Integer32(i) => write!(f, "{i}"),
            KeyValue::Integer64(i) => write!(f, "{i}"),
            KeyValue::Unsigned64(u) => write!(f, "{u}"),
            KeyValue::Float32(x) => write!(f, "{x}"),
            KeyValue::Float64(x) => write!(f, "{x}"),
            KeyValue::Decimal(d) => write!(f, "{d}"),
            KeyValue::Uuid(u) => write!(f, "{u}"),
            KeyValue::Date(d) => write!(f, "{d}"),
            KeyValue::Time(t) => write!(f, "{t}"),
            KeyValue::Timestamp(t) => write!(f, "{t}"),
            KeyValue::TimestampTz(t) => write!(f, "{t}"),
            KeyValue::Bool(b) => write!(f, "{b}"),
            KeyValue::Null => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_hash_is_the_sentinel() {
        assert_eq!(KeyValue::Null.component_hash(), NULL_HASH);
        assert_ne!(KeyValue::Integer64(0).component_hash(), NULL_HASH);
        assert_ne!(KeyValue::String(String::new()).component_hash(), NULL_HASH);
        assert_ne!(KeyValue::Array(vec![]).component_hash(), NULL_HASH);
    }

    #[test]
    fn arrays_compare_by_elements() {
        let a = KeyValue::Array(vec![KeyValue::Integer64(1), KeyValue::Integer64(2)]);
        let b = KeyValue::Array(vec![KeyValue::Integer64(1), KeyValue::Integer64(2)]);
        let reversed = KeyValue::Array(vec![KeyValue::Integer64(2), KeyValue::Integer64(1)]);
        assert_eq!(a, b);
        assert_eq!(a.component_hash(), b.component_hash());
        assert_ne!(a, reversed);
        assert_ne!(a.component_hash(), reversed.component_hash());
    }

    #[test]
    fn nested_arrays_differ_from_flat() {
        let flat = KeyValue::Array(vec![KeyValue::Integer64(1), KeyValue::Integer64(2)]);
        let nested = KeyValue::Array(vec![KeyValue::Array(vec![
            KeyValue::Integer64(1),
            KeyValue::Integer64(2),
        ])]);
        assert_ne!(flat, nested);
        assert_ne!(flat.component_hash(), nested.component_hash());
    }

    #[test]
    fn variants_do_not_compare_equal() {
        assert_ne!(KeyValue::Integer32(5), KeyValue::Integer64(5));
        assert_ne!(
            KeyValue::Integer32(5).component_hash(),
            KeyValue::Integer64(5).component_hash()
        );
        assert_ne!(KeyValue::String("null".into()), KeyValue::Null);
    }

    #[test]
    fn nan_is_equal_to_itself() {
        let nan = KeyValue::Float64(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_eq!(nan.component_hash(), nan.clone().component_hash());
    }

    #[test]
    fn display_renders_bytes_as_base64() {
        assert_eq!(KeyValue::Bytes(b"hi".to_vec()).to_string(), "aGk=");
        let arr = KeyValue::Array(vec![KeyValue::Integer64(1), KeyValue::Null]);
        assert_eq!(arr.to_string(), "[1, null]");
    }
}
