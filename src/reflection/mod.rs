//! Property access over parameter objects whose shape is only known at runtime.
//!
//! A mapped property name is a path such as `id`, `user.address.city` or
//! `orders[0].total`. Paths are parsed once into a [`PropertyPath`] and then
//! resolved against any [`PropertyAccessor`]: JSON values, [`KeyValue`]
//! objects, string-keyed maps, or any `Serialize` struct wrapped in
//! [`Structured`].

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::database::conversion::json_to_key_value;
use crate::database::value::KeyValue;
use crate::error::PropertyError;

pub mod registry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    /// Bracketed suffix: an array position or a map key.
    pub index: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    raw: String,
    segments: Vec<Segment>,
}

impl PropertyPath {
    pub fn parse(raw: &str) -> Result<Self, PropertyError> {
        let invalid = |reason| PropertyError::InvalidPath {
            path: raw.to_string(),
            reason,
        };
        if raw.is_empty() {
            return Err(invalid("empty path"));
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            let (name, index) = match part.find('[') {
                Some(open) => {
                    let Some(inner) = part[open + 1..].strip_suffix(']') else {
                        return Err(invalid("unclosed or trailing text after '['"));
                    };
                    if inner.is_empty() || inner.contains(['[', ']']) {
                        return Err(invalid("bad index"));
                    }
                    (&part[..open], Some(inner.to_string()))
                }
                None if part.contains(']') => return Err(invalid("unmatched ']'")),
                None => (part, None),
            };
            if name.is_empty() {
                return Err(invalid("empty segment"));
            }
            segments.push(Segment {
                name: name.to_string(),
                index,
            });
        }
        Ok(PropertyPath {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn root(&self) -> &str {
        // parse() never yields an empty segment list
        self.segments.first().map_or("", |s| s.name.as_str())
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Reads named properties off a value without static knowledge of its type.
///
/// A well-formed value that lacks the property answers `false` from
/// `has_property`; it never errors for that.
pub trait PropertyAccessor {
    fn has_property(&self, path: &PropertyPath) -> bool;
    fn get_property(&self, path: &PropertyPath) -> Result<KeyValue, PropertyError>;
}

#[derive(Debug, Clone, Copy)]
pub struct ParameterType {
    id: TypeId,
    name: &'static str,
}

impl ParameterType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        ParameterType {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ParameterType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ParameterType {}

impl Hash for ParameterType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

pub trait Parameter: PropertyAccessor + Send + Sync {
    /// Type used for the directly-keyable check. Dynamic values report the
    /// type of the scalar they currently hold.
    fn parameter_type(&self) -> ParameterType;

    fn to_key_value(&self) -> KeyValue;
}

/// Native type a scalar key value stands for; `None` for arrays and objects.
fn scalar_type(value: &KeyValue) -> Option<ParameterType> {
    Some(match value {
        KeyValue::Object(_) | KeyValue::Array(_) => return None,
        KeyValue::String(_) => ParameterType::of::<String>(),
        KeyValue::Bytes(_) => ParameterType::of::<Vec<u8>>(),
        KeyValue::Integer8(_) => ParameterType::of::<i8>(),
        KeyValue::Integer16(_) => ParameterType::of::<i16>(),
        KeyValue::Integer32(_) => ParameterType::of::<i32>(),
        KeyValue::Integer64(_) => ParameterType::of::<i64>(),
        KeyValue::Unsigned64(_) => ParameterType::of::<u64>(),
        KeyValue::Float32(_) => ParameterType::of::<f32>(),
        KeyValue::Float64(_) => ParameterType::of::<f64>(),
        KeyValue::Decimal(_) => ParameterType::of::<Decimal>(),
        KeyValue::Uuid(_) => ParameterType::of::<Uuid>(),
        KeyValue::Date(_) => ParameterType::of::<time::Date>(),
        KeyValue::Time(_) => ParameterType::of::<time::Time>(),
        KeyValue::Timestamp(_) => ParameterType::of::<time::PrimitiveDateTime>(),
        KeyValue::TimestampTz(_) => ParameterType::of::<time::OffsetDateTime>(),
        KeyValue::Bool(_) => ParameterType::of::<bool>(),
        KeyValue::Null => ParameterType::of::<()>(),
    })
}

trait Tree {
    fn is_null(&self) -> bool;
    fn member(&self, name: &str) -> Option<&Self>;
    fn element(&self, index: &str) -> Option<&Self>;
    fn leaf(&self) -> KeyValue;
}

impl Tree for KeyValue {
    fn is_null(&self) -> bool {
        KeyValue::is_null(self)
    }

    fn member(&self, name: &str) -> Option<&Self> {
        match self {
            KeyValue::Object(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    fn element(&self, index: &str) -> Option<&Self> {
        match self {
            KeyValue::Array(items) => index.parse::<usize>().ok().and_then(|i| items.get(i)),
            KeyValue::Object(_) => self.member(index),
            _ => None,
        }
    }

    fn leaf(&self) -> KeyValue {
        self.clone()
    }
}

impl Tree for serde_json::Value {
    fn is_null(&self) -> bool {
        serde_json::Value::is_null(self)
    }

    fn member(&self, name: &str) -> Option<&Self> {
        self.as_object().and_then(|map| map.get(name))
    }

    fn element(&self, index: &str) -> Option<&Self> {
        match self {
            serde_json::Value::Array(items) => {
                index.parse::<usize>().ok().and_then(|i| items.get(i))
            }
            serde_json::Value::Object(map) => map.get(index),
            _ => None,
        }
    }

    fn leaf(&self) -> KeyValue {
        json_to_key_value(self)
    }
}

enum Lookup<'a, T> {
    Found(&'a T),
    /// An intermediate value on the path is null; reads as null.
    NullPrefix,
    Missing,
}

fn lookup<'a, T: Tree>(
    first: impl FnOnce(&str) -> Option<&'a T>,
    path: &PropertyPath,
) -> Lookup<'a, T> {
    let Some((head, rest)) = path.segments().split_first() else {
        return Lookup::Missing;
    };
    let Some(mut current) = first(&head.name) else {
        return Lookup::Missing;
    };
    for (i, segment) in std::iter::once(head).chain(rest).enumerate() {
        if i > 0 {
            if current.is_null() {
                return Lookup::NullPrefix;
            }
            match current.member(&segment.name) {
                Some(node) => current = node,
                None => return Lookup::Missing,
            }
        }
        if let Some(index) = &segment.index {
            if current.is_null() {
                return Lookup::NullPrefix;
            }
            match current.element(index) {
                Some(node) => current = node,
                None => return Lookup::Missing,
            }
        }
    }
    Lookup::Found(current)
}

fn has_in<'a, T: Tree + 'a>(first: impl FnOnce(&str) -> Option<&'a T>, path: &PropertyPath) -> bool {
    !matches!(lookup(first, path), Lookup::Missing)
}

fn get_in<'a, T: Tree + 'a>(
    first: impl FnOnce(&str) -> Option<&'a T>,
    path: &PropertyPath,
) -> Result<KeyValue, PropertyError> {
    match lookup(first, path) {
        Lookup::Found(node) => Ok(node.leaf()),
        Lookup::NullPrefix => Ok(KeyValue::Null),
        Lookup::Missing => Err(PropertyError::NotFound(path.to_string())),
    }
}

impl PropertyAccessor for KeyValue {
    fn has_property(&self, path: &PropertyPath) -> bool {
        has_in(|name| self.member(name), path)
    }

    fn get_property(&self, path: &PropertyPath) -> Result<KeyValue, PropertyError> {
        get_in(|name| self.member(name), path)
    }
}

impl Parameter for KeyValue {
    fn parameter_type(&self) -> ParameterType {
        scalar_type(self).unwrap_or_else(ParameterType::of::<KeyValue>)
    }

    fn to_key_value(&self) -> KeyValue {
        self.clone()
    }
}

impl PropertyAccessor for serde_json::Value {
    fn has_property(&self, path: &PropertyPath) -> bool {
        has_in(|name| self.member(name), path)
    }

    fn get_property(&self, path: &PropertyPath) -> Result<KeyValue, PropertyError> {
        get_in(|name| self.member(name), path)
    }
}

impl Parameter for serde_json::Value {
    fn parameter_type(&self) -> ParameterType {
        match self {
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                ParameterType::of::<serde_json::Value>()
            }
            scalar => scalar_type(&json_to_key_value(scalar))
                .unwrap_or_else(ParameterType::of::<serde_json::Value>),
        }
    }

    fn to_key_value(&self) -> KeyValue {
        json_to_key_value(self)
    }
}

impl PropertyAccessor for HashMap<String, KeyValue> {
    fn has_property(&self, path: &PropertyPath) -> bool {
        has_in(|name| self.get(name), path)
    }

    fn get_property(&self, path: &PropertyPath) -> Result<KeyValue, PropertyError> {
        get_in(|name| self.get(name), path)
    }
}

impl Parameter for HashMap<String, KeyValue> {
    fn parameter_type(&self) -> ParameterType {
        ParameterType::of::<Self>()
    }

    // HashMap iteration order is unspecified; sort so the component is stable.
    fn to_key_value(&self) -> KeyValue {
        let mut fields: Vec<_> = self.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        KeyValue::Object(fields)
    }
}

impl PropertyAccessor for BTreeMap<String, KeyValue> {
    fn has_property(&self, path: &PropertyPath) -> bool {
        has_in(|name| self.get(name), path)
    }

    fn get_property(&self, path: &PropertyPath) -> Result<KeyValue, PropertyError> {
        get_in(|name| self.get(name), path)
    }
}

impl Parameter for BTreeMap<String, KeyValue> {
    fn parameter_type(&self) -> ParameterType {
        ParameterType::of::<Self>()
    }

    fn to_key_value(&self) -> KeyValue {
        KeyValue::Object(self.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

macro_rules! scalar_parameter {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PropertyAccessor for $ty {
                fn has_property(&self, _path: &PropertyPath) -> bool {
                    false
                }

                fn get_property(&self, path: &PropertyPath) -> Result<KeyValue, PropertyError> {
                    Err(PropertyError::NotFound(path.to_string()))
                }
            }

            impl Parameter for $ty {
                fn parameter_type(&self) -> ParameterType {
                    ParameterType::of::<$ty>()
                }

                fn to_key_value(&self) -> KeyValue {
                    KeyValue::from(self.clone())
                }
            }
        )*
    };
}

scalar_parameter!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u64,
    f32,
    f64,
    String,
    Vec<u8>,
    Decimal,
    Uuid,
    time::Date,
    time::Time,
    time::PrimitiveDateTime,
    time::OffsetDateTime,
);

/// Struct-shaped parameter: any `Serialize` value, flattened once on
/// construction and reported under the original type `T`.
#[derive(Debug, Clone)]
pub struct Structured {
    ty: ParameterType,
    value: KeyValue,
}

impl Structured {
    pub fn new<T: Serialize + 'static>(value: &T) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_value(value)?;
        Ok(Structured {
            ty: ParameterType::of::<T>(),
            value: json_to_key_value(&json),
        })
    }
}

impl PropertyAccessor for Structured {
    fn has_property(&self, path: &PropertyPath) -> bool {
        self.value.has_property(path)
    }

    fn get_property(&self, path: &PropertyPath) -> Result<KeyValue, PropertyError> {
        self.value.get_property(path)
    }
}

impl Parameter for Structured {
    fn parameter_type(&self) -> ParameterType {
        self.ty
    }

    fn to_key_value(&self) -> KeyValue {
        self.value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(raw: &str) -> PropertyPath {
        PropertyPath::parse(raw).unwrap()
    }

    #[test]
    fn parses_dotted_and_indexed_paths() {
        let p = path("orders[0].lines[total].sku");
        assert_eq!(p.root(), "orders");
        assert_eq!(
            p.segments(),
            &[
                Segment { name: "orders".into(), index: Some("0".into()) },
                Segment { name: "lines".into(), index: Some("total".into()) },
                Segment { name: "sku".into(), index: None },
            ]
        );
    }

    #[test]
    fn rejects_malformed_paths() {
        for raw in ["", "a..b", ".a", "a.", "a[", "a[]", "a[0]x", "a]", "[0]"] {
            assert!(
                matches!(PropertyPath::parse(raw), Err(PropertyError::InvalidPath { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn json_nested_lookup() {
        let param = json!({"user": {"id": 5, "tags": ["a", "b"]}, "gone": null});
        assert!(param.has_property(&path("user.id")));
        assert_eq!(param.get_property(&path("user.id")).unwrap(), KeyValue::Integer64(5));
        assert_eq!(
            param.get_property(&path("user.tags[1]")).unwrap(),
            KeyValue::String("b".into())
        );
        assert!(!param.has_property(&path("user.name")));
        assert!(!param.has_property(&path("user.tags[9]")));
        assert!(matches!(
            param.get_property(&path("user.name")),
            Err(PropertyError::NotFound(_))
        ));
    }

    #[test]
    fn null_intermediate_reads_as_null() {
        let param = json!({"gone": null});
        assert!(param.has_property(&path("gone.city")));
        assert_eq!(param.get_property(&path("gone.city")).unwrap(), KeyValue::Null);
        assert!(param.has_property(&path("gone")));
    }

    #[test]
    fn scalars_have_no_properties() {
        assert!(!42i64.has_property(&path("id")));
        assert!(42i64.get_property(&path("id")).is_err());
        assert_eq!(42i64.to_key_value(), KeyValue::Integer64(42));
    }

    #[test]
    fn dynamic_values_report_scalar_types() {
        assert_eq!(json!(42).parameter_type(), ParameterType::of::<i64>());
        assert_eq!(json!("x").parameter_type(), ParameterType::of::<String>());
        assert_eq!(
            json!({"a": 1}).parameter_type(),
            ParameterType::of::<serde_json::Value>()
        );
        assert_eq!(KeyValue::Bool(true).parameter_type(), ParameterType::of::<bool>());
        assert_eq!(
            KeyValue::Array(vec![]).parameter_type(),
            ParameterType::of::<KeyValue>()
        );
    }

    #[test]
    fn structured_wraps_serializable_structs() {
        #[derive(Serialize)]
        struct UserQuery {
            id: i64,
            name: Option<String>,
        }

        let param = Structured::new(&UserQuery { id: 7, name: None }).unwrap();
        assert_eq!(param.parameter_type(), ParameterType::of::<UserQuery>());
        assert_eq!(param.get_property(&path("id")).unwrap(), KeyValue::Integer64(7));
        assert!(param.has_property(&path("name")));
        assert_eq!(param.get_property(&path("name")).unwrap(), KeyValue::Null);
        assert!(!param.has_property(&path("email")));
    }

    #[test]
    fn hash_map_component_is_sorted() {
        let mut map = HashMap::new();
        map.insert("b".to_string(), KeyValue::Integer64(2));
        map.insert("a".to_string(), KeyValue::Integer64(1));
        assert_eq!(
            map.to_key_value(),
            KeyValue::Object(vec![
                ("a".to_string(), KeyValue::Integer64(1)),
                ("b".to_string(), KeyValue::Integer64(2)),
            ])
        );
        assert!(map.has_property(&path("a")));
    }
}
