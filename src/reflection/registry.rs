use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::config::TypesConfig;
use crate::error::{Error, Result};
use crate::reflection::ParameterType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCapability {
    DirectlyKeyable,
    Decomposable,
}

/// Answers whether a parameter type is used whole as a key component.
///
/// Filled during startup and only read afterwards; share it behind an `Arc`.
/// Types that were never registered are `Decomposable`.
#[derive(Debug, Clone, Default)]
pub struct TypeCapabilityRegistry {
    keyable: HashSet<ParameterType>,
}

/// Built-in keyable types, by the names accepted in the `[types]` config.
fn builtin(name: &str) -> Option<ParameterType> {
    Some(match name {
        "bool" => ParameterType::of::<bool>(),
        "i8" => ParameterType::of::<i8>(),
        "i16" => ParameterType::of::<i16>(),
        "i32" => ParameterType::of::<i32>(),
        "i64" => ParameterType::of::<i64>(),
        "u64" => ParameterType::of::<u64>(),
        "f32" => ParameterType::of::<f32>(),
        "f64" => ParameterType::of::<f64>(),
        "string" => ParameterType::of::<String>(),
        "bytes" => ParameterType::of::<Vec<u8>>(),
        "decimal" => ParameterType::of::<Decimal>(),
        "uuid" => ParameterType::of::<Uuid>(),
        "date" => ParameterType::of::<time::Date>(),
        "time" => ParameterType::of::<time::Time>(),
        "timestamp" => ParameterType::of::<time::PrimitiveDateTime>(),
        "timestamptz" => ParameterType::of::<time::OffsetDateTime>(),
        _ => return None,
    })
}

const BUILTIN_NAMES: [&str; 16] = [
    "bool",
    "i8",
    "i16",
    "i32",
    "i64",
    "u64",
    "f32",
    "f64",
    "string",
    "bytes",
    "decimal",
    "uuid",
    "date",
    "time",
    "timestamp",
    "timestamptz",
];

impl TypeCapabilityRegistry {
    /// Registry with nothing keyable; every parameter is decomposed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .keyable
            .extend(BUILTIN_NAMES.iter().filter_map(|name| builtin(name)));
        registry
    }

    pub fn from_config(config: &TypesConfig) -> Result<Self> {
        let mut registry = if config.builtin {
            Self::with_defaults()
        } else {
            Self::new()
        };
        for name in &config.keyable {
            let ty = builtin(name).ok_or_else(|| Error::UnknownTypeName(name.clone()))?;
            registry.keyable.insert(ty);
        }
        debug!(keyable = registry.keyable.len(), "type capability registry loaded");
        Ok(registry)
    }

    /// Marks `T` as directly keyable. Call during setup only.
    pub fn register<T: ?Sized + 'static>(&mut self) -> &mut Self {
        self.keyable.insert(ParameterType::of::<T>());
        self
    }

    pub fn capability(&self, ty: ParameterType) -> TypeCapability {
        if self.keyable.contains(&ty) {
            TypeCapability::DirectlyKeyable
        } else {
            TypeCapability::Decomposable
        }
    }

    pub fn is_directly_keyable(&self, ty: ParameterType) -> bool {
        self.capability(ty) == TypeCapability::DirectlyKeyable
    }

    pub fn len(&self) -> usize {
        self.keyable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyable.is_empty()
    }
}
