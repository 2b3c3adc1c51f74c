use std::collections::BTreeMap;

use crate::database::value::KeyValue;
use crate::reflection::{Parameter, PropertyAccessor, PropertyPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBounds {
    pub offset: u64,
    pub limit: u64,
}

impl RowBounds {
    pub const NO_OFFSET: u64 = 0;
    pub const NO_LIMIT: u64 = u64::MAX;

    pub fn new(offset: u64, limit: u64) -> Self {
        RowBounds { offset, limit }
    }
}

impl Default for RowBounds {
    fn default() -> Self {
        RowBounds {
            offset: Self::NO_OFFSET,
            limit: Self::NO_LIMIT,
        }
    }
}

/// One `?` in the bound SQL, named by the property that supplies its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMapping {
    pub property: String,
}

impl ParameterMapping {
    pub fn new(property: impl Into<String>) -> Self {
        ParameterMapping {
            property: property.into(),
        }
    }
}

/// Values injected by dynamic SQL (loop variables, bind expressions),
/// consulted when a mapped property is not on the parameter object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdditionalParameters(BTreeMap<String, KeyValue>);

impl AdditionalParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<KeyValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Presence is decided by the top-level name only, so `item.name` is
    /// present whenever `item` is, even if `item` has no `name`.
    pub fn contains(&self, path: &PropertyPath) -> bool {
        self.0.contains_key(path.root())
    }

    /// Full-path read; anything not reachable reads as null.
    pub fn get(&self, path: &PropertyPath) -> KeyValue {
        self.0.get_property(path).unwrap_or(KeyValue::Null)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<KeyValue>> FromIterator<(K, V)> for AdditionalParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        AdditionalParameters(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Borrowed from the caller for the duration of a single derivation.
#[derive(Clone, Copy)]
pub struct StatementInvocation<'a> {
    pub statement_id: &'a str,
    pub bounds: RowBounds,
    pub sql: &'a str,
    pub parameter_mappings: &'a [ParameterMapping],
    pub parameter: Option<&'a dyn Parameter>,
    pub additional_parameters: Option<&'a AdditionalParameters>,
}

impl<'a> StatementInvocation<'a> {
    pub fn new(statement_id: &'a str, sql: &'a str) -> Self {
        StatementInvocation {
            statement_id,
            bounds: RowBounds::default(),
            sql,
            parameter_mappings: &[],
            parameter: None,
            additional_parameters: None,
        }
    }

    pub fn with_bounds(mut self, bounds: RowBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_mappings(mut self, mappings: &'a [ParameterMapping]) -> Self {
        self.parameter_mappings = mappings;
        self
    }

    pub fn with_parameter(mut self, parameter: &'a dyn Parameter) -> Self {
        self.parameter = Some(parameter);
        self
    }

    pub fn with_additional_parameters(mut self, additional: &'a AdditionalParameters) -> Self {
        self.additional_parameters = Some(additional);
        self
    }

    pub fn has_blank_sql(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

impl std::fmt::Debug for StatementInvocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementInvocation")
            .field("statement_id", &self.statement_id)
            .field("bounds", &self.bounds)
            .field("sql", &self.sql)
            .field("parameter_mappings", &self.parameter_mappings)
            .field(
                "parameter",
                &self.parameter.map(|p| p.parameter_type().name()),
            )
            .field("additional_parameters", &self.additional_parameters)
            .finish()
    }
}
