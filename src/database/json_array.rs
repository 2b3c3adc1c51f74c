use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};

use crate::error::CodecError;

pub trait ColumnText {
    fn text_by_name(&self, name: &str) -> Result<Option<String>, sqlx::Error>;
    fn text_by_index(&self, index: usize) -> Result<Option<String>, sqlx::Error>;
}

pub trait OutputParameters {
    fn output_text(&self, index: usize) -> Result<Option<String>, sqlx::Error>;
}

impl ColumnText for PgRow {
    fn text_by_name(&self, name: &str) -> Result<Option<String>, sqlx::Error> {
        self.try_get::<Option<String>, _>(name)
    }

    fn text_by_index(&self, index: usize) -> Result<Option<String>, sqlx::Error> {
        self.try_get::<Option<String>, _>(index)
    }
}

/// Stores a JSON array as text in a single column.
///
/// Reading is lenient about absence: NULL, empty and whitespace-only text all
/// read back as `None`. Text that is present but malformed is an error.
pub struct JsonArrayCodec;

impl JsonArrayCodec {
    /// Compact JSON with no insignificant whitespace, e.g. `[1,2,3]`.
    pub fn encode(array: &[Value]) -> Result<String, CodecError> {
        serde_json::to_string(array).map_err(CodecError::Encode)
    }

    pub fn decode(text: Option<&str>) -> Result<Option<Vec<Value>>, CodecError> {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };
        match serde_json::from_str::<Value>(text).map_err(CodecError::Decode)? {
            Value::Array(items) => Ok(Some(items)),
            other => Err(CodecError::NotAnArray {
                found: json_type_name(&other),
            }),
        }
    }

    pub fn get_by_name<R: ColumnText + ?Sized>(
        row: &R,
        column: &str,
    ) -> Result<Option<Vec<Value>>, CodecError> {
        let text = row.text_by_name(column)?;
        Self::decode(text.as_deref())
    }

    pub fn get_by_index<R: ColumnText + ?Sized>(
        row: &R,
        index: usize,
    ) -> Result<Option<Vec<Value>>, CodecError> {
        let text = row.text_by_index(index)?;
        Self::decode(text.as_deref())
    }

    pub fn get_output<C: OutputParameters + ?Sized>(
        call: &C,
        index: usize,
    ) -> Result<Option<Vec<Value>>, CodecError> {
        let text = call.output_text(index)?;
        Self::decode(text.as_deref())
    }

    pub fn bind<'q>(
        query: Query<'q, Postgres, PgArguments>,
        array: &[Value],
    ) -> Result<Query<'q, Postgres, PgArguments>, CodecError> {
        let text = Self::encode(array)?;
        Ok(query.bind(text))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
