use serde::Deserialize;

pub mod deriver;
pub mod invocation;
pub mod key;
pub mod matcher;
pub mod resolver;

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SqlCommandType {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
}

impl SqlCommandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlCommandType::Select => "select",
            SqlCommandType::Insert => "insert",
            SqlCommandType::Update => "update",
            SqlCommandType::Delete => "delete",
        }
    }
}

/// A statement template as configured: an id, its SQL with `#{property}`
/// placeholders, and what kind of command it is.
#[derive(Debug, Deserialize, Clone)]
pub struct MappedStatement {
    pub id: String,
    #[serde(default)]
    pub sql: String,
    #[serde(default)]
    pub command: SqlCommandType,
}
