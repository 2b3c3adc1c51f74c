use std::collections::HashMap;

use crate::config::Config;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct StatementRegistry {
    statements: HashMap<String, super::MappedStatement>,
}

impl StatementRegistry {
    pub fn new(config: &Config) -> Result<Self> {
        Self::from_statements(config.statements.iter().cloned())
    }

    pub fn from_statements(
        statements: impl IntoIterator<Item = super::MappedStatement>,
    ) -> Result<Self> {
        let mut by_id = HashMap::new();
        for statement in statements {
            if by_id.contains_key(&statement.id) {
                return Err(Error::DuplicateStatement(statement.id));
            }
            by_id.insert(statement.id.clone(), statement);
        }
        Ok(StatementRegistry { statements: by_id })
    }

    pub fn find_statement(&self, id: &str) -> Option<&super::MappedStatement> {
        self.statements.get(id)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
