use std::sync::Arc;

use crate::cache::matcher::StatementRegistry;
use crate::cache::resolver::{PlaceholderResolver, SqlTextResolver, TemplateResolver};
use crate::config::{Config, SqlFallback};
use crate::error::Result;
use crate::reflection::registry::TypeCapabilityRegistry;

/// Read-only state shared by every key derivation.
///
/// Built once at startup (from a [`Config`] or piece by piece), wrapped in an
/// `Arc`, and never mutated afterwards. Dropping the last `Arc` releases it.
pub struct KeyState {
    pub statements: StatementRegistry,
    pub types: TypeCapabilityRegistry,
    pub resolver: Box<dyn SqlTextResolver>,
}

impl KeyState {
    pub fn new(
        statements: StatementRegistry,
        types: TypeCapabilityRegistry,
        resolver: Box<dyn SqlTextResolver>,
    ) -> Self {
        KeyState {
            statements,
            types,
            resolver,
        }
    }

    pub fn from_config(config: &Config) -> Result<Arc<Self>> {
        let statements = StatementRegistry::new(config)?;
        let types = TypeCapabilityRegistry::from_config(&config.types)?;
        let resolver: Box<dyn SqlTextResolver> = match config.key.sql_fallback {
            SqlFallback::Template => Box::new(TemplateResolver),
            SqlFallback::Placeholder => Box::new(PlaceholderResolver),
        };
        Ok(Arc::new(KeyState::new(statements, types, resolver)))
    }
}

impl Default for KeyState {
    /// Built-in keyable types, no statements, template fallback.
    fn default() -> Self {
        KeyState::new(
            StatementRegistry::default(),
            TypeCapabilityRegistry::with_defaults(),
            Box::new(TemplateResolver),
        )
    }
}

impl std::fmt::Debug for KeyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyState")
            .field("statements", &self.statements.len())
            .field("types", &self.types.len())
            .finish_non_exhaustive()
    }
}
