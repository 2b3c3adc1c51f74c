use std::borrow::Cow;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::cache::invocation::{ParameterMapping, StatementInvocation};
use crate::cache::key::{CompositeKey, CompositeKeyBuilder};
use crate::cache::resolver::SqlSource;
use crate::database::value::KeyValue;
use crate::error::PropertyError;
use crate::reflection::PropertyPath;
use crate::state::KeyState;

#[derive(Debug, Clone)]
pub struct Derivation {
    pub key: CompositeKey,
    pub sql_source: SqlSource,
    /// Mappings that could not be read; each contributed a null component.
    pub property_errors: Vec<PropertyError>,
}

impl Derivation {
    /// False when the key was built from degraded inputs and may conflate
    /// invocations that would otherwise get distinct keys.
    pub fn is_exact(&self) -> bool {
        !self.sql_source.is_degraded() && self.property_errors.is_empty()
    }
}

/// Cheap to clone; every clone shares the same read-only [`KeyState`].
/// Derivation never fails: anything that goes wrong degrades the key instead.
#[derive(Debug, Clone)]
pub struct CacheKeyDeriver {
    state: Arc<KeyState>,
}

impl CacheKeyDeriver {
    pub fn new(state: Arc<KeyState>) -> Self {
        CacheKeyDeriver { state }
    }

    pub fn state(&self) -> &KeyState {
        &self.state
    }

    pub fn derive_key(&self, invocation: &StatementInvocation<'_>) -> CompositeKey {
        self.derive(invocation).key
    }

    pub fn derive(&self, invocation: &StatementInvocation<'_>) -> Derivation {
        let mut builder = CompositeKeyBuilder::new();
        builder
            .update(invocation.statement_id)
            .update(invocation.bounds.offset)
            .update(invocation.bounds.limit);

        let mut mappings = Cow::Borrowed(invocation.parameter_mappings);
        let sql_source = if invocation.has_blank_sql() {
            let statement = self
                .state
                .statements
                .find_statement(invocation.statement_id);
            match self.state.resolver.resolve(statement, invocation) {
                Ok(resolved) => {
                    debug!(
                        statement_id = invocation.statement_id,
                        sql = %resolved.sql,
                        mappings = resolved.parameter_mappings.len(),
                        "rebuilt blank statement sql for cache key"
                    );
                    builder.update(resolved.sql.as_str());
                    mappings = Cow::Owned(resolved.parameter_mappings.clone());
                    SqlSource::Resolved(resolved)
                }
                Err(error) => {
                    warn!(
                        statement_id = invocation.statement_id,
                        %error,
                        "blank statement sql could not be rebuilt; cache key sql component is null"
                    );
                    builder.update(KeyValue::Null);
                    SqlSource::Degraded(error)
                }
            }
        } else {
            builder.update(invocation.sql);
            SqlSource::Supplied
        };

        let mut property_errors = Vec::new();
        if let Some(parameter) = invocation.parameter
            && !mappings.is_empty()
        {
            if self.state.types.is_directly_keyable(parameter.parameter_type()) {
                builder.update(parameter.to_key_value());
            } else {
                for mapping in mappings.iter() {
                    if let Err(error) = self.update_mapping(&mut builder, invocation, mapping) {
                        warn!(
                            statement_id = invocation.statement_id,
                            property = %mapping.property,
                            %error,
                            "parameter property unreadable; using null cache key component"
                        );
                        builder.update(KeyValue::Null);
                        property_errors.push(error);
                    }
                }
            }
        }

        Derivation {
            key: builder.build(),
            sql_source,
            property_errors,
        }
    }

    fn update_mapping(
        &self,
        builder: &mut CompositeKeyBuilder,
        invocation: &StatementInvocation<'_>,
        mapping: &ParameterMapping,
    ) -> Result<(), PropertyError> {
        let path = PropertyPath::parse(&mapping.property)?;
        if let Some(parameter) = invocation.parameter
            && parameter.has_property(&path)
        {
            builder.update(parameter.get_property(&path)?);
        } else if let Some(additional) = invocation.additional_parameters
            && additional.contains(&path)
        {
            builder.update(additional.get(&path));
        } else {
            trace!(
                statement_id = invocation.statement_id,
                property = %path,
                "mapped property absent; contributes nothing to cache key"
            );
        }
        Ok(())
    }
}
