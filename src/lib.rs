//! Result-cache keys for parameterized statements.
//!
//! [`CacheKeyDeriver`] turns one statement invocation (statement id, row
//! bounds, bound SQL, parameter mappings, parameter object and additional
//! parameters) into a [`CompositeKey`]: an ordered, hashable value that a
//! result cache in front of statement execution can use directly as its map
//! key. Derivation is total; a blank SQL text or an unreadable property
//! degrades the key instead of failing.
//!
//! [`JsonArrayCodec`] stores JSON arrays in text columns, reading blank or
//! NULL text back as `None`.
//!
//! ```
//! use std::sync::Arc;
//! use querykey::{CacheKeyDeriver, KeyState, ParameterMapping, StatementInvocation};
//!
//! let deriver = CacheKeyDeriver::new(Arc::new(KeyState::default()));
//! let mappings = [ParameterMapping::new("id")];
//! let param = serde_json::json!({ "id": 5 });
//! let invocation = StatementInvocation::new("ns.selectUser", "SELECT * FROM user WHERE id = ?")
//!     .with_mappings(&mappings)
//!     .with_parameter(&param);
//!
//! let key = deriver.derive_key(&invocation);
//! assert_eq!(key.update_count(), 5);
//! ```

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod reflection;
pub mod state;

pub use cache::deriver::{CacheKeyDeriver, Derivation};
pub use cache::invocation::{AdditionalParameters, ParameterMapping, RowBounds, StatementInvocation};
pub use cache::key::{CompositeKey, CompositeKeyBuilder};
pub use cache::matcher::StatementRegistry;
pub use cache::resolver::{
    PlaceholderResolver, ResolvedSql, SqlSource, SqlTextResolver, TemplateResolver,
};
pub use cache::{MappedStatement, SqlCommandType};
pub use config::{Config, SqlFallback, load_config, load_config_from};
pub use database::json_array::{ColumnText, JsonArrayCodec, OutputParameters};
pub use database::value::KeyValue;
pub use error::{CodecError, Error, PropertyError, ResolveError, Result};
pub use reflection::registry::{TypeCapability, TypeCapabilityRegistry};
pub use reflection::{Parameter, ParameterType, PropertyAccessor, PropertyPath, Structured};
pub use state::KeyState;
