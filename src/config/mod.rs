use std::fs;
use std::path::Path;

use crate::cache::MappedStatement;
use crate::error::{Error, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "querykey.toml";

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub key: KeyConfig,
    pub types: TypesConfig,
    pub statements: Vec<MappedStatement>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct KeyConfig {
    pub sql_fallback: SqlFallback,
}

/// How a blank bound SQL text is handled during key derivation.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SqlFallback {
    /// Rebuild the text from the statement's configured template.
    #[default]
    Template,
    /// Never rebuild; the SQL component is always the null marker.
    Placeholder,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TypesConfig {
    /// Register every built-in scalar type as directly keyable.
    pub builtin: bool,
    /// Additional built-in type names, useful when `builtin = false`.
    pub keyable: Vec<String>,
}

impl Default for TypesConfig {
    fn default() -> Self {
        TypesConfig {
            builtin: true,
            keyable: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Config> {
        Ok(toml::from_str(contents)?)
    }
}

pub fn load_config() -> Result<Config> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_toml_str(&contents)
}
