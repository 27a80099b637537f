//! Translator configuration
//!
//! ```yaml
//! root_variable: person
//! separator: "·"
//! remote_contexts: true
//! context_cache:
//!   https://example.com/context.jsonld:
//!     "@context":
//!       name: http://xmlns.com/foaf/0.1/name
//! ```

use crate::context::{iri, ContextLoader, HttpContextLoader, NoRemoteContexts, StaticContextLoader};
use crate::parse::Parser;
use crate::variable::{VariableNaming, DEFAULT_ROOT, DEFAULT_SEPARATOR};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid YAML for this schema
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A setting has an unusable value
    #[error("Invalid {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for building a [`Parser`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslatorConfig {
    /// Name of the root query variable
    pub root_variable: String,
    /// Separator between variable name segments
    pub separator: String,
    /// Allow fetching remote `@context` documents over HTTP
    pub remote_contexts: bool,
    /// Context documents served by IRI without fetching
    pub context_cache: IndexMap<String, Value>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            root_variable: DEFAULT_ROOT.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            remote_contexts: false,
            context_cache: IndexMap::new(),
        }
    }
}

impl TranslatorConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("Loading translator configuration from {}", path.display());
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.root_variable.is_empty()
            || !self
                .root_variable
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::Invalid {
                field: "root_variable",
                message: format!(
                    "'{}' must be a non-empty name of letters, digits and underscores",
                    self.root_variable
                ),
            });
        }

        if self.separator.is_empty() || !self.separator.chars().all(|c| c == '\u{B7}') {
            return Err(ConfigError::Invalid {
                field: "separator",
                message: format!(
                    "'{}' must consist of '\u{B7}' characters so variable names stay distinct",
                    self.separator
                ),
            });
        }

        if let Some(bad) = self.context_cache.keys().find(|k| !iri::is_absolute(k)) {
            return Err(ConfigError::Invalid {
                field: "context_cache",
                message: format!("'{}' is not an absolute IRI", bad),
            });
        }

        Ok(())
    }

    /// The context loader these settings call for
    pub fn loader(&self) -> Arc<dyn ContextLoader> {
        let documents = self.context_cache.iter().map(|(k, v)| (k.clone(), v.clone()));

        if self.remote_contexts {
            Arc::new(documents.fold(HttpContextLoader::new(), |loader, (iri, document)| {
                loader.with_document(iri, document)
            }))
        } else if self.context_cache.is_empty() {
            Arc::new(NoRemoteContexts)
        } else {
            Arc::new(documents.fold(StaticContextLoader::new(), |loader, (iri, document)| {
                loader.with_document(iri, document)
            }))
        }
    }

    /// A default production table using these settings
    pub fn to_parser(&self) -> Parser {
        Parser::default()
            .with_loader(self.loader())
            .with_naming(VariableNaming::new(&self.root_variable, &self.separator))
    }
}
