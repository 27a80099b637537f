//! JSON-LD context processing
//!
//! Resolves `@context` definitions into an [`ActiveContext`] that answers the
//! two questions the translator needs:
//! - what IRI (or keyword) does a key expand to
//! - what container and type mapping does a term declare
//!
//! Supports `@vocab`, `@base`, term aliasing (including aliases of `@id` and
//! `@type`), compact IRIs, `@container`, `@type` coercion, `@reverse`, scoped
//! contexts and remote contexts through a [`ContextLoader`].

mod definition;
pub mod iri;
mod loader;

pub use definition::{Container, TermDefinition, TypeMapping};
pub use loader::{ContextLoader, HttpContextLoader, NoRemoteContexts, StaticContextLoader};

use definition::TermCreator;
use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;
use iri::{is_absolute, is_keyword, split_compact};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Maximum nesting of remote contexts loading other remote contexts
const MAX_REMOTE_DEPTH: usize = 16;

/// Context processing errors
#[derive(Error, Debug)]
pub enum ContextError {
    /// Structurally invalid context
    #[error("Invalid context: {0}")]
    InvalidContext(String),

    /// Term definition of an unsupported shape
    #[error("Invalid term definition for '{0}'")]
    InvalidTermDefinition(String),

    /// Term whose IRI cannot be determined
    #[error("Invalid IRI mapping for term '{0}'")]
    InvalidIriMapping(String),

    /// Terms defined in terms of each other
    #[error("Cyclic IRI mapping for term '{0}'")]
    CyclicIriMapping(String),

    /// Attempt to define a keyword as a term
    #[error("Keywords cannot be redefined: {0}")]
    KeywordRedefinition(String),

    /// Unknown `@container` value
    #[error("Invalid @container value: {0}")]
    InvalidContainer(String),

    /// `@version` other than 1.1
    #[error("Invalid @version value: {0}")]
    InvalidVersion(String),

    /// Remote context requested while loading is disabled
    #[error("Remote contexts are disabled: {0}")]
    RemoteContextsDisabled(String),

    /// Remote context could not be fetched
    #[error("Failed to load remote context {iri}: {message}")]
    LoadingFailed { iri: String, message: String },

    /// Remote contexts nested too deeply
    #[error("Context recursion limit exceeded while loading {0}")]
    RecursionLimit(String),

    /// Context feature the processor does not implement
    #[error("Unsupported context feature: {0}")]
    Unsupported(String),
}

pub type ContextResult<T> = Result<T, ContextError>;

/// How a node object key resolves against the active context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResolution {
    /// A keyword, either directly or through an alias
    Keyword(String),
    /// A property IRI
    Iri(String),
    /// A reverse property IRI
    Reverse(String),
    /// Neither a term, a compact IRI, an absolute IRI nor vocab-relative
    Unmapped,
}

/// A processed JSON-LD context
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActiveContext {
    /// Base IRI for document-relative IRIs
    pub base: Option<String>,
    /// Vocabulary mapping for vocab-relative IRIs
    pub vocab: Option<String>,
    /// Term definitions in definition order
    pub terms: IndexMap<String, TermDefinition>,
}

impl ActiveContext {
    /// The initial (empty) context
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a local context on top of this one
    pub async fn process(
        &self,
        local: &Value,
        loader: &dyn ContextLoader,
    ) -> ContextResult<ActiveContext> {
        self.process_nested(local, loader, 0).await
    }

    fn process_nested<'a>(
        &'a self,
        local: &'a Value,
        loader: &'a dyn ContextLoader,
        depth: usize,
    ) -> BoxFuture<'a, ContextResult<ActiveContext>> {
        async move {
            match local {
                Value::Null => Ok(ActiveContext::new()),
                Value::String(iri) => {
                    if depth >= MAX_REMOTE_DEPTH {
                        return Err(ContextError::RecursionLimit(iri.clone()));
                    }
                    let iri = match &self.base {
                        Some(base) => iri::resolve(base, iri).unwrap_or_else(|| iri.clone()),
                        None => iri.clone(),
                    };
                    let document = loader.load(&iri).await?;
                    let remote = document.get("@context").ok_or_else(|| {
                        ContextError::InvalidContext(format!("{} has no @context entry", iri))
                    })?;
                    self.process_nested(remote, loader, depth + 1).await
                }
                Value::Array(contexts) => {
                    let mut active = self.clone();
                    for context in contexts {
                        active = active.process_nested(context, loader, depth).await?;
                    }
                    Ok(active)
                }
                Value::Object(map) => {
                    let mut active = self.clone();
                    active.apply_keywords(map)?;
                    TermCreator::new(&mut active, map).create_all()?;
                    Ok(active)
                }
                other => Err(ContextError::InvalidContext(format!(
                    "context must be null, a string, an array or an object, got {}",
                    other
                ))),
            }
        }
        .boxed()
    }

    fn apply_keywords(&mut self, map: &serde_json::Map<String, Value>) -> ContextResult<()> {
        if let Some(version) = map.get("@version") {
            if version.as_f64() != Some(1.1) {
                return Err(ContextError::InvalidVersion(version.to_string()));
            }
        }

        if map.contains_key("@import") {
            return Err(ContextError::Unsupported("@import".to_string()));
        }

        if let Some(base) = map.get("@base") {
            self.base = match base {
                Value::Null => None,
                Value::String(s) if is_absolute(s) => Some(s.clone()),
                Value::String(s) => match &self.base {
                    Some(current) => iri::resolve(current, s),
                    None => {
                        return Err(ContextError::InvalidContext(format!(
                            "relative @base {} without a base IRI",
                            s
                        )))
                    }
                },
                other => {
                    return Err(ContextError::InvalidContext(format!(
                        "@base must be a string or null, got {}",
                        other
                    )))
                }
            };
        }

        if let Some(vocab) = map.get("@vocab") {
            self.vocab = match vocab {
                Value::Null => None,
                Value::String(s) if s.is_empty() => self.base.clone(),
                Value::String(s) if split_compact(s).is_some() || is_absolute(s) => {
                    Some(self.expand_iri(s, true).unwrap_or_else(|| s.clone()))
                }
                Value::String(s) => match (&self.vocab, &self.base) {
                    (Some(current), _) => Some(format!("{}{}", current, s)),
                    (None, Some(base)) => iri::resolve(base, s),
                    (None, None) => Some(s.clone()),
                },
                other => {
                    return Err(ContextError::InvalidContext(format!(
                        "@vocab must be a string or null, got {}",
                        other
                    )))
                }
            };
        }

        Ok(())
    }

    /// Term definition for a key, if the key is a defined term
    pub fn term(&self, key: &str) -> Option<&TermDefinition> {
        self.terms.get(key)
    }

    /// Resolve a node object key
    pub fn expand_key(&self, key: &str) -> KeyResolution {
        if is_keyword(key) {
            return KeyResolution::Keyword(key.to_string());
        }

        if let Some(definition) = self.terms.get(key) {
            return match &definition.iri {
                None => KeyResolution::Unmapped,
                Some(iri) if is_keyword(iri) => KeyResolution::Keyword(iri.clone()),
                Some(iri) if definition.reverse => KeyResolution::Reverse(iri.clone()),
                Some(iri) => KeyResolution::Iri(iri.clone()),
            };
        }

        if key.starts_with('@') {
            return KeyResolution::Unmapped;
        }

        if let Some((prefix, suffix)) = split_compact(key) {
            if prefix == "_" {
                return KeyResolution::Unmapped;
            }
            return match self.prefix_iri(prefix) {
                Some(iri) => KeyResolution::Iri(format!("{}{}", iri, suffix)),
                None => KeyResolution::Iri(key.to_string()),
            };
        }

        if is_absolute(key) {
            return KeyResolution::Iri(key.to_string());
        }

        match &self.vocab {
            Some(vocab) => KeyResolution::Iri(format!("{}{}", vocab, key)),
            None => KeyResolution::Unmapped,
        }
    }

    /// Expand an IRI value.
    ///
    /// `vocab_relative` values (`@type` values, `@vocab` coercion) consult terms
    /// and `@vocab`; otherwise relative values resolve against `@base`.
    /// Returns `None` when no absolute IRI can be produced.
    pub fn expand_iri(&self, value: &str, vocab_relative: bool) -> Option<String> {
        if is_keyword(value) {
            return None;
        }

        if vocab_relative {
            if let Some(iri) = self.terms.get(value).and_then(|d| d.iri.as_ref()) {
                return (!is_keyword(iri)).then(|| iri.clone());
            }
        }

        if let Some((prefix, suffix)) = split_compact(value) {
            return match self.prefix_iri(prefix) {
                Some(iri) => Some(format!("{}{}", iri, suffix)),
                None => Some(value.to_string()),
            };
        }

        if is_absolute(value) {
            return Some(value.to_string());
        }

        if vocab_relative {
            if let Some(vocab) = &self.vocab {
                return Some(format!("{}{}", vocab, value));
            }
        }

        self.base.as_deref().and_then(|base| iri::resolve(base, value))
    }

    fn prefix_iri(&self, prefix: &str) -> Option<&str> {
        self.terms
            .get(prefix)
            .and_then(|definition| definition.iri.as_deref())
            .filter(|iri| !is_keyword(iri))
    }
}

/// Enter a nested `@context`.
///
/// Returns the parent unchanged when there is no child context; otherwise the
/// child is merged over a copy of the parent.
pub async fn propagate_context(
    child: Option<&Value>,
    parent: &Arc<ActiveContext>,
    loader: &dyn ContextLoader,
) -> ContextResult<Arc<ActiveContext>> {
    match child {
        None => Ok(Arc::clone(parent)),
        Some(local) => {
            debug!("Propagating nested @context");
            Ok(Arc::new(parent.process(local, loader).await?))
        }
    }
}
