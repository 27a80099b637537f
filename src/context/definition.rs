//! Term definitions and their creation from a local context

use super::iri::{is_absolute, is_keyword, split_compact};
use super::{ActiveContext, ContextError, ContextResult};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

/// `@container` mappings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    List,
    Set,
    Graph,
    Language,
    Index,
    Id,
    Type,
}

impl Container {
    fn parse(value: &str) -> ContextResult<Self> {
        match value {
            "@list" => Ok(Container::List),
            "@set" => Ok(Container::Set),
            "@graph" => Ok(Container::Graph),
            "@language" => Ok(Container::Language),
            "@index" => Ok(Container::Index),
            "@id" => Ok(Container::Id),
            "@type" => Ok(Container::Type),
            other => Err(ContextError::InvalidContainer(other.to_string())),
        }
    }

    /// Human-readable name of a map container, used in warnings
    pub fn map_kind(&self) -> Option<&'static str> {
        match self {
            Container::Language => Some("Language"),
            Container::Index => Some("Index"),
            Container::Id => Some("Id"),
            Container::Type => Some("Type"),
            _ => None,
        }
    }
}

/// `@type` mapping of a term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMapping {
    /// Values are IRIs relative to the document base
    Id,
    /// Values are IRIs relative to the vocabulary
    Vocab,
    /// Values are JSON literals
    Json,
    /// Values are literals of this datatype
    Datatype(String),
}

/// A single term definition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TermDefinition {
    /// Expanded IRI or keyword; `None` when the term is explicitly mapped to null
    pub iri: Option<String>,
    /// Whether the term is a reverse property
    pub reverse: bool,
    /// Declared containers
    pub containers: Vec<Container>,
    /// Declared type mapping
    pub type_mapping: Option<TypeMapping>,
    /// Term-scoped context, processed when descending into the term's value
    pub scoped_context: Option<Value>,
}

impl TermDefinition {
    /// Simple term mapping to an IRI or keyword
    pub fn new(iri: impl Into<String>) -> Self {
        Self {
            iri: Some(iri.into()),
            ..Default::default()
        }
    }

    /// Check for a declared container
    pub fn has_container(&self, container: Container) -> bool {
        self.containers.contains(&container)
    }

    /// First map-style container (language, index, id, type), if any
    pub fn map_container(&self) -> Option<Container> {
        self.containers.iter().copied().find(|c| c.map_kind().is_some())
    }
}

/// Keys of a local context that are not term definitions
pub(super) fn is_context_keyword(key: &str) -> bool {
    matches!(
        key,
        "@base"
            | "@vocab"
            | "@version"
            | "@language"
            | "@direction"
            | "@protected"
            | "@propagate"
            | "@import"
    )
}

/// Creates term definitions from a local context, resolving references between
/// terms and detecting cycles.
pub(super) struct TermCreator<'a> {
    active: &'a mut ActiveContext,
    local: &'a Map<String, Value>,
    defined: FxHashMap<String, bool>,
}

impl<'a> TermCreator<'a> {
    pub(super) fn new(active: &'a mut ActiveContext, local: &'a Map<String, Value>) -> Self {
        Self {
            active,
            local,
            defined: FxHashMap::default(),
        }
    }

    /// Define every term of the local context
    pub(super) fn create_all(mut self) -> ContextResult<()> {
        let local = self.local;
        for term in local.keys() {
            if is_context_keyword(term) {
                continue;
            }
            self.create(term)?;
        }
        Ok(())
    }

    fn create(&mut self, term: &str) -> ContextResult<()> {
        match self.defined.get(term) {
            Some(true) => return Ok(()),
            Some(false) => return Err(ContextError::CyclicIriMapping(term.to_string())),
            None => {}
        }
        if is_keyword(term) {
            return Err(ContextError::KeywordRedefinition(term.to_string()));
        }
        self.defined.insert(term.to_string(), false);

        let local = self.local;
        let definition = match local.get(term) {
            Some(Value::Null) => TermDefinition::default(),
            Some(Value::String(value)) => TermDefinition {
                iri: Some(self.expand(term, value)?),
                ..Default::default()
            },
            Some(Value::Object(map)) => self.create_expanded(term, map)?,
            _ => return Err(ContextError::InvalidTermDefinition(term.to_string())),
        };

        self.active.terms.insert(term.to_string(), definition);
        self.defined.insert(term.to_string(), true);
        Ok(())
    }

    fn create_expanded(
        &mut self,
        term: &str,
        map: &Map<String, Value>,
    ) -> ContextResult<TermDefinition> {
        let mut definition = TermDefinition::default();

        if let Some(reverse) = map.get("@reverse") {
            let value = reverse
                .as_str()
                .ok_or_else(|| ContextError::InvalidIriMapping(term.to_string()))?;
            definition.iri = Some(self.expand(term, value)?);
            definition.reverse = true;
        } else {
            definition.iri = match map.get("@id") {
                Some(Value::Null) => None,
                Some(Value::String(value)) => Some(self.expand(term, value)?),
                Some(_) => return Err(ContextError::InvalidIriMapping(term.to_string())),
                None => Some(self.default_iri(term)?),
            };
        }

        if let Some(container) = map.get("@container") {
            definition.containers = match container {
                Value::String(s) => vec![Container::parse(s)?],
                Value::Array(items) => items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .ok_or_else(|| ContextError::InvalidContainer(item.to_string()))
                            .and_then(Container::parse)
                    })
                    .collect::<ContextResult<_>>()?,
                other => return Err(ContextError::InvalidContainer(other.to_string())),
            };
        }

        if let Some(type_value) = map.get("@type") {
            definition.type_mapping = match type_value {
                Value::String(s) => Some(match s.as_str() {
                    "@id" => TypeMapping::Id,
                    "@vocab" => TypeMapping::Vocab,
                    "@json" => TypeMapping::Json,
                    other => TypeMapping::Datatype(self.expand(term, other)?),
                }),
                Value::Null => None,
                _ => return Err(ContextError::InvalidTermDefinition(term.to_string())),
            };
        }

        definition.scoped_context = map.get("@context").cloned();

        Ok(definition)
    }

    /// Expand the IRI a term maps to
    fn expand(&mut self, term: &str, value: &str) -> ContextResult<String> {
        if is_keyword(value) {
            return Ok(value.to_string());
        }

        if let Some((prefix, suffix)) = split_compact(value) {
            if prefix != term && self.local.contains_key(prefix) {
                self.create(prefix)?;
            }
            if let Some(iri) = self.term_iri(prefix) {
                return Ok(format!("{}{}", iri, suffix));
            }
            return Ok(value.to_string());
        }

        if is_absolute(value) {
            return Ok(value.to_string());
        }

        if self.local.contains_key(value) {
            self.create(value)?;
        }
        if let Some(iri) = self.term_iri(value) {
            return Ok(iri);
        }

        match &self.active.vocab {
            Some(vocab) => Ok(format!("{}{}", vocab, value)),
            None => Err(ContextError::InvalidIriMapping(term.to_string())),
        }
    }

    /// IRI of an expanded term definition without `@id`
    fn default_iri(&mut self, term: &str) -> ContextResult<String> {
        if split_compact(term).is_some() || is_absolute(term) {
            return self.expand(term, term);
        }
        match &self.active.vocab {
            Some(vocab) => Ok(format!("{}{}", vocab, term)),
            None => Err(ContextError::InvalidIriMapping(term.to_string())),
        }
    }

    fn term_iri(&self, term: &str) -> Option<String> {
        self.active
            .terms
            .get(term)
            .and_then(|definition| definition.iri.clone())
            .filter(|iri| !is_keyword(iri))
    }
}
