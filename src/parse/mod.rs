//! Recursive JSON-LD query parsing
//!
//! Each JSON-LD construct has one production. A production takes a
//! [`ToParse`] (the element, the variable it binds to and the active context)
//! and returns a [`Parsed`] record carrying the element's term, its
//! intermediate result, the graph pattern it contributes, the variables to
//! project and any warnings.
//!
//! Productions never call each other directly: they go through the
//! [`Parser`] table, so any single production can be replaced for testing or
//! composition:
//!
//! ```rust,ignore
//! let parser = Parser {
//!     set_object: my_set_object,
//!     ..Parser::default()
//! };
//! ```

mod document;
mod graph_object;
mod iri_entry_value;
mod list_object;
mod node_object;
mod node_object_array;
mod primitive;
mod set_object;
mod top_level_graph_container;
mod value_object;

pub use document::document;
pub use graph_object::graph_object;
pub use iri_entry_value::{classify, iri_entry_value, ElementKind};
pub use list_object::list_object;
pub use node_object::node_object;
pub use node_object_array::node_object_array;
pub use primitive::primitive;
pub use set_object::set_object;
pub use top_level_graph_container::top_level_graph_container;
pub use value_object::value_object;

use crate::algebra;
use crate::context::{
    propagate_context, ActiveContext, ContextError, ContextLoader, KeyResolution,
    NoRemoteContexts, TypeMapping,
};
use crate::ir::IntermediateResult;
use crate::variable::VariableNaming;
use futures::future::BoxFuture;
use oxrdf::Variable;
use serde::Serialize;
use serde_json::Value;
use spargebra::algebra::GraphPattern;
use spargebra::term::TermPattern;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const UNMAPPED_KEY: &str = "Key not defined by context and ignored";
pub const NULL_UNSUPPORTED: &str = "null values are not yet supported";
pub const SET_UNSUPPORTED: &str = "Set objects are not yet supported";

/// Fatal parse errors; any of these aborts the whole translation
#[derive(Error, Debug)]
pub enum ParseError {
    /// A `@context` could not be processed
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    /// The document is not shaped like a JSON-LD document
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A production was handed an element it cannot parse
    #[error("Expected {expected}, found {found}")]
    UnexpectedElement {
        expected: &'static str,
        found: &'static str,
    },
}

pub type ParseResult<T> = Result<T, ParseError>;

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn unexpected(expected: &'static str, found: &Value) -> ParseError {
    ParseError::UnexpectedElement {
        expected,
        found: json_kind(found),
    }
}

/// Key of the first entry of `object` naming `keyword`, directly or through
/// an alias defined in `ctx`
pub(crate) fn keyword_key<'v>(
    ctx: &ActiveContext,
    object: &'v serde_json::Map<String, Value>,
    keyword: &str,
) -> Option<&'v String> {
    object
        .keys()
        .find(|key| matches!(ctx.expand_key(key), KeyResolution::Keyword(k) if k == keyword))
}

/// Object IR mirroring `object`, with `ir` under `key` and every other entry
/// carried verbatim
pub(crate) fn wrap_entry(
    object: &serde_json::Map<String, Value>,
    key: &str,
    ir: IntermediateResult,
) -> IntermediateResult {
    let mut ir = Some(ir);
    IntermediateResult::object(object.iter().map(|(k, value)| {
        let entry = match ir.take() {
            Some(found) if k == key => found,
            other => {
                ir = other;
                IntermediateResult::native_value(value.clone())
            }
        };
        (k.clone(), entry)
    }))
}

/// One step of a warning's location in the source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A non-fatal diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    pub message: String,
    pub path: Vec<PathSegment>,
}

impl ParseWarning {
    /// Warning about the element being parsed itself
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }

    /// Locate the warning relative to the element being parsed
    pub fn at<S: Into<PathSegment>>(mut self, path: impl IntoIterator<Item = S>) -> Self {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    fn nested(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.path.iter().map(ToString::to_string).collect();
        write!(f, "{} (at /{})", self.message, path.join("/"))
    }
}

/// Prefix every warning's path with an object key
pub fn nest_under_key(key: &str, warnings: Vec<ParseWarning>) -> Vec<ParseWarning> {
    warnings
        .into_iter()
        .map(|w| w.nested(PathSegment::Key(key.to_string())))
        .collect()
}

/// Prefix every warning's path with an array index
pub fn nest_under_index(index: usize, warnings: Vec<ParseWarning>) -> Vec<ParseWarning> {
    warnings
        .into_iter()
        .map(|w| w.nested(PathSegment::Index(index)))
        .collect()
}

/// Input of a production
#[derive(Debug, Clone)]
pub struct ToParse<'a> {
    /// The JSON value being interpreted
    pub element: &'a Value,
    /// The variable designating the RDF term this element binds to
    pub variable: Variable,
    /// The active context
    pub ctx: Arc<ActiveContext>,
    /// Type coercion declared by the term owning this value
    pub coercion: Option<TypeMapping>,
}

impl<'a> ToParse<'a> {
    pub fn new(element: &'a Value, variable: Variable, ctx: Arc<ActiveContext>) -> Self {
        Self {
            element,
            variable,
            ctx,
            coercion: None,
        }
    }

    pub fn with_coercion(mut self, coercion: Option<TypeMapping>) -> Self {
        self.coercion = coercion;
        self
    }
}

/// Output of a production
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    /// The RDF term the element parsed to
    pub term: TermPattern,
    /// The element's intermediate result
    pub intermediate_result: IntermediateResult,
    /// The graph pattern the element contributes
    pub operation: GraphPattern,
    /// Variables the final query must project
    pub projections: Vec<Variable>,
    /// Diagnostics, paths relative to the element
    pub warnings: Vec<ParseWarning>,
}

impl Parsed {
    /// A result contributing no pattern, projections or warnings
    pub fn new(term: impl Into<TermPattern>, intermediate_result: IntermediateResult) -> Self {
        Self {
            term: term.into(),
            intermediate_result,
            operation: algebra::empty(),
            projections: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: GraphPattern) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_projection(mut self, variable: Variable) -> Self {
        self.projections.push(variable);
        self
    }

    pub fn with_warning(mut self, warning: ParseWarning) -> Self {
        self.warnings.push(warning);
        self
    }
}

/// A production: one recursive step of the parser
pub type Production = for<'a> fn(&'a Parser, ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>>;

/// Names of the replaceable productions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionKind {
    Document,
    NodeObject,
    NodeObjectArray,
    TopLevelGraphContainer,
    GraphObject,
    ValueObject,
    ListObject,
    SetObject,
    IriEntryValue,
    Primitive,
}

/// The production table plus the collaborators productions share
#[derive(Clone)]
pub struct Parser {
    pub document: Production,
    pub node_object: Production,
    pub node_object_array: Production,
    pub top_level_graph_container: Production,
    pub graph_object: Production,
    pub value_object: Production,
    pub list_object: Production,
    pub set_object: Production,
    pub iri_entry_value: Production,
    pub primitive: Production,
    /// Loader for remote `@context` documents
    pub loader: Arc<dyn ContextLoader>,
    /// Variable naming scheme
    pub naming: VariableNaming,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            document,
            node_object,
            node_object_array,
            top_level_graph_container,
            graph_object,
            value_object,
            list_object,
            set_object,
            iri_entry_value,
            primitive,
            loader: Arc::new(NoRemoteContexts),
            naming: VariableNaming::default(),
        }
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("naming", &self.naming)
            .finish_non_exhaustive()
    }
}

impl Parser {
    /// Replace a single production
    pub fn with(mut self, kind: ProductionKind, production: Production) -> Self {
        let slot = match kind {
            ProductionKind::Document => &mut self.document,
            ProductionKind::NodeObject => &mut self.node_object,
            ProductionKind::NodeObjectArray => &mut self.node_object_array,
            ProductionKind::TopLevelGraphContainer => &mut self.top_level_graph_container,
            ProductionKind::GraphObject => &mut self.graph_object,
            ProductionKind::ValueObject => &mut self.value_object,
            ProductionKind::ListObject => &mut self.list_object,
            ProductionKind::SetObject => &mut self.set_object,
            ProductionKind::IriEntryValue => &mut self.iri_entry_value,
            ProductionKind::Primitive => &mut self.primitive,
        };
        *slot = production;
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn ContextLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_naming(mut self, naming: VariableNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn document<'a>(&'a self, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
        (self.document)(self, to_parse)
    }

    pub fn node_object<'a>(&'a self, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
        (self.node_object)(self, to_parse)
    }

    pub fn node_object_array<'a>(
        &'a self,
        to_parse: ToParse<'a>,
    ) -> BoxFuture<'a, ParseResult<Parsed>> {
        (self.node_object_array)(self, to_parse)
    }

    pub fn top_level_graph_container<'a>(
        &'a self,
        to_parse: ToParse<'a>,
    ) -> BoxFuture<'a, ParseResult<Parsed>> {
        (self.top_level_graph_container)(self, to_parse)
    }

    pub fn graph_object<'a>(&'a self, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
        (self.graph_object)(self, to_parse)
    }

    pub fn value_object<'a>(&'a self, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
        (self.value_object)(self, to_parse)
    }

    pub fn list_object<'a>(&'a self, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
        (self.list_object)(self, to_parse)
    }

    pub fn set_object<'a>(&'a self, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
        (self.set_object)(self, to_parse)
    }

    pub fn iri_entry_value<'a>(
        &'a self,
        to_parse: ToParse<'a>,
    ) -> BoxFuture<'a, ParseResult<Parsed>> {
        (self.iri_entry_value)(self, to_parse)
    }

    pub fn primitive<'a>(&'a self, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
        (self.primitive)(self, to_parse)
    }

    /// Enter a nested `@context`, if any
    pub async fn propagate(
        &self,
        child: Option<&Value>,
        parent: &Arc<ActiveContext>,
    ) -> ParseResult<Arc<ActiveContext>> {
        Ok(propagate_context(child, parent, self.loader.as_ref()).await?)
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use serde_json::Value;

    pub fn variable() -> Variable {
        Variable::new_unchecked("thing")
    }

    pub async fn context(definition: Value) -> Arc<ActiveContext> {
        Arc::new(
            ActiveContext::new()
                .process(&definition, &NoRemoteContexts)
                .await
                .unwrap(),
        )
    }

    pub fn empty_context() -> Arc<ActiveContext> {
        Arc::new(ActiveContext::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_keyword_key_follows_aliases() {
        let ctx = test_util::context(json!({ "id": "@id", "graph": "@graph" })).await;
        let object = json!({ "name": "?", "id": "?", "graph": [] });
        let object = object.as_object().unwrap();

        assert_eq!(keyword_key(&ctx, object, "@id").map(String::as_str), Some("id"));
        assert_eq!(keyword_key(&ctx, object, "@graph").map(String::as_str), Some("graph"));
        assert_eq!(keyword_key(&ctx, object, "@value"), None);

        let plain = json!({ "@id": "?" });
        assert_eq!(
            keyword_key(&ActiveContext::new(), plain.as_object().unwrap(), "@id").map(String::as_str),
            Some("@id")
        );
    }

    #[test]
    fn test_nesting_warnings() {
        let warnings = vec![ParseWarning::new(UNMAPPED_KEY).at(["title"])];
        let nested = nest_under_key("films", nest_under_index(0, warnings));
        assert_eq!(
            nested,
            vec![ParseWarning::new(UNMAPPED_KEY).at([
                PathSegment::from("films"),
                PathSegment::from(0usize),
                PathSegment::from("title"),
            ])]
        );
        assert_eq!(
            nested[0].to_string(),
            "Key not defined by context and ignored (at /films/0/title)"
        );
    }

    #[test]
    fn test_warning_serialization() {
        let warning = ParseWarning::new(UNMAPPED_KEY)
            .at([PathSegment::from(0usize), PathSegment::from("vehicles")]);
        assert_eq!(
            serde_json::to_value(&warning).unwrap(),
            json!({ "message": UNMAPPED_KEY, "path": [0, "vehicles"] })
        );
    }

    #[test]
    fn test_parsed_defaults() {
        let variable = test_util::variable();
        let parsed = Parsed::new(
            variable.clone(),
            IntermediateResult::native_placeholder(variable.clone()),
        );
        assert!(algebra::is_empty(&parsed.operation));
        assert!(parsed.projections.is_empty());
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.term, TermPattern::Variable(variable));
    }

    fn stub_set_object<'a>(
        _parser: &'a Parser,
        to_parse: ToParse<'a>,
    ) -> BoxFuture<'a, ParseResult<Parsed>> {
        use futures::FutureExt;
        async move {
            Ok(Parsed::new(
                to_parse.variable.clone(),
                IntermediateResult::native_value("stubbed"),
            ))
        }
        .boxed()
    }

    #[tokio::test]
    async fn test_override_production() {
        let parser = Parser::default().with(ProductionKind::SetObject, stub_set_object);
        let element = json!({ "@set": [] });

        let parsed = parser
            .iri_entry_value(ToParse::new(
                &element,
                test_util::variable(),
                test_util::empty_context(),
            ))
            .await
            .unwrap();
        assert_eq!(
            parsed.intermediate_result,
            IntermediateResult::native_value("stubbed")
        );

        let inherited = Parser {
            set_object: stub_set_object,
            ..Parser::default()
        };
        let parsed = inherited
            .iri_entry_value(ToParse::new(
                &element,
                test_util::variable(),
                test_util::empty_context(),
            ))
            .await
            .unwrap();
        assert!(parsed.warnings.is_empty());
    }
}
