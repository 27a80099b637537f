//! Dispatch of an IRI-keyed entry's value to the production for its shape

use super::node_object_array::plural;
use super::{keyword_key, ParseResult, ParseWarning, Parsed, Parser, ToParse, NULL_UNSUPPORTED};
use crate::context::ActiveContext;
use crate::ir::IntermediateResult;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

/// Shape of a JSON-LD element, as far as dispatch is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Null,
    Primitive,
    GraphObject,
    ValueObject,
    ListObject,
    SetObject,
    NodeObject,
    Array,
}

/// Classify an element. Objects are recognized by their first matching
/// keyword in the order `@graph`, `@value`, `@list`, `@set`, spelled out or
/// through an alias defined in `ctx`.
pub fn classify(ctx: &ActiveContext, element: &Value) -> ElementKind {
    match element {
        Value::Null => ElementKind::Null,
        Value::Bool(_) | Value::Number(_) | Value::String(_) => ElementKind::Primitive,
        Value::Array(_) => ElementKind::Array,
        Value::Object(object) => {
            let has = |keyword| keyword_key(ctx, object, keyword).is_some();
            if has("@graph") {
                ElementKind::GraphObject
            } else if has("@value") {
                ElementKind::ValueObject
            } else if has("@list") {
                ElementKind::ListObject
            } else if has("@set") {
                ElementKind::SetObject
            } else {
                ElementKind::NodeObject
            }
        }
    }
}

pub fn iri_entry_value<'a>(
    parser: &'a Parser,
    to_parse: ToParse<'a>,
) -> BoxFuture<'a, ParseResult<Parsed>> {
    async move {
        let element = to_parse.element;
        // Aliases may come from the element's own context
        let kind = match element.get("@context") {
            Some(local) => classify(&*parser.propagate(Some(local), &to_parse.ctx).await?, element),
            None => classify(&to_parse.ctx, element),
        };
        match kind {
            ElementKind::Null => Ok(Parsed::new(
                to_parse.variable,
                IntermediateResult::native_value(Value::Null),
            )
            .with_warning(ParseWarning::new(NULL_UNSUPPORTED))),
            ElementKind::Primitive => parser.primitive(to_parse).await,
            ElementKind::GraphObject => parser.graph_object(to_parse).await,
            ElementKind::ValueObject => parser.value_object(to_parse).await,
            ElementKind::ListObject => parser.list_object(to_parse).await,
            ElementKind::SetObject => parser.set_object(to_parse).await,
            ElementKind::NodeObject => parser.node_object(to_parse).await,
            ElementKind::Array => {
                let items = element.as_array().map(Vec::as_slice).unwrap_or_default();
                plural(parser, to_parse, items, parser.iri_entry_value).await
            }
        }
    }
    .boxed()
}
