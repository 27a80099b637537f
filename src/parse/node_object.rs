//! Node objects
//!
//! Every entry of a node object becomes a triple from the node's subject to
//! the entry value's term, joined with whatever pattern the value itself
//! contributes. Entries whose value may be absent or repeated (sets, graphs,
//! plain arrays) are attached as OPTIONAL so they never eliminate the node.

use super::graph_object::graph_members;
use super::list_object::list_items;
use super::{
    classify, keyword_key, nest_under_key, unexpected, ElementKind, ParseResult, ParseWarning,
    Parsed, Parser, ToParse, UNMAPPED_KEY,
};
use crate::algebra;
use crate::common::{is_placeholder, rdf_type};
use crate::context::{ActiveContext, Container, KeyResolution};
use crate::ir::IntermediateResult;
use crate::variable::{local_name, VariableRegistry};
use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;
use oxrdf::{NamedNode, Variable};
use serde_json::Value;
use spargebra::algebra::GraphPattern;
use spargebra::term::TermPattern;
use std::sync::Arc;
use tracing::trace;

pub(super) const DUPLICATE_ID: &str = "Duplicate @id entry ignored";
const UNSUPPORTED_TYPE: &str = "Unsupported @type value and ignored";
const INVALID_PREDICATE: &str = "Key does not expand to a valid IRI and was ignored";

/// How an `@id` value identifies its node
pub(super) enum Identifier {
    /// The placeholder: the node's variable is bound and projected
    Placeholder,
    /// A constant IRI
    Iri(NamedNode),
    /// Unusable; the node keeps its variable
    Invalid(&'static str),
}

/// Interpret an `@id` value, expanding it against the document base
pub(super) fn identify(ctx: &ActiveContext, id: &Value) -> Identifier {
    match id {
        _ if is_placeholder(id) => Identifier::Placeholder,
        Value::String(iri) => match ctx
            .expand_iri(iri, false)
            .and_then(|iri| NamedNode::new(iri).ok())
        {
            Some(node) => Identifier::Iri(node),
            None => Identifier::Invalid("@id could not be expanded to an IRI and was ignored"),
        },
        _ => Identifier::Invalid("@id values must be strings"),
    }
}

pub fn node_object<'a>(parser: &'a Parser, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
    async move {
        let ToParse {
            element,
            variable,
            ctx,
            ..
        } = to_parse;
        let object = element
            .as_object()
            .ok_or_else(|| unexpected("a node object", element))?;

        let ctx = parser.propagate(object.get("@context"), &ctx).await?;
        trace!("Parsing node object bound to {}", variable);

        let id_key = keyword_key(&ctx, object, "@id");
        let mut identifier = id_key.and_then(|key| object.get(key)).map(|id| identify(&ctx, id));
        let subject: TermPattern = match &identifier {
            Some(Identifier::Iri(node)) => node.clone().into(),
            _ => variable.clone().into(),
        };

        let mut node = NodeBuilder::new(subject);
        let mut registry = VariableRegistry::new();

        for (key, value) in object {
            let (iri, reverse) = match ctx.expand_key(key) {
                KeyResolution::Iri(iri) => (iri, false),
                KeyResolution::Reverse(iri) => (iri, true),
                KeyResolution::Unmapped => {
                    node.warn(key, value, UNMAPPED_KEY);
                    continue;
                }
                KeyResolution::Keyword(keyword) => {
                    match keyword.as_str() {
                        "@context" => node.pass_through(key, value),
                        "@id" if Some(key) == id_key => match identifier.take() {
                            Some(Identifier::Placeholder) => {
                                node.projections.push(variable.clone());
                                node.entries.insert(
                                    key.clone(),
                                    IntermediateResult::name_placeholder(variable.clone()),
                                );
                            }
                            Some(Identifier::Invalid(message)) => node.warn(key, value, message),
                            _ => node.pass_through(key, value),
                        },
                        "@id" => node.warn(key, value, DUPLICATE_ID),
                        "@type" => {
                            let child = parser.naming.under(&variable, &registry.claim("type"));
                            node.type_entry(key, value, child, &ctx);
                        }
                        other => {
                            node.warn(key, value, format!("{} entries are not yet supported", other))
                        }
                    }
                    continue;
                }
            };

            let child = parser.naming.under(&variable, &registry.claim(local_name(&iri)));
            let property = Property { key, iri, reverse };
            node.property_entry(parser, property, value, child, &ctx).await?;
        }

        Ok(node.finish())
    }
    .boxed()
}

/// A key resolved to a property IRI
struct Property<'k> {
    key: &'k str,
    iri: String,
    reverse: bool,
}

/// Accumulates the parts of one node object, in entry order
struct NodeBuilder {
    subject: TermPattern,
    entries: IndexMap<String, IntermediateResult>,
    required: Vec<GraphPattern>,
    optional: Vec<GraphPattern>,
    projections: Vec<Variable>,
    warnings: Vec<ParseWarning>,
}

impl NodeBuilder {
    fn new(subject: TermPattern) -> Self {
        Self {
            subject,
            entries: IndexMap::new(),
            required: Vec::new(),
            optional: Vec::new(),
            projections: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn pass_through(&mut self, key: &str, value: &Value) {
        self.entries
            .insert(key.to_string(), IntermediateResult::native_value(value.clone()));
    }

    fn warn(&mut self, key: &str, value: &Value, message: impl Into<String>) {
        self.warnings.push(ParseWarning::new(message).at([key]));
        self.pass_through(key, value);
    }

    fn type_entry(&mut self, key: &str, value: &Value, child: Variable, ctx: &ActiveContext) {
        let class = |value: &str| {
            ctx.expand_iri(value, true)
                .and_then(|iri| NamedNode::new(iri).ok())
        };

        match value {
            _ if is_placeholder(value) => {
                self.required.push(algebra::bgp(vec![algebra::triple(
                    self.subject.clone(),
                    rdf_type(),
                    child.clone(),
                )]));
                self.projections.push(child.clone());
                self.entries
                    .insert(key.to_string(), IntermediateResult::name_placeholder(child));
            }
            Value::String(s) => match class(s) {
                Some(class) => {
                    self.required.push(algebra::bgp(vec![algebra::triple(
                        self.subject.clone(),
                        rdf_type(),
                        class,
                    )]));
                    self.pass_through(key, value);
                }
                None => self.warn(key, value, UNSUPPORTED_TYPE),
            },
            Value::Array(items) if items.len() == 1 && is_placeholder(&items[0]) => {
                self.optional.push(algebra::bgp(vec![algebra::triple(
                    self.subject.clone(),
                    rdf_type(),
                    child.clone(),
                )]));
                self.projections.push(child.clone());
                self.entries.insert(
                    key.to_string(),
                    IntermediateResult::array(child.clone(), IntermediateResult::name_placeholder(child)),
                );
            }
            Value::Array(items) => {
                let classes: Option<Vec<NamedNode>> = items
                    .iter()
                    .map(|item| item.as_str().filter(|_| !is_placeholder(item)).and_then(class))
                    .collect();
                match classes {
                    Some(classes) => {
                        let subject = self.subject.clone();
                        self.required.push(algebra::bgp(
                            classes
                                .into_iter()
                                .map(|class| algebra::triple(subject.clone(), rdf_type(), class))
                                .collect(),
                        ));
                        self.pass_through(key, value);
                    }
                    None => self.warn(key, value, UNSUPPORTED_TYPE),
                }
            }
            _ => self.warn(key, value, UNSUPPORTED_TYPE),
        }
    }

    async fn property_entry(
        &mut self,
        parser: &Parser,
        property: Property<'_>,
        value: &Value,
        child: Variable,
        ctx: &Arc<ActiveContext>,
    ) -> ParseResult<()> {
        let Property { key, iri, reverse } = property;
        let definition = ctx.term(key);

        if let Some(kind) = definition
            .and_then(|d| d.map_container())
            .and_then(|c| c.map_kind())
        {
            self.warn(key, value, format!("{} maps are not yet supported", kind));
            return Ok(());
        }

        let predicate = match NamedNode::new(iri) {
            Ok(predicate) => predicate,
            Err(_) => {
                self.warn(key, value, INVALID_PREDICATE);
                return Ok(());
            }
        };

        let child_ctx = parser
            .propagate(definition.and_then(|d| d.scoped_context.as_ref()), ctx)
            .await?;
        let has = |container| definition.map_or(false, |d| d.has_container(container));
        let kind = classify(&child_ctx, value);

        let parsed = if has(Container::Graph) && !matches!(kind, ElementKind::GraphObject | ElementKind::Null) {
            let members = graph_members(parser, value, &child, &child_ctx).await?;
            Parsed {
                term: child.clone().into(),
                operation: algebra::graph(child.clone(), members.operation),
                ..members
            }
        } else if has(Container::List) && !matches!(kind, ElementKind::ListObject | ElementKind::Null) {
            list_items(parser, value, &child, &child_ctx).await?
        } else {
            parser
                .iri_entry_value(
                    ToParse::new(value, child.clone(), child_ctx)
                        .with_coercion(definition.and_then(|d| d.type_mapping.clone())),
                )
                .await?
        };

        let optional = !has(Container::List)
            && (has(Container::Set) || has(Container::Graph) || kind == ElementKind::Array);

        if kind != ElementKind::Null {
            let triple = if reverse {
                algebra::triple(parsed.term.clone(), predicate, self.subject.clone())
            } else {
                algebra::triple(self.subject.clone(), predicate, parsed.term.clone())
            };
            let fragment = algebra::join([algebra::bgp(vec![triple]), parsed.operation]);
            if optional {
                self.optional.push(fragment);
            } else {
                self.required.push(fragment);
            }
        }

        self.entries.insert(key.to_string(), parsed.intermediate_result);
        self.projections.extend(parsed.projections);
        self.warnings.extend(nest_under_key(key, parsed.warnings));
        Ok(())
    }

    /// Required fragments are joined first; each optional fragment then
    /// extends the result as a left join, in entry order.
    fn finish(self) -> Parsed {
        let required = algebra::join(self.required);
        let operation = self
            .optional
            .into_iter()
            .fold(required, algebra::left_join);

        Parsed {
            term: self.subject,
            intermediate_result: IntermediateResult::Object {
                entries: self.entries,
            },
            operation,
            projections: self.projections,
            warnings: self.warnings,
        }
    }
}
