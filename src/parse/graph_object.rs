//! Graph objects (`{"@id"?: ..., "@graph": ...}`)

use super::node_object::{identify, Identifier, DUPLICATE_ID};
use super::node_object_array::plural;
use super::{keyword_key, nest_under_key, unexpected, ParseResult, ParseWarning, Parsed, Parser, ToParse};
use crate::algebra;
use crate::common::is_placeholder;
use crate::context::{ActiveContext, KeyResolution};
use crate::ir::IntermediateResult;
use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;
use oxrdf::Variable;
use serde_json::Value;
use spargebra::term::{NamedNodePattern, TermPattern};
use std::sync::Arc;

const MEMBER: &str = "item";
pub(super) const NOT_NODE_OBJECTS: &str = "Graph containers must hold node objects";

/// A named graph whose members are node objects.
///
/// The graph is named by `@id`: a constant, the placeholder (binding the
/// element's variable) or, when absent, the element's variable.
pub fn graph_object<'a>(parser: &'a Parser, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
    async move {
        let ToParse {
            element,
            variable,
            ctx,
            ..
        } = to_parse;
        let object = element
            .as_object()
            .ok_or_else(|| unexpected("a graph object", element))?;

        let ctx = parser.propagate(object.get("@context"), &ctx).await?;
        let graph_key = keyword_key(&ctx, object, "@graph")
            .ok_or_else(|| unexpected("a graph object", element))?;
        let id_key = keyword_key(&ctx, object, "@id");

        let mut warnings = Vec::new();
        let mut projections = Vec::new();
        let mut entries = IndexMap::with_capacity(object.len());
        let mut name = NamedNodePattern::Variable(variable.clone());
        let mut id_warning = None;

        if let Some(key) = id_key {
            match identify(&ctx, &object[key]) {
                Identifier::Placeholder => projections.push(variable.clone()),
                Identifier::Iri(node) => name = NamedNodePattern::NamedNode(node),
                Identifier::Invalid(message) => id_warning = Some(ParseWarning::new(message)),
            }
        }

        let parsed_members = graph_members(parser, &object[graph_key], &variable, &ctx).await?;
        let mut member_warnings = Some(parsed_members.warnings);

        for (key, value) in object {
            let ir = if key == graph_key {
                warnings.extend(nest_under_key(key, member_warnings.take().unwrap_or_default()));
                parsed_members.intermediate_result.clone()
            } else if Some(key) == id_key {
                warnings.extend(id_warning.take().map(|w| w.at([key.as_str()])));
                if is_placeholder(value) {
                    IntermediateResult::name_placeholder(variable.clone())
                } else {
                    IntermediateResult::native_value(value.clone())
                }
            } else {
                match ctx.expand_key(key) {
                    KeyResolution::Keyword(keyword) if keyword == "@context" => {}
                    KeyResolution::Keyword(keyword) if keyword == "@id" => {
                        warnings.push(ParseWarning::new(DUPLICATE_ID).at([key.as_str()]))
                    }
                    _ => warnings.push(
                        ParseWarning::new(format!("{} entries are not yet supported", key))
                            .at([key.as_str()]),
                    ),
                }
                IntermediateResult::native_value(value.clone())
            };
            entries.insert(key.clone(), ir);
        }

        projections.extend(parsed_members.projections);

        let term = match &name {
            NamedNodePattern::NamedNode(node) => TermPattern::NamedNode(node.clone()),
            NamedNodePattern::Variable(variable) => TermPattern::Variable(variable.clone()),
        };

        Ok(Parsed {
            term,
            intermediate_result: IntermediateResult::Object { entries },
            operation: algebra::graph(name, parsed_members.operation),
            projections,
            warnings,
        })
    }
    .boxed()
}

/// Parse the members of a graph bound to `variable`.
///
/// Members bind to a member variable under `variable`. The returned pattern
/// is not yet wrapped in `GRAPH`; warnings are relative to `members`.
pub(super) async fn graph_members(
    parser: &Parser,
    members: &Value,
    variable: &Variable,
    ctx: &Arc<ActiveContext>,
) -> ParseResult<Parsed> {
    let member = parser.naming.under(variable, MEMBER);

    match members {
        Value::Array(items) if items.iter().all(Value::is_object) => {
            plural(
                parser,
                ToParse::new(members, member, Arc::clone(ctx)),
                items,
                parser.node_object,
            )
            .await
        }
        Value::Object(_) => {
            parser
                .node_object(ToParse::new(members, member, Arc::clone(ctx)))
                .await
        }
        other => Ok(Parsed::new(member, IntermediateResult::native_value(other.clone()))
            .with_warning(ParseWarning::new(NOT_NODE_OBJECTS))),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{context, variable};
    use super::*;
    use oxrdf::NamedNode;
    use serde_json::json;
    use spargebra::algebra::GraphPattern;

    async fn parse(element: &Value) -> Parsed {
        let ctx = context(json!({ "@vocab": "http://swapi.dev/documentation#" })).await;
        graph_object(&Parser::default(), ToParse::new(element, variable(), ctx))
            .await
            .unwrap()
    }

    fn name() -> NamedNode {
        NamedNode::new_unchecked("http://swapi.dev/documentation#name")
    }

    #[tokio::test]
    async fn test_default_graph_name() {
        let parsed = parse(&json!({ "@graph": { "name": "?" } })).await;
        let member = Variable::new_unchecked("thing·item");
        let member_name = Variable::new_unchecked("thing·item·name");

        assert_eq!(parsed.term, TermPattern::Variable(variable()));
        assert_eq!(
            parsed.operation,
            algebra::graph(
                variable(),
                algebra::bgp(vec![algebra::triple(member, name(), member_name.clone())])
            )
        );
        assert_eq!(parsed.projections, vec![member_name.clone()]);
        assert_eq!(
            parsed.intermediate_result,
            IntermediateResult::object([(
                "@graph",
                IntermediateResult::object([(
                    "name",
                    IntermediateResult::native_placeholder(member_name)
                )])
            )])
        );
    }

    #[tokio::test]
    async fn test_named_graph() {
        let parsed = parse(&json!({
            "@id": "http://swapi.dev/graphs/films",
            "@graph": [{ "name": "?" }]
        }))
        .await;
        let graph = NamedNode::new_unchecked("http://swapi.dev/graphs/films");
        let member = Variable::new_unchecked("thing·item");

        assert_eq!(parsed.term, TermPattern::NamedNode(graph.clone()));
        match &parsed.operation {
            GraphPattern::Graph { name, .. } => {
                assert_eq!(name, &NamedNodePattern::NamedNode(graph))
            }
            other => panic!("Expected graph pattern, got {:?}", other),
        }
        assert_eq!(parsed.projections[0], member);
        assert!(matches!(
            parsed.intermediate_result,
            IntermediateResult::Object { ref entries }
                if matches!(entries.get("@graph"), Some(IntermediateResult::Array { .. }))
        ));
    }

    #[tokio::test]
    async fn test_placeholder_graph_name() {
        let parsed = parse(&json!({ "@id": "?", "@graph": [] })).await;
        assert_eq!(parsed.projections, vec![variable()]);
        assert_eq!(
            parsed.intermediate_result,
            IntermediateResult::object([
                ("@id", IntermediateResult::name_placeholder(variable())),
                ("@graph", IntermediateResult::native_value(json!([]))),
            ])
        );
    }

    #[tokio::test]
    async fn test_unsupported_entries_and_members() {
        let parsed = parse(&json!({ "@graph": "nothing", "@index": "a" })).await;
        assert_eq!(
            parsed.warnings,
            vec![
                ParseWarning::new(NOT_NODE_OBJECTS).at(["@graph"]),
                ParseWarning::new("@index entries are not yet supported").at(["@index"]),
            ]
        );
    }

    #[tokio::test]
    async fn test_aliased_keywords_name_the_graph() {
        let ctx = context(json!({
            "@vocab": "http://swapi.dev/documentation#",
            "id": "@id",
            "graph": "@graph"
        }))
        .await;
        let element = json!({ "id": "https://swapi.dev/graphs/films", "graph": [{ "name": "?" }] });
        let parsed = graph_object(&Parser::default(), ToParse::new(&element, variable(), ctx))
            .await
            .unwrap();
        let graph = NamedNode::new_unchecked("https://swapi.dev/graphs/films");

        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.term, TermPattern::NamedNode(graph.clone()));
        match &parsed.operation {
            GraphPattern::Graph { name, .. } => {
                assert_eq!(name, &NamedNodePattern::NamedNode(graph))
            }
            other => panic!("Expected graph pattern, got {:?}", other),
        }
        match &parsed.intermediate_result {
            IntermediateResult::Object { entries } => {
                assert_eq!(
                    entries.get("id"),
                    Some(&IntermediateResult::native_value("https://swapi.dev/graphs/films"))
                );
                assert!(matches!(entries.get("graph"), Some(IntermediateResult::Array { .. })));
            }
            other => panic!("Expected object, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_id_warns() {
        let ctx = context(json!({ "@vocab": "http://swapi.dev/documentation#", "id": "@id" })).await;
        let element = json!({ "@id": "?", "id": "?", "@graph": [] });
        let parsed = graph_object(&Parser::default(), ToParse::new(&element, variable(), ctx))
            .await
            .unwrap();
        assert_eq!(parsed.projections, vec![variable()]);
        assert_eq!(parsed.warnings, vec![ParseWarning::new(DUPLICATE_ID).at(["id"])]);
    }
}
