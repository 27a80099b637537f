//! Arrays of node objects, and plural values in general
//!
//! Items are assumed homogeneous, so the template is parsed once from the
//! first item and bound to the array's own variable.

use super::{
    json_kind, nest_under_index, unexpected, ParseError, ParseResult, Parsed, Parser, Production,
    ToParse,
};
use crate::ir::IntermediateResult;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use spargebra::term::TermPattern;

pub fn node_object_array<'a>(
    parser: &'a Parser,
    to_parse: ToParse<'a>,
) -> BoxFuture<'a, ParseResult<Parsed>> {
    async move {
        let element = to_parse.element;
        let items = element
            .as_array()
            .ok_or_else(|| unexpected("an array of node objects", element))?;

        if let Some(item) = items.iter().find(|item| !item.is_object()) {
            return Err(ParseError::InvalidDocument(format!(
                "Expected an array of node objects, found {}",
                json_kind(item)
            )));
        }

        plural(parser, to_parse, items, parser.node_object).await
    }
    .boxed()
}

/// Parse `items` as a container of `production` values bound to the
/// variable of `to_parse`.
pub(super) async fn plural<'a>(
    parser: &'a Parser,
    to_parse: ToParse<'a>,
    items: &'a [Value],
    production: Production,
) -> ParseResult<Parsed> {
    let first = match items.first() {
        Some(first) => first,
        None => {
            return Ok(Parsed::new(
                to_parse.variable,
                IntermediateResult::native_value(Value::Array(Vec::new())),
            ))
        }
    };

    let variable = to_parse.variable.clone();
    let template = production(
        parser,
        ToParse {
            element: first,
            ..to_parse
        },
    )
    .await?;

    // Constant items leave the array's variable unbound
    let mut projections = Vec::with_capacity(template.projections.len() + 1);
    if template.term == TermPattern::Variable(variable.clone()) {
        projections.push(variable.clone());
    }
    projections.extend(template.projections);

    Ok(Parsed {
        term: template.term,
        intermediate_result: IntermediateResult::array(variable, template.intermediate_result),
        operation: template.operation,
        projections,
        warnings: nest_under_index(0, template.warnings),
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{context, empty_context, variable};
    use super::super::{ParseWarning, PathSegment, UNMAPPED_KEY};
    use super::*;
    use crate::algebra;
    use oxrdf::{NamedNode, Variable};
    use serde_json::json;

    #[tokio::test]
    async fn test_array_template_from_first_item() {
        let ctx = context(json!({ "@vocab": "http://swapi.dev/documentation#" })).await;
        let element = json!([{ "name": "?" }, { "name": "?" }]);
        let parsed = node_object_array(&Parser::default(), ToParse::new(&element, variable(), ctx))
            .await
            .unwrap();

        let name = Variable::new_unchecked("thing·name");
        assert_eq!(
            parsed.intermediate_result,
            IntermediateResult::array(
                variable(),
                IntermediateResult::object([(
                    "name",
                    IntermediateResult::native_placeholder(name.clone())
                )])
            )
        );
        assert_eq!(parsed.projections, vec![variable(), name.clone()]);
        assert_eq!(
            parsed.operation,
            algebra::bgp(vec![algebra::triple(
                variable(),
                NamedNode::new_unchecked("http://swapi.dev/documentation#name"),
                name
            )])
        );
    }

    #[tokio::test]
    async fn test_constant_items_do_not_project_the_array() {
        let ctx = context(json!({ "@vocab": "http://swapi.dev/documentation#" })).await;
        let element = json!([{ "@id": "https://swapi.dev/api/people/1/", "name": "?" }]);
        let parsed = node_object_array(&Parser::default(), ToParse::new(&element, variable(), ctx))
            .await
            .unwrap();

        assert_eq!(
            parsed.term,
            TermPattern::NamedNode(NamedNode::new_unchecked("https://swapi.dev/api/people/1/"))
        );
        assert_eq!(parsed.projections, vec![Variable::new_unchecked("thing·name")]);

        let element = json!(["A New Hope"]);
        let parsed = plural(
            &Parser::default(),
            ToParse::new(&element, variable(), empty_context()),
            element.as_array().map(Vec::as_slice).unwrap_or_default(),
            Parser::default().primitive,
        )
        .await
        .unwrap();
        assert!(parsed.projections.is_empty());
    }

    #[tokio::test]
    async fn test_empty_array() {
        let element = json!([]);
        let parsed = node_object_array(
            &Parser::default(),
            ToParse::new(&element, variable(), empty_context()),
        )
        .await
        .unwrap();
        assert_eq!(parsed.intermediate_result, IntermediateResult::native_value(json!([])));
        assert!(algebra::is_empty(&parsed.operation));
        assert!(parsed.projections.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_non_objects() {
        let element = json!([{ "name": "?" }, "Luke"]);
        let result = node_object_array(
            &Parser::default(),
            ToParse::new(&element, variable(), empty_context()),
        )
        .await;
        assert!(matches!(result, Err(ParseError::InvalidDocument(_))));
    }

    #[tokio::test]
    async fn test_warnings_are_indexed() {
        let element = json!([{ "name": "?" }]);
        let parsed = node_object_array(
            &Parser::default(),
            ToParse::new(&element, variable(), empty_context()),
        )
        .await
        .unwrap();
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::new(UNMAPPED_KEY).at([PathSegment::from(0usize), PathSegment::from("name")])]
        );
    }
}
