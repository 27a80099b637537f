//! Entry point of the recursion

use super::{json_kind, keyword_key, ParseError, ParseResult, Parsed, Parser, ToParse};
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

/// Dispatch a whole document by its shape
pub fn document<'a>(parser: &'a Parser, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
    async move {
        let element = to_parse.element;
        match element {
            Value::Object(object) => {
                let ctx = parser.propagate(object.get("@context"), &to_parse.ctx).await?;
                if keyword_key(&ctx, object, "@graph").is_some() {
                    parser.top_level_graph_container(to_parse).await
                } else {
                    parser.node_object(to_parse).await
                }
            }
            Value::Array(_) => parser.node_object_array(to_parse).await,
            other => Err(ParseError::InvalidDocument(format!(
                "Expected an object or an array of objects, found {}",
                json_kind(other)
            ))),
        }
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{empty_context, variable};
    use super::super::ProductionKind;
    use super::*;
    use crate::ir::IntermediateResult;
    use serde_json::json;

    fn tagging<'a>(
        _parser: &'a Parser,
        to_parse: ToParse<'a>,
    ) -> BoxFuture<'a, ParseResult<Parsed>> {
        async move {
            Ok(Parsed::new(
                to_parse.variable,
                IntermediateResult::native_value("container"),
            ))
        }
        .boxed()
    }

    fn tagging_array<'a>(
        _parser: &'a Parser,
        to_parse: ToParse<'a>,
    ) -> BoxFuture<'a, ParseResult<Parsed>> {
        async move {
            Ok(Parsed::new(
                to_parse.variable,
                IntermediateResult::native_value("array"),
            ))
        }
        .boxed()
    }

    #[tokio::test]
    async fn test_dispatch() {
        let parser = Parser::default()
            .with(ProductionKind::TopLevelGraphContainer, tagging)
            .with(ProductionKind::NodeObjectArray, tagging_array);

        for (element, expected) in [
            (json!({ "@graph": [] }), "container"),
            (json!({ "@context": { "graph": "@graph" }, "graph": [] }), "container"),
            (json!([{ "@id": "?" }]), "array"),
        ] {
            let parsed = parser
                .document(ToParse::new(&element, variable(), empty_context()))
                .await
                .unwrap();
            assert_eq!(parsed.intermediate_result, IntermediateResult::native_value(expected));
        }
    }

    #[tokio::test]
    async fn test_rejects_scalars() {
        for element in [json!("?"), json!(1), json!(null)] {
            let result = Parser::default()
                .document(ToParse::new(&element, variable(), empty_context()))
                .await;
            assert!(matches!(result, Err(ParseError::InvalidDocument(_))));
        }
    }
}
