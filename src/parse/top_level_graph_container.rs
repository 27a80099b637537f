//! Documents of the form `{"@context"?: ..., "@graph": [...]}`

use super::{
    json_kind, keyword_key, nest_under_key, unexpected, ParseError, ParseResult, ParseWarning,
    Parsed, Parser, ToParse,
};
use crate::ir::IntermediateResult;
use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;
use serde_json::Value;

const IGNORED_KEY: &str = "Key ignored alongside a top-level @graph";

/// The `@graph` of a top-level container is the default graph: its node
/// objects bind to the document's own variable and no `GRAPH` is emitted.
pub fn top_level_graph_container<'a>(
    parser: &'a Parser,
    to_parse: ToParse<'a>,
) -> BoxFuture<'a, ParseResult<Parsed>> {
    async move {
        let element = to_parse.element;
        let object = element
            .as_object()
            .ok_or_else(|| unexpected("a top-level graph container", element))?;
        let ctx = parser.propagate(object.get("@context"), &to_parse.ctx).await?;
        let graph_key = keyword_key(&ctx, object, "@graph")
            .ok_or_else(|| unexpected("a top-level graph container", element))?;
        let graph = &object[graph_key];
        let inner = ToParse::new(graph, to_parse.variable.clone(), ctx);
        let contents = match graph {
            Value::Array(_) => parser.node_object_array(inner).await?,
            Value::Object(_) => parser.node_object(inner).await?,
            other => {
                return Err(ParseError::InvalidDocument(format!(
                    "@graph must hold node objects, found {}",
                    json_kind(other)
                )))
            }
        };

        let mut warnings = Vec::new();
        let mut graph_warnings = Some(contents.warnings);
        let mut entries = IndexMap::with_capacity(object.len());
        for (key, value) in object {
            let ir = if key == graph_key {
                warnings.extend(nest_under_key(key, graph_warnings.take().unwrap_or_default()));
                contents.intermediate_result.clone()
            } else {
                if key != "@context" {
                    warnings.push(ParseWarning::new(IGNORED_KEY).at([key.as_str()]));
                }
                IntermediateResult::native_value(value.clone())
            };
            entries.insert(key.clone(), ir);
        }

        Ok(Parsed {
            term: contents.term,
            intermediate_result: IntermediateResult::Object { entries },
            operation: contents.operation,
            projections: contents.projections,
            warnings,
        })
    }
    .boxed()
}
