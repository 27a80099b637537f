//! List objects (`{"@list": [...]}`)
//!
//! A list binds its variable to the list head. Members are reached through
//! `rdf:rest*/rdf:first` and bound to a member variable under the list's
//! variable, so the template applies to every member alike.

use super::{
    keyword_key, nest_under_index, nest_under_key, unexpected, wrap_entry, ParseResult, Parsed, Parser, ToParse,
};
use crate::algebra;
use crate::common::rdf_nil;
use crate::context::ActiveContext;
use crate::ir::IntermediateResult;
use futures::future::{BoxFuture, FutureExt};
use oxrdf::Variable;
use serde_json::Value;
use spargebra::term::TermPattern;
use std::sync::Arc;

const MEMBER: &str = "item";

pub fn list_object<'a>(parser: &'a Parser, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
    async move {
        let object = to_parse
            .element
            .as_object()
            .ok_or_else(|| unexpected("a list object", to_parse.element))?;

        let ctx = parser.propagate(object.get("@context"), &to_parse.ctx).await?;
        let key = keyword_key(&ctx, object, "@list")
            .ok_or_else(|| unexpected("a list object", to_parse.element))?;

        let list = list_items(parser, &object[key], &to_parse.variable, &ctx).await?;

        Ok(Parsed {
            term: list.term,
            intermediate_result: wrap_entry(object, key, list.intermediate_result),
            operation: list.operation,
            projections: list.projections,
            warnings: nest_under_key(key, list.warnings),
        })
    }
    .boxed()
}

/// Parse the members of a list bound to `variable`.
///
/// Shared with entries whose term declares `@container: @list`; the returned
/// IR mirrors `items` without any `@list` wrapper.
pub(super) async fn list_items(
    parser: &Parser,
    items: &Value,
    variable: &Variable,
    ctx: &Arc<ActiveContext>,
) -> ParseResult<Parsed> {
    let member = parser.naming.under(variable, MEMBER);

    let first = match items {
        Value::Array(items) => match items.first() {
            Some(first) => first,
            None => {
                return Ok(Parsed::new(
                    rdf_nil(),
                    IntermediateResult::native_value(Value::Array(Vec::new())),
                ))
            }
        },
        single => single,
    };

    let template = parser
        .iri_entry_value(ToParse::new(first, member.clone(), Arc::clone(ctx)))
        .await?;

    let operation = algebra::join([
        algebra::list_members(variable.clone(), template.term.clone()),
        template.operation,
    ]);

    let (intermediate_result, warnings) = if items.is_array() {
        (
            IntermediateResult::array(member.clone(), template.intermediate_result),
            nest_under_index(0, template.warnings),
        )
    } else {
        (template.intermediate_result, template.warnings)
    };

    let member_is_bound = template.term == TermPattern::Variable(member.clone());
    let mut projections = Vec::with_capacity(template.projections.len() + 1);
    if items.is_array() && member_is_bound {
        projections.push(member.clone());
    }
    projections.extend(template.projections);

    Ok(Parsed {
        term: variable.clone().into(),
        intermediate_result,
        operation,
        projections,
        warnings,
    })
}
