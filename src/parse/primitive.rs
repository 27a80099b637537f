//! Strings, numbers and booleans, including the placeholder marker

use super::{unexpected, ParseResult, ParseWarning, Parsed, Parser, ToParse};
use crate::common::{boolean_literal, is_placeholder, number_literal};
use crate::context::{ActiveContext, TypeMapping};
use crate::ir::IntermediateResult;
use futures::future::{BoxFuture, FutureExt};
use oxrdf::{Literal, NamedNode};
use serde_json::Value;
use spargebra::term::TermPattern;

const RDF_JSON: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#JSON";

/// Parse a scalar entry value.
///
/// The placeholder binds the variable and projects it; any other scalar is a
/// constant term and needs no binding.
pub fn primitive<'a>(_parser: &'a Parser, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
    async move {
        let ToParse {
            element,
            variable,
            ctx,
            coercion,
        } = to_parse;

        if is_placeholder(element) {
            return Ok(Parsed::new(
                variable.clone(),
                IntermediateResult::native_placeholder(variable.clone()),
            )
            .with_projection(variable));
        }

        let intermediate_result = IntermediateResult::native_value(element.clone());

        let term: TermPattern = match (element, &coercion) {
            (Value::String(s), Some(TypeMapping::Id)) | (Value::String(s), Some(TypeMapping::Vocab)) => {
                let vocab_relative = coercion == Some(TypeMapping::Vocab);
                match coerce_iri(&ctx, s, vocab_relative) {
                    Some(node) => node.into(),
                    None => {
                        return Ok(Parsed::new(Literal::new_simple_literal(s.as_str()), intermediate_result)
                            .with_warning(ParseWarning::new(
                                "Value could not be expanded to an IRI and was matched as a string",
                            )))
                    }
                }
            }
            (Value::String(_) | Value::Number(_) | Value::Bool(_), Some(TypeMapping::Json)) => {
                typed_literal(element.to_string(), RDF_JSON).into()
            }
            (Value::String(s), Some(TypeMapping::Datatype(datatype))) => {
                typed_literal(s.clone(), datatype).into()
            }
            (Value::Number(n), Some(TypeMapping::Datatype(datatype))) => {
                typed_literal(n.to_string(), datatype).into()
            }
            (Value::Bool(b), Some(TypeMapping::Datatype(datatype))) => {
                typed_literal(b.to_string(), datatype).into()
            }
            (Value::String(s), _) => Literal::new_simple_literal(s.as_str()).into(),
            (Value::Number(n), _) => number_literal(n).into(),
            (Value::Bool(b), _) => boolean_literal(*b).into(),
            (other, _) => return Err(unexpected("a string, number or boolean", other)),
        };

        Ok(Parsed::new(term, intermediate_result))
    }
    .boxed()
}

fn coerce_iri(ctx: &ActiveContext, value: &str, vocab_relative: bool) -> Option<NamedNode> {
    ctx.expand_iri(value, vocab_relative)
        .and_then(|iri| NamedNode::new(iri).ok())
}

fn typed_literal(value: String, datatype: &str) -> Literal {
    match NamedNode::new(datatype) {
        Ok(datatype) => Literal::new_typed_literal(value, datatype),
        Err(_) => Literal::new_simple_literal(value),
    }
}
