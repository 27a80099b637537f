//! Value objects (`{"@value": ..., "@type"?: ..., "@language"?: ...}`)

use super::{keyword_key, unexpected, wrap_entry, ParseResult, ParseWarning, Parsed, Parser, ToParse};
use crate::common::{boolean_literal, is_placeholder, number_literal};
use crate::ir::IntermediateResult;
use futures::future::{BoxFuture, FutureExt};
use oxrdf::{Literal, NamedNode};
use serde_json::Value;
use spargebra::term::TermPattern;

const UNSUPPORTED_DATATYPE: &str = "Value object @type does not expand to an IRI and was ignored";
const QUALIFIED_PLACEHOLDER: &str =
    "Value object @type and @language are not applied to placeholders";

pub fn value_object<'a>(parser: &'a Parser, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
    async move {
        let ToParse {
            element,
            variable,
            ctx,
            ..
        } = to_parse;
        let object = element
            .as_object()
            .ok_or_else(|| unexpected("a value object", element))?;

        let ctx = parser.propagate(object.get("@context"), &ctx).await?;
        let value_key = keyword_key(&ctx, object, "@value")
            .ok_or_else(|| unexpected("a value object", element))?;
        let value = &object[value_key];
        let type_key = keyword_key(&ctx, object, "@type");
        let language_key = keyword_key(&ctx, object, "@language");
        let language = language_key.and_then(|key| object[key].as_str());

        let mut warnings = Vec::new();
        let datatype = match type_key {
            Some(key) if !is_placeholder(value) => {
                let datatype = object[key]
                    .as_str()
                    .and_then(|t| ctx.expand_iri(t, true))
                    .and_then(|iri| NamedNode::new(iri).ok());
                if datatype.is_none() {
                    warnings.push(ParseWarning::new(UNSUPPORTED_DATATYPE).at([key.as_str()]));
                }
                datatype
            }
            _ => None,
        };

        let mut projections = Vec::new();

        let (term, value_ir): (TermPattern, IntermediateResult) = if is_placeholder(value) {
            if type_key.is_some() || language_key.is_some() {
                warnings.push(ParseWarning::new(QUALIFIED_PLACEHOLDER));
            }
            projections.push(variable.clone());
            (
                variable.clone().into(),
                IntermediateResult::native_placeholder(variable.clone()),
            )
        } else {
            let literal = match value {
                Value::String(s) => match (language, datatype) {
                    (Some(language), _) => match Literal::new_language_tagged_literal(s.as_str(), language) {
                        Ok(literal) => Some(literal),
                        Err(_) => {
                            warnings.push(
                                ParseWarning::new("Invalid @language tag ignored")
                                    .at(language_key.map(String::as_str)),
                            );
                            Some(Literal::new_simple_literal(s.as_str()))
                        }
                    },
                    (None, Some(datatype)) => Some(Literal::new_typed_literal(s.as_str(), datatype)),
                    (None, None) => Some(Literal::new_simple_literal(s.as_str())),
                },
                Value::Number(n) => Some(match datatype {
                    Some(datatype) => Literal::new_typed_literal(n.to_string(), datatype),
                    None => number_literal(n),
                }),
                Value::Bool(b) => Some(match datatype {
                    Some(datatype) => Literal::new_typed_literal(b.to_string(), datatype),
                    None => boolean_literal(*b),
                }),
                _ => None,
            };

            match literal {
                Some(literal) => (literal.into(), IntermediateResult::native_value(value.clone())),
                None => {
                    warnings.push(
                        ParseWarning::new("Value objects must have a scalar @value")
                            .at([value_key.as_str()]),
                    );
                    (
                        variable.clone().into(),
                        IntermediateResult::native_value(value.clone()),
                    )
                }
            }
        };

        Ok(Parsed {
            term,
            intermediate_result: wrap_entry(object, value_key, value_ir),
            operation: crate::algebra::empty(),
            projections,
            warnings,
        })
    }
    .boxed()
}
