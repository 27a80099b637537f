//! Shared constants and RDF term helpers

use oxrdf::vocab::{rdf, xsd};
use oxrdf::{Literal, NamedNode};
use serde_json::Number;

/// The scalar that marks a position to be returned as a query result
pub const PLACEHOLDER: &str = "?";

/// Returns true if the JSON value is the placeholder marker
pub fn is_placeholder(value: &serde_json::Value) -> bool {
    value.as_str() == Some(PLACEHOLDER)
}

/// `rdf:type`
pub fn rdf_type() -> NamedNode {
    rdf::TYPE.into_owned()
}

/// `rdf:first`
pub fn rdf_first() -> NamedNode {
    rdf::FIRST.into_owned()
}

/// `rdf:rest`
pub fn rdf_rest() -> NamedNode {
    rdf::REST.into_owned()
}

/// `rdf:nil`
pub fn rdf_nil() -> NamedNode {
    rdf::NIL.into_owned()
}

/// Literal for a JSON number: integers are `xsd:integer`, everything else `xsd:double`
pub fn number_literal(number: &Number) -> Literal {
    if number.is_i64() || number.is_u64() {
        Literal::new_typed_literal(number.to_string(), xsd::INTEGER)
    } else {
        let value = number.as_f64().unwrap_or_default();
        Literal::new_typed_literal(value.to_string(), xsd::DOUBLE)
    }
}

/// Literal for a JSON boolean
pub fn boolean_literal(value: bool) -> Literal {
    Literal::new_typed_literal(value.to_string(), xsd::BOOLEAN)
}
