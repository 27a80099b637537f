//! SPARQL algebra construction
//!
//! Thin builders over `spargebra` graph patterns. The empty basic graph
//! pattern is the identity of [`join`], so productions that contribute
//! nothing can return [`empty`] and be combined freely.

use oxrdf::Variable;
use spargebra::algebra::{GraphPattern, PropertyPathExpression};
use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};

/// The empty pattern (a single empty solution)
pub fn empty() -> GraphPattern {
    GraphPattern::Bgp {
        patterns: Vec::new(),
    }
}

/// Returns true for the empty basic graph pattern
pub fn is_empty(pattern: &GraphPattern) -> bool {
    matches!(pattern, GraphPattern::Bgp { patterns } if patterns.is_empty())
}

/// A basic graph pattern
pub fn bgp(patterns: Vec<TriplePattern>) -> GraphPattern {
    GraphPattern::Bgp { patterns }
}

/// A single triple pattern
pub fn triple(
    subject: impl Into<TermPattern>,
    predicate: impl Into<NamedNodePattern>,
    object: impl Into<TermPattern>,
) -> TriplePattern {
    TriplePattern {
        subject: subject.into(),
        predicate: predicate.into(),
        object: object.into(),
    }
}

/// Conjunction of patterns, left to right.
///
/// Empty patterns are dropped and adjacent basic graph patterns are merged, so
/// the result stays small and deterministic.
pub fn join(parts: impl IntoIterator<Item = GraphPattern>) -> GraphPattern {
    let mut merged: Vec<GraphPattern> = Vec::new();

    for part in parts {
        if is_empty(&part) {
            continue;
        }
        match (merged.last_mut(), part) {
            (Some(GraphPattern::Bgp { patterns }), GraphPattern::Bgp { patterns: more }) => {
                patterns.extend(more);
            }
            (_, part) => merged.push(part),
        }
    }

    merged
        .into_iter()
        .reduce(|left, right| GraphPattern::Join {
            left: Box::new(left),
            right: Box::new(right),
        })
        .unwrap_or_else(empty)
}

/// Optional match of `right` against `left`
pub fn left_join(left: GraphPattern, right: GraphPattern) -> GraphPattern {
    GraphPattern::LeftJoin {
        left: Box::new(left),
        right: Box::new(right),
        expression: None,
    }
}

/// Patterns matched within a named graph
pub fn graph(name: impl Into<NamedNodePattern>, inner: GraphPattern) -> GraphPattern {
    GraphPattern::Graph {
        name: name.into(),
        inner: Box::new(inner),
    }
}

/// Members of an RDF list: `list rdf:rest*/rdf:first member`
pub fn list_members(list: impl Into<TermPattern>, member: impl Into<TermPattern>) -> GraphPattern {
    let rest = PropertyPathExpression::NamedNode(crate::common::rdf_rest());
    let first = PropertyPathExpression::NamedNode(crate::common::rdf_first());
    GraphPattern::Path {
        subject: list.into(),
        path: PropertyPathExpression::Sequence(
            Box::new(PropertyPathExpression::ZeroOrMore(Box::new(rest))),
            Box::new(first),
        ),
        object: member.into(),
    }
}

/// Projection over the given variables
pub fn project(inner: GraphPattern, variables: Vec<Variable>) -> GraphPattern {
    GraphPattern::Project {
        inner: Box::new(inner),
        variables,
    }
}
