//! Top-level translation of a JSON-LD query document
//!
//! The document is parsed against the root variable and the empty context,
//! and the resulting pattern is projected over every variable the parse
//! asked for.

use crate::algebra;
use crate::context::ActiveContext;
use crate::ir::IntermediateResult;
use crate::parse::{ParseResult, ParseWarning, Parser, ToParse};
use indexmap::IndexSet;
use oxrdf::Variable;
use serde::{Serialize, Serializer};
use serde_json::Value;
use spargebra::algebra::GraphPattern;
use spargebra::Query;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Result of translating one query document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    /// Template for re-hydrating solutions into the document's shape
    pub intermediate_result: IntermediateResult,
    /// `Project` over the accumulated pattern
    #[serde(serialize_with = "serialize_pattern")]
    pub sparql: GraphPattern,
    /// Non-fatal diagnostics, in document order
    pub warnings: Vec<ParseWarning>,
}

impl Translation {
    /// Projected variables, in first-occurrence order
    pub fn projections(&self) -> &[Variable] {
        match &self.sparql {
            GraphPattern::Project { variables, .. } => variables.as_slice(),
            _ => &[],
        }
    }

    /// The translation as a SPARQL SELECT query
    pub fn to_query(&self) -> Query {
        Query::Select {
            dataset: None,
            pattern: self.sparql.clone(),
            base_iri: None,
        }
    }
}

/// Renders the SPARQL query text
impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_query())
    }
}

fn serialize_pattern<S: Serializer>(pattern: &GraphPattern, serializer: S) -> Result<S::Ok, S::Error> {
    let query = Query::Select {
        dataset: None,
        pattern: pattern.clone(),
        base_iri: None,
    };
    serializer.collect_str(&query)
}

/// Translate a document with the default parser
pub async fn parse_query(document: &Value) -> ParseResult<Translation> {
    parse_query_with(&Parser::default(), document).await
}

/// Translate a document with a custom production table
pub async fn parse_query_with(parser: &Parser, document: &Value) -> ParseResult<Translation> {
    let root = parser.naming.root();
    debug!("Translating query document bound to {}", root);

    let parsed = parser
        .document(ToParse::new(document, root, Arc::new(ActiveContext::new())))
        .await?;

    let projections: IndexSet<Variable> = parsed.projections.into_iter().collect();
    for warning in &parsed.warnings {
        trace!("Translation warning: {}", warning);
    }
    debug!(
        "Translated query with {} projections and {} warnings",
        projections.len(),
        parsed.warnings.len()
    );

    Ok(Translation {
        intermediate_result: parsed.intermediate_result,
        sparql: algebra::project(parsed.operation, projections.into_iter().collect()),
        warnings: parsed.warnings,
    })
}
