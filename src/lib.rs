//! xql
//!
//! Translates JSON-LD documents containing `"?"` placeholders into SPARQL
//! queries, together with an intermediate result: a template with the shape
//! of the query document that says where each bound variable belongs.
//!
//! # Architecture
//!
//! - `context`: JSON-LD 1.1 context processing (terms, `@vocab`, `@base`,
//!   containers, type coercion, scoped and remote contexts)
//! - `parse`: one recursive production per JSON-LD construct, dispatched
//!   through a replaceable [`Parser`] table
//! - `ir`: the intermediate result tree
//! - `algebra`: SPARQL algebra builders over `spargebra`
//! - `variable`: deterministic variable naming
//! - `query`: top-level translation and SPARQL rendering
//! - `config`: YAML configuration building a [`Parser`]
//!
//! ## Example Usage
//!
//! ```rust
//! use serde_json::json;
//! use xql::parse_query;
//!
//! let document = json!({
//!     "@context": { "@vocab": "http://swapi.dev/documentation#" },
//!     "@id": "?",
//!     "name": "Luke Skywalker",
//!     "hair_color": "?"
//! });
//!
//! let translation = futures::executor::block_on(parse_query(&document)).unwrap();
//! assert_eq!(translation.projections().len(), 2);
//! println!("{}", translation);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algebra;
pub mod common;
pub mod config;
pub mod context;
pub mod ir;
pub mod parse;
pub mod query;
pub mod variable;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigResult, TranslatorConfig};

pub use context::{
    ActiveContext, Container, ContextError, ContextLoader, ContextResult, HttpContextLoader,
    KeyResolution, NoRemoteContexts, StaticContextLoader, TermDefinition, TypeMapping,
};

pub use ir::IntermediateResult;

pub use parse::{
    ParseError, ParseResult, ParseWarning, Parsed, Parser, PathSegment, Production,
    ProductionKind, ToParse,
};

pub use query::{parse_query, parse_query_with, Translation};

pub use variable::{VariableNaming, VariableRegistry};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
