//! End-to-end translation of query documents
//!
//! Exercises the public API only: documents go in, translations come out.

use futures::future::{BoxFuture, FutureExt};
use oxrdf::Variable;
use serde_json::json;
use spargebra::algebra::GraphPattern;
use std::sync::Arc;
use xql::{
    parse_query, parse_query_with, IntermediateResult, ParseResult, ParseWarning, Parsed, Parser,
    PathSegment, ProductionKind, StaticContextLoader, ToParse,
};

const SWAPI: &str = "http://swapi.dev/documentation#";

fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

/// True if any pattern in the tree is a `LeftJoin`
fn has_left_join(pattern: &GraphPattern) -> bool {
    match pattern {
        GraphPattern::LeftJoin { .. } => true,
        GraphPattern::Project { inner, .. } | GraphPattern::Graph { inner, .. } => {
            has_left_join(inner)
        }
        GraphPattern::Join { left, right } => has_left_join(left) || has_left_join(right),
        _ => false,
    }
}

#[tokio::test]
async fn test_constant_subject() {
    let document = json!({
        "@id": "https://x/1",
        "ns:hair_color": "?",
        "ns:eye_color": "?"
    });
    let translation = parse_query(&document).await.unwrap();

    assert_eq!(
        translation.intermediate_result,
        IntermediateResult::object([
            ("@id", IntermediateResult::native_value("https://x/1")),
            ("ns:hair_color", IntermediateResult::native_placeholder(var("root·hair_color"))),
            ("ns:eye_color", IntermediateResult::native_placeholder(var("root·eye_color"))),
        ])
    );
    assert_eq!(
        translation.projections(),
        &[var("root·hair_color"), var("root·eye_color")]
    );

    let sparql = translation.to_string();
    assert!(sparql.starts_with("SELECT ?root·hair_color ?root·eye_color WHERE"));
    assert!(sparql.contains("<https://x/1> <ns:hair_color> ?root·hair_color"));
    assert!(sparql.contains("<https://x/1> <ns:eye_color> ?root·eye_color"));
}

#[tokio::test]
async fn test_plural_related_nodes_are_optional() {
    let document = json!([{
        "@context": { "@vocab": SWAPI },
        "@id": "?",
        "name": "?",
        "starships": [{ "name": "?" }]
    }]);
    let translation = parse_query(&document).await.unwrap();

    assert!(has_left_join(&translation.sparql));
    match &translation.intermediate_result {
        IntermediateResult::Array { variable, template } => {
            assert_eq!(variable, &var("root"));
            match template.as_ref() {
                IntermediateResult::Object { entries } => match entries.get("starships") {
                    Some(IntermediateResult::Array { variable, .. }) => {
                        assert_eq!(variable, &var("root·starships"))
                    }
                    other => panic!("Expected starships array, got {:?}", other),
                },
                other => panic!("Expected object template, got {:?}", other),
            }
        }
        other => panic!("Expected array, got {:?}", other),
    }
}

#[tokio::test]
async fn test_nested_set_warns_once() {
    let document = json!({
        "@context": { "@vocab": SWAPI },
        "films": [{
            "starships": [{
                "pilots": { "@set": [{ "name": "?" }] }
            }]
        }]
    });
    let translation = parse_query(&document).await.unwrap();

    assert_eq!(
        translation.warnings,
        vec![ParseWarning::new("Set objects are not yet supported").at([
            PathSegment::from("films"),
            PathSegment::from(0usize),
            PathSegment::from("starships"),
            PathSegment::from(0usize),
            PathSegment::from("pilots"),
        ])]
    );
}

#[tokio::test]
async fn test_null_values_pass_through() {
    let document = json!({
        "@context": { "@vocab": SWAPI },
        "@id": "?",
        "name": null
    });
    let translation = parse_query(&document).await.unwrap();

    assert_eq!(
        translation.intermediate_result,
        IntermediateResult::object([
            ("@context", IntermediateResult::native_value(json!({ "@vocab": SWAPI }))),
            ("@id", IntermediateResult::name_placeholder(var("root"))),
            ("name", IntermediateResult::native_value(serde_json::Value::Null)),
        ])
    );
    assert_eq!(
        translation.warnings,
        vec![ParseWarning::new("null values are not yet supported").at(["name"])]
    );
    assert_eq!(translation.projections(), &[var("root")]);
}

#[tokio::test]
async fn test_unmapped_keys_pass_through() {
    let document = json!({ "@id": "?", "name": "?" });
    let translation = parse_query(&document).await.unwrap();

    assert_eq!(
        translation.intermediate_result,
        IntermediateResult::object([
            ("@id", IntermediateResult::name_placeholder(var("root"))),
            ("name", IntermediateResult::native_value("?")),
        ])
    );
    assert_eq!(
        translation.warnings,
        vec![ParseWarning::new("Key not defined by context and ignored").at(["name"])]
    );
    assert_eq!(translation.projections(), &[var("root")]);
}

#[tokio::test]
async fn test_every_placeholder_is_projected_once() {
    let document = json!({
        "@context": {
            "@vocab": SWAPI,
            "characters": { "@container": "@list" }
        },
        "@id": "?",
        "@type": "?",
        "name": "?",
        "characters": ["?"],
        "films": [{ "@id": "?", "title": "?", "director": "?" }],
        "homeworld": { "name": "?", "climate": "?" }
    });
    let translation = parse_query(&document).await.unwrap();
    let projections = translation.projections();

    for variable in translation.intermediate_result.placeholder_variables() {
        assert_eq!(
            projections.iter().filter(|p| *p == variable).count(),
            1,
            "{} should be projected exactly once",
            variable
        );
    }
    assert_eq!(projections.first(), Some(&var("root")));
}

#[tokio::test]
async fn test_aliased_id_names_a_graph() {
    let document = json!({
        "@context": { "@vocab": SWAPI, "id": "@id" },
        "appearances": {
            "id": "https://swapi.dev/graphs/films",
            "@graph": [{ "name": "?" }]
        }
    });
    let translation = parse_query(&document).await.unwrap();

    assert!(translation.warnings.is_empty());
    let sparql = translation.to_string();
    assert!(sparql.contains("GRAPH <https://swapi.dev/graphs/films>"));
    assert!(!sparql.contains("GRAPH ?root·appearances"));
}

#[tokio::test]
async fn test_intermediate_result_keeps_key_order() {
    let document = json!({
        "@context": { "@vocab": SWAPI },
        "zeta": "?",
        "@id": "?",
        "alpha": "?",
        "mid": "constant"
    });
    let translation = parse_query(&document).await.unwrap();

    match &translation.intermediate_result {
        IntermediateResult::Object { entries } => assert_eq!(
            entries.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["@context", "zeta", "@id", "alpha", "mid"]
        ),
        other => panic!("Expected object, got {:?}", other),
    }
}

#[tokio::test]
async fn test_translation_is_deterministic() {
    let document = json!({
        "@context": { "@vocab": SWAPI },
        "@id": "?",
        "films": [{ "title": "?", "characters": [{ "name": "?" }] }],
        "vehicles": { "@set": ["?"] }
    });

    let first = parse_query(&document).await.unwrap();
    let second = parse_query(&document).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[tokio::test]
async fn test_remote_context_from_static_loader() {
    let loader = StaticContextLoader::new().with_document(
        "https://swapi.dev/context.jsonld",
        json!({ "@context": { "@vocab": SWAPI, "id": "@id" } }),
    );
    let parser = Parser::default().with_loader(Arc::new(loader));
    let document = json!({
        "@context": "https://swapi.dev/context.jsonld",
        "id": "?",
        "name": "?"
    });

    let translation = parse_query_with(&parser, &document).await.unwrap();
    assert!(translation.warnings.is_empty());
    assert_eq!(translation.projections(), &[var("root"), var("root·name")]);

    let unknown = json!({ "@context": "https://swapi.dev/missing.jsonld", "@id": "?" });
    assert!(parse_query_with(&parser, &unknown).await.is_err());
    assert!(parse_query(&document).await.is_err());
}

/// Treats a set object as a plain array of its members
fn set_as_array<'a>(parser: &'a Parser, to_parse: ToParse<'a>) -> BoxFuture<'a, ParseResult<Parsed>> {
    async move {
        let element = to_parse.element;
        let members = &element["@set"];
        parser
            .iri_entry_value(ToParse {
                element: members,
                ..to_parse
            })
            .await
    }
    .boxed()
}

#[tokio::test]
async fn test_replaced_production() {
    let parser = Parser::default().with(ProductionKind::SetObject, set_as_array);
    let document = json!({
        "@context": { "@vocab": SWAPI },
        "vehicles": { "@set": ["?"] }
    });

    let translation = parse_query_with(&parser, &document).await.unwrap();
    assert!(translation.warnings.is_empty());
    assert_eq!(translation.projections(), &[var("root·vehicles")]);
    assert_eq!(
        translation.intermediate_result,
        IntermediateResult::object([
            ("@context", IntermediateResult::native_value(json!({ "@vocab": SWAPI }))),
            (
                "vehicles",
                IntermediateResult::array(
                    var("root·vehicles"),
                    IntermediateResult::native_placeholder(var("root·vehicles"))
                )
            ),
        ])
    );
}
