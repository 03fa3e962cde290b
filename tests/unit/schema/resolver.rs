use super::*;
use crate::{
    foundation::error::TableError,
    schema::model::{DependencyCache, SchemaNode},
};
use serde_json::json;

fn node(value: serde_json::Value) -> SchemaNode {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn definition_resolution_reads_base_document() {
    let base = node(json!({
        "type": "object",
        "definitions": {
            "address": {"type": "object", "properties": {"street": {"type": "string"}}}
        }
    }));
    let resolver = SchemaResolver::new().with_base_document(base);

    let resolved = resolver.resolve("address").await.unwrap();
    assert!(resolved.properties.unwrap().contains_key("street"));
}

#[tokio::test]
async fn missing_definition_is_a_resolution_error() {
    let resolver = SchemaResolver::new().with_base_document(node(json!({"type": "object"})));
    let err = resolver.resolve("nowhere").await.unwrap_err();
    assert!(matches!(err, TableError::Resolve(_)));
}

#[tokio::test]
async fn file_resolution_without_base_path_fails_fast() {
    let resolver = SchemaResolver::new();
    let err = resolver.resolve("address.json").await.unwrap_err();
    assert!(matches!(err, TableError::Config(_)));
}

#[tokio::test]
async fn file_resolution_rejects_path_escapes() {
    let resolver = SchemaResolver::new().with_base_path("/tmp");
    let err = resolver.resolve("../secrets.json").await.unwrap_err();
    assert!(matches!(err, TableError::Config(_)));
}

#[tokio::test]
async fn populate_follows_references_inside_fragments() {
    let base = node(json!({
        "type": "object",
        "properties": {"shipping": {"$ref": "address"}},
        "definitions": {
            "address": {
                "type": "object",
                "properties": {"country": {"$ref": "country"}}
            },
            "country": {"type": "string"}
        }
    }));
    let resolver = SchemaResolver::new().with_base_document(base.clone());

    let mut cache = DependencyCache::new();
    resolver.populate(&mut cache, &base).await.unwrap();

    assert!(cache.contains("address"));
    assert!(cache.contains("country"));
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn populate_terminates_on_cyclic_references() {
    let base = node(json!({
        "type": "object",
        "properties": {"left": {"$ref": "a"}},
        "definitions": {
            "a": {"type": "object", "properties": {"peer": {"$ref": "b"}}},
            "b": {"type": "object", "properties": {"peer": {"$ref": "a"}}}
        }
    }));
    let resolver = SchemaResolver::new().with_base_document(base.clone());

    let mut cache = DependencyCache::new();
    resolver.populate(&mut cache, &base).await.unwrap();

    assert!(cache.contains("a"));
    assert!(cache.contains("b"));
}

#[test]
fn collect_refs_covers_union_and_datasrc_declarations() {
    let schema = node(json!({
        "type": "object",
        "properties": {
            "payments": {
                "type": "array",
                "items": {
                    "anyOf": [{"$ref": "card"}, {"$ref": "iban"}],
                    "options": {"matchOn": "kind"}
                }
            },
            "country": {"type": "string", "options": {"datasrc": "countries"}},
            "tags": {"type": "array", "items": {"oneOf": [{"$ref": "tag"}]}}
        }
    }));

    let mut refs = Vec::new();
    collect_refs(&schema, &mut refs);
    refs.sort();
    assert_eq!(refs, vec!["card", "countries", "iban", "tag"]);
}
