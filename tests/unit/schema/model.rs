use super::*;
use crate::foundation::error::TableError;
use serde_json::json;

fn node(value: serde_json::Value) -> SchemaNode {
    serde_json::from_value(value).unwrap()
}

#[test]
fn parses_typed_nodes_and_options() {
    let parsed = node(json!({
        "type": "object",
        "title": "Order",
        "properties": {
            "sku": {"type": "string", "options": {"matchOn": "kind", "keyName": "sku"}},
            "qty": {"type": "integer"}
        }
    }));

    assert_eq!(parsed.schema_type, Some(SchemaType::Object));
    let props = parsed.properties.as_ref().unwrap();
    let sku = &props["sku"];
    assert_eq!(sku.schema_type, Some(SchemaType::String));
    assert_eq!(sku.options.match_on.as_deref(), Some("kind"));
    assert_eq!(sku.options.key_name.as_deref(), Some("sku"));
}

#[test]
fn reference_wins_over_declared_type() {
    let parsed = node(json!({"type": "string", "$ref": "address"}));
    assert_eq!(parsed.effective_type(), Some(EffectiveType::Ref));

    let plain = node(json!({"type": "boolean"}));
    assert_eq!(plain.effective_type(), Some(EffectiveType::Boolean));
}

#[test]
fn effective_type_absent_for_untyped_nodes() {
    assert_eq!(node(json!({})).effective_type(), None);
}

#[test]
fn items_union_variants_parse() {
    let parsed = node(json!({
        "type": "array",
        "minItems": 2,
        "items": {
            "anyOf": [{"$ref": "card"}, {"$ref": "iban"}],
            "options": {"matchOn": "kind"}
        }
    }));

    let items = parsed.items.as_deref().unwrap();
    let variants = items.any_of.as_ref().unwrap();
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0].reference.as_deref(), Some("card"));
    assert_eq!(items.options.match_on.as_deref(), Some("kind"));
    assert_eq!(parsed.min_items, Some(2));
}

#[test]
fn validate_rejects_array_without_items() {
    let parsed = node(json!({
        "type": "object",
        "properties": {"tags": {"type": "array"}}
    }));
    let err = parsed.validate().unwrap_err();
    assert!(matches!(err, TableError::Validation(_)));
}

#[test]
fn unknown_keys_survive_round_trip() {
    let parsed = node(json!({"type": "string", "options": {"widget": "color-picker"}}));
    assert_eq!(parsed.options.extra["widget"], json!("color-picker"));

    let back = serde_json::to_value(&parsed).unwrap();
    assert_eq!(back["options"]["widget"], json!("color-picker"));
}

#[test]
fn dependency_cache_is_flat() {
    let mut cache = DependencyCache::new();
    assert!(cache.is_empty());

    cache.insert("address", node(json!({"type": "object"})));
    assert!(cache.contains("address"));
    assert_eq!(cache.len(), 1);
    assert!(cache.get("missing").is_none());
}
