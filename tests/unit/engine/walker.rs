use super::*;
use crate::{
    engine::task::TaskKind,
    foundation::error::TableError,
    pack::html::HtmlPack,
    pack::templates::{EngineTokens, RenderMode, TemplateParams, keys},
    schema::model::{DependencyCache, SchemaNode},
};
use serde_json::{Value, json};

fn node(value: Value) -> SchemaNode {
    serde_json::from_value(value).unwrap()
}

fn walk_with(
    schema: &SchemaNode,
    data: &Value,
    deps: &DependencyCache,
    pass: RenderPass,
) -> WalkState {
    let pack = HtmlPack::new();
    let ctx = WalkCtx {
        data,
        deps,
        pack: &pack,
        mode: RenderMode::Data,
        tokens: EngineTokens::default(),
        raw_data: false,
    };
    let mut state = WalkState::default();
    walk(&ctx, &mut state, schema, 0, None, pass).unwrap();
    state
}

fn field_tasks(state: &WalkState) -> Vec<(&str, &TemplateParams)> {
    state
        .queue
        .tasks()
        .iter()
        .filter_map(|task| match &task.kind {
            TaskKind::Field { template, params } => Some((template.as_str(), params)),
            _ => None,
        })
        .collect()
}

#[test]
fn header_and_body_emit_one_cell_per_scalar_property() {
    let schema = node(json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "qty": {"type": "integer"},
            "paid": {"type": "boolean"}
        }
    }));
    let data = json!({});
    let deps = DependencyCache::new();

    let header = walk_with(&schema, &data, &deps, RenderPass::Header);
    let body = walk_with(&schema, &data, &deps, RenderPass::Body);

    let header_fields = field_tasks(&header);
    let body_fields = field_tasks(&body);
    assert_eq!(header_fields.len(), 3);
    assert_eq!(body_fields.len(), 3);
    assert!(header_fields.iter().all(|(t, _)| *t == keys::TABLE_HEADER));
    assert!(body_fields.iter().all(|(t, _)| *t == keys::TABLE_ITEM));
}

#[test]
fn nested_objects_flatten_to_leaf_fields() {
    let schema = node(json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "address": {
                "type": "object",
                "properties": {"city": {"type": "string"}}
            }
        }
    }));
    let data = json!({});
    let deps = DependencyCache::new();

    let state = walk_with(&schema, &data, &deps, RenderPass::Body);
    let names: Vec<_> = field_tasks(&state)
        .iter()
        .map(|(_, p)| p.name.clone().unwrap())
        .collect();
    assert_eq!(names, vec!["address[city]", "name"]);
}

#[test]
fn field_parameters_bind_value_label_and_keys() {
    let schema = node(json!({
        "type": "object",
        "properties": {
            "name": {"type": "string", "title": "Full name"}
        }
    }));
    let data = json!({"name": "Ada"});
    let deps = DependencyCache::new();

    let state = walk_with(&schema, &data, &deps, RenderPass::Body);
    let fields = field_tasks(&state);
    let (_, params) = fields[0];

    assert_eq!(params.id.as_deref(), Some("name"));
    assert_eq!(params.val, Some(json!("Ada")));
    assert_eq!(params.label.as_deref(), Some("Full name"));
    assert_eq!(params.options.depth, Some(1));
    assert_eq!(params.options.key.as_deref(), Some("name"));
    assert_eq!(params.options.key_name.as_deref(), Some("name"));
    assert_eq!(params.options.array_depth, Some(0));
}

#[test]
fn format_option_overrides_the_default_template() {
    let schema = node(json!({
        "type": "object",
        "properties": {
            "color": {"type": "string", "options": {"format": "swatchCell"}}
        }
    }));
    let data = json!({});
    let deps = DependencyCache::new();

    let state = walk_with(&schema, &data, &deps, RenderPass::Body);
    assert_eq!(field_tasks(&state)[0].0, "swatchCell");
}

#[test]
fn visibility_gate_skips_node_and_subtree() {
    let schema = node(json!({
        "type": "object",
        "properties": {
            "visible": {"type": "string"},
            "secret": {
                "type": "object",
                "options": {"hidden": true},
                "properties": {"token": {"type": "string"}}
            }
        }
    }));
    let data = json!({});
    let deps = DependencyCache::new();

    let state = walk_with(&schema, &data, &deps, RenderPass::Body);
    let names: Vec<_> = field_tasks(&state)
        .iter()
        .map(|(_, p)| p.name.clone().unwrap())
        .collect();
    assert_eq!(names, vec!["visible"]);
}

#[test]
fn any_of_property_outside_arrays_is_skipped() {
    let schema = node(json!({
        "type": "object",
        "properties": {
            "payment": {
                "anyOf": [{"$ref": "card"}, {"$ref": "iban"}]
            }
        }
    }));
    let data = json!({});
    let deps = DependencyCache::new();

    let state = walk_with(&schema, &data, &deps, RenderPass::Body);
    assert!(field_tasks(&state).is_empty());
    // the property is still visited and annotated
    assert!(state.annotations.ids.contains_key("payment"));
}

#[test]
fn array_type_is_a_noop_in_the_dispatch_tables() {
    let schema = node(json!({
        "type": "object",
        "properties": {
            "tags": {"type": "array", "items": {"type": "string"}}
        }
    }));
    let data = json!({"tags": ["a", "b"]});
    let deps = DependencyCache::new();

    let state = walk_with(&schema, &data, &deps, RenderPass::Body);
    assert!(field_tasks(&state).is_empty());
}

#[test]
fn ref_resolves_and_redispatches_under_the_same_scope() {
    let schema = node(json!({
        "type": "object",
        "properties": {"home": {"$ref": "address"}}
    }));
    let mut deps = DependencyCache::new();
    deps.insert(
        "address",
        node(json!({
            "type": "object",
            "properties": {"street": {"type": "string"}}
        })),
    );
    let data = json!({"home": {"street": "Baker St"}});

    let state = walk_with(&schema, &data, &deps, RenderPass::Body);
    let fields = field_tasks(&state);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].1.name.as_deref(), Some("home[street]"));
    assert_eq!(fields[0].1.val, Some(json!("Baker St")));
}

#[test]
fn missing_ref_in_cache_is_a_hard_error() {
    let schema = node(json!({
        "type": "object",
        "properties": {"home": {"$ref": "address"}}
    }));
    let data = json!({});
    let deps = DependencyCache::new();
    let pack = HtmlPack::new();
    let ctx = WalkCtx {
        data: &data,
        deps: &deps,
        pack: &pack,
        mode: RenderMode::Data,
        tokens: EngineTokens::default(),
        raw_data: false,
    };
    let mut state = WalkState::default();

    let err = walk(&ctx, &mut state, &schema, 0, None, RenderPass::Body).unwrap_err();
    assert!(matches!(err, TableError::Resolve(_)));
    assert!(err.to_string().contains("address"));
}

#[test]
fn datasrc_resolves_from_the_cache() {
    let schema = node(json!({
        "type": "object",
        "properties": {
            "country": {"type": "string", "options": {"datasrc": "countries"}}
        }
    }));
    let mut deps = DependencyCache::new();
    deps.insert("countries", node(json!({"type": "array", "items": {"type": "string"}})));
    let data = json!({});

    let state = walk_with(&schema, &data, &deps, RenderPass::Body);
    let fields = field_tasks(&state);
    assert!(fields[0].1.datasrc.is_some());
}

#[test]
fn untyped_nodes_produce_nothing() {
    let schema = node(json!({"title": "just a label"}));
    let data = json!({});
    let deps = DependencyCache::new();
    let state = walk_with(&schema, &data, &deps, RenderPass::Body);
    assert!(state.queue.is_empty());
}
