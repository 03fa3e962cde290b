//! Schema walker: recursive type dispatch over the schema tree.
//!
//! The walker is fully synchronous; it never renders. Each handler appends
//! render tasks to the queue in the exact order their markup must appear in
//! the final output. Handlers are selected through two fixed dispatch tables
//! (header pass, body pass) keyed by the node's effective type, with the
//! engine state passed explicitly rather than captured in closures.

use serde_json::Value;

use crate::{
    engine::task::RenderQueue,
    foundation::{
        error::{TableError, TableResult},
        scope,
    },
    pack::templates::{EngineTokens, RenderMode, TemplatePack, TemplateParams, keys},
    schema::model::{DependencyCache, EffectiveType, FieldOptions, SchemaNode},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Which of the two dispatch tables a walk uses.
pub enum RenderPass {
    /// Header-row pass: every leaf emits a header cell.
    Header,
    /// Body-row pass: every leaf emits a data cell.
    Body,
}

/// Immutable collaborators shared by every walk step.
pub(crate) struct WalkCtx<'a, P: TemplatePack> {
    /// Data object, looked up on demand by scope path, never mutated.
    pub data: &'a Value,
    /// Resolved reference fragments; read-only during the walk.
    pub deps: &'a DependencyCache,
    /// Active pack, consulted only for the visibility predicate here.
    pub pack: &'a P,
    /// Snapshot of the pack's render mode.
    pub mode: RenderMode,
    /// Snapshot of the pack's stamp tokens.
    pub tokens: EngineTokens,
    /// Bind non-scalar data values into field parameters when set.
    pub raw_data: bool,
}

/// Mutable walk outputs, confined to one engine instance.
#[derive(Debug, Default)]
pub(crate) struct WalkState {
    /// Ordered render tasks with their fixed output positions.
    pub queue: RenderQueue,
    /// Derived ids and insert-template anchors, reported to the caller.
    pub annotations: crate::engine::builder::Annotations,
    /// Union-nesting depth while expanding `anyOf` inside arrays. Stack
    /// discipline: must return to its pre-call value after every expansion.
    pub array_loop_count: usize,
}

type Handler<P> =
    fn(&WalkCtx<'_, P>, &mut WalkState, &SchemaNode, &str, Option<&str>, u32) -> TableResult<()>;

/// Pure dispatch: effective type + pass to handler.
///
/// `number`, `integer` and `boolean` intentionally share the string field
/// handler in both tables; `array` is a deliberate no-op here because array
/// handling is invoked explicitly through the expander, never through the
/// general dispatch.
fn handler_for<P: TemplatePack>(ty: EffectiveType, pass: RenderPass) -> Handler<P> {
    match (pass, ty) {
        (RenderPass::Body, EffectiveType::Object) => object_body,
        (RenderPass::Body, EffectiveType::Ref) => reference_body,
        (
            RenderPass::Body,
            EffectiveType::String
            | EffectiveType::Number
            | EffectiveType::Integer
            | EffectiveType::Boolean,
        ) => field_body,
        (RenderPass::Header, EffectiveType::Object) => object_header,
        (RenderPass::Header, EffectiveType::Ref) => reference_header,
        (
            RenderPass::Header,
            EffectiveType::String
            | EffectiveType::Number
            | EffectiveType::Integer
            | EffectiveType::Boolean,
        ) => field_header,
        (_, EffectiveType::Array) => noop,
    }
}

/// One walk step: select a handler for `node` and run it.
///
/// Nodes without a recognizable effective type produce nothing. The pack's
/// visibility predicate gates the node and its entire subtree.
pub(crate) fn walk<P: TemplatePack>(
    ctx: &WalkCtx<'_, P>,
    state: &mut WalkState,
    node: &SchemaNode,
    depth: u32,
    scope_name: Option<&str>,
    pass: RenderPass,
) -> TableResult<()> {
    let Some(ty) = node.effective_type() else {
        return Ok(());
    };
    if !ctx.pack.is_visible(node) {
        return Ok(());
    }

    let id_seed = node.id.as_deref().or(scope_name).unwrap_or_default();
    let id = scope::generate_id(id_seed);

    handler_for::<P>(ty, pass)(ctx, state, node, &id, scope_name, depth)
}

fn noop<P: TemplatePack>(
    _ctx: &WalkCtx<'_, P>,
    _state: &mut WalkState,
    _node: &SchemaNode,
    _id: &str,
    _scope: Option<&str>,
    _depth: u32,
) -> TableResult<()> {
    Ok(())
}

fn object_body<P: TemplatePack>(
    ctx: &WalkCtx<'_, P>,
    state: &mut WalkState,
    node: &SchemaNode,
    id: &str,
    scope_name: Option<&str>,
    depth: u32,
) -> TableResult<()> {
    walk_object(ctx, state, node, id, scope_name, depth, RenderPass::Body)
}

fn object_header<P: TemplatePack>(
    ctx: &WalkCtx<'_, P>,
    state: &mut WalkState,
    node: &SchemaNode,
    id: &str,
    scope_name: Option<&str>,
    depth: u32,
) -> TableResult<()> {
    walk_object(ctx, state, node, id, scope_name, depth, RenderPass::Header)
}

fn walk_object<P: TemplatePack>(
    ctx: &WalkCtx<'_, P>,
    state: &mut WalkState,
    node: &SchemaNode,
    _id: &str,
    scope_name: Option<&str>,
    depth: u32,
    pass: RenderPass,
) -> TableResult<()> {
    let depth = depth + 1;
    let Some(props) = &node.properties else {
        return Ok(());
    };

    for (key, property) in props {
        let name = scope::child_scope(scope_name, key);
        state
            .annotations
            .ids
            .insert(name.clone(), scope::generate_id(&name));

        // An anyOf property outside an array-item context is not expanded;
        // union resolution only happens inside array items.
        if property.any_of.is_some() {
            continue;
        }

        walk(ctx, state, property, depth, Some(&name), pass)?;
    }
    Ok(())
}

fn reference_body<P: TemplatePack>(
    ctx: &WalkCtx<'_, P>,
    state: &mut WalkState,
    node: &SchemaNode,
    id: &str,
    scope_name: Option<&str>,
    depth: u32,
) -> TableResult<()> {
    walk_reference(ctx, state, node, id, scope_name, depth, RenderPass::Body)
}

fn reference_header<P: TemplatePack>(
    ctx: &WalkCtx<'_, P>,
    state: &mut WalkState,
    node: &SchemaNode,
    id: &str,
    scope_name: Option<&str>,
    depth: u32,
) -> TableResult<()> {
    walk_reference(ctx, state, node, id, scope_name, depth, RenderPass::Header)
}

fn walk_reference<P: TemplatePack>(
    ctx: &WalkCtx<'_, P>,
    state: &mut WalkState,
    node: &SchemaNode,
    _id: &str,
    scope_name: Option<&str>,
    depth: u32,
    pass: RenderPass,
) -> TableResult<()> {
    let Some(reference) = &node.reference else {
        return Ok(());
    };
    let resolved = resolve_cached(ctx.deps, reference)?;
    // Re-dispatch the resolved node under the same scope path.
    walk(ctx, state, resolved, depth, scope_name, pass)
}

fn field_body<P: TemplatePack>(
    ctx: &WalkCtx<'_, P>,
    state: &mut WalkState,
    node: &SchemaNode,
    id: &str,
    scope_name: Option<&str>,
    depth: u32,
) -> TableResult<()> {
    enqueue_field(ctx, state, node, id, scope_name, depth, keys::TABLE_ITEM)
}

fn field_header<P: TemplatePack>(
    ctx: &WalkCtx<'_, P>,
    state: &mut WalkState,
    node: &SchemaNode,
    id: &str,
    scope_name: Option<&str>,
    depth: u32,
) -> TableResult<()> {
    enqueue_field(ctx, state, node, id, scope_name, depth, keys::TABLE_HEADER)
}

fn enqueue_field<P: TemplatePack>(
    ctx: &WalkCtx<'_, P>,
    state: &mut WalkState,
    node: &SchemaNode,
    id: &str,
    scope_name: Option<&str>,
    depth: u32,
    default_template: &str,
) -> TableResult<()> {
    let name = scope_name.unwrap_or_default();
    let label = node.title.clone().unwrap_or_else(|| name.to_string());
    let val = bind_value(ctx, name);

    let mut options = node.options.clone();
    options.depth = Some(depth);
    options.key = Some(scope::dot_syntax(name));
    options.key_name = Some(scope::raw_name(name));
    options.key_inner = Some(scope::inner_name(name));
    options.array_depth = Some(state.array_loop_count);

    let datasrc = match &options.datasrc {
        Some(src) => Some(resolve_cached(ctx.deps, src)?.clone()),
        None => None,
    };
    let template = options
        .format
        .clone()
        .unwrap_or_else(|| default_template.to_string());

    let params = TemplateParams {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        val,
        label: Some(label),
        required: node.required.unwrap_or(false),
        datasrc,
        options,
        ..TemplateParams::default()
    };
    state.queue.enqueue_field(template, params);
    Ok(())
}

fn bind_value<P: TemplatePack>(ctx: &WalkCtx<'_, P>, name: &str) -> Option<Value> {
    let value = scope::lookup_value(ctx.data, name)?;
    match value {
        Value::Null => None,
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Some(value.clone()),
        Value::Array(_) | Value::Object(_) if ctx.raw_data => Some(value.clone()),
        _ => None,
    }
}

/// Cache lookup for a reference the resolver was supposed to have populated.
/// A missing entry is a hard error, not a silent skip.
pub(crate) fn resolve_cached<'a>(
    deps: &'a DependencyCache,
    reference: &str,
) -> TableResult<&'a SchemaNode> {
    deps.get(reference).ok_or_else(|| {
        TableError::resolve(format!(
            "unresolved schema reference '{reference}' (dependency cache not populated)"
        ))
    })
}

/// Shared parameter assembly for group open/close tags.
pub(crate) fn group_params(
    raw_id: &str,
    name: &str,
    depth: u32,
    array_loop_count: usize,
    mut options: FieldOptions,
) -> TemplateParams {
    options.key = Some(scope::dot_syntax(name));
    options.key_name = Some(scope::raw_name(name));
    options.key_inner = Some(scope::inner_name(name));
    options.array_depth = Some(array_loop_count);
    options.depth = Some(depth);

    TemplateParams {
        id: Some(scope::generate_id(raw_id)),
        name: Some(name.to_string()),
        options,
        ..TemplateParams::default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/walker.rs"]
mod tests;
