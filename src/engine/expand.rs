//! Array and union expansion.
//!
//! Array handling never runs through the general dispatch tables; it is
//! invoked explicitly via [`crate::TableEngine::expand_array`]. The expander
//! determines how many items to emit, wraps each item in group open/close
//! tasks, resolves per-item `$ref`/`anyOf`/`oneOf` constructs, and in
//! template-stamp mode substitutes the pack's index tokens for literal
//! indices so the emitted fragment can be cloned and re-indexed client-side.

use serde_json::Value;

use crate::{
    engine::walker::{RenderPass, WalkCtx, WalkState, group_params, resolve_cached, walk},
    foundation::{
        error::{TableError, TableResult},
        scope,
    },
    pack::templates::{TemplatePack, TemplateParams, keys},
    schema::model::SchemaNode,
};

/// Fixed placeholder substituted for literal indices in `insertTemplate`
/// anchors.
pub const INDEX_PLACEHOLDER: &str = "--index--";

/// Expand an array node under scope `name`.
///
/// Item count: the bound data sequence's length when one exists, else
/// `minItems` (default 1, floor 1). Template-stamp mode always renders
/// exactly one item. The anchor id of the first rendered item group, with
/// indices abstracted, is recorded in the annotations as the node's
/// insert-template.
pub(crate) fn expand_array<P: TemplatePack>(
    ctx: &WalkCtx<'_, P>,
    state: &mut WalkState,
    id: &str,
    name: &str,
    depth: u32,
    node: &SchemaNode,
) -> TableResult<()> {
    let Some(items) = node.items.as_deref() else {
        return Err(TableError::validation(format!(
            "array node '{name}' must declare an items schema"
        )));
    };
    let match_on = items.options.match_on.clone();
    let items_to_render = items_to_render(ctx, name, node);

    let group_id = format!("{id}-group-many");
    state.queue.enqueue_tag(
        keys::GROUP_ARRAY_OPEN,
        group_params(
            &group_id,
            name,
            depth,
            state.array_loop_count,
            node.options.clone(),
        ),
    );

    let mut insert_seed: Option<String> = None;
    for index in 0..items_to_render {
        if let Some(reference) = &items.reference {
            let resolved = resolve_cached(ctx.deps, reference)?;
            let item_id = expand_item(ctx, state, id, name, depth, index, resolved)?;
            if index == 0 {
                insert_seed = Some(item_id);
            }
        } else if items.any_of.is_some() {
            expand_any_of(ctx, state, name, depth, index, match_on.as_deref(), items)?;
        } else if let Some(variants) = &items.one_of {
            // Only the first variant whose $ref matches options.matchOn fires.
            for variant in variants {
                let Some(reference) = &variant.reference else {
                    continue;
                };
                if match_on.as_deref() == Some(reference.as_str()) {
                    let resolved = resolve_cached(ctx.deps, reference)?;
                    let item_scope = scope::child_scope(Some(name), &index.to_string());
                    walk(
                        ctx,
                        state,
                        resolved,
                        depth + 1,
                        Some(&item_scope),
                        RenderPass::Body,
                    )?;
                    break;
                }
            }
        } else {
            let item_id = expand_item(ctx, state, id, name, depth, index, items)?;
            if index == 0 {
                insert_seed = Some(item_id);
            }
        }
    }

    if let Some(seed) = insert_seed {
        state
            .annotations
            .insert_templates
            .insert(name.to_string(), format!("tmpl-{}", abstract_indices(&seed)));
    }

    state.queue.enqueue_tag(
        keys::GROUP_ARRAY_CLOSE,
        group_params(
            &group_id,
            name,
            depth,
            state.array_loop_count,
            node.options.clone(),
        ),
    );
    Ok(())
}

fn items_to_render<P: TemplatePack>(ctx: &WalkCtx<'_, P>, name: &str, node: &SchemaNode) -> usize {
    if ctx.mode.is_stamp() {
        return 1;
    }
    let count = match scope::lookup_value(ctx.data, name) {
        Some(Value::Array(bound)) => bound.len(),
        _ => usize::try_from(node.min_items.unwrap_or(1)).unwrap_or(1),
    };
    count.max(1)
}

/// Emit one array item wrapped in group open/close tasks, walking its schema
/// under the indexed scope. Returns the raw open-tag id used for the
/// insert-template anchor.
fn expand_item<P: TemplatePack>(
    ctx: &WalkCtx<'_, P>,
    state: &mut WalkState,
    id: &str,
    name: &str,
    depth: u32,
    index: usize,
    item: &SchemaNode,
) -> TableResult<String> {
    let (open_id, close_id, item_scope) = if ctx.mode.is_stamp() {
        let token = format!("{}{}{}", ctx.tokens.open, ctx.tokens.index, ctx.tokens.close);
        let item_scope = format!("{name}[{token}]");
        let group_id = format!("{id}-group-{token}");
        (format!("{group_id}-{item_scope}"), group_id, item_scope)
    } else {
        let group_id = format!("{id}-group--{index}");
        let item_scope = scope::child_scope(Some(name), &index.to_string());
        (group_id.clone(), group_id, item_scope)
    };

    state.queue.enqueue_tag(
        keys::GROUP_ITEM_OPEN,
        group_params(
            &open_id,
            &item_scope,
            depth + 1,
            state.array_loop_count,
            Default::default(),
        ),
    );
    walk(ctx, state, item, depth + 1, Some(&item_scope), RenderPass::Body)?;
    state.queue.enqueue_tag(
        keys::GROUP_ITEM_CLOSE,
        group_params(
            &close_id,
            &item_scope,
            depth + 1,
            state.array_loop_count,
            Default::default(),
        ),
    );

    Ok(open_id)
}

/// Union dispatch for `anyOf` inside an array item.
///
/// Concrete mode walks only the variant whose `$ref` equals the data value at
/// `name[index][matchOn]`. Stamp mode walks every variant, each wrapped in
/// its own union-boundary tasks, under a token-stamped index scope. The
/// union-nesting counter is restored even when a variant walk fails.
fn expand_any_of<P: TemplatePack>(
    ctx: &WalkCtx<'_, P>,
    state: &mut WalkState,
    name: &str,
    depth: u32,
    index: usize,
    match_on: Option<&str>,
    items: &SchemaNode,
) -> TableResult<()> {
    state.array_loop_count += 1;
    let result = expand_any_of_variants(ctx, state, name, depth, index, match_on, items);
    state.array_loop_count -= 1;
    result
}

fn expand_any_of_variants<P: TemplatePack>(
    ctx: &WalkCtx<'_, P>,
    state: &mut WalkState,
    name: &str,
    depth: u32,
    index: usize,
    match_on: Option<&str>,
    items: &SchemaNode,
) -> TableResult<()> {
    let Some(variants) = &items.any_of else {
        return Ok(());
    };

    for variant in variants {
        let Some(reference) = &variant.reference else {
            continue;
        };

        if ctx.mode.is_stamp() {
            let stamped = format!(
                "{name}[{}{}{}{}]",
                ctx.tokens.open,
                ctx.tokens.back_tick.repeat(state.array_loop_count),
                ctx.tokens.index,
                ctx.tokens.close
            );
            state.queue.enqueue_tag(
                keys::ANY_OF_OPEN,
                TemplateParams {
                    data_ref: Some(reference.clone()),
                    ..TemplateParams::default()
                },
            );
            let resolved = resolve_cached(ctx.deps, reference)?;
            walk(ctx, state, resolved, depth + 1, Some(&stamped), RenderPass::Body)?;
            state.queue.enqueue_tag(
                keys::ANY_OF_CLOSE,
                TemplateParams {
                    data_ref: Some(reference.clone()),
                    ..TemplateParams::default()
                },
            );
            continue;
        }

        let probe = match_on.map(|m| format!("{name}[{index}][{m}]"));
        let matched = probe
            .as_deref()
            .and_then(|p| scope::lookup_value(ctx.data, p))
            .and_then(Value::as_str)
            == Some(reference.as_str());
        if matched {
            let resolved = resolve_cached(ctx.deps, reference)?;
            let item_scope = scope::child_scope(Some(name), &index.to_string());
            walk(
                ctx,
                state,
                resolved,
                depth + 1,
                Some(&item_scope),
                RenderPass::Body,
            )?;
        }
    }
    Ok(())
}

/// Abstract literal indices out of an item group id: every numeric `--N` id
/// suffix becomes `---index--`, and the first bracketed numeric index becomes
/// `[--index--]`.
pub(crate) fn abstract_indices(seed: &str) -> String {
    let mut out = String::with_capacity(seed.len());
    let mut i = 0;
    let mut bracket_done = false;

    while i < seed.len() {
        let rest = &seed[i..];

        if let Some(after) = rest.strip_prefix("--") {
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();
            if digits > 0 {
                out.push('-');
                out.push_str(INDEX_PLACEHOLDER);
                i += 2 + digits;
                continue;
            }
        }
        if !bracket_done && let Some(after) = rest.strip_prefix('[') {
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();
            if digits > 0 && after[digits..].starts_with(']') {
                out.push('[');
                out.push_str(INDEX_PLACEHOLDER);
                out.push(']');
                bracket_done = true;
                i += digits + 2;
                continue;
            }
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/engine/expand.rs"]
mod tests;
