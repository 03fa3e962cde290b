//! Built-in HTML template pack.
//!
//! Renders a plain semantic table (`<table>/<thead>/<tbody>`) with group and
//! union boundaries as classed wrapper elements. All interpolated text and
//! attribute values are HTML-escaped. The pack is synchronous internally but
//! fulfills the asynchronous [`TemplatePack`] contract, so it can be swapped
//! for packs that load or compile templates lazily.

use crate::{
    foundation::error::{TableError, TableResult},
    pack::templates::{EngineTokens, RenderMode, TemplatePack, TemplateParams, keys},
    schema::model::SchemaNode,
};

#[derive(Clone, Debug, Default)]
/// Default pack producing self-contained HTML tables.
pub struct HtmlPack {
    mode: RenderMode,
}

impl HtmlPack {
    /// Create a pack in concrete data-rendering mode (mode 1).
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch the pack's render mode.
    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }
}

impl TemplatePack for HtmlPack {
    fn render_mode(&self) -> RenderMode {
        self.mode
    }

    fn engine_tokens(&self) -> EngineTokens {
        EngineTokens::default()
    }

    fn is_visible(&self, node: &SchemaNode) -> bool {
        !node.options.hidden
    }

    async fn render(&self, key: &str, params: &TemplateParams) -> TableResult<String> {
        let id = params.id.as_deref().unwrap_or_default();
        let name = params.name.as_deref().unwrap_or_default();

        let html = match key {
            keys::TABLE_OPEN => {
                let mut attrs = String::new();
                if let Some(endpoint) = &params.endpoint {
                    attrs.push_str(&format!(" data-endpoint=\"{}\"", escape_html(endpoint)));
                }
                if let Some(method) = &params.method {
                    attrs.push_str(&format!(" data-method=\"{}\"", escape_html(method)));
                }
                format!(
                    "<table id=\"{}\" class=\"schema-table\"{attrs}>",
                    escape_html(id)
                )
            }
            keys::TABLE_CLOSE => "</table>".to_string(),
            keys::TABLE_HEADER_OPEN => "<thead>".to_string(),
            keys::TABLE_HEADER_CLOSE => "</thead>".to_string(),
            keys::TABLE_BODY_OPEN => "<tbody>".to_string(),
            keys::TABLE_BODY_CLOSE => "</tbody>".to_string(),
            keys::TABLE_ROW_OPEN => "<tr>".to_string(),
            keys::TABLE_ROW_CLOSE => "</tr>".to_string(),
            keys::TABLE_HEADER => {
                let label = params.label.as_deref().unwrap_or(name);
                format!(
                    "<th id=\"{}\" scope=\"col\">{}</th>",
                    escape_html(id),
                    escape_html(label)
                )
            }
            keys::TABLE_ITEM => format!(
                "<td id=\"{}\" data-name=\"{}\">{}</td>",
                escape_html(id),
                escape_html(name),
                display_value(params.val.as_ref())
            ),
            keys::TABLE_HEADER_ACTIONS => "<th class=\"actions\" scope=\"col\"></th>".to_string(),
            keys::TABLE_ACTIONS => format!(
                "<td class=\"actions\" data-id=\"{}\">\
                 <button type=\"button\" data-action=\"edit\">Edit</button>\
                 <button type=\"button\" data-action=\"remove\">Remove</button></td>",
                escape_html(id)
            ),
            keys::START_GROUP => format!(
                "<td id=\"{}\" class=\"group\" data-depth=\"{}\">",
                escape_html(id),
                params.options.depth.unwrap_or(0)
            ),
            keys::END_GROUP => "</td>".to_string(),
            keys::GROUP_ARRAY_OPEN => format!(
                "<td id=\"{}\" class=\"group group-many\" data-name=\"{}\">",
                escape_html(id),
                escape_html(name)
            ),
            keys::GROUP_ARRAY_CLOSE => "</td>".to_string(),
            keys::GROUP_ITEM_OPEN => format!(
                "<span id=\"{}\" class=\"group-item\" data-name=\"{}\">",
                escape_html(id),
                escape_html(name)
            ),
            keys::GROUP_ITEM_CLOSE => "</span>".to_string(),
            keys::ANY_OF_OPEN => format!(
                "<span class=\"any-of\" data-ref=\"{}\">",
                escape_html(params.data_ref.as_deref().unwrap_or_default())
            ),
            keys::ANY_OF_CLOSE => "</span>".to_string(),
            other => {
                return Err(TableError::config(format!(
                    "template has no valid path: {other}"
                )));
            }
        };

        Ok(html)
    }
}

fn display_value(val: Option<&serde_json::Value>) -> String {
    match val {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => escape_html(s),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(other) => escape_html(&other.to_string()),
    }
}

/// Escape `&`, `<`, `>` and `"` for safe text and attribute interpolation.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/pack/html.rs"]
mod tests;
