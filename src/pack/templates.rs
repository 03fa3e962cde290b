//! The template pack contract.
//!
//! A pack owns the named templates the engine renders through, a render-mode
//! indicator, the engine tokens used for template-stamp output, and the
//! per-node visibility predicate. The engine itself never produces markup; it
//! only decides which template to invoke with which parameters, and in which
//! output position the result lands.

use crate::{
    foundation::error::TableResult,
    schema::model::{FieldOptions, SchemaNode},
};

/// Well-known template keys the engine invokes by default.
///
/// A pack must render every one of these; a schema node may override the
/// field-level keys through `options.format`.
pub mod keys {
    /// Opens the table element.
    pub const TABLE_OPEN: &str = "tableOpen";
    /// Closes the table element.
    pub const TABLE_CLOSE: &str = "tableClose";
    /// Opens the header section.
    pub const TABLE_HEADER_OPEN: &str = "tableHeaderOpen";
    /// Closes the header section.
    pub const TABLE_HEADER_CLOSE: &str = "tableHeaderClose";
    /// Opens the body section.
    pub const TABLE_BODY_OPEN: &str = "tableBodyOpen";
    /// Closes the body section.
    pub const TABLE_BODY_CLOSE: &str = "tableBodyClose";
    /// Opens a row.
    pub const TABLE_ROW_OPEN: &str = "tableRowOpen";
    /// Closes a row.
    pub const TABLE_ROW_CLOSE: &str = "tableRowClose";
    /// One header cell for a leaf field.
    pub const TABLE_HEADER: &str = "tableHeader";
    /// One body cell for a leaf field.
    pub const TABLE_ITEM: &str = "tableItem";
    /// Row-level action cell.
    pub const TABLE_ACTIONS: &str = "tableActions";
    /// Header-level action cell.
    pub const TABLE_HEADER_ACTIONS: &str = "tableHeaderActions";
    /// Opens a generic group.
    pub const START_GROUP: &str = "startGroup";
    /// Closes a generic group.
    pub const END_GROUP: &str = "endGroup";
    /// Opens an array group.
    pub const GROUP_ARRAY_OPEN: &str = "groupArrayOpen";
    /// Closes an array group.
    pub const GROUP_ARRAY_CLOSE: &str = "groupArrayClose";
    /// Opens one array item group.
    pub const GROUP_ITEM_OPEN: &str = "groupItemOpen";
    /// Closes one array item group.
    pub const GROUP_ITEM_CLOSE: &str = "groupItemClose";
    /// Opens a union variant boundary.
    pub const ANY_OF_OPEN: &str = "anyOfOpen";
    /// Closes a union variant boundary.
    pub const ANY_OF_CLOSE: &str = "anyOfClose";
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// What kind of output the active pack produces.
pub enum RenderMode {
    /// Mode 1: concrete data-bound rendering.
    #[default]
    Data,
    /// Mode 2: reusable client-side row-template rendering. Arrays emit
    /// exactly one token-stamped item group and every union variant.
    Stamp,
}

impl RenderMode {
    /// Whether the pack renders reusable row templates (mode 2).
    pub fn is_stamp(self) -> bool {
        self == RenderMode::Stamp
    }
}

#[derive(Clone, Debug)]
/// Tokens substituted for literal array indices in template-stamp mode.
///
/// A stamped index is composed as `open + back_tick*n + index + close`, where
/// `n` is the union-nesting depth at the point of substitution. The client
/// replaces the token when cloning rows.
pub struct EngineTokens {
    /// Index placeholder name.
    pub index: String,
    /// Escape prefix repeated per union-nesting level.
    pub back_tick: String,
    /// Token opening delimiter.
    pub open: String,
    /// Token closing delimiter.
    pub close: String,
}

impl Default for EngineTokens {
    fn default() -> Self {
        Self {
            index: "index".to_string(),
            back_tick: "`".to_string(),
            open: "${".to_string(),
            close: "}".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// Uniform parameter record passed to every template invocation.
///
/// Field and action tasks fill the whole record; structural tags carry only
/// the subset their template reads. `val` is forced to `None` when a field
/// task renders its dummy/template fragment.
pub struct TemplateParams {
    /// Sanitized DOM identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Scope path of the bound value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Bound data value, absent in dummy renders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<serde_json::Value>,
    /// Auxiliary source list for choice-like fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<serde_json::Value>,
    /// Display label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Render options snapshot (walker-augmented).
    pub options: FieldOptions,
    /// Whether the field is required.
    pub required: bool,
    /// Resolved `options.datasrc` schema fragment, when declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasrc: Option<SchemaNode>,
    /// Submission endpoint (table open / action templates).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Submission HTTP method (table open / action templates).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Union variant reference (anyOf boundary templates).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_ref: Option<String>,
    /// Item total for group templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// External collaborator supplying named template execution and the per-node
/// visibility predicate.
///
/// `render` may suspend (template load, compile, execute); the engine
/// guarantees only one render is ever in flight at a time, so packs need no
/// internal synchronization beyond `Send + Sync`.
pub trait TemplatePack: Send + Sync {
    /// One-time initialization before the first render.
    fn build(&mut self) -> TableResult<()> {
        Ok(())
    }

    /// Render-mode indicator for this pack.
    fn render_mode(&self) -> RenderMode {
        RenderMode::Data
    }

    /// Engine tokens used for template-stamp output.
    fn engine_tokens(&self) -> EngineTokens {
        EngineTokens::default()
    }

    /// Visibility/security predicate. A `false` return skips the node and its
    /// entire subtree; this is a feature gate, not a type check.
    fn is_visible(&self, node: &SchemaNode) -> bool;

    /// Execute the template registered under `key` against `params`.
    ///
    /// Unknown keys must fail with [`crate::TableError::Config`]; execution
    /// failures with [`crate::TableError::Render`].
    fn render(
        &self,
        key: &str,
        params: &TemplateParams,
    ) -> impl Future<Output = TableResult<String>> + Send;
}

#[cfg(test)]
#[path = "../../tests/unit/pack/templates.rs"]
mod tests;
