//! Engine entry point: one instance per render request.
//!
//! Construction takes ownership of the schema, the data object, the options
//! and the pack; `build` consumes the engine (position counters and buffers
//! are never reset for a second run). The build walks the header row and the
//! body row independently, enqueuing render tasks, then drains the queue on
//! a single asynchronous lane and concatenates the positional output.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::{
    engine::{
        expand,
        walker::{RenderPass, WalkCtx, WalkState, walk},
    },
    foundation::{error::TableResult, scope},
    pack::templates::{TemplatePack, TemplateParams, keys},
    schema::model::{DependencyCache, SchemaNode},
    schema::resolver::SchemaResolver,
};

#[derive(Clone, Debug, Default)]
/// Configuration for one render request.
pub struct TableOptions {
    /// Base path for file-based `$ref` resolution.
    pub schema_base_path: Option<PathBuf>,
    /// Prefix prepended to every data path and parameter name.
    pub data_prefix: Option<String>,
    /// Bind non-scalar data values raw into field parameters.
    pub raw_data: bool,
    /// Emit header and row action cells.
    pub show_actions: bool,
    /// Submission endpoint forwarded to the table open / action templates.
    pub endpoint: Option<String>,
    /// Submission HTTP method forwarded to the table open / action templates.
    pub method: Option<String>,
}

#[derive(Clone, Debug, Default, serde::Serialize)]
/// Derived artifacts of a walk, reported instead of mutating the schema tree.
pub struct Annotations {
    /// Sanitized DOM id per visited property scope path.
    pub ids: BTreeMap<String, String>,
    /// Insert-template anchor per expanded array scope path: the group id a
    /// caller duplicates when adding rows dynamically.
    pub insert_templates: BTreeMap<String, String>,
}

#[derive(Debug)]
/// Result of a successful build.
pub struct TableOutput {
    /// Concatenated data-bound HTML.
    pub html: String,
    /// Concatenated dummy/template HTML used to seed client-side row cloning.
    pub template_html: String,
    /// Derived ids and insert-template anchors.
    pub annotations: Annotations,
}

/// Schema-to-table render engine. Single-use: construct, prepare, build.
#[derive(Debug)]
pub struct TableEngine<P: TemplatePack> {
    schema: SchemaNode,
    data: serde_json::Value,
    options: TableOptions,
    pack: P,
    deps: DependencyCache,
    state: WalkState,
}

impl<P: TemplatePack> TableEngine<P> {
    /// Create an engine over `schema` and `data`, initializing the pack.
    pub fn new(
        schema: SchemaNode,
        data: serde_json::Value,
        options: TableOptions,
        mut pack: P,
    ) -> TableResult<Self> {
        schema.validate()?;
        pack.build()?;
        Ok(Self {
            schema,
            data,
            options,
            pack,
            deps: DependencyCache::new(),
            state: WalkState::default(),
        })
    }

    /// Read access to the dependency cache.
    pub fn dependency_cache(&self) -> &DependencyCache {
        &self.deps
    }

    /// Write access to the dependency cache, for callers that populate it
    /// without a [`SchemaResolver`].
    pub fn dependency_cache_mut(&mut self) -> &mut DependencyCache {
        &mut self.deps
    }

    /// Populate the dependency cache with every reference reachable from the
    /// schema. Must complete before `build`; the walk itself never resolves.
    pub async fn prepare(&mut self, resolver: &SchemaResolver) -> TableResult<()> {
        resolver.populate(&mut self.deps, &self.schema).await
    }

    /// Populate the dependency cache with a resolver derived from the engine
    /// options: file resolution under `schema_base_path`.
    pub async fn prepare_from_options(&mut self) -> TableResult<()> {
        let mut resolver = SchemaResolver::new();
        if let Some(base) = &self.options.schema_base_path {
            resolver = resolver.with_base_path(base);
        }
        resolver.populate(&mut self.deps, &self.schema).await
    }

    /// Expand an array node under scope `name`, appending its render tasks.
    ///
    /// Array nodes are deliberately a no-op in the general dispatch tables;
    /// this is the explicit entry point for array and union expansion.
    pub fn expand_array(
        &mut self,
        id: &str,
        name: &str,
        depth: u32,
        node: &SchemaNode,
    ) -> TableResult<()> {
        let ctx = WalkCtx {
            data: &self.data,
            deps: &self.deps,
            pack: &self.pack,
            mode: self.pack.render_mode(),
            tokens: self.pack.engine_tokens(),
            raw_data: self.options.raw_data,
        };
        expand::expand_array(&ctx, &mut self.state, id, name, depth, node)
    }

    /// Build the full table and resolve with the concatenated HTML string,
    /// or fail with the first encountered error.
    #[tracing::instrument(skip(self))]
    pub async fn build(mut self) -> TableResult<TableOutput> {
        let root_id = scope::generate_id(self.schema.id.as_deref().unwrap_or_default());
        let prefix = self.options.data_prefix.clone();

        self.state.queue.enqueue_tag(
            keys::TABLE_OPEN,
            TemplateParams {
                id: Some(root_id.clone()),
                endpoint: self.options.endpoint.clone(),
                method: self.options.method.clone(),
                ..TemplateParams::default()
            },
        );

        self.enqueue_plain_tag(keys::TABLE_HEADER_OPEN);
        self.enqueue_plain_tag(keys::TABLE_ROW_OPEN);
        self.walk_root(prefix.as_deref(), RenderPass::Header)?;
        if self.options.show_actions {
            self.enqueue_actions(&root_id, prefix.as_deref(), keys::TABLE_HEADER_ACTIONS);
        }
        self.enqueue_plain_tag(keys::TABLE_ROW_CLOSE);
        self.enqueue_plain_tag(keys::TABLE_HEADER_CLOSE);

        self.enqueue_plain_tag(keys::TABLE_BODY_OPEN);
        self.enqueue_plain_tag(keys::TABLE_ROW_OPEN);
        self.walk_root(prefix.as_deref(), RenderPass::Body)?;
        if self.options.show_actions {
            self.enqueue_actions(&root_id, prefix.as_deref(), keys::TABLE_ACTIONS);
        }
        self.enqueue_plain_tag(keys::TABLE_ROW_CLOSE);
        self.enqueue_plain_tag(keys::TABLE_BODY_CLOSE);
        self.enqueue_plain_tag(keys::TABLE_CLOSE);

        tracing::debug!(tasks = self.state.queue.len(), "draining render queue");
        let outputs = self.state.queue.drain(&self.pack).await?;

        Ok(TableOutput {
            html: outputs.join_data(),
            template_html: outputs.join_template(),
            annotations: self.state.annotations,
        })
    }

    fn walk_root(&mut self, prefix: Option<&str>, pass: RenderPass) -> TableResult<()> {
        let ctx = WalkCtx {
            data: &self.data,
            deps: &self.deps,
            pack: &self.pack,
            mode: self.pack.render_mode(),
            tokens: self.pack.engine_tokens(),
            raw_data: self.options.raw_data,
        };
        walk(&ctx, &mut self.state, &self.schema, 0, prefix, pass)
    }

    fn enqueue_plain_tag(&mut self, key: &str) {
        self.state
            .queue
            .enqueue_tag(key, TemplateParams::default());
    }

    fn enqueue_actions(&mut self, root_id: &str, prefix: Option<&str>, key: &str) {
        let name = prefix.unwrap_or_default();
        let options = crate::schema::model::FieldOptions {
            key: Some(scope::dot_syntax(name)),
            key_name: Some(scope::raw_name(name)),
            key_inner: Some(scope::inner_name(name)),
            array_depth: Some(self.state.array_loop_count),
            ..Default::default()
        };

        self.state.queue.enqueue_field(
            key,
            TemplateParams {
                id: Some(root_id.to_string()),
                name: Some(name.to_string()),
                endpoint: self.options.endpoint.clone(),
                method: self.options.method.clone(),
                options,
                ..TemplateParams::default()
            },
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/builder.rs"]
mod tests;
