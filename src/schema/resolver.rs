//! Reference resolution for `$ref` schema fragments.
//!
//! Resolution happens entirely before a walk: [`SchemaResolver::populate`]
//! collects every reachable reference and fills the [`DependencyCache`]; the
//! walker never performs IO. Three sources are supported, dispatched on the
//! reference path: HTTP(S) URLs, inline `definitions` of a base document, and
//! JSON files under a configured base path.

use std::path::{Path, PathBuf};

use crate::{
    foundation::error::{TableError, TableResult},
    schema::model::{DependencyCache, SchemaNode},
};

/// Resolves schema reference paths into parsed fragments.
pub struct SchemaResolver {
    base_path: Option<PathBuf>,
    base_document: Option<SchemaNode>,
    http: reqwest::Client,
}

impl SchemaResolver {
    /// Create a resolver with neither a file base path nor a base document.
    /// Only HTTP(S) references can be resolved in this configuration.
    pub fn new() -> Self {
        Self {
            base_path: None,
            base_document: None,
            http: reqwest::Client::new(),
        }
    }

    /// Resolve non-URL references as files relative to `base_path`.
    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Resolve non-URL references against the `definitions` of `document`.
    /// Takes precedence over file resolution.
    pub fn with_base_document(mut self, document: SchemaNode) -> Self {
        self.base_document = Some(document);
        self
    }

    /// Resolve a single reference path to a parsed schema fragment.
    pub async fn resolve(&self, ref_path: &str) -> TableResult<SchemaNode> {
        if ref_path.starts_with("http://") || ref_path.starts_with("https://") {
            return self.resolve_http(ref_path).await;
        }
        if self.base_document.is_some() {
            return self.resolve_definition(ref_path);
        }
        self.resolve_file(ref_path).await
    }

    /// Populate `cache` with every reference reachable from `schema`,
    /// following references inside resolved fragments. Already-cached
    /// identifiers are skipped, which also terminates cyclic reference
    /// chains.
    #[tracing::instrument(skip(self, cache, schema))]
    pub async fn populate(
        &self,
        cache: &mut DependencyCache,
        schema: &SchemaNode,
    ) -> TableResult<()> {
        let mut pending = Vec::new();
        collect_refs(schema, &mut pending);

        while let Some(ref_path) = pending.pop() {
            if cache.contains(&ref_path) {
                continue;
            }
            let fragment = self.resolve(&ref_path).await?;
            collect_refs(&fragment, &mut pending);
            tracing::debug!(reference = %ref_path, "resolved schema fragment");
            cache.insert(ref_path, fragment);
        }
        Ok(())
    }

    fn resolve_definition(&self, ref_path: &str) -> TableResult<SchemaNode> {
        let base = self
            .base_document
            .as_ref()
            .ok_or_else(|| TableError::config("missing base document for definition resolution"))?;
        base.definitions
            .as_ref()
            .and_then(|defs| defs.get(ref_path))
            .cloned()
            .ok_or_else(|| TableError::resolve(format!("missing definition '{ref_path}'")))
    }

    async fn resolve_file(&self, ref_path: &str) -> TableResult<SchemaNode> {
        let base = self
            .base_path
            .as_ref()
            .ok_or_else(|| TableError::config(format!("no base path specified: {ref_path}")))?;
        let path = normalize_ref_file(base, ref_path)?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            TableError::resolve(format!("read schema file '{}': {e}", path.display()))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            TableError::resolve(format!("parse schema file '{}': {e}", path.display()))
        })
    }

    async fn resolve_http(&self, ref_path: &str) -> TableResult<SchemaNode> {
        let response = self
            .http
            .get(ref_path)
            .send()
            .await
            .map_err(|e| TableError::resolve(format!("failed to load resource '{ref_path}': {e}")))?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(TableError::resolve(format!(
                "failed to load resource '{ref_path}': status {}",
                response.status()
            )));
        }
        response
            .json::<SchemaNode>()
            .await
            .map_err(|e| TableError::resolve(format!("parse schema resource '{ref_path}': {e}")))
    }
}

impl Default for SchemaResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_ref_file(base: &Path, ref_path: &str) -> TableResult<PathBuf> {
    let rel = ref_path.replace('\\', "/");
    if rel.starts_with('/') || rel.split('/').any(|part| part == "..") {
        return Err(TableError::config(format!(
            "schema reference path must be relative and must not contain '..': {ref_path}"
        )));
    }
    Ok(base.join(rel))
}

/// Collect every reference identifier declared directly on `node` or its
/// subtree: `$ref`, `items.$ref`, `items.anyOf[].$ref`, `items.oneOf[].$ref`,
/// property subtrees, and `options.datasrc`.
pub fn collect_refs(node: &SchemaNode, out: &mut Vec<String>) {
    if let Some(r) = &node.reference {
        out.push(r.clone());
    }
    if let Some(datasrc) = &node.options.datasrc {
        out.push(datasrc.clone());
    }
    for variants in [&node.any_of, &node.one_of] {
        if let Some(variants) = variants {
            for v in variants {
                if let Some(r) = &v.reference {
                    out.push(r.clone());
                }
            }
        }
    }
    if let Some(items) = &node.items {
        collect_refs(items, out);
    }
    if let Some(props) = &node.properties {
        for child in props.values() {
            collect_refs(child, out);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/resolver.rs"]
mod tests;
