//! Schematable is a schema-driven HTML table rendering engine.
//!
//! Schematable walks a JSON-Schema-like document together with a matching
//! data object and produces an HTML table representation of that data,
//! suitable for display or for an editable table UI.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: `SchemaResolver::populate` fills the [`DependencyCache`]
//!    with every `$ref` fragment reachable from the schema (file, inline
//!    definition, or HTTP sources)
//! 2. **Walk**: the schema walker dispatches on node type over header and
//!    body passes, enqueuing [`RenderTask`]s bound to fixed output positions
//! 3. **Drain**: a single-lane asynchronous runner executes the tasks
//!    strictly in order through the active [`TemplatePack`]
//! 4. **Join**: the positional buffers concatenate into the final HTML (and
//!    a parallel reusable-template output)
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Read-only inputs**: the schema tree and the data object are never
//!   mutated; derived ids and insert-template anchors are reported through
//!   [`Annotations`].
//! - **No IO in the walk**: reference resolution is front-loaded into the
//!   [`DependencyCache`] before a walk begins.
//! - **Explicit ordering**: output order is carried by enqueue-time
//!   positions and the single-lane drain contract, never by execution
//!   timing.
//!
//! # Getting started
//!
//! Construct a [`TableEngine`] with a schema, a data object, [`TableOptions`]
//! and a pack (see [`HtmlPack`] for the built-in one), populate its
//! dependency cache via [`TableEngine::prepare`], then await
//! [`TableEngine::build`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod engine;
mod foundation;
mod pack;
mod schema;

pub use engine::builder::{Annotations, TableEngine, TableOptions, TableOutput};
pub use engine::expand::INDEX_PLACEHOLDER;
pub use engine::task::{OutputBuffers, RenderQueue, RenderTask, TaskKind};
pub use foundation::error::{TableError, TableResult};
pub use foundation::scope::{
    child_scope, dot_syntax, generate_id, inner_name, lookup_value, raw_name,
};
pub use pack::html::{HtmlPack, escape_html};
pub use pack::templates::{EngineTokens, RenderMode, TemplatePack, TemplateParams, keys};
pub use schema::model::{
    DependencyCache, EffectiveType, FieldOptions, SchemaNode, SchemaType, UnionVariant,
};
pub use schema::resolver::{SchemaResolver, collect_refs};
