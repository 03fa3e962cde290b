use std::collections::{BTreeMap, HashMap};

use crate::foundation::error::{TableError, TableResult};

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// One node of the schema definition tree.
///
/// A schema node is a pure data model deserialized from JSON. The engine
/// treats the tree as read-only for its whole lifetime; derived values (DOM
/// ids, insert-template anchors) are reported through
/// [`crate::Annotations`] instead of being written back into the tree.
pub struct SchemaNode {
    /// Declared type, absent when `$ref` is present.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    /// Reference identifier into the [`DependencyCache`].
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Authored identifier; falls back to the scope path when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display label; falls back to the scope path when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Child properties of an `object` node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaNode>>,
    /// Item schema of an `array` node (may itself carry `anyOf`/`oneOf`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    /// Union variants (`anyOf`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<UnionVariant>>,
    /// Union variants (`oneOf`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<UnionVariant>>,
    /// Free-form render configuration bag.
    pub options: FieldOptions,
    /// Minimum item count for arrays without bound data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    /// Maximum item count (carried, not enforced).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// Uniqueness marker (carried, not enforced).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    /// Whether the field is required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Inline definitions, used by the definition resolver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<BTreeMap<String, SchemaNode>>,
    /// Unrecognized keys, preserved for round-tripping.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Declared schema node types.
pub enum SchemaType {
    /// Nested object with properties.
    Object,
    /// Scalar string field.
    String,
    /// Scalar number field.
    Number,
    /// Scalar integer field.
    Integer,
    /// Scalar boolean field.
    Boolean,
    /// Sequence of items.
    Array,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Effective dispatch type: the declared type, or `Ref` when `$ref` is set.
pub enum EffectiveType {
    /// Node carries a `$ref` (wins over any declared type).
    Ref,
    /// `object`
    Object,
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer`
    Integer,
    /// `boolean`
    Boolean,
    /// `array`
    Array,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Free-form render configuration attached to a schema node.
///
/// `key`, `key_name`, `key_inner` and `array_depth` are filled in by the
/// walker when it assembles template parameters; the remaining fields are
/// authored in the schema document.
pub struct FieldOptions {
    /// Data field name compared against union variant `$ref`s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_on: Option<String>,
    /// Template key override for this node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Nesting depth, assigned during the walk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    /// Reference id of an auxiliary data source schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasrc: Option<String>,
    /// Dotted data path of the field, assigned during the walk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Raw (un-prefixed) property name, assigned during the walk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    /// Name with its outermost index bracket stripped, assigned during the walk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_inner: Option<String>,
    /// Union-nesting counter at task creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_depth: Option<usize>,
    /// Hide this node and its subtree (honored by the default pack).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    /// Unrecognized option keys, passed through to templates.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// One variant of an `anyOf`/`oneOf` union.
pub struct UnionVariant {
    /// Reference identifier of the variant schema.
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Unrecognized keys, preserved for round-tripping.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SchemaNode {
    /// The effective dispatch type: `Ref` when `$ref` is present, otherwise
    /// the declared `type`. `None` when neither is set.
    pub fn effective_type(&self) -> Option<EffectiveType> {
        if self.reference.is_some() {
            return Some(EffectiveType::Ref);
        }
        self.schema_type.map(|t| match t {
            SchemaType::Object => EffectiveType::Object,
            SchemaType::String => EffectiveType::String,
            SchemaType::Number => EffectiveType::Number,
            SchemaType::Integer => EffectiveType::Integer,
            SchemaType::Boolean => EffectiveType::Boolean,
            SchemaType::Array => EffectiveType::Array,
        })
    }

    /// Validate structural invariants the engine relies on.
    pub fn validate(&self) -> TableResult<()> {
        if self.schema_type == Some(SchemaType::Array) && self.items.is_none() {
            return Err(TableError::validation(
                "array node must declare an items schema",
            ));
        }
        if let Some(props) = &self.properties {
            for (key, child) in props {
                if key.trim().is_empty() {
                    return Err(TableError::validation("property key must be non-empty"));
                }
                child.validate()?;
            }
        }
        if let Some(items) = &self.items {
            items.validate()?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
/// Flat mapping from reference identifier to resolved schema fragment.
///
/// Populated by [`crate::SchemaResolver::populate`] before a walk begins; the
/// walker only reads it. Every identifier reachable via `$ref`,
/// `anyOf[].$ref`, `oneOf[].$ref` or `items.$ref` must be present before the
/// walk touches it.
pub struct DependencyCache {
    entries: HashMap<String, SchemaNode>,
}

impl DependencyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resolved fragment under its reference identifier.
    pub fn insert(&mut self, id: impl Into<String>, node: SchemaNode) {
        self.entries.insert(id.into(), node);
    }

    /// Look up a resolved fragment.
    pub fn get(&self, id: &str) -> Option<&SchemaNode> {
        self.entries.get(id)
    }

    /// Whether a reference identifier has been resolved.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of cached fragments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/model.rs"]
mod tests;
