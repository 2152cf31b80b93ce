//! Documentation metadata and runtime introspection snapshots.

use serde::{Deserialize, Serialize};

use crate::schema::TypeTag;

/// Documentation attached to a schema node. Never consulted while parsing.
///
/// Usually filled through [`ZodType::describe`](crate::ZodType::describe)
/// and its siblings; [`ZodType::meta`](crate::ZodType::meta) replaces it
/// wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaMetadata {
    pub description: Option<String>,
    /// Set together with `deprecation_message`.
    pub deprecated: bool,
    pub deprecation_message: Option<String>,
    /// Sample inputs, in their JSON form.
    pub examples: Vec<serde_json::Value>,
    pub tags: Vec<String>,
}

impl SchemaMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been documented.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    pub fn with_deprecation_message(self, message: impl Into<String>) -> Self {
        Self {
            deprecated: true,
            deprecation_message: Some(message.into()),
            ..self
        }
    }

    pub fn with_example(mut self, example: serde_json::Value) -> Self {
        self.examples.push(example);
        self
    }

    /// Tags are kept once each, in first-seen order.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }
}

/// Serializable snapshot of a schema tree for external consumers
/// (documentation generators, type-hint renderers).
///
/// Lazy nodes are not expanded, so recursive schemas produce finite
/// descriptors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDescriptor {
    pub type_tag: TypeTag,
    pub optional: bool,
    pub nullable: bool,
    #[serde(skip_serializing_if = "SchemaMetadata::is_empty")]
    pub metadata: SchemaMetadata,
    /// Object property names, aligned with `children` for object schemas.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SchemaDescriptor>,
}
