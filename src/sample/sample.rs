//! Deserialized sample records

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::SampleId;

/// Field holding the sample identifier
pub const ID_FIELD: &str = "_id";
/// Field holding the sample's tag list
pub const TAGS_FIELD: &str = "tags";

/// One data record of a dataset.
///
/// Fields other than the well-known ones are kept in `fields` and
/// round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Canonical identifier
    #[serde(rename = "_id")]
    pub id: SampleId,
    /// Path of the underlying media file
    pub filepath: String,
    /// Free-form tags
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Media metadata (size, dimensions, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Any other stored field
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Sample {
    /// Creates a sample with a fresh identifier
    pub fn new(filepath: impl Into<String>) -> Self {
        Self::with_id(SampleId::new(), filepath)
    }

    /// Creates a sample with the given identifier
    pub fn with_id(id: SampleId, filepath: impl Into<String>) -> Self {
        Self {
            id,
            filepath: filepath.into(),
            tags: BTreeSet::new(),
            metadata: None,
            fields: Map::new(),
        }
    }

    /// Adds a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Sets the metadata document
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Sets an extra field
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Builds a sample from a stored document
    pub fn from_document(document: Value) -> serde_json::Result<Self> {
        serde_json::from_value(document)
    }

    /// Stored document form of this sample
    pub fn to_document(&self) -> Value {
        let mut doc = self.fields.clone();
        doc.insert(ID_FIELD.to_string(), Value::String(self.id.to_canonical()));
        doc.insert("filepath".to_string(), Value::String(self.filepath.clone()));
        doc.insert(
            TAGS_FIELD.to_string(),
            Value::Array(self.tags.iter().cloned().map(Value::String).collect()),
        );
        if let Some(metadata) = &self.metadata {
            doc.insert("metadata".to_string(), metadata.clone());
        }
        Value::Object(doc)
    }
}
