//! Knowledge documents and the recommendations read from them.

use serde::{Deserialize, Serialize};

use super::metadata::DocumentMetadata;
use crate::domain::foundation::text::canonicalize;

pub const RECOMMENDATION_KEYS: &[&str] = &["recommendation", "recomendacion"];
pub const SOURCE_KEYS: &[&str] = &["source", "fuente"];
pub const DIMENSION_KEYS: &[&str] = &["dimension"];
pub const LEVEL_KEYS: &[&str] = &["level", "nivel"];
pub const EFFORT_KEYS: &[&str] = &["effort", "esfuerzo"];
pub const IMPACT_KEYS: &[&str] = &["impact", "impacto", "nivel_impacto"];
pub const TAG_KEYS: &[&str] = &["tags", "etiquetas", "keywords"];
pub const TOPIC_KEYS: &[&str] = &["topic", "tema"];
pub const EXCERPT_KEYS: &[&str] = &["excerpt", "extracto"];

/// A text body plus flat metadata, as held by a knowledge store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl KnowledgeDocument {
    pub fn new(id: impl Into<String>, content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata,
        }
    }

    /// Length of the body in characters, used to rank unseeded results.
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// A recommendation as delivered to a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub document_id: String,
}

impl Recommendation {
    /// Reads the recommendation attributes from a document.
    ///
    /// The text comes from the `recommendation` metadata entry, falling back
    /// to the document body.
    pub fn from_document(document: &KnowledgeDocument) -> Self {
        let metadata = &document.metadata;
        let text = metadata
            .text(RECOMMENDATION_KEYS)
            .unwrap_or_else(|| document.content.trim().to_string());

        Self {
            text,
            source: metadata.text(SOURCE_KEYS),
            dimension: metadata.text(DIMENSION_KEYS),
            level: metadata.text(LEVEL_KEYS),
            effort: metadata.text(EFFORT_KEYS),
            impact: metadata.text(IMPACT_KEYS),
            tags: metadata.list(TAG_KEYS),
            topic: metadata.text(TOPIC_KEYS),
            excerpt: metadata.text(EXCERPT_KEYS),
            document_id: document.id.clone(),
        }
    }

    /// Key under which two recommendations count as the same.
    pub fn canonical_key(&self) -> String {
        canonicalize(&self.text)
    }
}
