//! Best-effort parsing of LLM-enriched knowledge chunks.

use serde::{Deserialize, Serialize};

use super::document::KnowledgeDocument;
use super::metadata::DocumentMetadata;

/// Semantic fields an LLM extracted from one knowledge-base chunk.
///
/// Every field defaults to empty, so partial or malformed model output still
/// yields a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichedChunk {
    #[serde(rename = "tema")]
    pub topic: String,
    #[serde(rename = "rol_afectado")]
    pub affected_role: String,
    #[serde(rename = "accion_recomendada")]
    pub recommended_action: String,
    #[serde(rename = "riesgo")]
    pub risk: String,
    #[serde(rename = "tipo_vulnerabilidad")]
    pub vulnerability_type: String,
    #[serde(rename = "nivel_impacto")]
    pub impact_level: String,
    /// Actor, threat, mitigation.
    #[serde(rename = "triplete")]
    pub triple: Vec<String>,
}

impl EnrichedChunk {
    pub fn is_empty(&self) -> bool {
        self.recommended_action.trim().is_empty() && self.topic.trim().is_empty()
    }

    /// Converts the chunk into a knowledge document citing `source`.
    ///
    /// Content is the recommended action, or the topic when no action was
    /// extracted. Returns `None` for chunks with neither.
    pub fn into_document(self, id: impl Into<String>, source: &str) -> Option<KnowledgeDocument> {
        if self.is_empty() {
            return None;
        }
        let content = if self.recommended_action.trim().is_empty() {
            self.topic.trim().to_string()
        } else {
            self.recommended_action.trim().to_string()
        };
        let triple_part = |index: usize| self.triple.get(index).cloned().unwrap_or_default();

        let metadata = DocumentMetadata::new()
            .with("source", source)
            .with("topic", self.topic.trim())
            .with("affected_role", self.affected_role.trim())
            .with("risk", self.risk.trim())
            .with("vulnerability_type", self.vulnerability_type.trim())
            .with("impact", self.impact_level.trim())
            .with("actor", triple_part(0))
            .with("threat", triple_part(1))
            .with("mitigation", triple_part(2));

        Some(KnowledgeDocument::new(id, content, metadata))
    }
}

/// Parses model output into an [`EnrichedChunk`], never failing.
///
/// Surrounding Markdown code fences are stripped; anything that still is not
/// a JSON object yields the empty record.
pub fn parse_enriched_chunk(text: &str) -> EnrichedChunk {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```json").or_else(|| body.strip_prefix("```")) {
        body = rest;
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    serde_json::from_str(body.trim()).unwrap_or_default()
}
