//! Knowledge-base loading from JSON files.
//!
//! Two layouts are accepted:
//!
//! - A document array: `[{"id": "...", "content": "...", "metadata": {...}, "embedding": [...]}]`
//! - An enrichment file: `{"fuente": "guide.pdf", "chunks_enriquecidos": [{...}, "```json ...```"]}`
//!   where each chunk is either an object or raw model output.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::domain::recommendation::{
    parse_enriched_chunk, DocumentMetadata, EnrichedChunk, KnowledgeDocument,
};
use crate::ports::KnowledgeStoreError;

/// A loaded document with its precomputed vector, if the file carried one.
pub type LoadedDocument = (KnowledgeDocument, Option<Vec<f32>>);

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, alias = "page_content", alias = "text")]
    content: String,
    #[serde(default)]
    metadata: serde_json::Map<String, Value>,
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct EnrichmentFile {
    #[serde(default, alias = "fuente")]
    source: String,
    #[serde(alias = "chunks_enriquecidos")]
    enriched_chunks: Vec<Value>,
}

pub struct JsonKnowledgeBaseLoader;

impl JsonKnowledgeBaseLoader {
    /// Loads a knowledge-base file or every `.json` file in a directory.
    pub async fn load(path: &Path) -> Result<Vec<LoadedDocument>, KnowledgeStoreError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| KnowledgeStoreError::load(path.display().to_string(), e.to_string()))?;

        if !metadata.is_dir() {
            return Self::load_file(path).await;
        }

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(path)
            .await
            .map_err(|e| KnowledgeStoreError::load(path.display().to_string(), e.to_string()))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| KnowledgeStoreError::load(path.display().to_string(), e.to_string()))?
        {
            let file = entry.path();
            if file.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(file);
            }
        }
        files.sort();

        let mut documents = Vec::new();
        for file in files {
            documents.extend(Self::load_file(&file).await?);
        }
        Ok(documents)
    }

    async fn load_file(path: &Path) -> Result<Vec<LoadedDocument>, KnowledgeStoreError> {
        let shown = path.display().to_string();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| KnowledgeStoreError::load(&shown, e.to_string()))?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("doc")
            .to_string();

        let documents = Self::parse(&content, &stem).map_err(|reason| KnowledgeStoreError::load(&shown, reason))?;
        tracing::debug!(path = %shown, documents = documents.len(), "Loaded knowledge-base file");
        Ok(documents)
    }

    /// Parses one file's content; `stem` prefixes generated document ids.
    pub fn parse(content: &str, stem: &str) -> Result<Vec<LoadedDocument>, String> {
        let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;

        match value {
            Value::Array(_) => {
                let raw: Vec<RawDocument> = serde_json::from_value(value).map_err(|e| e.to_string())?;
                Ok(raw
                    .into_iter()
                    .enumerate()
                    .filter(|(_, r)| !r.content.trim().is_empty())
                    .map(|(index, r)| {
                        let id = r.id.unwrap_or_else(|| format!("{}-{}", stem, index));
                        let metadata = DocumentMetadata::from_json_object(&r.metadata);
                        (KnowledgeDocument::new(id, r.content, metadata), r.embedding)
                    })
                    .collect())
            }
            Value::Object(_) => {
                let file: EnrichmentFile = serde_json::from_value(value).map_err(|e| e.to_string())?;
                let source = if file.source.is_empty() { stem.to_string() } else { file.source };
                Ok(file
                    .enriched_chunks
                    .into_iter()
                    .map(|chunk| match chunk {
                        Value::String(text) => parse_enriched_chunk(&text),
                        other => serde_json::from_value::<EnrichedChunk>(other).unwrap_or_default(),
                    })
                    .enumerate()
                    .filter_map(|(index, chunk)| chunk.into_document(format!("{}-{}", stem, index), &source))
                    .map(|document| (document, None))
                    .collect())
            }
            _ => Err("expected a document array or an enrichment object".to_string()),
        }
    }
}
