//! Recommendation domain - knowledge documents, metadata filters, bundles.

mod bundle;
mod document;
mod enrichment;
mod filter;
mod metadata;

pub use bundle::{
    DimensionRecommendation, ItemRecommendation, QueryTarget, RecommendationBundle, RetrievalFailure,
};
pub use document::{KnowledgeDocument, Recommendation};
pub use enrichment::{parse_enriched_chunk, EnrichedChunk};
pub use filter::{FilterClause, MetadataFilter};
pub use metadata::{DocumentMetadata, MetadataValue};
