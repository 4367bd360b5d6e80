//! RecommendationRetriever - fetches recommendations for a participant's findings.
//!
//! Dimension queries accumulate across the expertise fallback chain until the
//! dimension cap is met. Item queries stop at the first level whose filtered
//! query returns anything.
//!
//! Each seed (dimension display name, item "measures" text) is embedded once
//! per run and reused for every level and every participant.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::assessment::ParticipantProfile;
use crate::domain::foundation::{Dimension, ExpertiseLevel};
use crate::domain::recommendation::{
    KnowledgeDocument, MetadataFilter, QueryTarget, Recommendation, RecommendationBundle,
};
use crate::domain::scoring::CriticalItem;
use crate::ports::{retry_with_backoff, KnowledgeStore, KnowledgeStoreError, RetryError, RetryPolicy};

/// Caps and query sizes used by the retriever.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalSettings {
    /// Distinct recommendations kept per critical dimension.
    pub dimension_cap: usize,
    /// Distinct recommendations kept per critical item.
    pub item_cap: usize,
    /// Documents requested per item query.
    pub item_query_depth: usize,
    /// Nearest neighbours fetched before metadata filtering.
    pub candidate_pool: usize,
    /// When false every query ranks by content length instead of similarity.
    pub use_semantic_seed: bool,
    pub retry: RetryPolicy,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            dimension_cap: 10,
            item_cap: 5,
            item_query_depth: 10,
            candidate_pool: 50,
            use_semantic_seed: true,
            retry: RetryPolicy::default(),
        }
    }
}

type QueryResult<T> = Result<T, RetryError<KnowledgeStoreError>>;

pub struct RecommendationRetriever {
    store: Arc<dyn KnowledgeStore>,
    settings: RetrievalSettings,
    seed_vectors: Mutex<HashMap<String, Vec<f32>>>,
}

impl RecommendationRetriever {
    pub fn new(store: Arc<dyn KnowledgeStore>, settings: RetrievalSettings) -> Self {
        Self {
            store,
            settings,
            seed_vectors: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &RetrievalSettings {
        &self.settings
    }

    /// Builds the recommendation bundle for one profile.
    ///
    /// Never fails: queries that exhaust their retries are recorded in the
    /// bundle and the fallback chain moves on.
    pub async fn retrieve(&self, profile: &ParticipantProfile) -> RecommendationBundle {
        let mut bundle = RecommendationBundle::new();
        let chain = profile.expertise_level.fallback_chain();

        for &dimension in &profile.critical_dimensions {
            self.retrieve_for_dimension(profile, dimension, &chain, &mut bundle)
                .await;
        }

        for item in profile.critical_items.distinct() {
            self.retrieve_for_item(profile, item, &chain, &mut bundle).await;
        }

        tracing::debug!(
            participant = %profile.participant,
            dimension_recommendations = bundle.by_dimension().len(),
            item_recommendations = bundle.by_item().len(),
            failures = bundle.failures().len(),
            "Retrieved recommendations"
        );

        bundle
    }

    async fn retrieve_for_dimension(
        &self,
        profile: &ParticipantProfile,
        dimension: Dimension,
        chain: &[ExpertiseLevel],
        bundle: &mut RecommendationBundle,
    ) {
        let cap = self.settings.dimension_cap;
        let seed = self.seed_vector(Some(dimension.display_name())).await;

        for &level in chain {
            if bundle.count_for_dimension(dimension) >= cap {
                break;
            }

            let filter = MetadataFilter::new()
                .with_dimension(dimension)
                .with_level(level);

            let result = match &seed {
                Ok(vector) => self.query(vector.as_deref(), &filter, cap).await,
                Err(error) => Err(error.clone()),
            };

            match result {
                Ok(documents) => {
                    for document in &documents {
                        if bundle.count_for_dimension(dimension) >= cap {
                            break;
                        }
                        bundle.push_for_dimension(dimension, level, Recommendation::from_document(document));
                    }
                }
                Err(error) => {
                    tracing::error!(
                        participant = %profile.participant,
                        dimension = %dimension,
                        level = %level,
                        error = %error,
                        "Dimension recommendation query failed"
                    );
                    bundle.record_failure(QueryTarget::Dimension(dimension), level, error.to_string());
                }
            }
        }
    }

    async fn retrieve_for_item(
        &self,
        profile: &ParticipantProfile,
        item: &CriticalItem,
        chain: &[ExpertiseLevel],
        bundle: &mut RecommendationBundle,
    ) {
        let cap = self.settings.item_cap;
        let text = if item.measures.trim().is_empty() {
            item.statement.as_str()
        } else {
            item.measures.as_str()
        };
        let seed = self.seed_vector(Some(text)).await;

        for &level in chain {
            let filter = MetadataFilter::new()
                .with_dimension(item.dimension)
                .with_level(level);

            let result = match &seed {
                Ok(vector) => self.query(vector.as_deref(), &filter, self.settings.item_query_depth).await,
                Err(error) => Err(error.clone()),
            };

            match result {
                Ok(documents) if documents.is_empty() => continue,
                Ok(documents) => {
                    for document in &documents {
                        if bundle.count_for_item(&item.item) >= cap {
                            break;
                        }
                        bundle.push_for_item(
                            item.item.clone(),
                            item.dimension,
                            level,
                            Recommendation::from_document(document),
                        );
                    }
                    break;
                }
                Err(error) => {
                    tracing::error!(
                        participant = %profile.participant,
                        item = %item.item,
                        level = %level,
                        error = %error,
                        "Item recommendation query failed"
                    );
                    bundle.record_failure(QueryTarget::Item(item.item.clone()), level, error.to_string());
                }
            }
        }
    }

    /// Filtered knowledge-store query returning at most `k` documents.
    ///
    /// With a seed: nearest neighbours of the seed, filtered, similarity order
    /// kept. Without one (or with seeds disabled): every document, filtered,
    /// longest content first.
    pub async fn semantic_query(
        &self,
        seed: Option<&str>,
        filter: &MetadataFilter,
        k: usize,
    ) -> QueryResult<Vec<KnowledgeDocument>> {
        let vector = self.seed_vector(seed).await?;
        self.query(vector.as_deref(), filter, k).await
    }

    /// Query vector for `seed`, or `None` when the listing path applies:
    /// seeds disabled, a blank seed, or a store that can only embed it
    /// outside its index space.
    async fn seed_vector(&self, seed: Option<&str>) -> QueryResult<Option<Vec<f32>>> {
        let Some(seed) = seed
            .map(str::trim)
            .filter(|s| self.settings.use_semantic_seed && !s.is_empty())
        else {
            return Ok(None);
        };

        if let Some(vector) = self.cached(seed) {
            return Ok(Some(vector));
        }

        match retry_with_backoff(&self.settings.retry, "embed_query", || self.store.embed(seed)).await {
            Ok(vector) => {
                if let Ok(mut cache) = self.seed_vectors.lock() {
                    cache.insert(seed.to_string(), vector.clone());
                }
                Ok(Some(vector))
            }
            Err(RetryError::Permanent(KnowledgeStoreError::ForeignEmbeddingSpace { index, query })) => {
                tracing::warn!(
                    seed,
                    index_space = %index,
                    query_space = %query,
                    "Seed embedded outside the index space, ranking by content length"
                );
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    fn cached(&self, seed: &str) -> Option<Vec<f32>> {
        self.seed_vectors.lock().ok()?.get(seed).cloned()
    }

    async fn query(
        &self,
        vector: Option<&[f32]>,
        filter: &MetadataFilter,
        k: usize,
    ) -> QueryResult<Vec<KnowledgeDocument>> {
        let policy = &self.settings.retry;

        match vector {
            Some(vector) => {
                let pool = self.settings.candidate_pool.max(k);
                let candidates = retry_with_backoff(policy, "similarity_search", || {
                    self.store.similarity_search(vector, pool)
                })
                .await?;

                Ok(candidates
                    .into_iter()
                    .filter(|d| filter.matches(d))
                    .take(k)
                    .collect())
            }
            None => {
                let documents = retry_with_backoff(policy, "get_all", || self.store.get_all()).await?;

                let mut matched: Vec<KnowledgeDocument> =
                    documents.into_iter().filter(|d| filter.matches(d)).collect();
                matched.sort_by(|a, b| b.content_len().cmp(&a.content_len()));
                matched.truncate(k);
                Ok(matched)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ItemCode, LikertAnswer, ParticipantId};
    use crate::domain::recommendation::DocumentMetadata;
    use crate::domain::survey::Demographics;
    use crate::ports::EmbeddingError;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Store that returns every document from both search methods, counting calls.
    struct FakeStore {
        documents: Vec<KnowledgeDocument>,
        fail_embed: bool,
        foreign_space: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FakeStore {
        fn new(documents: Vec<KnowledgeDocument>) -> Self {
            Self {
                documents,
                fail_embed: false,
                foreign_space: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Embeds every query with a model other than the index's.
        fn foreign(documents: Vec<KnowledgeDocument>) -> Self {
            Self {
                foreign_space: true,
                ..Self::new(documents)
            }
        }

        fn failing() -> Self {
            Self {
                fail_embed: true,
                ..Self::new(Vec::new())
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl KnowledgeStore for FakeStore {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, KnowledgeStoreError> {
            self.calls.lock().unwrap().push("embed");
            if self.fail_embed {
                return Err(EmbeddingError::unavailable("down").into());
            }
            if self.foreign_space {
                return Err(KnowledgeStoreError::ForeignEmbeddingSpace {
                    index: "openai/text-embedding-3-small".to_string(),
                    query: "gemini/text-embedding-004".to_string(),
                });
            }
            Ok(vec![1.0])
        }

        async fn similarity_search(
            &self,
            _vector: &[f32],
            k: usize,
        ) -> Result<Vec<KnowledgeDocument>, KnowledgeStoreError> {
            self.calls.lock().unwrap().push("similarity_search");
            Ok(self.documents.iter().take(k).cloned().collect())
        }

        async fn get_all(&self) -> Result<Vec<KnowledgeDocument>, KnowledgeStoreError> {
            self.calls.lock().unwrap().push("get_all");
            Ok(self.documents.clone())
        }
    }

    fn doc(id: &str, text: &str, dimension: &str, level: &str) -> KnowledgeDocument {
        KnowledgeDocument::new(
            id,
            text,
            DocumentMetadata::new()
                .with("dimension", dimension)
                .with("level", level),
        )
    }

    fn settings() -> RetrievalSettings {
        RetrievalSettings {
            retry: RetryPolicy::new(2, Duration::ZERO),
            ..RetrievalSettings::default()
        }
    }

    fn count(calls: &[&str], name: &str) -> usize {
        calls.iter().filter(|c| **c == name).count()
    }

    fn critical_item(code: &str, dimension: Dimension) -> CriticalItem {
        CriticalItem {
            item: ItemCode::new(code).unwrap(),
            dimension,
            indicates_risk: true,
            statement: "I reuse passwords".to_string(),
            measures: "password reuse".to_string(),
            answer: LikertAnswer::try_new(5).unwrap(),
            normalized: 1.0,
            weighted_risk: 5.0,
            cohort_percentile: None,
        }
    }

    fn profile(level: ExpertiseLevel, dimensions: Vec<Dimension>, items: Vec<CriticalItem>) -> ParticipantProfile {
        ParticipantProfile {
            participant: ParticipantId::new("p1").unwrap(),
            demographics: Demographics::new(),
            expertise_level: level,
            item_scores: Vec::new(),
            dimension_scores: BTreeMap::new(),
            overall_score: None,
            overall_relative_to_baseline_pct: None,
            critical_dimensions: dimensions,
            critical_items: crate::domain::assessment::CriticalItems {
                self_referential: items,
                percentile_based: Vec::new(),
            },
            dimension_flags: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn dimension_retrieval_accumulates_across_levels_up_to_cap() {
        let mut documents: Vec<_> = (0..3)
            .map(|i| doc(&format!("b{}", i), &format!("basic tip {}", i), "AUC", "basic"))
            .collect();
        documents.extend((0..4).map(|i| doc(&format!("a{}", i), &format!("average tip {}", i), "AUC", "average")));
        documents.extend((0..8).map(|i| doc(&format!("t{}", i), &format!("technical tip {}", i), "AUC", "technical")));

        let retriever = RecommendationRetriever::new(Arc::new(FakeStore::new(documents)), settings());
        let bundle = retriever
            .retrieve(&profile(ExpertiseLevel::Basic, vec![Dimension::Authentication], Vec::new()))
            .await;

        let levels: Vec<_> = bundle.by_dimension().iter().map(|r| r.level).collect();
        assert_eq!(bundle.count_for_dimension(Dimension::Authentication), 10);
        assert_eq!(levels.iter().filter(|l| **l == ExpertiseLevel::Basic).count(), 3);
        assert_eq!(levels.iter().filter(|l| **l == ExpertiseLevel::Average).count(), 4);
        assert_eq!(levels.iter().filter(|l| **l == ExpertiseLevel::Technical).count(), 3);
    }

    #[tokio::test]
    async fn item_retrieval_stops_at_first_level_with_matches() {
        let documents = vec![
            doc("t1", "technical tip", "AUC", "technical"),
            doc("a1", "admin tip", "AUC", "administrator"),
        ];

        let retriever = RecommendationRetriever::new(Arc::new(FakeStore::new(documents)), settings());
        let bundle = retriever
            .retrieve(&profile(
                ExpertiseLevel::Average,
                Vec::new(),
                vec![critical_item("i01", Dimension::Authentication)],
            ))
            .await;

        // Average -> Basic (empty) -> Technical (match, stop)
        assert_eq!(bundle.by_item().len(), 1);
        assert_eq!(bundle.by_item()[0].level, ExpertiseLevel::Technical);
        assert_eq!(bundle.by_item()[0].recommendation.text, "technical tip");
    }

    #[tokio::test]
    async fn item_retrieval_caps_at_five() {
        let documents: Vec<_> = (0..8)
            .map(|i| doc(&format!("d{}", i), &format!("tip number {}", i), "AUC", "basic"))
            .collect();

        let retriever = RecommendationRetriever::new(Arc::new(FakeStore::new(documents)), settings());
        let bundle = retriever
            .retrieve(&profile(
                ExpertiseLevel::Basic,
                Vec::new(),
                vec![critical_item("i01", Dimension::Authentication)],
            ))
            .await;

        assert_eq!(bundle.count_for_item(&ItemCode::new("i01").unwrap()), 5);
    }

    #[tokio::test]
    async fn canonical_duplicates_are_emitted_once() {
        let documents = vec![
            doc("1", "Use a password manager.", "AUC", "basic"),
            doc("2", "use a PASSWORD   manager", "AUC", "basic"),
        ];

        let retriever = RecommendationRetriever::new(Arc::new(FakeStore::new(documents)), settings());
        let bundle = retriever
            .retrieve(&profile(ExpertiseLevel::Basic, vec![Dimension::Authentication], Vec::new()))
            .await;

        assert_eq!(bundle.by_dimension().len(), 1);
    }

    #[tokio::test]
    async fn failed_queries_are_recorded_and_chain_continues() {
        let store = Arc::new(FakeStore::failing());
        let retriever = RecommendationRetriever::new(store.clone(), settings());

        let bundle = retriever
            .retrieve(&profile(ExpertiseLevel::Basic, vec![Dimension::Messaging], Vec::new()))
            .await;

        assert!(bundle.by_dimension().is_empty());
        // Every level of the chain is recorded as failed.
        assert_eq!(bundle.failures().len(), 4);
        assert_eq!(bundle.failures()[0].target, QueryTarget::Dimension(Dimension::Messaging));
        assert_eq!(bundle.failures()[3].level, ExpertiseLevel::Administrator);
        // The seed is embedded once, with two attempts.
        assert_eq!(store.calls(), vec!["embed", "embed"]);
    }

    #[tokio::test]
    async fn seeds_are_embedded_once_across_levels_and_participants() {
        let documents = vec![doc("t1", "technical tip", "AUC", "technical")];
        let store = Arc::new(FakeStore::new(documents));
        let retriever = RecommendationRetriever::new(store.clone(), settings());
        let participant = profile(
            ExpertiseLevel::Basic,
            vec![Dimension::Authentication],
            vec![
                critical_item("i01", Dimension::Authentication),
                critical_item("i02", Dimension::Authentication),
            ],
        );

        retriever.retrieve(&participant).await;
        retriever.retrieve(&participant).await;

        let calls = store.calls();
        // One vector for the dimension name, one for the shared "measures" text.
        assert_eq!(count(&calls, "embed"), 2);
        // Four levels for the dimension, three per item (stop at technical), twice.
        assert_eq!(count(&calls, "similarity_search"), 2 * (4 + 3 + 3));
    }

    #[tokio::test]
    async fn seed_outside_the_index_space_ranks_by_content_length() {
        let documents = vec![
            doc("short", "MFA", "AUC", "basic"),
            doc("long", "Turn on multi-factor authentication everywhere", "AUC", "basic"),
        ];
        let store = Arc::new(FakeStore::foreign(documents));
        let retriever = RecommendationRetriever::new(store.clone(), settings());

        let results = retriever
            .semantic_query(Some("mfa"), &MetadataFilter::new(), 1)
            .await
            .unwrap();

        assert_eq!(results[0].id, "long");
        // Not retried and not cached.
        assert_eq!(store.calls(), vec!["embed", "get_all"]);
    }

    #[tokio::test]
    async fn without_seed_ranks_by_content_length() {
        let documents = vec![
            doc("short", "Short", "AUC", "basic"),
            doc("long", "A much longer recommendation", "AUC", "basic"),
            doc("medium", "Medium length", "AUC", "basic"),
            doc("other", "Different dimension entirely", "MCE", "basic"),
        ];
        let store = Arc::new(FakeStore::new(documents));
        let retriever = RecommendationRetriever::new(store.clone(), settings());
        let filter = MetadataFilter::new().with_dimension(Dimension::Authentication);

        let results = retriever.semantic_query(None, &filter, 2).await.unwrap();

        let ids: Vec<_> = results.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["long", "medium"]);
        assert_eq!(store.calls(), vec!["get_all"]);
    }

    #[tokio::test]
    async fn disabled_seeds_take_the_get_all_path() {
        let store = Arc::new(FakeStore::new(vec![doc("1", "tip", "AUC", "basic")]));
        let retriever = RecommendationRetriever::new(
            store.clone(),
            RetrievalSettings {
                use_semantic_seed: false,
                ..settings()
            },
        );

        let results = retriever
            .semantic_query(Some("password reuse"), &MetadataFilter::new(), 5)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(store.calls(), vec!["get_all"]);
    }
}
