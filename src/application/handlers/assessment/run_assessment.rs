//! RunAssessmentHandler - scores a whole cohort and persists the results.
//!
//! # Flow
//!
//! 1. Load catalog and submissions (fatal on failure)
//! 2. Compute the cohort baseline once and persist it
//! 3. Per participant, concurrently: score, classify, retrieve, assemble
//! 4. Persist each record, then the run summary

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;

use super::error::AssessmentError;
use super::recommendation_retriever::{RecommendationRetriever, RetrievalSettings};
use crate::domain::assessment::{Assembler, AssessmentSummary, ParticipantProfile, ParticipantRecord};
use crate::domain::foundation::RunId;
use crate::domain::scoring::{BaselineCalculator, CriticalityClassifier, DEFAULT_PERCENTILE_RANK};
use crate::ports::{KnowledgeStore, ReportWriter, SurveySource};

/// Scoring and scheduling knobs for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentSettings {
    /// Cohort percentile for the deficit criterion.
    pub percentile_rank: f64,
    /// Top-N-with-ties limit on each critical-item list.
    pub max_critical_items: Option<usize>,
    /// Participants processed at the same time.
    pub concurrency: usize,
    pub retrieval: RetrievalSettings,
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        Self {
            percentile_rank: DEFAULT_PERCENTILE_RANK,
            max_critical_items: None,
            concurrency: 4,
            retrieval: RetrievalSettings::default(),
        }
    }
}

pub struct RunAssessmentHandler {
    survey_source: Arc<dyn SurveySource>,
    writer: Arc<dyn ReportWriter>,
    retriever: RecommendationRetriever,
    settings: AssessmentSettings,
}

impl RunAssessmentHandler {
    pub fn new(
        survey_source: Arc<dyn SurveySource>,
        store: Arc<dyn KnowledgeStore>,
        writer: Arc<dyn ReportWriter>,
        settings: AssessmentSettings,
    ) -> Self {
        Self {
            survey_source,
            writer,
            retriever: RecommendationRetriever::new(store, settings.retrieval.clone()),
            settings,
        }
    }

    pub async fn handle(&self) -> Result<AssessmentSummary, AssessmentError> {
        let run_id = RunId::new();
        tracing::info!(run_id = %run_id, "Starting assessment run");

        // 1. Reference data and submissions
        let catalog = self
            .survey_source
            .load_catalog()
            .await
            .map_err(AssessmentError::Catalog)?;
        if catalog.is_empty() {
            return Err(AssessmentError::EmptyCatalog);
        }

        let submissions = self
            .survey_source
            .load_submissions(&catalog)
            .await
            .map_err(AssessmentError::Responses)?;

        // One output file per participant id.
        let mut seen = HashSet::with_capacity(submissions.len());
        if let Some(repeat) = submissions.iter().find(|s| !seen.insert(&s.participant)) {
            return Err(AssessmentError::DuplicateParticipant(repeat.participant.clone()));
        }

        // 2. Baseline, shared read-only by every participant
        let baseline = BaselineCalculator::compute(
            &catalog,
            submissions.iter().flat_map(|s| s.responses.iter()),
            self.settings.percentile_rank,
        );
        if baseline.is_empty() {
            return Err(AssessmentError::NoResponses);
        }
        tracing::info!(
            run_id = %run_id,
            participants = submissions.len(),
            scored_items = baseline.items().len(),
            global_mean = ?baseline.global_mean(),
            "Computed cohort baseline"
        );

        if let Err(error) = self.writer.write_baseline(&baseline).await {
            tracing::error!(run_id = %run_id, error = %error, "Failed to write baseline");
        }

        // 3. Participants
        let classifier = CriticalityClassifier::new().with_max_items(self.settings.max_critical_items);
        let catalog = &catalog;
        let baseline = &baseline;
        let classifier = &classifier;
        let retriever = &self.retriever;

        let mut indexed: Vec<(usize, ParticipantRecord)> = stream::iter(submissions.iter().enumerate())
            .map(|(index, submission)| async move {
                let profile = ParticipantProfile::build(submission, catalog, baseline, classifier);
                tracing::debug!(
                    participant = %profile.participant,
                    level = %profile.expertise_level,
                    critical_dimensions = profile.critical_dimensions.len(),
                    critical_items = profile.critical_items.distinct().len(),
                    "Scored participant"
                );
                let bundle = retriever.retrieve(&profile).await;
                (index, Assembler::assemble(profile, bundle))
            })
            .buffer_unordered(self.settings.concurrency.max(1))
            .collect()
            .await;
        indexed.sort_by_key(|(index, _)| *index);
        let records: Vec<ParticipantRecord> = indexed.into_iter().map(|(_, record)| record).collect();

        // 4. Output
        let mut written = 0;
        let mut failed = 0;
        for record in &records {
            match self.writer.write_participant(record).await {
                Ok(path) => {
                    written += 1;
                    tracing::debug!(participant = %record.profile.participant, path = %path.display(), "Wrote record");
                }
                Err(error) => {
                    failed += 1;
                    tracing::error!(
                        participant = %record.profile.participant,
                        error = %error,
                        "Failed to write participant record"
                    );
                }
            }
        }

        let summary = AssessmentSummary::new(run_id, records).with_write_counts(written, failed);
        self.writer.write_summary(&summary).await?;

        tracing::info!(
            run_id = %run_id,
            participants = summary.participants,
            with_findings = summary.participants_with_findings,
            written = summary.records_written,
            write_failures = summary.write_failures,
            retrieval_failures = summary.retrieval_failures,
            "Assessment run complete"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Dimension, ItemCode, LikertAnswer, ParticipantId};
    use crate::domain::recommendation::{DocumentMetadata, KnowledgeDocument};
    use crate::domain::scoring::Baseline;
    use crate::domain::survey::{Demographics, SurveyCatalog, SurveyItem, SurveySubmission};
    use crate::ports::{KnowledgeStoreError, ReportWriteError, SurveySourceError};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct MockSurveySource {
        catalog: SurveyCatalog,
        submissions: Vec<SurveySubmission>,
        missing_catalog: bool,
    }

    #[async_trait]
    impl SurveySource for MockSurveySource {
        async fn load_catalog(&self) -> Result<SurveyCatalog, SurveySourceError> {
            if self.missing_catalog {
                return Err(SurveySourceError::NotFound {
                    path: "items.json".to_string(),
                });
            }
            Ok(self.catalog.clone())
        }

        async fn load_submissions(&self, _catalog: &SurveyCatalog) -> Result<Vec<SurveySubmission>, SurveySourceError> {
            Ok(self.submissions.clone())
        }
    }

    struct StaticStore(Vec<KnowledgeDocument>);

    #[async_trait]
    impl KnowledgeStore for StaticStore {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, KnowledgeStoreError> {
            Ok(vec![1.0])
        }

        async fn similarity_search(&self, _vector: &[f32], k: usize) -> Result<Vec<KnowledgeDocument>, KnowledgeStoreError> {
            Ok(self.0.iter().take(k).cloned().collect())
        }

        async fn get_all(&self) -> Result<Vec<KnowledgeDocument>, KnowledgeStoreError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct MockWriter {
        participants: Mutex<Vec<String>>,
        baselines: Mutex<usize>,
        fail_participant: Option<String>,
    }

    #[async_trait]
    impl ReportWriter for MockWriter {
        async fn write_participant(&self, record: &ParticipantRecord) -> Result<PathBuf, ReportWriteError> {
            let id = record.profile.participant.to_string();
            if self.fail_participant.as_deref() == Some(id.as_str()) {
                return Err(ReportWriteError::io(id, "disk full"));
            }
            self.participants.lock().unwrap().push(id.clone());
            Ok(PathBuf::from(id))
        }

        async fn write_baseline(&self, _baseline: &Baseline) -> Result<PathBuf, ReportWriteError> {
            *self.baselines.lock().unwrap() += 1;
            Ok(PathBuf::from("baseline.json"))
        }

        async fn write_summary(&self, _summary: &AssessmentSummary) -> Result<PathBuf, ReportWriteError> {
            Ok(PathBuf::from("summary.json"))
        }
    }

    fn code(s: &str) -> ItemCode {
        ItemCode::new(s).unwrap()
    }

    fn source(answers: &[u8]) -> MockSurveySource {
        let catalog = SurveyCatalog::new(vec![SurveyItem::new(
            code("i01"),
            Dimension::Authentication,
            true,
            "I reuse passwords",
            "password reuse",
        )])
        .unwrap();
        let submissions = answers
            .iter()
            .enumerate()
            .map(|(i, &a)| {
                SurveySubmission::new(ParticipantId::new(format!("p{}", i + 1)).unwrap(), Demographics::new())
                    .with_answer(code("i01"), Some(LikertAnswer::try_new(a).unwrap()))
            })
            .collect();
        MockSurveySource {
            catalog,
            submissions,
            missing_catalog: false,
        }
    }

    fn store() -> Arc<StaticStore> {
        Arc::new(StaticStore(vec![KnowledgeDocument::new(
            "d1",
            "Use a password manager",
            DocumentMetadata::new().with("dimension", "AUC").with("level", "basic"),
        )]))
    }

    fn handler(source: MockSurveySource, writer: Arc<MockWriter>) -> RunAssessmentHandler {
        RunAssessmentHandler::new(Arc::new(source), store(), writer, AssessmentSettings::default())
    }

    #[tokio::test]
    async fn scores_every_participant_in_submission_order() {
        let writer = Arc::new(MockWriter::default());
        let summary = handler(source(&[5, 3, 1]), writer.clone()).handle().await.unwrap();

        let ids: Vec<_> = summary.records.iter().map(|r| r.profile.participant.to_string()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
        assert_eq!(summary.records_written, 3);
        assert_eq!(*writer.baselines.lock().unwrap(), 1);

        let first = &summary.records[0];
        assert_eq!(first.profile.critical_items.self_referential.len(), 1);
        assert_eq!(first.recommendations.by_item()[0].recommendation.text, "Use a password manager");
    }

    #[tokio::test]
    async fn one_failed_write_does_not_stop_the_others() {
        let writer = Arc::new(MockWriter {
            fail_participant: Some("p2".to_string()),
            ..MockWriter::default()
        });

        let summary = handler(source(&[5, 3, 1]), writer.clone()).handle().await.unwrap();

        assert_eq!(summary.records_written, 2);
        assert_eq!(summary.write_failures, 1);
        assert_eq!(*writer.participants.lock().unwrap(), vec!["p1", "p3"]);
    }

    #[tokio::test]
    async fn missing_catalog_is_fatal() {
        let mut source = source(&[5]);
        source.missing_catalog = true;

        let result = handler(source, Arc::new(MockWriter::default())).handle().await;

        assert!(matches!(result, Err(AssessmentError::Catalog(_))));
    }

    #[tokio::test]
    async fn repeated_participant_aborts_before_any_output() {
        let mut source = source(&[5, 3]);
        let repeat = source.submissions[0].clone();
        source.submissions.push(repeat);
        let writer = Arc::new(MockWriter::default());

        let result = handler(source, writer.clone()).handle().await;

        assert!(matches!(
            result,
            Err(AssessmentError::DuplicateParticipant(ref id)) if id.as_str() == "p1"
        ));
        assert_eq!(*writer.baselines.lock().unwrap(), 0);
        assert!(writer.participants.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cohort_without_answers_is_fatal() {
        let result = handler(source(&[]), Arc::new(MockWriter::default())).handle().await;
        assert!(matches!(result, Err(AssessmentError::NoResponses)));
    }
}
