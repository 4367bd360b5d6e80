//! End-to-end tests for a full assessment run.
//!
//! Survey files, the knowledge base, and the output directory all live in a
//! temporary directory. Embeddings come from the deterministic mock provider.

use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use cyberhygiene_advisor::adapters::{
    InMemoryKnowledgeStore, JsonKnowledgeBaseLoader, JsonReportWriter, JsonSurveySource, MockEmbeddingProvider,
};
use cyberhygiene_advisor::application::{AssessmentSettings, RetrievalSettings, RunAssessmentHandler};
use cyberhygiene_advisor::ports::RetryPolicy;

// =============================================================================
// Fixtures
// =============================================================================

const CATALOG: &str = r#"[
    {"code": "i01", "dimension": "AUC", "indicates_risk": "Sí",
     "statement": "I use the same password for several accounts", "measures": "password reuse", "weight": 5}
]"#;

const RESPONSES: &str = r#"[
    {"participant": "p1", "demographics": {"Responsabilidad": "Colaborador(a) individual"}, "answers": {"i01": 5}},
    {"participant": "p2", "answers": {"i01": 3}},
    {"participant": "p3", "answers": {"i01": 1}}
]"#;

const KNOWLEDGE_BASE: &str = r#"[
    {"id": "auc-basic-1", "content": "Use a password manager for every account",
     "metadata": {"dimension": "AUC", "level": "basic", "tags": "['passwords']"}},
    {"id": "auc-basic-2", "content": "USE a password   manager for every account!",
     "metadata": {"dimension": "AUC", "nivel": "básico"}},
    {"id": "auc-average-1", "content": "Enable multi-factor authentication on email",
     "metadata": {"dimension": "Authentication and credential use", "level": "promedio"}},
    {"id": "mce-basic-1", "content": "Verify the sender before opening attachments",
     "metadata": {"dimension": "MCE", "level": "basic"}}
]"#;

fn write_inputs(dir: &Path) {
    std::fs::write(dir.join("items.json"), CATALOG).unwrap();
    std::fs::write(dir.join("responses.json"), RESPONSES).unwrap();
    std::fs::write(dir.join("kb.json"), KNOWLEDGE_BASE).unwrap();
}

fn settings(use_semantic_seed: bool) -> AssessmentSettings {
    AssessmentSettings {
        retrieval: RetrievalSettings {
            use_semantic_seed,
            retry: RetryPolicy::new(2, Duration::ZERO),
            ..RetrievalSettings::default()
        },
        ..AssessmentSettings::default()
    }
}

async fn store(dir: &Path, with_embedder: bool) -> InMemoryKnowledgeStore {
    let documents = JsonKnowledgeBaseLoader::load(&dir.join("kb.json")).await.unwrap();
    let mut store = if with_embedder {
        InMemoryKnowledgeStore::new(Arc::new(MockEmbeddingProvider::new()))
    } else {
        InMemoryKnowledgeStore::without_embedder()
    };
    store.extend(documents);
    store.index_missing(&RetryPolicy::once()).await;
    store
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn three_participant_cohort_end_to_end() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_inputs(input.path());

    let handler = RunAssessmentHandler::new(
        Arc::new(JsonSurveySource::new(input.path().join("items.json"), input.path().join("responses.json"))),
        Arc::new(store(input.path(), true).await),
        Arc::new(JsonReportWriter::new(output.path())),
        settings(true),
    );

    let summary = handler.handle().await.unwrap();

    assert_eq!(summary.participants, 3);
    assert_eq!(summary.participants_with_findings, 1);
    assert_eq!(summary.records_written, 3);
    assert_eq!(summary.retrieval_failures, 0);

    // Baseline: inverted answers [1, 3, 5]
    let baseline = read_json(&output.path().join("baseline.json"));
    assert_eq!(baseline["items"]["i01"]["mean"], 3.0);
    assert!(baseline["items"]["i01"]["percentile"].as_f64().unwrap() > 1.0);

    // p1 answered 5 on a risk item: normalized 1, critical by both criteria
    let p1 = read_json(&output.path().join("participant_p1.json"));
    assert_eq!(p1["expertise_level"], "basic");
    assert_eq!(p1["critical_dimensions"], serde_json::json!(["AUC"]));
    assert_eq!(p1["critical_items"]["self_referential"][0]["item"], "i01");
    assert_eq!(p1["critical_items"]["percentile_based"][0]["item"], "i01");

    // Dimension: one basic (duplicate collapsed) plus one average recommendation
    let by_dimension = p1["recommendations"]["by_dimension"].as_array().unwrap();
    let texts: Vec<_> = by_dimension
        .iter()
        .map(|r| r["recommendation"]["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts.len(), 2);
    assert!(texts.contains(&"Use a password manager for every account")
        || texts.contains(&"USE a password   manager for every account!"));
    assert!(texts.contains(&"Enable multi-factor authentication on email"));
    assert!(by_dimension.iter().all(|r| r["dimension"] == "AUC"));

    // Item: stops at the basic level, duplicate collapsed
    let by_item = p1["recommendations"]["by_item"].as_array().unwrap();
    assert_eq!(by_item.len(), 1);
    assert_eq!(by_item[0]["item"], "i01");
    assert_eq!(by_item[0]["level"], "basic");

    // p2 and p3 have no findings and no recommendations
    for id in ["p2", "p3"] {
        let record = read_json(&output.path().join(format!("participant_{}.json", id)));
        assert_eq!(record["critical_dimensions"], serde_json::json!([]));
        assert_eq!(record["recommendations"]["by_dimension"], serde_json::json!([]));
    }

    let written = read_json(&output.path().join("summary.json"));
    assert_eq!(written["participants"], 3);
    assert_eq!(written["records"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn run_without_semantic_seeds_ranks_by_content_length() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_inputs(input.path());

    let handler = RunAssessmentHandler::new(
        Arc::new(JsonSurveySource::new(input.path().join("items.json"), input.path().join("responses.json"))),
        Arc::new(store(input.path(), false).await),
        Arc::new(JsonReportWriter::new(output.path())),
        settings(false),
    );

    let summary = handler.handle().await.unwrap();

    let p1 = &summary.records[0];
    assert_eq!(p1.profile.participant.as_str(), "p1");
    // The longer of the two duplicates wins the content-length ranking.
    assert_eq!(
        p1.recommendations.by_item()[0].recommendation.text,
        "USE a password   manager for every account!"
    );
    assert_eq!(summary.retrieval_failures, 0);
}

#[tokio::test]
async fn missing_catalog_aborts_before_writing_anything() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_inputs(input.path());

    let handler = RunAssessmentHandler::new(
        Arc::new(JsonSurveySource::new(input.path().join("missing.json"), input.path().join("responses.json"))),
        Arc::new(store(input.path(), true).await),
        Arc::new(JsonReportWriter::new(output.path().join("out"))),
        settings(true),
    );

    assert!(handler.handle().await.is_err());
    assert!(!output.path().join("out").exists());
}

#[tokio::test]
async fn repeated_participant_ids_are_rejected_before_any_output() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_inputs(input.path());
    std::fs::write(
        input.path().join("responses.json"),
        r#"[{"participant": "p1", "answers": {"i01": 5}},
            {"participant": "p2", "answers": {"i01": 3}},
            {"participant": "p1", "answers": {"i01": 1}}]"#,
    )
    .unwrap();

    let handler = RunAssessmentHandler::new(
        Arc::new(JsonSurveySource::new(input.path().join("items.json"), input.path().join("responses.json"))),
        Arc::new(store(input.path(), false).await),
        Arc::new(JsonReportWriter::new(output.path().join("out"))),
        settings(false),
    );

    let error = handler.handle().await.unwrap_err();

    assert!(error.to_string().contains("p1"));
    assert!(!output.path().join("out").exists());
}

#[tokio::test]
async fn look_alike_participant_ids_each_get_a_record_file() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_inputs(input.path());
    std::fs::write(
        input.path().join("responses.json"),
        r#"[{"participant": "a b", "answers": {"i01": 5}},
            {"participant": "a_b", "answers": {"i01": 3}},
            {"participant": "A_B", "answers": {"i01": 1}}]"#,
    )
    .unwrap();

    let handler = RunAssessmentHandler::new(
        Arc::new(JsonSurveySource::new(input.path().join("items.json"), input.path().join("responses.json"))),
        Arc::new(store(input.path(), false).await),
        Arc::new(JsonReportWriter::new(output.path())),
        settings(false),
    );

    let summary = handler.handle().await.unwrap();

    let record_files = std::fs::read_dir(output.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("participant_"))
        .count();
    assert_eq!(summary.records_written, 3);
    assert_eq!(record_files, 3);
}
