//! Batch entry point: score the configured cohort and write its reports.
//!
//! Exit codes: 0 on a completed run (even with per-participant failures),
//! 1 on configuration errors, 2 on fatal run errors.

use std::process::ExitCode;
use std::sync::Arc;

use cyberhygiene_advisor::adapters::{
    FailoverEmbeddingProvider, GeminiEmbeddingConfig, GeminiEmbeddingProvider, InMemoryKnowledgeStore,
    JsonKnowledgeBaseLoader, JsonReportWriter, JsonSurveySource, OpenAIEmbeddingConfig,
    OpenAIEmbeddingProvider,
};
use cyberhygiene_advisor::application::{AssessmentSettings, RetrievalSettings, RunAssessmentHandler};
use cyberhygiene_advisor::config::{AppConfig, EmbeddingConfig, EmbeddingProviderKind, LogFormat};
use cyberhygiene_advisor::ports::{EmbeddingError, EmbeddingProvider};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            return ExitCode::from(1);
        }
    };

    init_tracing(&config);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return ExitCode::from(1);
    }

    let store = match build_store(&config).await {
        Ok(store) => store,
        Err(message) => {
            tracing::error!(error = %message, "Failed to prepare knowledge base");
            return ExitCode::from(1);
        }
    };

    let handler = RunAssessmentHandler::new(
        Arc::new(JsonSurveySource::new(
            &config.data.catalog_path,
            &config.data.responses_path,
        )),
        Arc::new(store),
        Arc::new(JsonReportWriter::new(&config.data.output_dir)),
        assessment_settings(&config),
    );

    match handler.handle().await {
        Ok(summary) => {
            tracing::info!(
                run_id = %summary.run_id,
                output_dir = %config.data.output_dir.display(),
                "Reports written"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(code = %e.code(), error = %e, "Assessment run failed");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = config.logging.env_filter();
    match config.logging.format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn assessment_settings(config: &AppConfig) -> AssessmentSettings {
    AssessmentSettings {
        percentile_rank: config.scoring.percentile_rank,
        max_critical_items: config.scoring.max_critical_items,
        concurrency: config.retrieval.concurrency,
        retrieval: RetrievalSettings {
            dimension_cap: config.retrieval.dimension_cap,
            item_cap: config.retrieval.item_cap,
            item_query_depth: config.retrieval.item_query_depth,
            candidate_pool: config.retrieval.candidate_pool,
            use_semantic_seed: config.retrieval.use_semantic_seed,
            retry: config.retrieval.retry_policy(),
        },
    }
}

/// Loads the knowledge base and embeds documents that came without vectors.
async fn build_store(config: &AppConfig) -> Result<InMemoryKnowledgeStore, String> {
    let documents = JsonKnowledgeBaseLoader::load(&config.data.knowledge_base_path)
        .await
        .map_err(|e| e.to_string())?;

    let mut store = if config.retrieval.use_semantic_seed {
        let embedder = build_embedder(&config.embedding).map_err(|e| e.to_string())?;
        InMemoryKnowledgeStore::new(embedder)
    } else {
        InMemoryKnowledgeStore::without_embedder()
    };
    store.extend(documents);

    if config.retrieval.use_semantic_seed {
        let indexed = store.index_missing(&config.retrieval.retry_policy()).await;
        tracing::info!(indexed, "Indexed knowledge documents without vectors");
    }

    tracing::info!(
        documents = store.len(),
        searchable = store.indexed_len(),
        path = %config.data.knowledge_base_path.display(),
        "Knowledge base ready"
    );
    Ok(store)
}

fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    let primary = provider(config, config.provider, true)?;
    let Some(fallback_kind) = config.fallback_provider else {
        return Ok(primary);
    };

    let fallback = provider(config, fallback_kind, false)?;
    Ok(Arc::new(FailoverEmbeddingProvider::new(primary).with_fallback(fallback)))
}

/// Model and base URL overrides apply to the primary provider only.
fn provider(
    config: &EmbeddingConfig,
    kind: EmbeddingProviderKind,
    primary: bool,
) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    let key = config
        .api_key(kind)
        .ok_or(EmbeddingError::AuthenticationFailed)?;
    let model = config.model.as_ref().filter(|_| primary);
    let base_url = config.base_url.as_ref().filter(|_| primary);

    let provider: Arc<dyn EmbeddingProvider> = match kind {
        EmbeddingProviderKind::OpenAI => {
            let mut c = OpenAIEmbeddingConfig::new(key).with_timeout(config.timeout());
            if let Some(model) = model {
                c = c.with_model(model);
            }
            if let Some(url) = base_url {
                c = c.with_base_url(url);
            }
            Arc::new(OpenAIEmbeddingProvider::new(c)?)
        }
        EmbeddingProviderKind::Gemini => {
            let mut c = GeminiEmbeddingConfig::new(key).with_timeout(config.timeout());
            if let Some(model) = model {
                c = c.with_model(model);
            }
            if let Some(url) = base_url {
                c = c.with_base_url(url);
            }
            Arc::new(GeminiEmbeddingProvider::new(c)?)
        }
    };
    Ok(provider)
}
