//! Résumé analysis pipeline.
//!
//! Flow: extract text → build prompt → completion → parse → persist.
//! Collaborators are injected at startup so both entry points (JSON API and
//! upload UI) share one instance and tests can substitute doubles.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analysis::extractor::{ExtractionError, TextExtractor};
use crate::analysis::parser::parse_completion;
use crate::analysis::prompts::build_analysis_prompt;
use crate::analysis::store::{DocumentStore, PersistenceError};
use crate::llm_client::{AnalysisRequestError, CompletionBackend};
use crate::models::resume::{AnalysisOutcome, StoredDocument};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    AnalysisRequest(#[from] AnalysisRequestError),

    /// The model's work is kept so callers can still show it.
    #[error("analysis could not be stored: {source}")]
    Persistence {
        #[source]
        source: PersistenceError,
        outcome: AnalysisOutcome,
    },
}

/// A stored analysis.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub id: Uuid,
    pub outcome: AnalysisOutcome,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AnalysisPipeline {
    extractor: Arc<dyn TextExtractor>,
    completer: Arc<dyn CompletionBackend>,
    store: Arc<dyn DocumentStore>,
    max_resume_chars: Option<usize>,
}

impl AnalysisPipeline {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        completer: Arc<dyn CompletionBackend>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            extractor,
            completer,
            store,
            max_resume_chars: None,
        }
    }

    /// Caps the résumé text sent to the model. `None` sends everything.
    pub fn with_max_resume_chars(mut self, max: Option<usize>) -> Self {
        self.max_resume_chars = max;
        self
    }

    pub async fn run(&self, pdf: Bytes) -> Result<AnalysisResult, PipelineError> {
        let text = self.extractor.extract(pdf).await?;
        info!("Extracted {} characters of resume text", text.chars().count());

        let text = match self.max_resume_chars {
            Some(max) => {
                let truncated = truncate_chars(&text, max);
                if truncated.len() < text.len() {
                    warn!("Resume text truncated to {max} characters");
                }
                truncated
            }
            None => text.as_str(),
        };

        let prompt = build_analysis_prompt(text);
        let raw = self.completer.complete(&prompt).await?;
        let outcome = parse_completion(&raw);
        if outcome.is_fallback() {
            info!("Completion did not contain a usable record; storing raw response");
        }

        let document = StoredDocument::new(outcome);
        match self.store.insert(&document).await {
            Ok(id) => Ok(AnalysisResult {
                id,
                outcome: document.resume_data,
                timestamp: document.timestamp,
            }),
            Err(source) => {
                error!("Failed to persist analysis: {source}");
                Err(PipelineError::Persistence {
                    source,
                    outcome: document.resume_data,
                })
            }
        }
    }

    pub async fn fetch(&self, id: Uuid) -> Result<Option<StoredDocument>, PersistenceError> {
        self.store.fetch(id).await
    }
}

/// Longest prefix of at most `max` characters, cut on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
