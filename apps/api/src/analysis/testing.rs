//! Test doubles for the pipeline collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::analysis::extractor::{ExtractionError, TextExtractor};
use crate::analysis::store::{DocumentStore, PersistenceError};
use crate::llm_client::{AnalysisRequestError, CompletionBackend};
use crate::models::resume::StoredDocument;

pub struct StubExtractor {
    text: Option<String>,
    pub calls: AtomicUsize,
}

impl StubExtractor {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TextExtractor for StubExtractor {
    async fn extract(&self, _pdf: Bytes) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text
            .clone()
            .ok_or_else(|| ExtractionError::InvalidPdf("stub: broken pdf".to_string()))
    }
}

pub struct StubCompleter {
    reply: Option<String>,
    pub calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubCompleter {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionBackend for StubCompleter {
    async fn complete(&self, prompt: &str) -> Result<String, AnalysisRequestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().ok_or(AnalysisRequestError::Api {
            status: 503,
            message: "stub: upstream unavailable".to_string(),
        })
    }
}

/// Keeps documents as JSON so reads go through the same encoding as the real store.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<Uuid, serde_json::Value>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, document: &StoredDocument) -> Result<Uuid, PersistenceError> {
        let id = Uuid::new_v4();
        let value = serde_json::to_value(document)?;
        self.docs.lock().unwrap().insert(id, value);
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<StoredDocument>, PersistenceError> {
        let value = self.docs.lock().unwrap().get(&id).cloned();
        Ok(value.map(serde_json::from_value).transpose()?)
    }
}

pub struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn insert(&self, _document: &StoredDocument) -> Result<Uuid, PersistenceError> {
        Err(PersistenceError::Rejected("stub: store offline".to_string()))
    }

    async fn fetch(&self, _id: Uuid) -> Result<Option<StoredDocument>, PersistenceError> {
        Err(PersistenceError::Rejected("stub: store offline".to_string()))
    }
}
