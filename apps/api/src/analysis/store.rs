//! Persistence sink for analyses.
//!
//! Insert-only: a document is written once per pipeline run and never updated.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::StoredDocument;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("could not encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store rejected the write: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Writes a new document and returns its generated id.
    async fn insert(&self, document: &StoredDocument) -> Result<Uuid, PersistenceError>;

    async fn fetch(&self, id: Uuid) -> Result<Option<StoredDocument>, PersistenceError>;
}

/// [`DocumentStore`] over a PostgreSQL JSONB table (see `db::ensure_schema`).
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, document: &StoredDocument) -> Result<Uuid, PersistenceError> {
        let id = Uuid::new_v4();
        let resume_data = serde_json::to_value(&document.resume_data)?;

        let result = sqlx::query(
            r#"
            INSERT INTO resume_analyses (id, resume_data, "timestamp")
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(&resume_data)
        .bind(document.timestamp)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() != 1 {
            return Err(PersistenceError::Rejected(format!(
                "expected 1 inserted row, got {}",
                result.rows_affected()
            )));
        }

        info!("Stored analysis {id}");
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<StoredDocument>, PersistenceError> {
        let row: Option<(Value, DateTime<Utc>)> = sqlx::query_as(
            r#"SELECT resume_data, "timestamp" FROM resume_analyses WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((resume_data, timestamp)) = row else {
            return Ok(None);
        };
        Ok(Some(StoredDocument {
            resume_data: serde_json::from_value(resume_data)?,
            timestamp,
        }))
    }
}
