use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::model::Question;
use reqwest::Client;
use reqwest::header::CACHE_CONTROL;
use serde::Serialize;

use crate::file_cache::FileCache;
use crate::repository::{DurableStore, LocalCache, Storage, StorageError};

const ENDPOINT_PATH: &str = "/api/custom-questions";

/// Durable store reached over HTTP.
///
/// `GET {base}/api/custom-questions` returns the override array;
/// `POST` with `{"questions": [...]}` replaces it.
#[derive(Clone, Debug)]
pub struct HttpDurableStore {
    client: Client,
    endpoint: String,
}

#[derive(Serialize)]
struct WriteRequest<'a> {
    questions: &'a [Question],
}

fn conn(e: reqwest::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl HttpDurableStore {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: &str) -> Self {
        let endpoint = format!("{}{ENDPOINT_PATH}", base_url.trim_end_matches('/'));
        Self { client, endpoint }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl DurableStore for HttpDurableStore {
    async fn read_overrides(&self) -> Result<String, StorageError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(conn)?;

        if !response.status().is_success() {
            return Err(StorageError::Status(response.status().as_u16()));
        }

        response.text().await.map_err(conn)
    }

    async fn write_overrides(&self, questions: &[Question]) -> Result<(), StorageError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&WriteRequest { questions })
            .send()
            .await
            .map_err(conn)?;

        if !response.status().is_success() {
            return Err(StorageError::Status(response.status().as_u16()));
        }

        tracing::debug!(count = questions.len(), endpoint = %self.endpoint, "posted question overrides");
        Ok(())
    }
}

impl Storage {
    /// Build a `Storage` whose durable copy lives behind an HTTP endpoint.
    #[must_use]
    pub fn remote(base_url: &str, cache_dir: impl Into<PathBuf>) -> Self {
        let cache: Arc<dyn LocalCache> = Arc::new(FileCache::new(cache_dir));
        let durable: Arc<dyn DurableStore> = Arc::new(HttpDurableStore::new(base_url));
        Self { cache, durable }
    }
}
