use async_trait::async_trait;
use quiz_core::model::{Question, encode_question_list};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Local cache key holding the JSON-encoded override set.
pub const OVERRIDES_KEY: &str = "jlpt-custom-questions";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("remote store answered with status {0}")]
    Status(u16),

    #[error("io error: {0}")]
    Io(String),
}

/// Fast key-value slot read once at start-up and written on every mutation.
///
/// Calls are synchronous so a mutation reaches the cache before any durable
/// write is scheduled.
pub trait LocalCache: Send + Sync {
    /// Read the raw value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Durable copy of the override set.
///
/// Reads return the raw JSON array so the consumer decides how to treat
/// malformed content; writes replace the whole set.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Fetch the stored override set as a JSON array (`[]` when empty).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store is unreachable.
    async fn read_overrides(&self) -> Result<String, StorageError>;

    /// Replace the stored override set with `questions`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write is rejected or fails.
    async fn write_overrides(&self, questions: &[Question]) -> Result<(), StorageError>;
}

/// Simple in-memory cache for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryCache {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a slot, e.g. with a stale or malformed value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn seed(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write(key, value)
    }
}

impl LocalCache for InMemoryCache {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct DurableState {
    payload: Option<String>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

/// In-memory durable store with failure injection for tests.
#[derive(Clone, Default)]
pub struct InMemoryDurableStore {
    state: Arc<Mutex<DurableState>>,
}

impl InMemoryDurableStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw payload verbatim, bypassing encoding.
    pub fn set_payload(&self, raw: impl Into<String>) {
        if let Ok(mut guard) = self.state.lock() {
            guard.payload = Some(raw.into());
        }
    }

    /// The raw payload currently stored, if anything was written.
    #[must_use]
    pub fn payload(&self) -> Option<String> {
        self.state.lock().ok().and_then(|guard| guard.payload.clone())
    }

    pub fn fail_reads(&self, fail: bool) {
        if let Ok(mut guard) = self.state.lock() {
            guard.fail_reads = fail;
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        if let Ok(mut guard) = self.state.lock() {
            guard.fail_writes = fail;
        }
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.state.lock().map(|guard| guard.writes).unwrap_or(0)
    }
}

#[async_trait]
impl DurableStore for InMemoryDurableStore {
    async fn read_overrides(&self) -> Result<String, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.fail_reads {
            return Err(StorageError::Connection("read failure injected".into()));
        }
        Ok(guard.payload.clone().unwrap_or_else(|| "[]".to_string()))
    }

    async fn write_overrides(&self, questions: &[Question]) -> Result<(), StorageError> {
        let raw = encode_question_list(questions)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.fail_writes {
            return Err(StorageError::Connection("write failure injected".into()));
        }
        guard.payload = Some(raw);
        guard.writes += 1;
        Ok(())
    }
}

/// Aggregates the local cache and durable store behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub cache: Arc<dyn LocalCache>,
    pub durable: Arc<dyn DurableStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let cache: Arc<dyn LocalCache> = Arc::new(InMemoryCache::new());
        let durable: Arc<dyn DurableStore> = Arc::new(InMemoryDurableStore::new());
        Self { cache, durable }
    }
}
