use std::sync::Arc;

use quiz_core::builtin;
use quiz_core::model::{Question, QuestionId, Section, bank, encode_question_list};
use storage::repository::{DurableStore, LocalCache, OVERRIDES_KEY, Storage};
use tokio_util::sync::CancellationToken;

use crate::error::SyncError;

mod reconcile;
mod sync;

pub use reconcile::{ReconcileEvent, Reconciliation};
pub use sync::SyncHandle;

use reconcile::decode_overrides;

/// Owns the built-in set, the override set and their merged view.
///
/// Every mutation writes the override set to the local cache before the
/// durable write is scheduled. Durable failures are logged and never roll
/// back memory.
pub struct QuestionBankStore {
    builtin: Vec<Question>,
    overrides: Vec<Question>,
    merged: Vec<Question>,
    loading: bool,
    cache: Arc<dyn LocalCache>,
    durable: Arc<dyn DurableStore>,
}

impl QuestionBankStore {
    /// Bank over the embedded built-in questions.
    #[must_use]
    pub fn new(storage: &Storage) -> Self {
        Self::with_builtin(storage, builtin::questions().to_vec())
    }

    #[must_use]
    pub fn with_builtin(storage: &Storage, builtin: Vec<Question>) -> Self {
        let merged = bank::merge(&builtin, &[]);
        Self {
            builtin,
            overrides: Vec::new(),
            merged,
            loading: true,
            cache: Arc::clone(&storage.cache),
            durable: Arc::clone(&storage.durable),
        }
    }

    /// True until the local cache has been read once.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Expose whatever the local cache holds. Unreadable or malformed cache
    /// content reads as an empty override set.
    pub fn hydrate(&mut self) {
        let overrides = match self.cache.read(OVERRIDES_KEY) {
            Ok(Some(raw)) => decode_overrides(&raw, "local cache"),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "local cache read failed; starting without overrides");
                Vec::new()
            }
        };
        tracing::info!(count = overrides.len(), "hydrated overrides from local cache");
        self.overrides = overrides;
        self.loading = false;
        self.recompute();
    }

    /// Start fetching the durable copy in the background.
    #[must_use]
    pub fn spawn_reconcile(&self, token: CancellationToken) -> Reconciliation {
        Reconciliation::spawn(Arc::clone(&self.durable), token)
    }

    /// Replace the override set with fetched durable content and refresh the cache.
    pub fn apply(&mut self, event: ReconcileEvent) {
        tracing::info!(count = event.overrides.len(), "reconciled overrides from durable store");
        self.overrides = event.overrides;
        self.write_cache();
        self.recompute();
    }

    /// Hydrate from the local cache, then reconcile with the durable store.
    ///
    /// A failed or cancelled fetch leaves the cache-derived state in place.
    pub async fn load(&mut self, token: &CancellationToken) {
        self.hydrate();
        let reconciliation = self.spawn_reconcile(token.child_token());
        if let Some(event) = reconciliation.outcome().await {
            self.apply(event);
        }
    }

    /// Insert or replace `question` in the override set. Every stored record
    /// with the same id is replaced.
    pub fn upsert(&mut self, question: Question) -> SyncHandle {
        tracing::info!(id = %question.id, section = %question.section, "upserting override");
        match self.overrides.iter().position(|q| q.id == question.id) {
            Some(first) => {
                self.overrides.retain(|q| q.id != question.id);
                self.overrides.insert(first, question);
            }
            None => self.overrides.push(question),
        }
        self.persist()
    }

    /// Remove `id` from the override set. A built-in with the same id becomes
    /// visible again.
    pub fn delete(&mut self, id: QuestionId) -> SyncHandle {
        tracing::info!(id = %id, "deleting override");
        self.overrides.retain(|q| q.id != id);
        self.persist()
    }

    /// Re-issue the durable write of the current override set.
    pub fn resync(&self) -> SyncHandle {
        self.spawn_durable_write()
    }

    /// One past the largest id in use. Not reserved.
    #[must_use]
    pub fn next_id(&self) -> QuestionId {
        bank::next_id(&self.builtin, &self.overrides)
    }

    /// Merged bank ordered by id.
    #[must_use]
    pub fn merged(&self) -> &[Question] {
        &self.merged
    }

    #[must_use]
    pub fn overrides(&self) -> &[Question] {
        &self.overrides
    }

    #[must_use]
    pub fn is_override(&self, id: QuestionId) -> bool {
        self.overrides.iter().any(|q| q.id == id)
    }

    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.merged
            .binary_search_by_key(&id, |q| q.id)
            .ok()
            .map(|idx| &self.merged[idx])
    }

    #[must_use]
    pub fn section_count(&self, section: Section) -> usize {
        bank::in_section(&self.merged, section).count()
    }

    fn recompute(&mut self) {
        self.merged = bank::merge(&self.builtin, &self.overrides);
    }

    fn persist(&mut self) -> SyncHandle {
        self.recompute();
        self.write_cache();
        self.spawn_durable_write()
    }

    fn write_cache(&self) {
        let result = encode_question_list(&self.overrides)
            .map_err(|e| SyncError::Encode(e.to_string()))
            .and_then(|raw| {
                self.cache
                    .write(OVERRIDES_KEY, &raw)
                    .map_err(SyncError::from)
            });
        if let Err(err) = result {
            tracing::warn!(error = %err, "local cache write failed");
        }
    }

    fn spawn_durable_write(&self) -> SyncHandle {
        let durable = Arc::clone(&self.durable);
        let snapshot = self.overrides.clone();
        SyncHandle::new(tokio::spawn(async move {
            match durable.write_overrides(&snapshot).await {
                Ok(()) => {
                    tracing::debug!(count = snapshot.len(), "durable write finished");
                    Ok(())
                }
                Err(err) => {
                    tracing::warn!(error = %err, "durable write failed; keeping local state");
                    Err(SyncError::from(err))
                }
            }
        }))
    }
}
