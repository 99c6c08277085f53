use std::fmt;

use quiz_core::model::{QuestionDraft, QuestionId};

use crate::bank::QuestionBankStore;
use crate::error::{AuthoringError, SyncError};

/// The change was kept locally but the durable write failed.
///
/// Recoverable: [`Authoring::retry`] re-issues the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncNotice {
    pub reason: String,
}

impl From<SyncError> for SyncNotice {
    fn from(err: SyncError) -> Self {
        Self {
            reason: err.to_string(),
        }
    }
}

impl fmt::Display for SyncNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "saved locally, but syncing failed: {}", self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub id: QuestionId,
    pub created: bool,
    pub notice: Option<SyncNotice>,
}

/// Admin workflow over the bank: validate drafts, then write through.
pub struct Authoring<'a> {
    bank: &'a mut QuestionBankStore,
}

impl<'a> Authoring<'a> {
    pub fn new(bank: &'a mut QuestionBankStore) -> Self {
        Self { bank }
    }

    /// Draft for editing an existing question (built-in or override).
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::UnknownQuestion` if no question has `id`.
    pub fn edit(&self, id: QuestionId) -> Result<QuestionDraft, AuthoringError> {
        self.bank
            .get(id)
            .map(QuestionDraft::from_question)
            .ok_or(AuthoringError::UnknownQuestion(id))
    }

    /// Validate and store `draft`. A draft without an id gets the next free
    /// id in the same call.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::Draft` if validation fails; nothing is stored.
    pub async fn save(&mut self, draft: QuestionDraft) -> Result<SaveOutcome, AuthoringError> {
        let created = draft.id.is_none();
        let id = draft.id.unwrap_or_else(|| self.bank.next_id());
        let question = draft.validate(id)?;
        let notice = self.bank.upsert(question).wait().await.err().map(SyncNotice::from);
        if let Some(notice) = &notice {
            tracing::warn!(id = %id, %notice, "question saved without durable sync");
        }
        Ok(SaveOutcome {
            id,
            created,
            notice,
        })
    }

    /// Delete an override. Built-in questions cannot be deleted.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::UnknownQuestion` if nothing has `id`, and
    /// `AuthoringError::NotAnOverride` for built-in questions.
    pub async fn delete(&mut self, id: QuestionId) -> Result<Option<SyncNotice>, AuthoringError> {
        if !self.bank.is_override(id) {
            return Err(if self.bank.get(id).is_some() {
                AuthoringError::NotAnOverride(id)
            } else {
                AuthoringError::UnknownQuestion(id)
            });
        }
        Ok(self.bank.delete(id).wait().await.err().map(SyncNotice::from))
    }

    /// Re-issue the durable write after a surfaced notice.
    pub async fn retry(&self) -> Option<SyncNotice> {
        self.bank.resync().wait().await.err().map(SyncNotice::from)
    }
}
