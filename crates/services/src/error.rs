//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{DraftError, OptionId, QuestionId};
use storage::repository::StorageError;

/// Errors emitted by test sessions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("a session needs at least one question")]
    NoQuestions,
    #[error("session has already started")]
    AlreadyStarted,
    #[error("session is not active")]
    NotActive,
    #[error("session has not finished")]
    NotFinished,
    #[error("option {option} does not belong to the current question")]
    UnknownOption { option: OptionId },
}

/// Errors emitted while syncing the override set to storage.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("override set could not be encoded: {0}")]
    Encode(String),
    #[error("sync task did not complete: {0}")]
    TaskFailed(String),
}

/// Errors emitted by the authoring flow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthoringError {
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error("question {0} does not exist")]
    UnknownQuestion(QuestionId),
    #[error("question {0} is built in and cannot be deleted")]
    NotAnOverride(QuestionId),
}
