#![forbid(unsafe_code)]

pub mod authoring;
pub mod bank;
pub mod error;
pub mod sessions;

pub use quiz_core::Clock;

pub use authoring::{Authoring, SaveOutcome, SyncNotice};
pub use bank::{QuestionBankStore, ReconcileEvent, Reconciliation, SyncHandle};
pub use error::{AuthoringError, SessionError, SyncError};
pub use sessions::{
    FinishReason, SessionBuilder, SessionPlan, SessionSnapshot, SessionState, SessionTimer,
    SharedSession, TestFlow, TestSession, TimerUrgency,
};
