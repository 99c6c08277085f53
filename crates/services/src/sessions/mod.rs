mod builder;
mod flow;
mod test_session;
mod timer;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use builder::{SessionBuilder, SessionPlan, fisher_yates};
pub use flow::TestFlow;
pub use test_session::{
    FinishReason, SECONDS_PER_QUESTION, SessionSnapshot, SessionState, TestSession, TimerUrgency,
    format_clock,
};
pub use timer::{SessionTimer, SharedSession};
