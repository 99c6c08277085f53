use quiz_core::Clock;
use quiz_core::model::Section;

use super::builder::{SessionBuilder, SessionPlan};
use super::test_session::TestSession;
use crate::bank::QuestionBankStore;

/// What the test surface shows for a section.
#[derive(Debug)]
pub enum TestFlow {
    /// The bank has not finished its initial load.
    Loading { section: Section },
    /// The section has no playable questions.
    Empty { section: Section },
    Session(TestSession),
}

impl TestFlow {
    /// Build a fresh flow for `section` from the current bank contents.
    #[must_use]
    pub fn prepare(
        section: Section,
        bank: &QuestionBankStore,
        builder: &SessionBuilder,
        clock: Clock,
    ) -> Self {
        if bank.is_loading() {
            return Self::Loading { section };
        }
        Self::from_plan(builder.build(section, bank.merged()), clock)
    }

    #[must_use]
    pub fn from_plan(plan: SessionPlan, clock: Clock) -> Self {
        match plan {
            SessionPlan::Empty { section } => Self::Empty { section },
            SessionPlan::Ready { section, questions } => {
                match TestSession::new(section, questions, clock) {
                    Ok(session) => Self::Session(session),
                    Err(_) => Self::Empty { section },
                }
            }
        }
    }

    #[must_use]
    pub fn section(&self) -> Section {
        match self {
            Self::Loading { section } | Self::Empty { section } => *section,
            Self::Session(session) => session.section(),
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&TestSession> {
        match self {
            Self::Session(session) => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_session(self) -> Option<TestSession> {
        match self {
            Self::Session(session) => Some(session),
            _ => None,
        }
    }
}
