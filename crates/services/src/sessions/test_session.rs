use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use quiz_core::Clock;
use quiz_core::model::score::score;
use quiz_core::model::{AttemptId, OptionId, Question, ScoreReport, Section};

use crate::error::SessionError;

/// Time budget granted per question.
pub const SECONDS_PER_QUESTION: u32 = 120;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Completed,
    TimeUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Ready,
    Active,
    Finished(FinishReason),
}

/// How close the countdown is to running out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerUrgency {
    /// More than half the time left.
    Calm,
    /// More than a fifth left.
    Warning,
    Critical,
}

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub position: usize,
    pub total: usize,
    pub selected: Option<OptionId>,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub progress_percent: u32,
    pub time_display: String,
    pub urgency: TimerUrgency,
}

/// One randomized, timed attempt at a section.
#[derive(Debug, Clone)]
pub struct TestSession {
    attempt_id: AttemptId,
    section: Section,
    questions: Vec<Question>,
    answers: BTreeMap<usize, OptionId>,
    current: usize,
    total_seconds: u32,
    remaining_seconds: u32,
    state: SessionState,
    clock: Clock,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl TestSession {
    /// Create a session in the `Ready` state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestions` if `questions` is empty.
    pub fn new(
        section: Section,
        questions: Vec<Question>,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        let count = u32::try_from(questions.len()).unwrap_or(u32::MAX);
        let total_seconds = count.saturating_mul(SECONDS_PER_QUESTION);
        Ok(Self {
            attempt_id: AttemptId::new_v4(),
            section,
            questions,
            answers: BTreeMap::new(),
            current: 0,
            total_seconds,
            remaining_seconds: total_seconds,
            state: SessionState::Ready,
            clock,
            started_at: None,
            finished_at: None,
        })
    }

    /// Move from `Ready` to `Active`; the countdown starts from the full budget.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` unless the session is `Ready`.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Ready {
            return Err(SessionError::AlreadyStarted);
        }
        self.remaining_seconds = self.total_seconds;
        self.started_at = Some(self.clock.now());
        self.state = SessionState::Active;
        tracing::info!(
            attempt = %self.attempt_id,
            section = %self.section,
            questions = self.questions.len(),
            seconds = self.total_seconds,
            "session started"
        );
        Ok(())
    }

    /// Select `option` for the current question; a later answer replaces it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` outside `Active` and
    /// `SessionError::UnknownOption` if the current question has no such option.
    pub fn record_answer(&mut self, option: OptionId) -> Result<(), SessionError> {
        self.ensure_active()?;
        if !self.questions[self.current].has_option(&option) {
            return Err(SessionError::UnknownOption { option });
        }
        tracing::debug!(attempt = %self.attempt_id, position = self.current, option = %option, "answer recorded");
        self.answers.insert(self.current, option);
        Ok(())
    }

    /// Go to the next question, or finish when already on the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` outside `Active`.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        } else {
            self.finish(FinishReason::Completed);
        }
        Ok(())
    }

    /// Go back one question; stays put on the first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` outside `Active`.
    pub fn retreat(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.current = self.current.saturating_sub(1);
        Ok(())
    }

    /// Count down one second. Ignored unless `Active`; reaching zero finishes
    /// the session. Returns the remaining seconds.
    pub fn tick(&mut self) -> u32 {
        if self.state != SessionState::Active {
            return self.remaining_seconds;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.finish(FinishReason::TimeUp);
        }
        self.remaining_seconds
    }

    /// Score the attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFinished` until the session is finished.
    pub fn report(&self) -> Result<ScoreReport, SessionError> {
        if !self.is_finished() {
            return Err(SessionError::NotFinished);
        }
        Ok(score(&self.questions, &self.answers))
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            position: self.current,
            total: self.questions.len(),
            selected: self.selected().cloned(),
            remaining_seconds: self.remaining_seconds,
            total_seconds: self.total_seconds,
            progress_percent: progress_percent(self.current, self.questions.len()),
            time_display: format_clock(self.remaining_seconds),
            urgency: urgency(self.remaining_seconds, self.total_seconds),
        }
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn section(&self) -> Section {
        self.section
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished(_))
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&OptionId> {
        self.answers.get(&self.current)
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<usize, OptionId> {
        &self.answers
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Wall-clock seconds between start and finish (or now, if still running).
    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => u64::try_from((end - start).num_seconds()).unwrap_or(0),
            (Some(start), None) => self.clock.seconds_since(start),
            _ => 0,
        }
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(SessionError::NotActive)
        }
    }

    fn finish(&mut self, reason: FinishReason) {
        self.state = SessionState::Finished(reason);
        self.finished_at = Some(self.clock.now());
        tracing::info!(
            attempt = %self.attempt_id,
            section = %self.section,
            ?reason,
            answered = self.answers.len(),
            remaining = self.remaining_seconds,
            "session finished"
        );
    }
}

/// `m:ss`, e.g. `2:05`.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn progress_percent(current: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    u32::try_from((current + 1) * 100 / total).unwrap_or(100)
}

fn urgency(remaining: u32, total: u32) -> TimerUrgency {
    let remaining = u64::from(remaining);
    let total = u64::from(total);
    if remaining * 2 > total {
        TimerUrgency::Calm
    } else if remaining * 5 > total {
        TimerUrgency::Warning
    } else {
        TimerUrgency::Critical
    }
}
