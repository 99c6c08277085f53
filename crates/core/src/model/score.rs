use std::collections::BTreeMap;

use crate::model::ids::{OptionId, QuestionId};
use crate::model::question::Question;

/// Percentage at or above which an attempt counts as passed.
pub const PASS_PERCENTAGE: u32 = 70;

/// Outcome for one session position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionResult {
    pub position: usize,
    pub question_id: QuestionId,
    pub selected: Option<OptionId>,
    pub correct_answer: OptionId,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

/// Correctness report for a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    positions: Vec<PositionResult>,
    correct_count: usize,
    total: usize,
    percentage: u32,
}

impl ScoreReport {
    #[must_use]
    pub fn positions(&self) -> &[PositionResult] {
        &self.positions
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// `round(100 * correct / total)`, or `0` for an empty session.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.percentage
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.total > 0 && self.percentage >= PASS_PERCENTAGE
    }
}

/// Score recorded answers against session questions.
///
/// `answers` maps a 0-based position in `questions` to the selected option.
/// A position without an answer is incorrect. Entries whose position is out of
/// range are ignored.
#[must_use]
pub fn score(questions: &[Question], answers: &BTreeMap<usize, OptionId>) -> ScoreReport {
    let positions: Vec<PositionResult> = questions
        .iter()
        .enumerate()
        .map(|(position, question)| {
            let selected = answers.get(&position).cloned();
            let is_correct = selected.as_ref() == Some(&question.correct_answer);
            PositionResult {
                position,
                question_id: question.id,
                selected,
                correct_answer: question.correct_answer.clone(),
                is_correct,
                explanation: question.explanation.clone(),
            }
        })
        .collect();

    let correct_count = positions.iter().filter(|p| p.is_correct).count();
    let total = positions.len();

    ScoreReport {
        positions,
        correct_count,
        total,
        percentage: percentage(correct_count, total),
    }
}

fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    // Integer round-half-up of 100 * correct / total.
    let scaled = (correct.min(total) * 200 + total) / (2 * total);
    u32::try_from(scaled).unwrap_or(100)
}
