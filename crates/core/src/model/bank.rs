use std::collections::BTreeMap;

use crate::model::ids::QuestionId;
use crate::model::question::Question;
use crate::model::section::Section;

/// Merge built-in questions with overrides into one id-keyed bank.
///
/// An override replaces the built-in record with the same id entirely. The
/// result is ordered by ascending id. When either input repeats an id, the
/// later entry wins.
#[must_use]
pub fn merge(builtin: &[Question], overrides: &[Question]) -> Vec<Question> {
    let mut merged: BTreeMap<QuestionId, &Question> = BTreeMap::new();
    for question in builtin.iter().chain(overrides) {
        merged.insert(question.id, question);
    }
    merged.into_values().cloned().collect()
}

/// One past the largest id across both sets; `1` when both are empty.
///
/// The id is not reserved: two calls without an intervening insert return the
/// same value.
#[must_use]
pub fn next_id(builtin: &[Question], overrides: &[Question]) -> QuestionId {
    builtin
        .iter()
        .chain(overrides)
        .map(|q| q.id)
        .max()
        .map_or(QuestionId::new(1), |max| max.next())
}

/// Questions of one section, in bank order.
pub fn in_section(bank: &[Question], section: Section) -> impl Iterator<Item = &Question> {
    bank.iter().filter(move |q| q.section == section)
}
