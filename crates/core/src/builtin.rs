//! The built-in JLPT N5 question set shipped with the application.

use std::sync::OnceLock;

use crate::model::{Question, decode_question_list};

const BUILTIN_JSON: &str = include_str!("../data/builtin_questions.json");

static BUILTIN: OnceLock<Vec<Question>> = OnceLock::new();

/// Built-in questions, decoded once on first use.
///
/// Entries of the embedded file that fail to decode are left out rather than
/// aborting start-up.
#[must_use]
pub fn questions() -> &'static [Question] {
    BUILTIN.get_or_init(|| {
        decode_question_list(BUILTIN_JSON)
            .map(|decoded| decoded.questions)
            .unwrap_or_default()
    })
}
