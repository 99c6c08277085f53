use serde_json::Value;
use thiserror::Error;

use crate::model::question::Question;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("question list is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("question list is not a JSON array")]
    NotAList,
}

/// Questions recovered from a stored list, plus how many entries were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedQuestions {
    pub questions: Vec<Question>,
    pub skipped: usize,
}

/// Decode a JSON array of questions, skipping elements that do not decode.
///
/// # Errors
///
/// Returns `DecodeError::Json` if `raw` is not JSON at all, and
/// `DecodeError::NotAList` if the document is not an array.
pub fn decode_question_list(raw: &str) -> Result<DecodedQuestions, DecodeError> {
    let Value::Array(items) = serde_json::from_str::<Value>(raw)? else {
        return Err(DecodeError::NotAList);
    };

    let mut decoded = DecodedQuestions::default();
    for item in items {
        match serde_json::from_value::<Question>(item) {
            Ok(question) => decoded.questions.push(question),
            Err(_) => decoded.skipped += 1,
        }
    }
    Ok(decoded)
}

/// Encode questions as the JSON array stored in caches and data files.
///
/// # Errors
///
/// Returns the underlying `serde_json` error; the question model itself always
/// serializes.
pub fn encode_question_list(questions: &[Question]) -> Result<String, serde_json::Error> {
    serde_json::to_string(questions)
}
