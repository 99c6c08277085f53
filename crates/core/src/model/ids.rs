use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a Question
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(u64);

impl QuestionId {
    /// Creates a new `QuestionId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id directly after this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Identifier of an answer option, unique within its question.
///
/// Options are letter-coded (`a`, `b`, `c`, ...) by the authoring flow, but any
/// non-empty string read from storage is accepted.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(String);

impl OptionId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Letter code for the option at `index`: `a` for 0 through `z` for 25.
    ///
    /// Past `z` the id falls back to `opt-{index}`.
    #[must_use]
    pub fn letter(index: usize) -> Self {
        match u8::try_from(index) {
            Ok(i) if i < 26 => Self(char::from(b'a' + i).to_string()),
            _ => Self(format!("opt-{index}")),
        }
    }

    /// First letter code not already taken by `existing`.
    #[must_use]
    pub fn next_free<'a>(existing: impl IntoIterator<Item = &'a OptionId>) -> Self {
        let taken: Vec<&OptionId> = existing.into_iter().collect();
        // `taken.len() + 1` candidates always contain at least one free id.
        (0..=taken.len())
            .map(Self::letter)
            .find(|candidate| !taken.contains(&candidate))
            .unwrap_or_else(|| Self::letter(taken.len()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of one test attempt, used to correlate log lines.
///
/// Attempts are never persisted, so this id only lives as long as the session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Creates a fresh random `AttemptId`
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Debug for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OptionId({:?})", self.0)
    }
}

impl fmt::Debug for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttemptId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OptionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OptionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for QuestionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .trim_start_matches('#')
            .parse::<u64>()
            .map(QuestionId::new)
            .map_err(|_| ParseIdError {
                kind: "QuestionId".to_string(),
            })
    }
}

impl FromStr for OptionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError {
                kind: "OptionId".to_string(),
            });
        }
        Ok(OptionId::new(trimmed.to_lowercase()))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_id_display() {
        let id = QuestionId::new(42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn question_id_from_str_accepts_hash_prefix() {
        let id: QuestionId = "#123".parse().unwrap();
        assert_eq!(id, QuestionId::new(123));
    }

    #[test]
    fn question_id_from_str_invalid() {
        assert!("not-a-number".parse::<QuestionId>().is_err());
    }

    #[test]
    fn question_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&QuestionId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn attempt_ids_are_unique() {
        assert_ne!(AttemptId::new_v4(), AttemptId::new_v4());
    }

    #[test]
    fn option_letters() {
        assert_eq!(OptionId::letter(0).as_str(), "a");
        assert_eq!(OptionId::letter(3).as_str(), "d");
        assert_eq!(OptionId::letter(25).as_str(), "z");
        assert_eq!(OptionId::letter(26).as_str(), "opt-26");
    }

    #[test]
    fn next_free_skips_taken_letters() {
        let existing = [OptionId::from("a"), OptionId::from("c")];
        assert_eq!(OptionId::next_free(&existing), OptionId::from("b"));
    }

    #[test]
    fn next_free_falls_back_after_z() {
        let existing: Vec<OptionId> = (0..26).map(OptionId::letter).collect();
        assert_eq!(OptionId::next_free(&existing).as_str(), "opt-26");
    }

    #[test]
    fn option_id_from_str_normalizes_case() {
        let id: OptionId = " B ".parse().unwrap();
        assert_eq!(id, OptionId::from("b"));
        assert!("  ".parse::<OptionId>().is_err());
    }
}
