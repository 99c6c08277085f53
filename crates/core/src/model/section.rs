use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the four fixed exam sections questions are grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Vocabulary,
    Grammar,
    Reading,
    Listening,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown section: {raw}")]
pub struct ParseSectionError {
    raw: String,
}

impl Section {
    /// All sections in menu order.
    pub const ALL: [Section; 4] = [
        Section::Vocabulary,
        Section::Grammar,
        Section::Reading,
        Section::Listening,
    ];

    /// Lowercase key used in storage and on the command line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Vocabulary => "vocabulary",
            Section::Grammar => "grammar",
            Section::Reading => "reading",
            Section::Listening => "listening",
        }
    }

    /// Display title shown on section headers and result pages.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Section::Vocabulary => "語彙 (Vocabulary)",
            Section::Grammar => "文法 (Grammar)",
            Section::Reading => "読解 (Reading)",
            Section::Listening => "聴解 (Listening)",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = ParseSectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == key)
            .ok_or(ParseSectionError { raw: s.to_string() })
    }
}
