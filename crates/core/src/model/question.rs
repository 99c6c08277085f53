use serde::{Deserialize, Serialize};

use crate::model::content::{AnswerOption, MediaKind, OptionImage, PromptMedia};
use crate::model::ids::{OptionId, QuestionId};
use crate::model::section::Section;

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question.
///
/// Edits replace the whole record keyed by `id`. A `Question` read from storage
/// is not guaranteed to satisfy the authoring invariants; see [`Question::is_playable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "QuestionWire", into = "QuestionWire")]
pub struct Question {
    pub id: QuestionId,
    pub section: Section,
    pub prompt_text: Option<String>,
    pub prompt_media: Option<PromptMedia>,
    pub options: Vec<AnswerOption>,
    pub correct_answer: OptionId,
    pub explanation: Option<String>,
}

impl Question {
    /// Prompt text, or an empty string for media-only prompts.
    #[must_use]
    pub fn prompt_text(&self) -> &str {
        self.prompt_text.as_deref().unwrap_or("")
    }

    #[must_use]
    pub fn option(&self, id: &OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|opt| &opt.id == id)
    }

    #[must_use]
    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.option(&self.correct_answer)
    }

    #[must_use]
    pub fn has_option(&self, id: &OptionId) -> bool {
        self.option(id).is_some()
    }

    /// Whether this record can be presented in a test: at least two filled
    /// options with distinct ids, one of which is the correct answer.
    #[must_use]
    pub fn is_playable(&self) -> bool {
        let filled = self.options.iter().filter(|opt| opt.is_filled()).count();
        let distinct_ids = self
            .options
            .iter()
            .enumerate()
            .all(|(i, opt)| self.options[..i].iter().all(|prev| prev.id != opt.id));
        let correct_filled = self
            .correct_option()
            .is_some_and(AnswerOption::is_filled);

        filled >= 2 && distinct_ids && correct_filled
    }
}

//
// ─── WIRE FORMAT ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PromptType {
    Text,
    Image,
    Audio,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionWire {
    id: OptionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_alt: Option<String>,
}

/// JSON shape shared with the existing data files and the remote endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionWire {
    id: QuestionId,
    section: Section,
    #[serde(default)]
    question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompt_type: Option<PromptType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompt_media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompt_media_alt: Option<String>,
    options: Vec<OptionWire>,
    correct_answer: OptionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
}

impl From<OptionWire> for AnswerOption {
    fn from(wire: OptionWire) -> Self {
        let image = wire.image_url.map(|url| OptionImage {
            url,
            alt_text: wire.image_alt,
        });
        Self {
            id: wire.id,
            text: wire.text,
            image,
        }
    }
}

impl From<AnswerOption> for OptionWire {
    fn from(option: AnswerOption) -> Self {
        let (image_url, image_alt) = match option.image {
            Some(image) => (Some(image.url), image.alt_text),
            None => (None, None),
        };
        Self {
            id: option.id,
            text: option.text,
            image_url,
            image_alt,
        }
    }
}

impl From<QuestionWire> for Question {
    fn from(wire: QuestionWire) -> Self {
        let kind = match wire.prompt_type {
            Some(PromptType::Image) => Some(MediaKind::Image),
            Some(PromptType::Audio) => Some(MediaKind::Audio),
            Some(PromptType::Text) | None => None,
        };
        let prompt_media = match (kind, wire.prompt_media_url) {
            (Some(kind), Some(url)) if !url.trim().is_empty() => Some(PromptMedia {
                kind,
                url,
                alt_text: wire.prompt_media_alt,
            }),
            _ => None,
        };
        let prompt_text = Some(wire.question).filter(|text| !text.trim().is_empty());

        Self {
            id: wire.id,
            section: wire.section,
            prompt_text,
            prompt_media,
            options: wire.options.into_iter().map(AnswerOption::from).collect(),
            correct_answer: wire.correct_answer,
            explanation: wire.explanation,
        }
    }
}

impl From<Question> for QuestionWire {
    fn from(question: Question) -> Self {
        let (prompt_type, prompt_media_url, prompt_media_alt) = match question.prompt_media {
            Some(media) => {
                let kind = match media.kind {
                    MediaKind::Image => PromptType::Image,
                    MediaKind::Audio => PromptType::Audio,
                };
                (kind, Some(media.url), media.alt_text)
            }
            None => (PromptType::Text, None, None),
        };

        Self {
            id: question.id,
            section: question.section,
            question: question.prompt_text.unwrap_or_default(),
            prompt_type: Some(prompt_type),
            prompt_media_url,
            prompt_media_alt,
            options: question.options.into_iter().map(OptionWire::from).collect(),
            correct_answer: question.correct_answer,
            explanation: question.explanation,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
