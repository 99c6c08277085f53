use thiserror::Error;

use crate::model::content::{
    AnswerOption, MediaKind, MediaUri, MediaValidationError, OptionImage, PromptMedia,
};
use crate::model::ids::{OptionId, QuestionId};
use crate::model::question::Question;
use crate::model::section::Section;

//
// ─── DRAFT TYPES (unvalidated authoring input) ────────────────────────────────
//

/// How the prompt is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptKind {
    #[default]
    Text,
    Image,
    Audio,
}

/// Which content field of an option is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionKind {
    #[default]
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDraft {
    pub id: OptionId,
    pub kind: OptionKind,
    pub text: String,
    pub image_url: String,
    pub image_alt: String,
}

impl OptionDraft {
    pub fn empty(id: OptionId) -> Self {
        Self {
            id,
            kind: OptionKind::Text,
            text: String::new(),
            image_url: String::new(),
            image_alt: String::new(),
        }
    }

    pub fn text(id: impl Into<OptionId>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::empty(id.into())
        }
    }

    pub fn image(id: impl Into<OptionId>, url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            kind: OptionKind::Image,
            image_url: url.into(),
            image_alt: alt.into(),
            ..Self::empty(id.into())
        }
    }

    fn is_filled(&self) -> bool {
        match self.kind {
            OptionKind::Text => !self.text.trim().is_empty(),
            OptionKind::Image => !self.image_url.trim().is_empty(),
        }
    }

    /// Switch content kind, clearing the fields of the other kind.
    pub fn set_kind(&mut self, kind: OptionKind) {
        if self.kind == kind {
            return;
        }
        self.kind = kind;
        match kind {
            OptionKind::Text => {
                self.image_url.clear();
                self.image_alt.clear();
            }
            OptionKind::Image => self.text.clear(),
        }
    }

    fn into_option(self) -> AnswerOption {
        let text = self.text.trim();
        let url = self.image_url.trim();
        let alt = self.image_alt.trim();
        match self.kind {
            OptionKind::Text => AnswerOption {
                id: self.id,
                text: non_empty(text),
                image: None,
            },
            OptionKind::Image => AnswerOption {
                id: self.id,
                text: None,
                image: non_empty(url).map(|url| OptionImage {
                    url,
                    alt_text: non_empty(alt),
                }),
            },
        }
    }
}

/// Form state for creating or editing a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    /// `None` for a new question; set when editing an existing record.
    pub id: Option<QuestionId>,
    pub section: Section,
    pub prompt_kind: PromptKind,
    pub prompt_text: String,
    pub prompt_media_url: String,
    pub prompt_media_alt: String,
    pub explanation: String,
    pub options: Vec<OptionDraft>,
    pub correct_answer: OptionId,
}

//
// ─── VALIDATION ERRORS ─────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DraftError {
    #[error("At least two answer options need text or an image.")]
    TooFewFilledOptions,

    #[error("Pick a correct answer that has content.")]
    CorrectAnswerWithoutContent,

    #[error("Option {} needs an image URL, or switch it to text.", .option.as_str().to_uppercase())]
    IncompleteImageOption { option: OptionId },

    #[error("Option id {option} is used more than once.")]
    DuplicateOptionId { option: OptionId },

    #[error("Text question cannot be empty.")]
    EmptyPromptText,

    #[error("Image and audio questions need a media URL.")]
    MissingPromptMedia,

    #[error("Add question text or media so the question can be shown.")]
    EmptyPrompt,

    #[error("invalid media URL: {0}")]
    InvalidMediaUrl(#[from] MediaValidationError),
}

//
// ─── DRAFT IMPL ────────────────────────────────────────────────────────────────
//

const DEFAULT_OPTION_COUNT: usize = 4;
const MIN_OPTIONS: usize = 2;

impl QuestionDraft {
    /// Blank draft with options `a` through `d` and `a` marked correct.
    pub fn new(section: Section) -> Self {
        Self {
            id: None,
            section,
            prompt_kind: PromptKind::Text,
            prompt_text: String::new(),
            prompt_media_url: String::new(),
            prompt_media_alt: String::new(),
            explanation: String::new(),
            options: (0..DEFAULT_OPTION_COUNT)
                .map(|i| OptionDraft::empty(OptionId::letter(i)))
                .collect(),
            correct_answer: OptionId::letter(0),
        }
    }

    /// Load an existing question for editing.
    pub fn from_question(question: &Question) -> Self {
        let (prompt_kind, prompt_media_url, prompt_media_alt) = match &question.prompt_media {
            Some(media) => (
                match media.kind {
                    MediaKind::Image => PromptKind::Image,
                    MediaKind::Audio => PromptKind::Audio,
                },
                media.url.clone(),
                media.alt_text.clone().unwrap_or_default(),
            ),
            None => (PromptKind::Text, String::new(), String::new()),
        };

        let options = question
            .options
            .iter()
            .map(|opt| match &opt.image {
                Some(image) => OptionDraft::image(
                    opt.id.clone(),
                    image.url.clone(),
                    image.alt_text.clone().unwrap_or_default(),
                ),
                None => OptionDraft::text(opt.id.clone(), opt.text.clone().unwrap_or_default()),
            })
            .collect();

        Self {
            id: Some(question.id),
            section: question.section,
            prompt_kind,
            prompt_text: question.prompt_text().to_string(),
            prompt_media_url,
            prompt_media_alt,
            explanation: question.explanation.clone().unwrap_or_default(),
            options,
            correct_answer: question.correct_answer.clone(),
        }
    }

    /// Append an empty option with the first free letter id.
    pub fn add_option(&mut self) -> OptionId {
        let id = OptionId::next_free(self.options.iter().map(|o| &o.id));
        self.options.push(OptionDraft::empty(id.clone()));
        id
    }

    /// Remove an option, keeping at least two. Returns whether it was removed.
    ///
    /// If the removed option was the correct answer, the first remaining
    /// option becomes correct.
    pub fn remove_option(&mut self, id: &OptionId) -> bool {
        if self.options.len() <= MIN_OPTIONS {
            return false;
        }
        let before = self.options.len();
        self.options.retain(|o| &o.id != id);
        let removed = self.options.len() != before;
        if removed && !self.options.iter().any(|o| o.id == self.correct_answer) {
            if let Some(first) = self.options.first() {
                self.correct_answer = first.id.clone();
            }
        }
        removed
    }

    /// Check the authoring rules in order and build the stored record.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule as a `DraftError`.
    pub fn validate(self, id: QuestionId) -> Result<Question, DraftError> {
        let filled: Vec<&OptionDraft> = self.options.iter().filter(|o| o.is_filled()).collect();
        if filled.len() < MIN_OPTIONS {
            return Err(DraftError::TooFewFilledOptions);
        }
        if !filled.iter().any(|o| o.id == self.correct_answer) {
            return Err(DraftError::CorrectAnswerWithoutContent);
        }
        if let Some(incomplete) = self
            .options
            .iter()
            .find(|o| o.kind == OptionKind::Image && o.image_url.trim().is_empty())
        {
            return Err(DraftError::IncompleteImageOption {
                option: incomplete.id.clone(),
            });
        }
        for (i, opt) in self.options.iter().enumerate() {
            if self.options[..i].iter().any(|prev| prev.id == opt.id) {
                return Err(DraftError::DuplicateOptionId {
                    option: opt.id.clone(),
                });
            }
        }

        let prompt_text = self.prompt_text.trim();
        let media_url = self.prompt_media_url.trim();
        if self.prompt_kind == PromptKind::Text && prompt_text.is_empty() {
            return Err(DraftError::EmptyPromptText);
        }
        if self.prompt_kind != PromptKind::Text && media_url.is_empty() {
            return Err(DraftError::MissingPromptMedia);
        }
        let has_prompt_content =
            !prompt_text.is_empty() || (self.prompt_kind != PromptKind::Text && !media_url.is_empty());
        if !has_prompt_content {
            return Err(DraftError::EmptyPrompt);
        }

        if self.prompt_kind != PromptKind::Text {
            MediaUri::parse(media_url)?;
        }
        for opt in self.options.iter().filter(|o| o.kind == OptionKind::Image) {
            MediaUri::parse(&opt.image_url)?;
        }

        let prompt_media = match self.prompt_kind {
            PromptKind::Text => None,
            PromptKind::Image => Some(PromptMedia::new(
                MediaKind::Image,
                media_url,
                non_empty(self.prompt_media_alt.trim()),
            )),
            PromptKind::Audio => Some(PromptMedia::new(MediaKind::Audio, media_url, None)),
        };

        Ok(Question {
            id,
            section: self.section,
            prompt_text: non_empty(prompt_text),
            prompt_media,
            options: self.options.into_iter().map(OptionDraft::into_option).collect(),
            correct_answer: self.correct_answer,
            explanation: non_empty(self.explanation.trim()),
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
