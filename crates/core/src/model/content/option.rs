use crate::model::ids::OptionId;

/// Image content of an answer option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionImage {
    pub url: String,
    pub alt_text: Option<String>,
}

/// One selectable answer choice.
///
/// Authoring fills exactly one of `text` or `image`. Stored records may carry
/// neither (an empty option) or both; readers must tolerate both shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub id: OptionId,
    pub text: Option<String>,
    pub image: Option<OptionImage>,
}

impl AnswerOption {
    pub fn text(id: impl Into<OptionId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: Some(text.into()),
            image: None,
        }
    }

    pub fn image(id: impl Into<OptionId>, url: impl Into<String>, alt_text: Option<String>) -> Self {
        Self {
            id: id.into(),
            text: None,
            image: Some(OptionImage {
                url: url.into(),
                alt_text,
            }),
        }
    }

    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    pub fn has_image(&self) -> bool {
        self.image.as_ref().is_some_and(|i| !i.url.trim().is_empty())
    }

    /// Whether the option has any content a test taker could select.
    pub fn is_filled(&self) -> bool {
        self.has_text() || self.has_image()
    }

    /// Short human-readable label: the text, else the alt text, else the URL.
    pub fn label(&self) -> &str {
        if let Some(text) = self.text.as_deref().filter(|t| !t.trim().is_empty()) {
            return text;
        }
        match &self.image {
            Some(image) => image.alt_text.as_deref().unwrap_or(&image.url),
            None => "",
        }
    }
}
