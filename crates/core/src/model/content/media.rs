use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

//
// ─── ERRORS (domain validation) ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaValidationError {
    #[error("Media URI cannot be empty.")]
    EmptyMediaUri,

    #[error("Media URI is neither an absolute URL nor a root-relative path: {raw}")]
    InvalidMediaUri { raw: String },
}

//
// ─── MEDIA CORE TYPES ──────────────────────────────────────────────────────────
//

/// Kind of media attached to a question prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
}

/// Parsed location of a media resource.
///
/// Uploaded files arrive as `data:` URLs, linked files as absolute URLs, and
/// assets bundled with the app as root-relative paths (`/audio/q12.mp3`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaUri {
    Path(String),
    Url(Url),
}

impl MediaUri {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, MediaValidationError> {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            return Err(MediaValidationError::EmptyMediaUri);
        }
        if s.starts_with('/') && !s.starts_with("//") {
            return Ok(MediaUri::Path(s.to_string()));
        }
        Url::parse(s)
            .map(MediaUri::Url)
            .map_err(|_| MediaValidationError::InvalidMediaUri { raw: s.to_string() })
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            MediaUri::Url(u) => Some(u),
            MediaUri::Path(_) => None,
        }
    }

    /// True for inline `data:` payloads produced by file uploads.
    pub fn is_inline(&self) -> bool {
        self.as_url().is_some_and(|u| u.scheme() == "data")
    }
}

/// Image or audio shown alongside (or instead of) the prompt text.
///
/// The URL is kept as the raw stored string so records written by older
/// clients still load; `MediaUri::parse` is applied at authoring time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMedia {
    pub kind: MediaKind,
    pub url: String,
    pub alt_text: Option<String>,
}

impl PromptMedia {
    pub fn new(kind: MediaKind, url: impl Into<String>, alt_text: Option<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            alt_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_uri_fails() {
        assert_eq!(
            MediaUri::parse("   ").unwrap_err(),
            MediaValidationError::EmptyMediaUri
        );
    }

    #[test]
    fn accepts_absolute_data_and_rooted_uris() {
        assert!(matches!(
            MediaUri::parse("https://example.com/a.png").unwrap(),
            MediaUri::Url(_)
        ));
        let inline = MediaUri::parse("data:audio/mpeg;base64,AAAA").unwrap();
        assert!(inline.is_inline());
        assert_eq!(
            MediaUri::parse("/audio/q12.mp3").unwrap(),
            MediaUri::Path("/audio/q12.mp3".into())
        );
    }

    #[test]
    fn rejects_relative_garbage() {
        assert!(matches!(
            MediaUri::parse("picture.png").unwrap_err(),
            MediaValidationError::InvalidMediaUri { .. }
        ));
    }
}
