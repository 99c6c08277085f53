pub mod media;
pub mod option;

pub use media::{MediaKind, MediaUri, MediaValidationError, PromptMedia};
pub use option::{AnswerOption, OptionImage};
