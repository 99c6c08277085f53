pub mod bank;
pub mod codec;
pub mod content;
pub mod draft;
mod ids;
mod question;
pub mod score;
mod section;

pub use codec::{DecodeError, DecodedQuestions, decode_question_list, encode_question_list};
pub use content::{
    AnswerOption, MediaKind, MediaUri, MediaValidationError, OptionImage, PromptMedia,
};
pub use draft::{DraftError, OptionDraft, OptionKind, PromptKind, QuestionDraft};
pub use ids::{AttemptId, OptionId, ParseIdError, QuestionId};
pub use question::Question;
pub use score::{PositionResult, ScoreReport};
pub use section::{ParseSectionError, Section};
