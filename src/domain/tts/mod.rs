pub mod dto;
pub mod error;
pub mod language;
pub mod service;

pub use dto::{SpeakRequest, ValidSpeakRequest, MISSING_FIELDS_MESSAGE};
pub use error::TtsServiceError;
pub use language::{get_voice_for_language, select_voice, LanguageCode};
pub use service::{SpeechArtifact, TtsService, TtsServiceApi};
