use serde::{Deserialize, Serialize};

/// ISO 639-1 language codes with a dedicated synthesis voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "te")]
    Telugu,
    #[serde(rename = "ta")]
    Tamil,
    #[serde(rename = "bn")]
    Bengali,
    #[serde(rename = "kn")]
    Kannada,
    #[serde(rename = "ml")]
    Malayalam,
    #[serde(rename = "gu")]
    Gujarati,
}

impl LanguageCode {
    /// Get the ISO 639-1 code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::English => "en",
            LanguageCode::Hindi => "hi",
            LanguageCode::Telugu => "te",
            LanguageCode::Tamil => "ta",
            LanguageCode::Bengali => "bn",
            LanguageCode::Kannada => "kn",
            LanguageCode::Malayalam => "ml",
            LanguageCode::Gujarati => "gu",
        }
    }

    /// Parse an ISO 639-1 code. Unknown codes return `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(LanguageCode::English),
            "hi" => Some(LanguageCode::Hindi),
            "te" => Some(LanguageCode::Telugu),
            "ta" => Some(LanguageCode::Tamil),
            "bn" => Some(LanguageCode::Bengali),
            "kn" => Some(LanguageCode::Kannada),
            "ml" => Some(LanguageCode::Malayalam),
            "gu" => Some(LanguageCode::Gujarati),
            _ => None,
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Get the neural voice used for a language
pub fn get_voice_for_language(language: LanguageCode) -> &'static str {
    match language {
        LanguageCode::English => "en-IN-NeerjaNeural",
        LanguageCode::Hindi => "hi-IN-SwaraNeural",
        LanguageCode::Telugu => "te-IN-MohanNeural",
        LanguageCode::Tamil => "ta-IN-PallaviNeural",
        LanguageCode::Bengali => "bn-IN-TanishaaNeural",
        LanguageCode::Kannada => "kn-IN-SapnaNeural",
        LanguageCode::Malayalam => "ml-IN-SobhanaNeural",
        LanguageCode::Gujarati => "gu-IN-DhwaniNeural",
    }
}

/// Resolve the voice for a requested language code.
/// Codes without a dedicated voice fall back to the English voice.
pub fn select_voice(code: &str) -> &'static str {
    let language = LanguageCode::from_code(code).unwrap_or_else(|| {
        tracing::debug!(language = code, "No voice for language, falling back to English");
        LanguageCode::English
    });
    get_voice_for_language(language)
}
