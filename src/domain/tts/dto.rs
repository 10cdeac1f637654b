use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing text or lang/language";

/// Request body for POST /speak, as received.
///
/// The language keys stay loosely typed: any value is accepted and values
/// that are not a known code fall back to the default voice.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SpeakRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Value>,
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSpeakRequest {
    pub text: String,
    /// Requested language code; empty when none was usable
    pub language: String,
}

impl SpeakRequest {
    /// Parse and validate a raw request body.
    ///
    /// Requires a JSON object with non-blank string `text` and at least one
    /// of the `lang`/`language` keys. The keys only need to be present.
    pub fn parse(body: &[u8]) -> Option<ValidSpeakRequest> {
        let value: Value = serde_json::from_slice(body).ok()?;
        let object = value.as_object()?;
        if !object.contains_key("lang") && !object.contains_key("language") {
            return None;
        }
        serde_json::from_value::<SpeakRequest>(value).ok()?.validate()
    }

    /// `lang` wins when it holds a non-empty string, then `language`
    fn validate(self) -> Option<ValidSpeakRequest> {
        let text = self.text.filter(|t| !t.trim().is_empty())?;
        let language = language_code(self.lang)
            .or_else(|| language_code(self.language))
            .unwrap_or_default();

        Some(ValidSpeakRequest { text, language })
    }
}

fn language_code(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(code) if !code.is_empty() => Some(code),
        _ => None,
    }
}
