use super::tts_repository::TtsRepository;
use async_trait::async_trait;
use std::time::Duration;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";
const USER_AGENT: &str = "tts-service";

/// Azure Speech implementation of TTS repository.
///
/// Posts an SSML document naming the neural voice to the regional REST
/// endpoint and returns the MP3 body.
pub struct AzureTtsRepository {
    client: reqwest::Client,
    endpoint: String,
    subscription_key: String,
    output_format: String,
}

impl AzureTtsRepository {
    pub fn new(
        region: &str,
        subscription_key: String,
        output_format: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1"),
            subscription_key,
            output_format,
        })
    }

    /// Point the repository at a different endpoint (tests, sovereign clouds)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TtsRepository for AzureTtsRepository {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            voice = voice_id,
            text_length = text.len(),
            "Calling Azure TTS API"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .header(reqwest::header::CONTENT_TYPE, "application/ssml+xml")
            .header(OUTPUT_FORMAT_HEADER, &self.output_format)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .body(build_ssml(text, voice_id))
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() { "timed out" } else { "request failed" };
                tracing::error!(
                    error = %e,
                    voice = voice_id,
                    text_length = text.len(),
                    "Azure TTS API call {}",
                    reason
                );
                format!("Azure TTS {reason}: {e}")
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                voice = voice_id,
                body = %body,
                "Azure TTS API returned an error"
            );
            return Err(format!("Azure TTS error: HTTP {} {}", status.as_u16(), body.trim()));
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| format!("Azure TTS error: failed to read audio: {e}"))?
            .to_vec();

        let duration = start_time.elapsed();
        tracing::info!(
            provider = "azure",
            voice = voice_id,
            latency_ms = duration.as_millis(),
            characters_count = text.len(),
            audio_size_bytes = audio_data.len(),
            "TTS synthesis completed"
        );

        Ok(audio_data)
    }
}

/// Escape the characters XML treats specially
pub fn escape_xml(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}

/// Locale prefix of a neural voice name, e.g. `en-IN` for `en-IN-NeerjaNeural`
fn voice_locale(voice_id: &str) -> &str {
    let mut dashes = voice_id.match_indices('-').map(|(i, _)| i);
    match (dashes.next(), dashes.next()) {
        (Some(_), Some(second)) => &voice_id[..second],
        _ => "en-US",
    }
}

/// Wrap text in an SSML document for the given voice
pub fn build_ssml(text: &str, voice_id: &str) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='{}'><voice name='{}'>{}</voice></speak>",
        voice_locale(voice_id),
        escape_xml(voice_id),
        escape_xml(text)
    )
}
