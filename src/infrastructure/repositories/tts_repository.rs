use async_trait::async_trait;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying voice-synthesis provider.
///
/// Calls may take seconds and may fail; callers must not assume either away.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize text with the given provider voice
    ///
    /// Returns the complete audio (MP3 format)
    ///
    /// # Arguments
    /// * `text` - The text to synthesize
    /// * `voice_id` - Provider voice identifier, e.g. `en-IN-NeerjaNeural`
    ///
    /// # Errors
    /// Returns error if synthesis fails, times out, or the provider is unavailable
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, String>;
}
