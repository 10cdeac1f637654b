use super::error::TtsServiceError;
use super::language::select_voice;
use crate::domain::artifact::{ArtifactHandle, ArtifactStore};
use crate::infrastructure::repositories::TtsRepository;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::fs::File;

/// A synthesized artifact, opened and ready to stream
#[derive(Debug)]
pub struct SpeechArtifact {
    pub handle: ArtifactHandle,
    pub voice: &'static str,
    pub file: File,
}

pub struct TtsService {
    tts_repo: Arc<dyn TtsRepository>,
    store: Arc<ArtifactStore>,
}

impl TtsService {
    pub fn new(tts_repo: Arc<dyn TtsRepository>, store: Arc<ArtifactStore>) -> Self {
        Self { tts_repo, store }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Synthesize text to speech and hand back the stored artifact
    ///
    /// This operation:
    /// - Resolves the voice for the language (default voice for unknown codes)
    /// - Calls the synthesis provider
    /// - Persists the audio as an ephemeral artifact that deletes itself later
    /// - Opens the artifact for streaming
    async fn speak(&self, text: &str, language: &str) -> Result<SpeechArtifact, TtsServiceError>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn speak(&self, text: &str, language: &str) -> Result<SpeechArtifact, TtsServiceError> {
        let voice = select_voice(language);

        tracing::info!(
            language = language,
            voice = voice,
            text_length = text.len(),
            "TTS synthesis request"
        );

        let audio_data = self
            .tts_repo
            .synthesize(text, voice)
            .await
            .map_err(TtsServiceError::Synthesis)?;

        if audio_data.is_empty() {
            return Err(TtsServiceError::Synthesis(
                "Synthesis produced no audio".to_string(),
            ));
        }

        let handle = self.store.create(&audio_data).await?;
        let file = self.store.open(&handle).await?;

        tracing::info!(
            artifact_id = %handle.id,
            voice = voice,
            audio_size = audio_data.len(),
            "TTS artifact ready"
        );

        Ok(SpeechArtifact { handle, voice, file })
    }
}
