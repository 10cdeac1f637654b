use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::{
    domain::tts::{SpeakRequest, TtsService, TtsServiceApi, MISSING_FIELDS_MESSAGE},
    error::{AppError, AppResult},
};

pub const X_VOICE_USED: &str = "x-voice-used";

pub struct TtsController {
    tts_service: Arc<TtsService>,
    max_text_chars: usize,
}

impl TtsController {
    pub fn new(tts_service: Arc<TtsService>, max_text_chars: usize) -> Self {
        Self {
            tts_service,
            max_text_chars,
        }
    }

    /// POST /speak - Convert text to speech and stream the audio back
    pub async fn speak(
        State(controller): State<Arc<TtsController>>,
        body: Bytes,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        // Validate input
        let request = SpeakRequest::parse(&body)
            .ok_or_else(|| AppError::BadRequest(MISSING_FIELDS_MESSAGE.to_string()))?;

        if request.text.chars().count() > controller.max_text_chars {
            return Err(AppError::PayloadTooLarge(format!(
                "Text must be {} characters or less",
                controller.max_text_chars
            )));
        }

        let artifact = controller
            .tts_service
            .speak(&request.text, &request.language)
            .await?;

        // Build headers
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&format!(
                "attachment; filename=\"{}\"",
                artifact.handle.download_name()
            ))
            .map_err(|e| AppError::Internal(e.to_string()))?,
        );
        headers.insert(X_VOICE_USED, HeaderValue::from_static(artifact.voice));
        if let Ok(metadata) = artifact.file.metadata().await {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(metadata.len()));
        }

        let body = Body::from_stream(ReaderStream::new(artifact.file));

        Ok((StatusCode::OK, headers, body))
    }
}
