use crate::domain::artifact::ArtifactError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error("{0}")]
    Synthesis(String),
    #[error(transparent)]
    Storage(#[from] ArtifactError),
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Synthesis(msg) => AppError::Synthesis(msg),
            TtsServiceError::Storage(e) => AppError::Storage(e.to_string()),
        }
    }
}
