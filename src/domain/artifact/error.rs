use super::model::ArtifactId;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to write audio artifact: {0}")]
    Write(#[source] std::io::Error),
    #[error("artifact id {0} is already in use")]
    IdCollision(ArtifactId),
    #[error("failed to read audio artifact: {0}")]
    Read(#[source] std::io::Error),
    #[error("artifact {0} not found")]
    NotFound(ArtifactId),
    #[error("artifact expiration scheduler is not running")]
    SchedulerClosed,
    #[error("failed to prepare artifact directory: {0}")]
    Directory(#[source] std::io::Error),
    #[error("artifact {0} was reclaimed before it could be published")]
    Reclaimed(ArtifactId),
    #[error("artifact write task failed: {0}")]
    Task(#[source] tokio::task::JoinError),
}
