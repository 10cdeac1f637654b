use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const FILE_PREFIX: &str = "tts-";
const FILE_EXTENSION: &str = ".mp3";
const PARTIAL_SUFFIX: &str = ".partial";

/// Unique identifier of one ephemeral artifact (random 128-bit token)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    /// Allocate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier rendered by this service.
    ///
    /// Only the canonical lowercase hyphenated form is accepted, so anything
    /// that did not come out of `generate` maps to no path at all.
    pub fn parse(value: &str) -> Option<Self> {
        let uuid = Uuid::parse_str(value).ok()?;
        let canonical = uuid.hyphenated().to_string();
        (canonical == value).then_some(Self(uuid))
    }

    /// Name of the published artifact file: `tts-<id>.mp3`
    pub fn file_name(&self) -> String {
        format!("{FILE_PREFIX}{}{FILE_EXTENSION}", self.0.hyphenated())
    }

    /// Name of the temporary file the payload is written to before publishing
    pub fn partial_file_name(&self) -> String {
        format!(".{}{PARTIAL_SUFFIX}", self.file_name())
    }

    /// Recognize a file in the base directory as one of ours.
    ///
    /// Returns the id and whether the file is a temporary (still being written).
    pub fn from_file_name(name: &str) -> Option<(Self, bool)> {
        let (stem, partial) = match name.strip_prefix('.') {
            Some(rest) => (rest.strip_suffix(PARTIAL_SUFFIX)?, true),
            None => (name, false),
        };
        let id = stem
            .strip_prefix(FILE_PREFIX)?
            .strip_suffix(FILE_EXTENSION)?;
        Self::parse(id).map(|id| (id, partial))
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Lifecycle of an artifact. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactState {
    Writing,
    Available,
    Expired,
}

/// Handle to a persisted artifact, returned by `ArtifactStore::create`
#[derive(Debug, Clone)]
pub struct ArtifactHandle {
    pub id: ArtifactId,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

impl ArtifactHandle {
    /// File name offered to the client when the artifact is downloaded
    pub fn download_name(&self) -> String {
        self.id.file_name()
    }
}

/// Path of an artifact inside the base directory
pub fn artifact_path(base_dir: &Path, id: &ArtifactId) -> PathBuf {
    base_dir.join(id.file_name())
}

/// Path of the temporary file an artifact is written to
pub fn partial_path(base_dir: &Path, id: &ArtifactId) -> PathBuf {
    base_dir.join(id.partial_file_name())
}
