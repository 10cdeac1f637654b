use super::error::ArtifactError;
use super::model::{ArtifactId, ArtifactState};
use dashmap::{mapref::entry::Entry, DashMap};
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Book-keeping for one live artifact
#[derive(Debug)]
pub struct ArtifactEntry {
    pub id: ArtifactId,
    pub path: PathBuf,
    reserved_at: Instant,
    state: Mutex<ArtifactState>,
}

impl ArtifactEntry {
    fn new(id: ArtifactId, path: PathBuf) -> Self {
        Self {
            id,
            path,
            reserved_at: Instant::now(),
            state: Mutex::new(ArtifactState::Writing),
        }
    }

    pub fn state(&self) -> ArtifactState {
        *self.state.lock()
    }

    /// Time since the id was reserved
    pub fn age(&self) -> Duration {
        self.reserved_at.elapsed()
    }

    /// Move to `next` if that is a forward transition.
    /// Returns false when the entry is already at or past `next`.
    pub(crate) fn advance(&self, next: ArtifactState) -> bool {
        let mut state = self.state.lock();
        if *state >= next {
            return false;
        }
        *state = next;
        true
    }
}

/// What happened when an artifact was retired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetireOutcome {
    Deleted,
    AlreadyAbsent,
    DeleteFailed,
    AlreadyExpired,
}

/// Live artifacts keyed by id.
///
/// Sharded, so unrelated artifacts never contend on one lock; an id stays
/// registered until its backing file is gone.
#[derive(Debug, Default)]
pub struct ArtifactRegistry {
    entries: DashMap<ArtifactId, Arc<ArtifactEntry>>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh id in `Writing` state; a registered id is a collision
    pub fn reserve(&self, id: ArtifactId, path: PathBuf) -> Result<Arc<ArtifactEntry>, ArtifactError> {
        match self.entries.entry(id) {
            Entry::Occupied(_) => Err(ArtifactError::IdCollision(id)),
            Entry::Vacant(vacant) => {
                let entry = Arc::new(ArtifactEntry::new(id, path));
                vacant.insert(entry.clone());
                Ok(entry)
            }
        }
    }

    pub fn get(&self, id: &ArtifactId) -> Option<Arc<ArtifactEntry>> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    /// Drop the entry, but only if the registered entry is this very one
    pub fn release(&self, entry: &Arc<ArtifactEntry>) {
        self.entries
            .remove_if(&entry.id, |_, registered| Arc::ptr_eq(registered, entry));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// End an artifact's life: mark it expired, remove its file, unregister it.
///
/// Runs at most once per entry. A missing file is fine; any other removal
/// failure is logged and left to the reconciliation sweep.
pub async fn retire(registry: &ArtifactRegistry, entry: &Arc<ArtifactEntry>) -> RetireOutcome {
    if !entry.advance(ArtifactState::Expired) {
        return RetireOutcome::AlreadyExpired;
    }

    let outcome = match tokio::fs::remove_file(&entry.path).await {
        Ok(()) => {
            tracing::info!(
                artifact_id = %entry.id,
                path = %entry.path.display(),
                "Deleted audio artifact"
            );
            RetireOutcome::Deleted
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(
                artifact_id = %entry.id,
                "Audio artifact already absent at expiration"
            );
            RetireOutcome::AlreadyAbsent
        }
        Err(e) => {
            tracing::warn!(
                artifact_id = %entry.id,
                path = %entry.path.display(),
                error = %e,
                "Failed to delete audio artifact"
            );
            RetireOutcome::DeleteFailed
        }
    };

    registry.release(entry);
    outcome
}
