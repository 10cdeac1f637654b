use super::config::ArtifactStoreConfig;
use super::error::ArtifactError;
use super::expiration::ExpirationScheduler;
use super::model::{artifact_path, partial_path, ArtifactHandle, ArtifactId, ArtifactState};
use super::registry::{retire, ArtifactEntry, ArtifactRegistry};
use super::sweeper::{SweepReport, Sweeper};
use chrono::Utc;
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Ephemeral, self-expiring audio artifacts backed by files in one directory.
///
/// Every successful `create` schedules exactly one deletion, `expiration_delay`
/// after the file was published. Reading an artifact never touches its timer.
pub struct ArtifactStore {
    config: ArtifactStoreConfig,
    registry: Arc<ArtifactRegistry>,
    publisher: Publisher,
    sweeper: Sweeper,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ArtifactStore {
    /// Prepare the base directory and start the expiration worker and the
    /// reconciliation sweep. Leftovers from a previous run are purged first.
    pub async fn start(
        config: ArtifactStoreConfig,
        shutdown: CancellationToken,
    ) -> Result<Arc<Self>, ArtifactError> {
        tokio::fs::create_dir_all(&config.base_dir)
            .await
            .map_err(ArtifactError::Directory)?;

        let registry = Arc::new(ArtifactRegistry::new());
        let sweeper = Sweeper::new(
            config.base_dir.clone(),
            registry.clone(),
            config.sweep_max_age(),
        );

        let purged = sweeper.purge().await;
        tracing::info!(
            base_dir = %config.base_dir.display(),
            purged = purged.removed,
            failed = purged.failed,
            "Artifact directory ready"
        );

        let (expirations, worker) =
            ExpirationScheduler::spawn(registry.clone(), config.max_pending, shutdown.clone());
        let sweep_task = sweeper
            .clone()
            .spawn(config.sweep_interval, shutdown.clone());

        tracing::info!(
            expiration_delay_secs = config.expiration_delay.as_secs_f64(),
            sweep_interval_secs = config.sweep_interval.as_secs_f64(),
            max_pending = config.max_pending,
            "Artifact store started"
        );

        let publisher = Publisher {
            base_dir: config.base_dir.clone(),
            expiration_delay: config.expiration_delay,
            registry: registry.clone(),
            expirations,
        };

        Ok(Arc::new(Self {
            config,
            registry,
            publisher,
            sweeper,
            shutdown,
            tasks: Mutex::new(vec![worker, sweep_task]),
        }))
    }

    /// Persist `payload` as a new artifact and schedule its expiration.
    ///
    /// The file only appears under its final name once fully written, so a
    /// concurrent reader never sees a partial artifact. The work runs on its
    /// own task: dropping the returned future (a client hanging up) does not
    /// interrupt it, and the artifact then simply expires unread.
    pub async fn create(&self, payload: &[u8]) -> Result<ArtifactHandle, ArtifactError> {
        let publisher = self.publisher.clone();
        let payload = payload.to_vec();
        tokio::spawn(async move { publisher.publish(&payload).await })
            .await
            .map_err(ArtifactError::Task)?
    }

    /// Open an available artifact for reading.
    ///
    /// A stream opened before the scheduled deletion keeps serving on Unix,
    /// where an unlinked file stays readable through open descriptors. If the
    /// file is removed between the state check and the open, the artifact is
    /// reported as not found.
    pub async fn open(&self, handle: &ArtifactHandle) -> Result<File, ArtifactError> {
        let entry = self
            .registry
            .get(&handle.id)
            .filter(|entry| entry.state() == ArtifactState::Available)
            .ok_or(ArtifactError::NotFound(handle.id))?;

        match File::open(&entry.path).await {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ArtifactError::NotFound(handle.id)),
            Err(e) => Err(ArtifactError::Read(e)),
        }
    }

    /// Lifecycle state of the artifact; unknown handles are expired
    pub fn state(&self, handle: &ArtifactHandle) -> ArtifactState {
        self.registry
            .get(&handle.id)
            .map(|entry| entry.state())
            .unwrap_or(ArtifactState::Expired)
    }

    /// Run one reconciliation pass now
    pub async fn sweep(&self) -> SweepReport {
        self.sweeper.sweep().await
    }

    /// Deletions waiting for their deadline
    pub fn pending_expirations(&self) -> usize {
        self.publisher.expirations.pending()
    }

    /// Artifacts currently registered (being written or available)
    pub fn live_artifacts(&self) -> usize {
        self.registry.len()
    }

    pub fn base_dir(&self) -> &Path {
        &self.config.base_dir
    }

    pub fn expiration_delay(&self) -> Duration {
        self.config.expiration_delay
    }

    /// Whether the base directory is still usable
    pub async fn is_ready(&self) -> bool {
        tokio::fs::metadata(&self.config.base_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Stop the expiration worker and the sweep, abandoning pending deletions
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Artifact store task failed");
            }
        }
    }
}

/// Writes artifacts and hands them to the expiration worker
#[derive(Clone)]
struct Publisher {
    base_dir: PathBuf,
    expiration_delay: Duration,
    registry: Arc<ArtifactRegistry>,
    expirations: ExpirationScheduler,
}

impl Publisher {
    async fn publish(&self, payload: &[u8]) -> Result<ArtifactHandle, ArtifactError> {
        let id = ArtifactId::generate();
        let path = artifact_path(&self.base_dir, &id);
        let entry = self.registry.reserve(id, path.clone())?;

        if let Err(e) = self.persist(&entry, payload).await {
            self.registry.release(&entry);
            tracing::error!(artifact_id = %id, error = %e, "Failed to persist audio artifact");
            return Err(e);
        }

        if !entry.advance(ArtifactState::Available) {
            // The sweep gave up on this write and already unregistered it.
            remove_quietly(&path).await;
            return Err(ArtifactError::Reclaimed(id));
        }
        let created_at = Utc::now();
        let deadline = Instant::now() + self.expiration_delay;

        if let Err(e) = self.expirations.schedule(entry.clone(), deadline).await {
            // Its lifetime can no longer be bounded, so take it back.
            retire(&self.registry, &entry).await;
            tracing::error!(artifact_id = %id, error = %e, "Could not schedule artifact expiration");
            return Err(e);
        }

        tracing::debug!(
            artifact_id = %id,
            size_bytes = payload.len(),
            expires_in_secs = self.expiration_delay.as_secs_f64(),
            "Audio artifact available"
        );

        Ok(ArtifactHandle {
            id,
            path,
            created_at,
        })
    }

    async fn persist(&self, entry: &ArtifactEntry, payload: &[u8]) -> Result<(), ArtifactError> {
        // A file already under this name means the id was handed out before.
        if tokio::fs::try_exists(&entry.path)
            .await
            .map_err(ArtifactError::Write)?
        {
            return Err(ArtifactError::IdCollision(entry.id));
        }

        let partial = partial_path(&self.base_dir, &entry.id);
        let written = async {
            write_partial(&partial, payload).await?;
            tokio::fs::rename(&partial, &entry.path).await
        }
        .await;

        if let Err(e) = written {
            remove_quietly(&partial).await;
            return Err(ArtifactError::Write(e));
        }
        Ok(())
    }
}

async fn write_partial(path: &Path, payload: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(payload).await?;
    file.sync_all().await?;
    Ok(())
}

async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove unpublished artifact file"
        ),
    }
}
