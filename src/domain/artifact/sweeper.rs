use super::model::{ArtifactId, ArtifactState};
use super::registry::{retire, ArtifactRegistry, RetireOutcome};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Outcome of one pass over the base directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Reconciliation sweep: force-removes artifact files that outlived their
/// expiration, e.g. because the scheduled deletion failed or the process
/// restarted before it fired.
#[derive(Clone)]
pub struct Sweeper {
    base_dir: PathBuf,
    registry: Arc<ArtifactRegistry>,
    max_age: Duration,
}

impl Sweeper {
    pub fn new(base_dir: PathBuf, registry: Arc<ArtifactRegistry>, max_age: Duration) -> Self {
        Self {
            base_dir,
            registry,
            max_age,
        }
    }

    /// Remove every file older than the configured age
    pub async fn sweep(&self) -> SweepReport {
        self.sweep_older_than(self.max_age).await
    }

    /// Remove every artifact file regardless of age.
    /// Only meaningful before the store has created anything.
    pub async fn purge(&self) -> SweepReport {
        self.sweep_older_than(Duration::ZERO).await
    }

    async fn sweep_older_than(&self, max_age: Duration) -> SweepReport {
        let mut report = SweepReport::default();

        let mut dir = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!(
                    base_dir = %self.base_dir.display(),
                    error = %e,
                    "Reconciliation sweep could not read artifact directory"
                );
                return report;
            }
        };

        loop {
            let dir_entry = match dir.next_entry().await {
                Ok(Some(dir_entry)) => dir_entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Reconciliation sweep stopped early");
                    break;
                }
            };

            let file_name = dir_entry.file_name();
            let Some((id, partial)) = file_name.to_str().and_then(ArtifactId::from_file_name) else {
                continue;
            };
            report.scanned += 1;

            let path = dir_entry.path();
            let outcome = match self.registry.get(&id) {
                Some(entry) if entry.state() == ArtifactState::Writing => {
                    // A write that never finished, e.g. its task died mid-way
                    if max_age.is_zero() || entry.age() < max_age {
                        continue;
                    }
                    tracing::warn!(
                        artifact_id = %id,
                        age_secs = entry.age().as_secs_f64(),
                        "Reclaiming artifact stuck in writing"
                    );
                    if entry.advance(ArtifactState::Expired) {
                        self.registry.release(&entry);
                    }
                    remove_leaked(&id, &path).await
                }
                Some(entry) if !partial => {
                    if !is_older_than(&path, max_age).await {
                        continue;
                    }
                    retire(&self.registry, &entry).await
                }
                _ => {
                    if !is_older_than(&path, max_age).await {
                        continue;
                    }
                    remove_leaked(&id, &path).await
                }
            };

            match outcome {
                RetireOutcome::Deleted => report.removed += 1,
                RetireOutcome::DeleteFailed => report.failed += 1,
                RetireOutcome::AlreadyAbsent | RetireOutcome::AlreadyExpired => {}
            }
        }

        report
    }

    /// Run `sweep` every `period` until `shutdown` is cancelled
    pub fn spawn(self, period: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = period.max(Duration::from_millis(1));
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let report = self.sweep().await;
                        if report.removed > 0 || report.failed > 0 {
                            tracing::info!(
                                scanned = report.scanned,
                                removed = report.removed,
                                failed = report.failed,
                                "Reconciliation sweep finished"
                            );
                        } else {
                            tracing::debug!(scanned = report.scanned, "Reconciliation sweep found nothing to remove");
                        }
                    }
                }
            }
            tracing::info!("Reconciliation sweep stopped");
        })
    }
}

async fn remove_leaked(id: &ArtifactId, path: &Path) -> RetireOutcome {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::info!(
                artifact_id = %id,
                path = %path.display(),
                "Reconciliation sweep removed leaked artifact"
            );
            RetireOutcome::Deleted
        }
        Err(e) if e.kind() == ErrorKind::NotFound => RetireOutcome::AlreadyAbsent,
        Err(e) => {
            tracing::warn!(
                artifact_id = %id,
                path = %path.display(),
                error = %e,
                "Reconciliation sweep failed to remove artifact"
            );
            RetireOutcome::DeleteFailed
        }
    }
}

async fn is_older_than(path: &Path, max_age: Duration) -> bool {
    if max_age.is_zero() {
        return true;
    }
    match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
        Ok(modified) => SystemTime::now()
            .duration_since(modified)
            .map(|age| age >= max_age)
            .unwrap_or(false),
        Err(_) => false,
    }
}
