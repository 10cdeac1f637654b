use super::error::ArtifactError;
use super::registry::{retire, ArtifactEntry, ArtifactRegistry, RetireOutcome};
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::time::DelayQueue;

/// Capacity of the hand-off channel between `create` and the worker
const SCHEDULE_CHANNEL_CAPACITY: usize = 1024;

struct ScheduledExpiration {
    entry: Arc<ArtifactEntry>,
    deadline: Instant,
}

/// Handle to the expiration worker.
///
/// All pending deletions live in one `DelayQueue` owned by a single task.
/// The queue is bounded by `max_pending`: once full the worker stops taking
/// requests and `schedule` waits on the channel.
#[derive(Clone)]
pub struct ExpirationScheduler {
    sender: mpsc::Sender<ScheduledExpiration>,
    pending: Arc<AtomicUsize>,
}

impl ExpirationScheduler {
    /// Spawn the worker. It runs until `shutdown` is cancelled, or until every
    /// scheduler handle is dropped and the queue has drained.
    pub fn spawn(
        registry: Arc<ArtifactRegistry>,
        max_pending: usize,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(SCHEDULE_CHANNEL_CAPACITY);
        let pending = Arc::new(AtomicUsize::new(0));

        let worker = ExpirationWorker {
            registry,
            receiver,
            queue: DelayQueue::new(),
            deletions: JoinSet::new(),
            pending: pending.clone(),
            max_pending: max_pending.max(1),
            shutdown,
        };
        let handle = tokio::spawn(worker.run());

        (Self { sender, pending }, handle)
    }

    /// Schedule the entry's deletion at `deadline`.
    ///
    /// The deletion counts as pending from the moment this is called, even
    /// while it still waits in the hand-off channel.
    pub(crate) async fn schedule(
        &self,
        entry: Arc<ArtifactEntry>,
        deadline: Instant,
    ) -> Result<(), ArtifactError> {
        self.pending.fetch_add(1, Ordering::AcqRel);
        let sent = self
            .sender
            .send(ScheduledExpiration { entry, deadline })
            .await;
        if sent.is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(ArtifactError::SchedulerClosed);
        }
        Ok(())
    }

    /// Number of deletions scheduled but not yet started
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }
}

struct ExpirationWorker {
    registry: Arc<ArtifactRegistry>,
    receiver: mpsc::Receiver<ScheduledExpiration>,
    queue: DelayQueue<Arc<ArtifactEntry>>,
    deletions: JoinSet<RetireOutcome>,
    pending: Arc<AtomicUsize>,
    max_pending: usize,
    shutdown: CancellationToken,
}

impl ExpirationWorker {
    async fn run(mut self) {
        tracing::info!(max_pending = self.max_pending, "Artifact expiration worker started");

        let mut accepting = true;
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::warn!(
                        abandoned = self.pending.load(Ordering::Acquire),
                        "Expiration worker stopping, abandoning pending deletions"
                    );
                    break;
                }
                scheduled = self.receiver.recv(), if accepting && self.queue.len() < self.max_pending => {
                    match scheduled {
                        Some(scheduled) => {
                            tracing::debug!(
                                artifact_id = %scheduled.entry.id,
                                "Artifact expiration scheduled"
                            );
                            self.queue.insert_at(scheduled.entry, scheduled.deadline);
                        }
                        None => accepting = false,
                    }
                }
                Some(expired) = self.queue.next(), if !self.queue.is_empty() => {
                    self.pending.fetch_sub(1, Ordering::AcqRel);
                    let registry = self.registry.clone();
                    let entry = expired.into_inner();
                    self.deletions.spawn(async move { retire(&registry, &entry).await });
                }
                Some(joined) = self.deletions.join_next(), if !self.deletions.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Artifact deletion task failed");
                    }
                }
            }

            if !accepting && self.queue.is_empty() && self.deletions.is_empty() {
                break;
            }
        }

        // Refuse further requests, then drop what was queued or in flight.
        self.receiver.close();
        let mut abandoned = self.queue.len();
        while self.receiver.try_recv().is_ok() {
            abandoned += 1;
        }
        self.queue.clear();
        self.pending.fetch_sub(abandoned, Ordering::AcqRel);

        // Deletions already started are short; let them finish.
        while let Some(joined) = self.deletions.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Artifact deletion task failed");
            }
        }
        tracing::info!("Artifact expiration worker stopped");
    }
}
