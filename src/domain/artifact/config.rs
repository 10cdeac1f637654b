use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_EXPIRATION_DELAY: Duration = Duration::from_secs(30);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_SWEEP_AGE_FACTOR: u32 = 4;
pub const DEFAULT_MAX_PENDING: usize = 10_000;

/// Settings the artifact store is constructed with
#[derive(Debug, Clone)]
pub struct ArtifactStoreConfig {
    /// Directory holding every artifact file
    pub base_dir: PathBuf,
    /// Time from persistence until an artifact's file is removed
    pub expiration_delay: Duration,
    /// How often the reconciliation sweep scans the base directory
    pub sweep_interval: Duration,
    /// Files older than `sweep_age_factor * expiration_delay` are force-removed
    pub sweep_age_factor: u32,
    /// Upper bound on deletions waiting in the expiration queue
    pub max_pending: usize,
}

impl ArtifactStoreConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            expiration_delay: DEFAULT_EXPIRATION_DELAY,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            sweep_age_factor: DEFAULT_SWEEP_AGE_FACTOR,
            max_pending: DEFAULT_MAX_PENDING,
        }
    }

    pub fn with_expiration_delay(mut self, delay: Duration) -> Self {
        self.expiration_delay = delay;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_sweep_age_factor(mut self, factor: u32) -> Self {
        self.sweep_age_factor = factor;
        self
    }

    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }

    /// Age beyond which the sweep treats an artifact file as leaked
    pub fn sweep_max_age(&self) -> Duration {
        self.expiration_delay
            .saturating_mul(self.sweep_age_factor.max(1))
    }
}
