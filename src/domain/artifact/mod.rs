pub mod config;
pub mod error;
pub mod expiration;
pub mod model;
pub mod registry;
pub mod store;
pub mod sweeper;

pub use config::ArtifactStoreConfig;
pub use error::ArtifactError;
pub use model::{ArtifactHandle, ArtifactId, ArtifactState};
pub use store::ArtifactStore;
pub use sweeper::SweepReport;
