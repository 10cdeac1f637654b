use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tts_service::controllers::tts::TtsController;
use tts_service::domain::artifact::{ArtifactStore, ArtifactStoreConfig};
use tts_service::domain::tts::TtsService;
use tts_service::infrastructure::http::build_router;

pub mod assertions;
pub mod synthesis_mocks;

use api_client::TestClient;
use synthesis_mocks::{MockBehavior, MockSynthesisRepository};

/// Knobs for a test server; defaults mirror production except for the
/// artifact directory, which is always a fresh temporary one
pub struct TestOptions {
    pub behavior: MockBehavior,
    pub latency: Duration,
    pub expiration_delay: Duration,
    pub max_text_chars: usize,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            behavior: MockBehavior::Audio(4096),
            latency: Duration::ZERO,
            expiration_delay: Duration::from_secs(30),
            max_text_chars: 10_000,
        }
    }
}

pub struct TestContext {
    pub client: TestClient,
    pub store: Arc<ArtifactStore>,
    pub synthesis: Arc<MockSynthesisRepository>,
    shutdown: CancellationToken,
    server: tokio::task::JoinHandle<()>,
    _dir: TempDir,
}

impl TestContext {
    pub async fn start(options: TestOptions) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let shutdown = CancellationToken::new();

        let store_config = ArtifactStoreConfig::new(dir.path().join("tts_audio"))
            .with_expiration_delay(options.expiration_delay);
        let store = ArtifactStore::start(store_config, shutdown.clone()).await?;

        let synthesis = Arc::new(
            MockSynthesisRepository::new(options.behavior).with_latency(options.latency),
        );
        let tts_service = Arc::new(TtsService::new(synthesis.clone(), store.clone()));
        let tts_controller = Arc::new(TtsController::new(tts_service, options.max_text_chars));
        let app = build_router("*", store.clone(), tts_controller);

        // Start server
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);

        let server_shutdown = shutdown.clone();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
                .await
                .unwrap();
        });

        Ok(Self {
            client: TestClient::new(&base_url),
            store,
            synthesis,
            shutdown,
            server,
            _dir: dir,
        })
    }

    pub fn artifact_dir(&self) -> &Path {
        self.store.base_dir()
    }

    /// Artifact files currently on disk, sorted by name
    pub fn artifact_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(self.artifact_dir())
            .map(|entries| entries.flatten().map(|e| e.path()).collect())
            .unwrap_or_default();
        files.sort();
        files
    }

    pub async fn stop(self) {
        self.shutdown.cancel();
        self.store.shutdown().await;
        let _ = self.server.await;
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            TestContext::start(TestOptions::default())
                .await
                .expect("Failed to start test server")
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            self.stop().await;
        }
    }
}
