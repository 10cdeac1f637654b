use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tts_service::controllers::tts::TtsController;
use tts_service::domain::artifact::ArtifactStore;
use tts_service::domain::tts::TtsService;
use tts_service::infrastructure::config::{Config, LogFormat};
use tts_service::infrastructure::http::{build_router, start_http_server};
use tts_service::infrastructure::repositories::AzureTtsRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting TTS service on {}:{}",
        config.host,
        config.port
    );

    let shutdown = CancellationToken::new();

    // Artifact store owns the audio directory and its expiration worker
    let store = ArtifactStore::start(config.artifact_store(), shutdown.clone()).await?;

    // Synthesis provider
    tracing::info!(
        region = %config.azure_speech_region,
        output_format = %config.azure_output_format,
        timeout_secs = config.synthesis_timeout_secs,
        "Initializing Azure TTS client"
    );
    let tts_repo = Arc::new(AzureTtsRepository::new(
        &config.azure_speech_region,
        config.azure_speech_key.clone(),
        config.azure_output_format.clone(),
        config.synthesis_timeout(),
    )?);

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    let tts_service = Arc::new(TtsService::new(tts_repo, store.clone()));
    let tts_controller = Arc::new(TtsController::new(tts_service, config.max_text_chars));
    let router = build_router(&config.allowed_origin, store.clone(), tts_controller);

    tokio::spawn(wait_for_signal(shutdown.clone()));

    start_http_server(config, router, shutdown).await?;

    store.shutdown().await;
    tracing::info!("TTS service stopped");

    Ok(())
}

async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}

fn init_logging(config: &Config) {
    let default_filter = if config.is_development() {
        "tts_service=debug,tower_http=debug"
    } else {
        "tts_service=info,tower_http=info"
    };

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
