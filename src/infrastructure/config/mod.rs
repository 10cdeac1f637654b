use crate::domain::artifact::ArtifactStoreConfig;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub allowed_origin: String,
    pub max_text_chars: usize,
    // Artifact store
    pub artifact_dir: PathBuf,
    pub artifact_expiration_secs: u64,
    pub artifact_sweep_interval_secs: u64,
    pub artifact_sweep_age_factor: u32,
    pub artifact_max_pending: usize,
    // Azure Speech
    pub azure_speech_key: String,
    pub azure_speech_region: String,
    pub azure_output_format: String,
    pub synthesis_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5500".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            allowed_origin: env::var("TTS_ALLOWED_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            max_text_chars: env::var("MAX_TEXT_CHARS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()?,
            artifact_dir: env::var("ARTIFACT_DIR")
                .unwrap_or_else(|_| "tts_audio".to_string())
                .into(),
            artifact_expiration_secs: env::var("ARTIFACT_EXPIRATION_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            artifact_sweep_interval_secs: env::var("ARTIFACT_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            artifact_sweep_age_factor: env::var("ARTIFACT_SWEEP_AGE_FACTOR")
                .unwrap_or_else(|_| "4".to_string())
                .parse()?,
            artifact_max_pending: env::var("ARTIFACT_MAX_PENDING")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()?,
            azure_speech_key: env::var("AZURE_SPEECH_KEY")?,
            azure_speech_region: env::var("AZURE_SPEECH_REGION")
                .unwrap_or_else(|_| "eastus".to_string()),
            azure_output_format: env::var("AZURE_OUTPUT_FORMAT")
                .unwrap_or_else(|_| "audio-24khz-48kbitrate-mono-mp3".to_string()),
            synthesis_timeout_secs: env::var("SYNTHESIS_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Settings handed to the artifact store
    pub fn artifact_store(&self) -> ArtifactStoreConfig {
        ArtifactStoreConfig::new(self.artifact_dir.clone())
            .with_expiration_delay(Duration::from_secs(self.artifact_expiration_secs))
            .with_sweep_interval(Duration::from_secs(self.artifact_sweep_interval_secs))
            .with_sweep_age_factor(self.artifact_sweep_age_factor)
            .with_max_pending(self.artifact_max_pending)
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }
}
