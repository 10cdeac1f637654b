use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use tts_service::infrastructure::repositories::TtsRepository;

/// What the mocked provider answers with
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return a payload of `n` bytes derived from the request text
    Audio(usize),
    /// Fail every synthesis with the given message
    Fail(String),
    /// Succeed with an empty payload
    Empty,
}

/// In-memory synthesis provider that records every voice it is asked for
pub struct MockSynthesisRepository {
    behavior: MockBehavior,
    latency: Duration,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockSynthesisRepository {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn voices(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

/// Deterministic fake MP3 payload: an ID3 tag followed by the text bytes repeated
pub fn fake_audio(text: &str, len: usize) -> Vec<u8> {
    let mut audio = b"ID3".to_vec();
    audio.extend(text.bytes().cycle().take(len.saturating_sub(3)));
    audio.truncate(len);
    audio
}

#[async_trait]
impl TtsRepository for MockSynthesisRepository {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, String> {
        self.calls
            .lock()
            .push((text.to_string(), voice_id.to_string()));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match &self.behavior {
            MockBehavior::Audio(len) => Ok(fake_audio(text, *len)),
            MockBehavior::Fail(message) => Err(message.clone()),
            MockBehavior::Empty => Ok(Vec::new()),
        }
    }
}
