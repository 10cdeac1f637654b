// End-to-end integration tests for the TTS service API
//
// Each test gets its own server bound to an ephemeral port, a fresh
// temporary artifact directory and a mocked synthesis provider, so tests
// run in parallel without sharing files. Tests that depend on wall-clock
// expiration timing are marked #[serial] to keep them away from the rest.

mod helpers;
mod test_artifact_lifecycle;
mod test_health;
