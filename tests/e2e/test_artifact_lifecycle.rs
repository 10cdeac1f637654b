use crate::e2e::helpers;

use helpers::assertions::attachment_name;
use helpers::{TestContext, TestOptions};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tts_service::domain::artifact::{ArtifactState, ArtifactStore, ArtifactStoreConfig};

#[tokio::test]
#[serial]
async fn it_should_delete_served_audio_after_expiration_delay() {
    let ctx = TestContext::start(TestOptions {
        expiration_delay: Duration::from_secs(2),
        ..TestOptions::default()
    })
    .await
    .unwrap();

    let response = ctx
        .client
        .post("/speak", &json!({ "text": "Hello", "lang": "en" }))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    let file = ctx.artifact_dir().join(attachment_name(&response));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(file.exists(), "artifact removed before its delay elapsed");
    assert_eq!(ctx.store.pending_expirations(), 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!file.exists(), "artifact still on disk after its delay");
    assert_eq!(ctx.store.pending_expirations(), 0);
    assert_eq!(ctx.store.live_artifacts(), 0);

    ctx.stop().await;
}

#[tokio::test]
#[serial]
async fn it_should_open_before_and_not_after_expiration() {
    let dir = tempfile::tempdir().unwrap();
    let shutdown = tokio_util::sync::CancellationToken::new();
    let store = ArtifactStore::start(
        ArtifactStoreConfig::new(dir.path().to_path_buf())
            .with_expiration_delay(Duration::from_secs(2)),
        shutdown,
    )
    .await
    .unwrap();

    let payload = b"ID3 lifecycle payload".to_vec();
    let handle = store.create(&payload).await.unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    let mut file = store.open(&handle).await.unwrap();
    let mut read_back = Vec::new();
    file.read_to_end(&mut read_back).await.unwrap();
    assert_eq!(read_back, payload);
    assert_eq!(store.state(&handle), ArtifactState::Available);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!handle.path.exists());
    assert_eq!(store.state(&handle), ArtifactState::Expired);
    assert!(store.open(&handle).await.is_err());

    store.shutdown().await;
}

#[tokio::test]
#[serial]
async fn it_should_abandon_pending_deletions_on_shutdown_and_purge_on_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = ArtifactStoreConfig::new(dir.path().to_path_buf())
        .with_expiration_delay(Duration::from_secs(60));

    let first = ArtifactStore::start(config.clone(), tokio_util::sync::CancellationToken::new())
        .await
        .unwrap();
    let handle = first.create(b"left behind").await.unwrap();
    first.shutdown().await;

    // Nothing deletes the file once the worker is gone
    assert!(handle.path.exists());

    let second = ArtifactStore::start(config, tokio_util::sync::CancellationToken::new())
        .await
        .unwrap();
    assert!(!handle.path.exists(), "leftover artifact survived restart");
    assert_eq!(second.live_artifacts(), 0);

    second.shutdown().await;
}
