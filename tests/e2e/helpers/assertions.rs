use std::path::PathBuf;

use super::api_client::ApiResponse;

/// Headers every successful /speak response must carry
pub fn assert_audio_headers(response: &ApiResponse) {
    response.assert_header("content-type", "audio/mpeg");
    response.assert_header_exists("x-voice-used");
    response.assert_header_exists("x-request-id");

    let disposition = response
        .header("content-disposition")
        .expect("Missing Content-Disposition header");
    assert!(
        disposition.starts_with("attachment; filename=\"tts-") && disposition.ends_with(".mp3\""),
        "Unexpected Content-Disposition: {}",
        disposition
    );
}

/// File name advertised in Content-Disposition, e.g. `tts-<uuid>.mp3`
pub fn attachment_name(response: &ApiResponse) -> String {
    response
        .header("content-disposition")
        .and_then(|d| d.split("filename=\"").nth(1))
        .map(|rest| rest.trim_end_matches('"').to_string())
        .expect("Missing attachment filename")
}

/// Assert that no file in the artifact directory is a leftover temp file
pub fn assert_no_partial_files(files: &[PathBuf]) {
    for file in files {
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        assert!(
            !name.ends_with(".partial"),
            "Found leftover partial file {}",
            name
        );
    }
}
