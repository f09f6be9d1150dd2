use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use scanstat_core::{BufferSource, CaptureFileSource, IngestOptions, SourceError};

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn temp_capture(contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("scanstat_capture_{unique}.json"));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn capture_source_reads_buffers_from_fixture() {
    let path = repo_root()
        .join("tests")
        .join("golden")
        .join("profile")
        .join("capture.json");
    let mut source = CaptureFileSource::open(&path, &IngestOptions::default()).unwrap();
    assert_eq!(source.device(), "Camera 0");

    let mut buffers = 0;
    while let Some(_event) = source.next_buffer().unwrap() {
        buffers += 1;
    }

    assert_eq!(buffers, 2);
}

#[test]
fn capture_source_rejects_missing_file() {
    let path = repo_root().join("tests").join("golden").join("nope.json");
    let err = match CaptureFileSource::open(&path, &IngestOptions::default()) {
        Ok(_) => panic!("expected missing file to be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, SourceError::Io(_)));
}

#[test]
fn capture_source_rejects_truncated_file() {
    let path = temp_capture("{\"version\": 1, \"device\": ");
    let result = CaptureFileSource::open(&path, &IngestOptions::default());
    let _ = fs::remove_file(&path);

    let err = match result {
        Ok(_) => panic!("expected truncated file to be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, SourceError::Capture(_)));
}

#[test]
fn capture_source_rejects_unknown_version() {
    let path = temp_capture(r#"{"version": 7, "device": "Camera 0", "buffers": []}"#);
    let result = CaptureFileSource::open(&path, &IngestOptions::default());
    let _ = fs::remove_file(&path);

    match result {
        Ok(_) => panic!("expected version 7 to be rejected"),
        Err(err) => assert!(err.to_string().contains("unsupported capture version: 7")),
    }
}
