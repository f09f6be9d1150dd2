use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid capture JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported capture version: {version}")]
    UnsupportedVersion { version: u32 },
}
