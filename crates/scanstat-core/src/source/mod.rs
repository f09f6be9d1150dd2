pub(crate) mod capture;
pub mod memory;

pub use capture::{CaptureFileSource, IngestOptions};

use thiserror::Error;

use crate::GrabStatus;
use memory::MemoryBuffer;

/// One buffer as delivered by a device, with its grab status.
#[derive(Debug, Clone)]
pub struct BufferEvent {
    /// Capture timestamp in seconds since the Unix epoch, when known.
    pub ts: Option<f64>,
    pub status: GrabStatus,
    pub buffer: MemoryBuffer,
}

pub trait BufferSource {
    /// Name of the device delivering the buffers.
    fn device(&self) -> &str;

    fn next_buffer(&mut self) -> Result<Option<BufferEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture error: {0}")]
    Capture(String),
}

impl From<capture::error::CaptureError> for SourceError {
    fn from(value: capture::error::CaptureError) -> Self {
        match value {
            capture::error::CaptureError::Io(err) => SourceError::Io(err),
            other => SourceError::Capture(other.to_string()),
        }
    }
}
