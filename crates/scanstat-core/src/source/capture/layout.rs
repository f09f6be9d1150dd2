//! On-disk shape of a capture file.

use serde::Deserialize;

use crate::GrabStatus;
use crate::buffer::BufferKind;

pub const CAPTURE_VERSION: u32 = 1;
pub const DEFAULT_CONTROL_NAME: &str = "Mark";

#[derive(Debug, Deserialize)]
pub struct CaptureFile {
    pub version: u32,
    pub device: String,
    #[serde(default)]
    pub buffers: Vec<CaptureBuffer>,
}

#[derive(Debug, Deserialize)]
pub struct CaptureBuffer {
    #[serde(default)]
    pub timestamp: Option<f64>,
    pub kind: BufferKind,
    pub scan_count: usize,
    #[serde(default)]
    pub status: GrabStatus,
    #[serde(default)]
    pub channels: Vec<CaptureChannel>,
}

#[derive(Debug, Deserialize)]
pub struct CaptureChannel {
    pub name: String,
    #[serde(default)]
    pub subchannels: Vec<CaptureSubChannel>,
}

#[derive(Debug, Deserialize)]
pub struct CaptureSubChannel {
    pub name: String,
    pub value_type: String,
    pub width: usize,
    /// Little-endian, row-major sample bytes as hex.
    #[serde(default)]
    pub data: String,
}
