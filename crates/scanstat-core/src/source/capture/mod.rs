//! JSON capture file source.
//!
//! A capture file holds the buffers one device delivered, each with its
//! shape, grab status and per-sub-channel format descriptor plus raw
//! little-endian sample bytes (hex). Ingestion validates data lengths for the
//! known value types and assigns sub-channel roles; decoding stays in
//! `decoder`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::CaptureFileSource;

use crate::buffer::SubChannelRole;

/// Ingestion settings.
///
/// # Examples
/// ```
/// use scanstat_core::{IngestOptions, SubChannelRole};
///
/// let options = IngestOptions::default();
/// assert_eq!(options.role_for("Mark"), SubChannelRole::Control);
/// assert_eq!(options.role_for("Range"), SubChannelRole::Measurement);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Sub-channel name that identifies the control (mark) sub-channel.
    pub control_name: String,
}

impl IngestOptions {
    pub fn role_for(&self, subchannel: &str) -> SubChannelRole {
        if subchannel == self.control_name {
            SubChannelRole::Control
        } else {
            SubChannelRole::Measurement
        }
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            control_name: layout::DEFAULT_CONTROL_NAME.to_string(),
        }
    }
}
