//! Buffer capability model.
//!
//! The decoder never sees a vendor object model. It reads buffers through the
//! traits below: a buffer exposes its kind, scan count and ordered channels;
//! each sub-channel exposes its name, role, declared value type, width and a
//! typed row-range accessor. Roles are fixed when a buffer is ingested, so the
//! decoder never compares names.
//!
//! Version française (résumé):
//! Le décodeur lit les buffers uniquement via ces traits (type, nombre de
//! scans, canaux, sous-canaux typés). Le rôle de contrôle est fixé à
//! l'ingestion.

use std::ops::Range;

use serde::{Deserialize, Serialize};

mod matrix;
mod value_type;

pub use matrix::{Sample, SampleMatrix};
pub use value_type::{UnknownValueType, ValueType};

use crate::decoder::error::DecodeError;

/// Layout family of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferKind {
    /// Structured profile data (decoded).
    Profile,
    /// Image data (unsupported, reported and skipped).
    Image,
}

impl BufferKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BufferKind::Profile => "profile",
            BufferKind::Image => "image",
        }
    }
}

/// Role of a sub-channel, assigned at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubChannelRole {
    /// Mark sub-channel carrying scan counters and status flags.
    Control,
    /// Any other sub-channel; reduced to a mean.
    Measurement,
}

/// A captured scan sequence.
pub trait ScanBuffer {
    type Channel: BufferChannel;

    fn kind(&self) -> BufferKind;

    /// Number of rows (sensor scans) in the buffer.
    fn scan_count(&self) -> usize;

    fn channels(&self) -> &[Self::Channel];
}

/// Named group of sub-channels sharing a source.
pub trait BufferChannel {
    type SubChannel: BufferSubChannel;

    fn name(&self) -> &str;

    fn subchannels(&self) -> &[Self::SubChannel];
}

/// Smallest decodable unit of a buffer.
pub trait BufferSubChannel {
    fn name(&self) -> &str;

    fn role(&self) -> SubChannelRole;

    /// Declared value type.
    ///
    /// # Errors
    /// Returns `DecodeError::UnsupportedValueType` when the declared format
    /// name is outside the closed set.
    fn value_type(&self) -> Result<ValueType, DecodeError>;

    /// Samples per scan row.
    fn width(&self) -> usize;

    /// Read `rows` as a matrix of `T`, `width` samples per row.
    ///
    /// # Errors
    /// Returns `DecodeError::RowsOutOfRange` when `rows` exceeds the buffer
    /// and `DecodeError::TooShort` when the raw data cannot cover it.
    fn sample_matrix<T: Sample>(&self, rows: Range<usize>) -> Result<SampleMatrix<T>, DecodeError>;
}
