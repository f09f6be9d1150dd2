use thiserror::Error;

use crate::buffer::BufferKind;

/// Data-level failures raised while decoding a buffer.
///
/// None of these abort a decode: each is attached to the report entry of the
/// sub-channel that raised it.
///
/// # Examples
/// ```
/// use scanstat_core::DecodeError;
///
/// let err = DecodeError::UnsupportedValueType {
///     name: "SHORT".to_string(),
/// };
/// assert_eq!(err.code(), "unsupported_value_type");
/// assert!(err.to_string().contains("SHORT"));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unsupported buffer kind: {}", kind.as_str())]
    UnsupportedBufferKind { kind: BufferKind },
    #[error("unsupported value type: {name}")]
    UnsupportedValueType { name: String },
    #[error("no sample data: every sample is the missing-data sentinel")]
    NoSampleData,
    #[error("rows {start}..{end} out of range for {scan_count} scans")]
    RowsOutOfRange {
        start: usize,
        end: usize,
        scan_count: usize,
    },
    #[error("mark sub-channel too narrow: need {needed} columns, got {width}")]
    MarkTooNarrow { needed: usize, width: usize },
    #[error("sample data too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("mean is not finite")]
    NonFiniteMean,
    #[error("invalid sample data: {message}")]
    InvalidSampleData { message: String },
}

impl DecodeError {
    /// Stable machine-readable identifier used in reports.
    pub fn code(&self) -> &'static str {
        match self {
            DecodeError::UnsupportedBufferKind { .. } => "unsupported_buffer_kind",
            DecodeError::UnsupportedValueType { .. } => "unsupported_value_type",
            DecodeError::NoSampleData => "no_sample_data",
            DecodeError::RowsOutOfRange { .. } => "rows_out_of_range",
            DecodeError::MarkTooNarrow { .. } => "mark_too_narrow",
            DecodeError::TooShort { .. } => "too_short",
            DecodeError::NonFiniteMean => "non_finite_mean",
            DecodeError::InvalidSampleData { .. } => "invalid_sample_data",
        }
    }
}
