use std::io::Read;

use hex::FromHexError;

use super::error::CaptureError;
use super::layout::{self, CaptureFile};
use crate::buffer::ValueType;
use crate::decoder::error::DecodeError;

/// Parse a capture document and check its version.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use scanstat_core::source::capture::reader::read_capture;
///
/// let json = br#"{"version": 1, "device": "Camera 0", "buffers": []}"#;
/// let capture = read_capture(&json[..]).unwrap();
/// assert_eq!(capture.device, "Camera 0");
/// ```
///
/// # Errors
/// Returns `CaptureError` when the document is not valid JSON for the
/// capture layout or declares an unsupported version.
pub fn read_capture<R: Read>(reader: R) -> Result<CaptureFile, CaptureError> {
    let capture: CaptureFile = serde_json::from_reader(reader)?;
    if capture.version != layout::CAPTURE_VERSION {
        return Err(CaptureError::UnsupportedVersion {
            version: capture.version,
        });
    }
    Ok(capture)
}

/// Decode hex sample data; surrounding whitespace is ignored.
///
/// # Errors
/// Returns `DecodeError::InvalidSampleData` describing the malformed digit
/// or length.
pub fn decode_hex(data: &str) -> Result<Vec<u8>, DecodeError> {
    hex::decode(data.trim()).map_err(|err| {
        let message = match err {
            FromHexError::InvalidHexCharacter { c, index } => {
                format!("invalid hex character {c:?} at position {index}")
            }
            FromHexError::OddLength => "odd number of hex digits".to_string(),
            FromHexError::InvalidStringLength => "invalid hex length".to_string(),
        };
        DecodeError::InvalidSampleData { message }
    })
}

/// Byte length a sub-channel of a known type must have.
///
/// Returns `None` when the size overflows `usize`.
pub fn expected_len(value_type: ValueType, scan_count: usize, width: usize) -> Option<usize> {
    scan_count
        .checked_mul(width)?
        .checked_mul(value_type.element_size())
}

/// Fault for sample data longer than its declared shape.
///
/// Short data is not a fault here: the decoder reports it as `TooShort` for
/// exactly the rows it needs.
pub fn excess_data(
    value_type: ValueType,
    scan_count: usize,
    width: usize,
    actual: usize,
) -> Option<DecodeError> {
    let expected = expected_len(value_type, scan_count, width)?;
    (actual > expected).then(|| DecodeError::InvalidSampleData {
        message: format!("data length mismatch: expected {expected} bytes, got {actual}"),
    })
}
