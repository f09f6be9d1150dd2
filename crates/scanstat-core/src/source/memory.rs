//! Owned, in-memory buffer model.
//!
//! Sub-channel data is stored as little-endian, row-major bytes. Declared
//! value types are classified once at construction; an unknown format name is
//! kept so the decoder can report it. A sub-channel whose data was unusable
//! at ingestion carries that fault and returns it from `sample_matrix`.

use std::ops::Range;

use crate::buffer::{
    BufferChannel, BufferKind, BufferSubChannel, Sample, SampleMatrix, ScanBuffer,
    SubChannelRole, ValueType,
};
use crate::decoder::error::DecodeError;

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryBuffer {
    kind: BufferKind,
    scan_count: usize,
    channels: Vec<MemoryChannel>,
}

impl MemoryBuffer {
    pub fn new(kind: BufferKind, scan_count: usize, mut channels: Vec<MemoryChannel>) -> Self {
        for subchannel in channels.iter_mut().flat_map(|c| c.subchannels.iter_mut()) {
            subchannel.scan_count = scan_count;
        }
        Self {
            kind,
            scan_count,
            channels,
        }
    }

    pub fn profile(scan_count: usize, channels: Vec<MemoryChannel>) -> Self {
        Self::new(BufferKind::Profile, scan_count, channels)
    }
}

impl ScanBuffer for MemoryBuffer {
    type Channel = MemoryChannel;

    fn kind(&self) -> BufferKind {
        self.kind
    }

    fn scan_count(&self) -> usize {
        self.scan_count
    }

    fn channels(&self) -> &[MemoryChannel] {
        &self.channels
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryChannel {
    name: String,
    subchannels: Vec<MemorySubChannel>,
}

impl MemoryChannel {
    pub fn new(name: impl Into<String>, subchannels: Vec<MemorySubChannel>) -> Self {
        Self {
            name: name.into(),
            subchannels,
        }
    }
}

impl BufferChannel for MemoryChannel {
    type SubChannel = MemorySubChannel;

    fn name(&self) -> &str {
        &self.name
    }

    fn subchannels(&self) -> &[MemorySubChannel] {
        &self.subchannels
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemorySubChannel {
    name: String,
    role: SubChannelRole,
    format_name: String,
    value_type: Option<ValueType>,
    width: usize,
    scan_count: usize,
    data: Vec<u8>,
    fault: Option<DecodeError>,
}

impl MemorySubChannel {
    pub fn new(
        name: impl Into<String>,
        role: SubChannelRole,
        format_name: impl Into<String>,
        width: usize,
        data: Vec<u8>,
    ) -> Self {
        let format_name = format_name.into();
        let value_type = format_name.parse().ok();
        Self {
            name: name.into(),
            role,
            format_name,
            value_type,
            width,
            scan_count: 0,
            data,
            fault: None,
        }
    }

    pub fn control(
        name: impl Into<String>,
        format_name: impl Into<String>,
        width: usize,
        data: Vec<u8>,
    ) -> Self {
        Self::new(name, SubChannelRole::Control, format_name, width, data)
    }

    pub fn measurement(
        name: impl Into<String>,
        format_name: impl Into<String>,
        width: usize,
        data: Vec<u8>,
    ) -> Self {
        Self::new(name, SubChannelRole::Measurement, format_name, width, data)
    }

    /// Declared format name, as delivered.
    pub fn format_name(&self) -> &str {
        &self.format_name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mark the sample data as unusable; every sample read returns `fault`.
    pub fn with_fault(mut self, fault: DecodeError) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn fault(&self) -> Option<&DecodeError> {
        self.fault.as_ref()
    }
}

impl BufferSubChannel for MemorySubChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> SubChannelRole {
        self.role
    }

    fn value_type(&self) -> Result<ValueType, DecodeError> {
        self.value_type
            .ok_or_else(|| DecodeError::UnsupportedValueType {
                name: self.format_name.clone(),
            })
    }

    fn width(&self) -> usize {
        self.width
    }

    fn sample_matrix<T: Sample>(&self, rows: Range<usize>) -> Result<SampleMatrix<T>, DecodeError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        if rows.start > rows.end || rows.end > self.scan_count {
            return Err(DecodeError::RowsOutOfRange {
                start: rows.start,
                end: rows.end,
                scan_count: self.scan_count,
            });
        }
        let row_bytes = self.width.saturating_mul(T::SIZE);
        let offset = rows.start.saturating_mul(row_bytes);
        let tail = self.data.get(offset..).unwrap_or(&[]);
        SampleMatrix::from_le_bytes(tail, rows.len(), self.width).map_err(|err| match err {
            DecodeError::TooShort { needed, actual } => DecodeError::TooShort {
                needed: needed.saturating_add(offset),
                actual: actual.saturating_add(offset.min(self.data.len())),
            },
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryBuffer, MemoryChannel, MemorySubChannel};
    use crate::buffer::{BufferChannel, BufferSubChannel, ScanBuffer, ValueType};
    use crate::decoder::error::DecodeError;

    fn buffer_with(subchannel: MemorySubChannel, scans: usize) -> MemoryBuffer {
        MemoryBuffer::profile(scans, vec![MemoryChannel::new("Hi3D 1", vec![subchannel])])
    }

    #[test]
    fn reads_requested_row_range() {
        let data: Vec<u8> = [1u16, 2, 3, 4, 5, 6]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let buffer = buffer_with(MemorySubChannel::measurement("Range", "WORD", 2, data), 3);
        let sub = &buffer.channels()[0].subchannels()[0];

        let matrix = sub.sample_matrix::<u16>(1..3).unwrap();
        assert_eq!(matrix.samples(), &[3, 4, 5, 6]);
    }

    #[test]
    fn rejects_rows_past_scan_count() {
        let buffer = buffer_with(MemorySubChannel::measurement("Range", "BYTE", 1, vec![1]), 1);
        let sub = &buffer.channels()[0].subchannels()[0];

        let err = sub.sample_matrix::<u8>(0..2).unwrap_err();
        assert_eq!(
            err,
            DecodeError::RowsOutOfRange {
                start: 0,
                end: 2,
                scan_count: 1
            }
        );
    }

    #[test]
    fn short_data_reports_absolute_length() {
        let buffer = buffer_with(
            MemorySubChannel::measurement("Range", "DWORD", 1, vec![0; 6]),
            2,
        );
        let sub = &buffer.channels()[0].subchannels()[0];

        let err = sub.sample_matrix::<u32>(1..2).unwrap_err();
        assert_eq!(err, DecodeError::TooShort { needed: 8, actual: 6 });
    }

    #[test]
    fn faulty_subchannel_returns_its_fault() {
        let fault = DecodeError::InvalidSampleData {
            message: "odd number of hex digits".to_string(),
        };
        let buffer = buffer_with(
            MemorySubChannel::measurement("Range", "BYTE", 1, Vec::new())
                .with_fault(fault.clone()),
            1,
        );
        let sub = &buffer.channels()[0].subchannels()[0];

        assert_eq!(sub.fault(), Some(&fault));
        assert_eq!(sub.sample_matrix::<u8>(0..1).unwrap_err(), fault);
        assert_eq!(sub.value_type(), Ok(ValueType::Byte8));
    }

    #[test]
    fn classifies_declared_type_once() {
        let known = MemorySubChannel::measurement("Range", "FLOAT", 1, Vec::new());
        assert_eq!(known.value_type(), Ok(ValueType::Float32));

        let unknown = MemorySubChannel::measurement("Range", "SHORT", 1, Vec::new());
        assert_eq!(unknown.format_name(), "SHORT");
        assert!(matches!(
            unknown.value_type(),
            Err(DecodeError::UnsupportedValueType { .. })
        ));
    }
}
