use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::buffer::{BufferSubChannel, SubChannelRole, ValueType};
use crate::source::memory::{MemoryBuffer, MemoryChannel, MemorySubChannel};
use crate::source::{BufferEvent, BufferSource, SourceError};

use super::IngestOptions;
use super::layout::{CaptureBuffer, CaptureChannel, CaptureSubChannel};
use super::reader::{decode_hex, excess_data, read_capture};

/// `BufferSource` backed by a JSON capture file.
///
/// The file is parsed up front; each buffer is ingested into the in-memory
/// model only when it is requested.
pub struct CaptureFileSource {
    device: String,
    options: IngestOptions,
    buffers: std::vec::IntoIter<CaptureBuffer>,
    index: u64,
}

impl CaptureFileSource {
    pub fn open(path: &Path, options: &IngestOptions) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), options)
    }

    pub fn from_reader<R: std::io::Read>(
        reader: R,
        options: &IngestOptions,
    ) -> Result<Self, SourceError> {
        let capture = read_capture(reader)?;
        Ok(Self {
            device: capture.device,
            options: options.clone(),
            buffers: capture.buffers.into_iter(),
            index: 0,
        })
    }
}

impl BufferSource for CaptureFileSource {
    fn device(&self) -> &str {
        &self.device
    }

    fn next_buffer(&mut self) -> Result<Option<BufferEvent>, SourceError> {
        let Some(raw) = self.buffers.next() else {
            return Ok(None);
        };
        self.index += 1;
        Ok(Some(ingest_buffer(raw, self.index, &self.options)))
    }
}

fn ingest_buffer(raw: CaptureBuffer, index: u64, options: &IngestOptions) -> BufferEvent {
    let scan_count = raw.scan_count;
    let channels = raw
        .channels
        .into_iter()
        .map(|channel| ingest_channel(channel, index, scan_count, options))
        .collect();
    BufferEvent {
        ts: raw.timestamp,
        status: raw.status,
        buffer: MemoryBuffer::new(raw.kind, scan_count, channels),
    }
}

fn ingest_channel(
    raw: CaptureChannel,
    index: u64,
    scan_count: usize,
    options: &IngestOptions,
) -> MemoryChannel {
    let subchannels = raw
        .subchannels
        .into_iter()
        .map(|sub| ingest_subchannel(&raw.name, sub, index, scan_count, options))
        .collect();
    MemoryChannel::new(raw.name, subchannels)
}

/// Build one sub-channel. Unusable sample data stays attached to the
/// sub-channel as a fault so its siblings still decode.
fn ingest_subchannel(
    channel: &str,
    raw: CaptureSubChannel,
    index: u64,
    scan_count: usize,
    options: &IngestOptions,
) -> MemorySubChannel {
    let (data, fault) = match decode_hex(&raw.data) {
        Ok(data) => {
            let fault = match raw.value_type.parse::<ValueType>() {
                Ok(value_type) => excess_data(value_type, scan_count, raw.width, data.len()),
                Err(_) => None,
            };
            (data, fault)
        }
        Err(err) => (Vec::new(), Some(err)),
    };

    let role = options.role_for(&raw.name);
    if role == SubChannelRole::Control {
        log::debug!("buffer {index}: {channel}/{} is the control sub-channel", raw.name);
    }
    let subchannel = MemorySubChannel::new(raw.name, role, raw.value_type, raw.width, data);
    match fault {
        Some(fault) => {
            log::warn!("buffer {index}: {channel}/{}: {fault}", subchannel.name());
            subchannel.with_fault(fault)
        }
        None => subchannel,
    }
}

#[cfg(test)]
mod tests {
    use super::CaptureFileSource;
    use crate::buffer::{
        BufferChannel, BufferKind, BufferSubChannel, ScanBuffer, SubChannelRole, ValueType,
    };
    use crate::decoder::decode_buffer;
    use crate::source::{BufferSource, IngestOptions};
    use crate::{MeanOutcome, MeasurementEntry, ReportEntry};

    const CAPTURE: &str = r#"{
        "version": 1,
        "device": "Camera 1",
        "buffers": [
            {
                "timestamp": 12.5,
                "kind": "profile",
                "scan_count": 1,
                "status": { "overflow": true, "overtrigs": 0, "scans_lost": 3 },
                "channels": [
                    { "name": "Hi3D 1", "subchannels": [
                        { "name": "Mark", "value_type": "INT", "width": 2, "data": "2a00000000000140" },
                        { "name": "Range", "value_type": "WORD", "width": 2, "data": "00000a00" }
                    ] }
                ]
            },
            { "kind": "image", "scan_count": 0 }
        ]
    }"#;

    #[test]
    fn ingests_buffers_in_order() {
        let mut source =
            CaptureFileSource::from_reader(CAPTURE.as_bytes(), &IngestOptions::default()).unwrap();
        assert_eq!(source.device(), "Camera 1");

        let first = source.next_buffer().unwrap().expect("first buffer");
        assert_eq!(first.ts, Some(12.5));
        assert!(first.status.overflow);
        assert_eq!(first.status.scans_lost, 3);
        let channel = &first.buffer.channels()[0];
        assert_eq!(channel.name(), "Hi3D 1");
        assert_eq!(channel.subchannels()[0].role(), SubChannelRole::Control);
        assert_eq!(channel.subchannels()[1].role(), SubChannelRole::Measurement);

        let second = source.next_buffer().unwrap().expect("second buffer");
        assert_eq!(second.buffer.kind(), BufferKind::Image);
        assert!(second.status.all_ok());
        assert!(second.ts.is_none());

        assert!(source.next_buffer().unwrap().is_none());
    }

    #[test]
    fn control_name_is_configurable() {
        let options = IngestOptions {
            control_name: "Range".to_string(),
        };
        let mut source = CaptureFileSource::from_reader(CAPTURE.as_bytes(), &options).unwrap();
        let first = source.next_buffer().unwrap().unwrap();
        let subs = first.buffer.channels()[0].subchannels();
        assert_eq!(subs[0].role(), SubChannelRole::Measurement);
        assert_eq!(subs[1].role(), SubChannelRole::Control);
    }

    #[test]
    fn short_data_is_kept_for_the_decoder() {
        let json = r#"{"version": 1, "device": "Camera 0", "buffers": [
            { "kind": "profile", "scan_count": 2, "channels": [
                { "name": "Hi3D 1", "subchannels": [
                    { "name": "Range", "value_type": "WORD", "width": 1, "data": "0100" }
                ] }
            ] }
        ]}"#;
        let mut source =
            CaptureFileSource::from_reader(json.as_bytes(), &IngestOptions::default()).unwrap();
        let event = source.next_buffer().unwrap().expect("buffer");
        let sub = &event.buffer.channels()[0].subchannels()[0];
        assert_eq!(sub.data(), &[1, 0]);
        assert!(sub.fault().is_none());

        let report = decode_buffer(&event.buffer);
        let failure = report.failures().next().expect("failure");
        assert_eq!(failure.code, "too_short");
        assert_eq!(failure.message, "sample data too short: need 4 bytes, got 2");
    }

    #[test]
    fn excess_data_faults_only_its_subchannel() {
        let json = r#"{"version": 1, "device": "Camera 0", "buffers": [
            { "kind": "profile", "scan_count": 1, "channels": [
                { "name": "Hi3D 1", "subchannels": [
                    { "name": "Range", "value_type": "WORD", "width": 1, "data": "010002" },
                    { "name": "Intensity", "value_type": "BYTE", "width": 1, "data": "07" }
                ] }
            ] },
            { "kind": "profile", "scan_count": 1, "channels": [
                { "name": "Hi3D 1", "subchannels": [
                    { "name": "Range", "value_type": "WORD", "width": 1, "data": "0300" }
                ] }
            ] }
        ]}"#;
        let mut source =
            CaptureFileSource::from_reader(json.as_bytes(), &IngestOptions::default()).unwrap();

        let first = source.next_buffer().unwrap().expect("first buffer");
        let report = decode_buffer(&first.buffer);
        let codes: Vec<_> = report.failures().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["invalid_sample_data"]);
        assert_eq!(
            report.entries[1],
            ReportEntry::Measurement(MeasurementEntry {
                channel: "Hi3D 1".to_string(),
                subchannel: "Intensity".to_string(),
                value_type: Some(ValueType::Byte8),
                outcome: MeanOutcome::Mean {
                    value: 7.0,
                    samples: 1
                },
            })
        );

        let second = source.next_buffer().unwrap().expect("second buffer");
        assert!(decode_buffer(&second.buffer).failures().next().is_none());
    }

    #[test]
    fn unknown_type_keeps_raw_bytes() {
        let json = r#"{"version": 1, "device": "Camera 0", "buffers": [
            { "kind": "profile", "scan_count": 1, "channels": [
                { "name": "Hi3D 1", "subchannels": [
                    { "name": "Odd", "value_type": "SHORT", "width": 1, "data": "010203" }
                ] }
            ] }
        ]}"#;
        let mut source =
            CaptureFileSource::from_reader(json.as_bytes(), &IngestOptions::default()).unwrap();
        let event = source.next_buffer().unwrap().unwrap();
        let sub = &event.buffer.channels()[0].subchannels()[0];
        assert_eq!(sub.data(), &[1, 2, 3]);
        assert!(sub.value_type().is_err());
    }

    #[test]
    fn invalid_hex_faults_only_its_subchannel() {
        let json = r#"{"version": 1, "device": "Camera 0", "buffers": [
            { "kind": "profile", "scan_count": 1, "channels": [
                { "name": "Hi3D 1", "subchannels": [
                    { "name": "Range", "value_type": "BYTE", "width": 1, "data": "zz" },
                    { "name": "Intensity", "value_type": "BYTE", "width": 1, "data": "09" }
                ] }
            ] }
        ]}"#;
        let mut source =
            CaptureFileSource::from_reader(json.as_bytes(), &IngestOptions::default()).unwrap();
        let event = source.next_buffer().unwrap().expect("buffer");
        let subs = event.buffer.channels()[0].subchannels();
        assert!(subs[0].data().is_empty());
        assert_eq!(
            subs[0].fault().map(|fault| fault.to_string()).as_deref(),
            Some("invalid sample data: invalid hex character 'z' at position 0")
        );
        assert!(subs[1].fault().is_none());

        let report = decode_buffer(&event.buffer);
        assert_eq!(report.failures().count(), 1);
    }
}
