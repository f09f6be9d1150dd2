//! scanstat core library for typed line-scan buffer decoding.
//!
//! This crate implements the offline pipeline used by the CLI: buffer sources
//! feed the analysis layer, which drives the typed buffer decoder
//! (layout/reader/parser) and aggregates results into a deterministic report.
//! Decoding is side-effect free and sees buffers only through the capability
//! traits in `buffer`; all I/O is isolated in `source` modules.
//!
//! Invariants:
//! - Report outputs are deterministic and stable across runs.
//! - The mark sub-channel is read for row 0 only.
//! - A zero sample is missing data and never enters a mean.
//! - A failing sub-channel never aborts its siblings.
//!
//! Version française (résumé):
//! Cette crate décode des buffers de capteurs à balayage linéaire : sources ->
//! analyse -> décodeur typé (layout/reader/parser) -> rapport déterministe.
//! Le zéro signifie « donnée absente » ; les erreurs restent locales à leur
//! sous-canal.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use scanstat_core::{IngestOptions, analyze_capture_file};
//!
//! let report = analyze_capture_file(Path::new("camera0.json"), &IngestOptions::default())?;
//! println!("device: {} ({} buffers)", report.device, report.buffers.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod buffer;
mod decoder;
mod render;
mod source;

pub use analysis::{AnalysisError, analyze_capture_file, analyze_capture_files, analyze_source};
pub use buffer::{
    BufferChannel, BufferKind, BufferSubChannel, Sample, SampleMatrix, ScanBuffer,
    SubChannelRole, UnknownValueType, ValueType,
};
pub use decoder::decode_buffer;
pub use decoder::error::DecodeError;
pub use render::{render_buffer_text, render_session_text};
pub use source::memory::{MemoryBuffer, MemoryChannel, MemorySubChannel};
pub use source::{BufferEvent, BufferSource, CaptureFileSource, IngestOptions, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Reports for every decoded device, in input order.
///
/// # Examples
/// ```
/// use scanstat_core::make_stub_session;
///
/// let session = make_stub_session();
/// assert_eq!(session.report_version, scanstat_core::REPORT_VERSION);
/// assert!(session.devices.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp of the latest capture in the session.
    pub generated_at: String,
    pub devices: Vec<DeviceReport>,
}

impl SessionReport {
    /// Every failed entry across devices and buffers, in report order.
    pub fn failures(&self) -> Vec<Failure> {
        let mut failures = Vec::new();
        for device in &self.devices {
            for buffer in &device.buffers {
                for entry in &buffer.report.entries {
                    let (channel, subchannel) = match entry {
                        ReportEntry::Mark(mark) => (&mark.channel, &mark.subchannel),
                        ReportEntry::Measurement(m) => (&m.channel, &m.subchannel),
                        ReportEntry::Unsupported(_) => continue,
                    };
                    if let Some(error) = entry.failure() {
                        failures.push(Failure {
                            device: device.device.clone(),
                            sequence: buffer.sequence,
                            channel: channel.clone(),
                            subchannel: subchannel.clone(),
                            code: error.code.clone(),
                            message: error.message.clone(),
                        });
                    }
                }
            }
        }
        failures
    }
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "scanstat").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input capture metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Basic capture summary (timestamps may be absent).
///
/// # Examples
/// ```
/// use scanstat_core::CaptureSummary;
///
/// let summary = CaptureSummary {
///     buffers_total: 3,
///     time_start: None,
///     time_end: None,
/// };
/// assert_eq!(summary.buffers_total, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Total buffers delivered by the device.
    pub buffers_total: u64,
    /// RFC3339 timestamp of the first buffer (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 timestamp of the last buffer (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Decoded buffers of one device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceReport {
    /// Device name as recorded in the capture.
    pub device: String,
    pub input: InputInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Buffers in delivery order.
    pub buffers: Vec<BufferSummary>,
}

/// One delivered buffer: numbering, grab status and decode result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferSummary {
    /// 1-based delivery number within the device.
    pub sequence: u64,
    /// RFC3339 capture time, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>,
    pub status: GrabStatus,
    /// Human-readable grab status warnings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub report: BufferReport,
}

/// Acquisition status the device attached to a buffer.
///
/// # Examples
/// ```
/// use scanstat_core::GrabStatus;
///
/// let status = GrabStatus {
///     overflow: false,
///     overtrigs: 2,
///     scans_lost: 0,
/// };
/// assert!(!status.all_ok());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrabStatus {
    #[serde(default)]
    pub overflow: bool,
    #[serde(default)]
    pub overtrigs: u32,
    #[serde(default)]
    pub scans_lost: u32,
}

impl GrabStatus {
    pub fn all_ok(&self) -> bool {
        !self.overflow && self.overtrigs == 0 && self.scans_lost == 0
    }
}

/// Decode result for a single buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferReport {
    pub kind: BufferKind,
    /// Rows in the buffer.
    pub scan_count: u64,
    /// One entry per sub-channel in encounter order (or one informational
    /// entry for unsupported buffers).
    pub entries: Vec<ReportEntry>,
}

impl BufferReport {
    /// Errors attached to entries, in order.
    pub fn failures(&self) -> impl Iterator<Item = &EntryError> {
        self.entries.iter().filter_map(ReportEntry::failure)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum ReportEntry {
    Unsupported(UnsupportedEntry),
    Mark(MarkEntry),
    Measurement(MeasurementEntry),
}

impl ReportEntry {
    pub fn failure(&self) -> Option<&EntryError> {
        match self {
            ReportEntry::Mark(MarkEntry {
                outcome: MarkOutcome::Failed { error },
                ..
            }) => Some(error),
            ReportEntry::Measurement(MeasurementEntry {
                outcome: MeanOutcome::Failed { error },
                ..
            }) => Some(error),
            _ => None,
        }
    }
}

/// Informational entry for a buffer that is not decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsupportedEntry {
    pub kind: BufferKind,
    pub message: String,
}

/// Mark (control) sub-channel summary from row 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkEntry {
    pub channel: String,
    pub subchannel: String,
    pub outcome: MarkOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MarkOutcome {
    Decoded {
        /// First word, read as a signed integer.
        counter: i32,
        /// Bits 16..24 of the second word.
        overtrig: u8,
        /// Bit 30 of the second word.
        enable: bool,
    },
    Failed {
        error: EntryError,
    },
}

/// Measurement sub-channel mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementEntry {
    pub channel: String,
    pub subchannel: String,
    /// Declared value type, when recognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    pub outcome: MeanOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MeanOutcome {
    /// Mean of `samples` non-sentinel samples (three per RGB pixel).
    Mean { value: f64, samples: u64 },
    /// Every sample was the missing-data sentinel.
    NoSampleData,
    Failed { error: EntryError },
}

/// Error attached to a report entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryError {
    /// Stable identifier (see `DecodeError::code`).
    pub code: String,
    pub message: String,
}

impl From<&DecodeError> for EntryError {
    fn from(err: &DecodeError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Flattened failed entry, for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub device: String,
    pub sequence: u64,
    pub channel: String,
    pub subchannel: String,
    pub code: String,
    pub message: String,
}

/// Build a stub session with base fields filled and no devices.
pub fn make_stub_session() -> SessionReport {
    SessionReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "scanstat".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        devices: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_device() -> DeviceReport {
        DeviceReport {
            device: "Camera 0".to_string(),
            input: InputInfo {
                path: "camera0.json".to_string(),
                bytes: 1,
            },
            capture_summary: Some(CaptureSummary {
                buffers_total: 1,
                time_start: None,
                time_end: None,
            }),
            buffers: vec![BufferSummary {
                sequence: 1,
                captured_at: None,
                status: GrabStatus::default(),
                warnings: Vec::new(),
                report: BufferReport {
                    kind: BufferKind::Profile,
                    scan_count: 4,
                    entries: vec![
                        ReportEntry::Measurement(MeasurementEntry {
                            channel: "Hi3D 1".to_string(),
                            subchannel: "Range".to_string(),
                            value_type: None,
                            outcome: MeanOutcome::Failed {
                                error: EntryError::from(&DecodeError::UnsupportedValueType {
                                    name: "SHORT".to_string(),
                                }),
                            },
                        }),
                        ReportEntry::Measurement(MeasurementEntry {
                            channel: "Hi3D 1".to_string(),
                            subchannel: "Intensity".to_string(),
                            value_type: Some(ValueType::Byte8),
                            outcome: MeanOutcome::NoSampleData,
                        }),
                    ],
                },
            }],
        }
    }

    #[test]
    fn report_omits_optional_fields_when_none() {
        let device = sample_device();
        let value = serde_json::to_value(&device).expect("device json");

        let capture = value.get("capture_summary").expect("capture_summary");
        assert!(capture.get("time_start").is_none());
        assert!(capture.get("time_end").is_none());

        let buffer = &value["buffers"][0];
        assert!(buffer.get("captured_at").is_none());
        assert!(buffer.get("warnings").is_none());
        assert!(buffer["report"]["entries"][0].get("value_type").is_none());
    }

    #[test]
    fn entries_are_tagged() {
        let value = serde_json::to_value(sample_device()).expect("device json");
        let entries = &value["buffers"][0]["report"]["entries"];
        assert_eq!(entries[0]["entry"], "measurement");
        assert_eq!(entries[0]["outcome"]["status"], "failed");
        assert_eq!(
            entries[0]["outcome"]["error"]["code"],
            "unsupported_value_type"
        );
        assert_eq!(entries[1]["outcome"]["status"], "no_sample_data");
        assert_eq!(entries[1]["value_type"], "BYTE");
    }

    #[test]
    fn report_round_trips_through_json() {
        let device = sample_device();
        let json = serde_json::to_string(&device).expect("serialize");
        let parsed: DeviceReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.buffers[0].report, device.buffers[0].report);
    }

    #[test]
    fn session_lists_failures() {
        let mut session = make_stub_session();
        session.devices.push(sample_device());
        let failures = session.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].device, "Camera 0");
        assert_eq!(failures[0].sequence, 1);
        assert_eq!(failures[0].subchannel, "Range");
        assert_eq!(failures[0].code, "unsupported_value_type");
    }
}
