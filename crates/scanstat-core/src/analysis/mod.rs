use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::decoder::decode_buffer;
use crate::source::{BufferEvent, BufferSource, CaptureFileSource, IngestOptions, SourceError};
use crate::{
    BufferSummary, CaptureSummary, DEFAULT_GENERATED_AT, DeviceReport, InputInfo, SessionReport,
    make_stub_session,
};

mod status;

use status::status_warnings;

/// Device report plus its latest capture timestamp.
type DeviceResult = Result<(DeviceReport, Option<f64>), AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("{path}: {source}")]
    Input {
        path: String,
        #[source]
        source: Box<AnalysisError>,
    },
    #[error("{path}: analysis worker panicked")]
    Worker { path: String },
}

pub fn analyze_capture_file(
    path: &Path,
    options: &IngestOptions,
) -> Result<DeviceReport, AnalysisError> {
    let source = CaptureFileSource::open(path, options)?;
    analyze_source(path, source)
}

pub fn analyze_source<S: BufferSource>(
    path: &Path,
    source: S,
) -> Result<DeviceReport, AnalysisError> {
    analyze_device(path, source).map(|(report, _)| report)
}

/// Decode several device captures into one session.
///
/// Files are decoded on scoped threads, at most `worker_limit()` at a time.
/// Devices keep the order of `paths`. The first failing input aborts the
/// session and is named in the error.
pub fn analyze_capture_files(
    paths: &[PathBuf],
    options: &IngestOptions,
) -> Result<SessionReport, AnalysisError> {
    let mut results: Vec<DeviceResult> = Vec::with_capacity(paths.len());
    for batch in paths.chunks(worker_limit()) {
        results.extend(analyze_batch(batch, options));
    }

    let mut session = make_stub_session();
    let mut latest_ts: Option<f64> = None;
    for (result, path) in results.into_iter().zip(paths) {
        let (device, last_ts) = result.map_err(|err| match err {
            AnalysisError::Worker { .. } => err,
            other => AnalysisError::Input {
                path: path.display().to_string(),
                source: Box::new(other),
            },
        })?;
        if let Some(ts) = last_ts {
            latest_ts = Some(latest_ts.map_or(ts, |current| current.max(ts)));
        }
        session.devices.push(device);
    }
    session.generated_at =
        ts_to_rfc3339(latest_ts).unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    Ok(session)
}

fn worker_limit() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

fn analyze_batch(
    paths: &[PathBuf],
    options: &IngestOptions,
) -> Vec<DeviceResult> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .map(|path| {
                scope.spawn(move || -> Result<_, AnalysisError> {
                    let source = CaptureFileSource::open(path, options)?;
                    analyze_device(path, source)
                })
            })
            .collect();
        handles
            .into_iter()
            .zip(paths)
            .map(|(handle, path)| {
                handle.join().unwrap_or_else(|_| {
                    Err(AnalysisError::Worker {
                        path: path.display().to_string(),
                    })
                })
            })
            .collect()
    })
}

fn analyze_device<S: BufferSource>(
    path: &Path,
    mut source: S,
) -> Result<(DeviceReport, Option<f64>), AnalysisError> {
    let mut buffers_total = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut buffers = Vec::new();

    while let Some(BufferEvent { ts, status, buffer }) = source.next_buffer()? {
        buffers_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);

        let warnings = status_warnings(&status);
        for warning in &warnings {
            log::warn!("{} buffer {}: {}", source.device(), buffers_total, warning);
        }
        let report = decode_buffer(&buffer);
        log::debug!(
            "{} buffer {}: {} entries",
            source.device(),
            buffers_total,
            report.entries.len()
        );

        buffers.push(BufferSummary {
            sequence: buffers_total,
            captured_at: ts_to_rfc3339(ts),
            status,
            warnings,
            report,
        });
    }

    let report = DeviceReport {
        device: source.device().to_string(),
        input: InputInfo {
            path: path.display().to_string(),
            bytes: path.metadata()?.len(),
        },
        capture_summary: Some(CaptureSummary {
            buffers_total,
            time_start: ts_to_rfc3339(first_ts),
            time_end: ts_to_rfc3339(last_ts),
        }),
        buffers,
    };
    Ok((report, last_ts))
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let ts = match ts {
        Some(ts) => ts,
        None => return,
    };
    match first {
        None => *first = Some(ts),
        Some(existing) => {
            if ts < *existing {
                *first = Some(ts);
            }
        }
    }
    match last {
        None => *last = Some(ts),
        Some(existing) => {
            if ts > *existing {
                *last = Some(ts);
            }
        }
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
