use crate::buffer::{
    BufferChannel, BufferKind, BufferSubChannel, Sample, ScanBuffer, SubChannelRole, ValueType,
};
use crate::{
    BufferReport, EntryError, MarkEntry, MarkOutcome, MeanOutcome, MeasurementEntry, ReportEntry,
    UnsupportedEntry,
};

use super::error::DecodeError;
use super::layout;
use super::reader::{MarkReader, MeanAccumulator};

/// Decode every sub-channel of `buffer` into a report.
///
/// Image buffers yield a single informational entry and are not traversed.
/// Per-sub-channel failures are attached to their own entry; the report is
/// always complete.
pub fn decode_buffer<B: ScanBuffer>(buffer: &B) -> BufferReport {
    let kind = buffer.kind();
    let scan_count = buffer.scan_count();
    let mut report = BufferReport {
        kind,
        scan_count: scan_count as u64,
        entries: Vec::new(),
    };

    if kind == BufferKind::Image {
        let reason = DecodeError::UnsupportedBufferKind { kind };
        log::debug!("skipping buffer: {reason}");
        report.entries.push(ReportEntry::Unsupported(UnsupportedEntry {
            kind,
            message: reason.to_string(),
        }));
        return report;
    }

    for channel in buffer.channels() {
        for subchannel in channel.subchannels() {
            let entry = match subchannel.role() {
                SubChannelRole::Control => {
                    ReportEntry::Mark(decode_mark_entry(channel, subchannel))
                }
                SubChannelRole::Measurement => {
                    let entry = decode_measurement_entry(channel, subchannel, scan_count);
                    ReportEntry::Measurement(entry)
                }
            };
            if let Some(error) = entry.failure() {
                log::warn!("{}/{}: {}", channel.name(), subchannel.name(), error.message);
            }
            report.entries.push(entry);
        }
    }

    report
}

fn decode_mark_entry<C: BufferChannel>(channel: &C, subchannel: &C::SubChannel) -> MarkEntry {
    let outcome = match decode_mark(subchannel) {
        Ok((counter, overtrig, enable)) => MarkOutcome::Decoded {
            counter,
            overtrig,
            enable,
        },
        Err(err) => MarkOutcome::Failed {
            error: EntryError::from(&err),
        },
    };
    MarkEntry {
        channel: channel.name().to_string(),
        subchannel: subchannel.name().to_string(),
        outcome,
    }
}

fn decode_mark<S: BufferSubChannel>(subchannel: &S) -> Result<(i32, u8, bool), DecodeError> {
    let matrix = subchannel.sample_matrix::<u32>(layout::MARK_ROWS)?;
    let row = matrix.row(0).unwrap_or(&[]);
    let reader = MarkReader::new(row)?;
    Ok((reader.read_counter(), reader.read_overtrig(), reader.read_enable()))
}

fn decode_measurement_entry<C: BufferChannel>(
    channel: &C,
    subchannel: &C::SubChannel,
    scan_count: usize,
) -> MeasurementEntry {
    let value_type = subchannel.value_type();
    let outcome = match value_type
        .clone()
        .and_then(|value_type| decode_mean(subchannel, value_type, scan_count))
    {
        Ok((value, samples)) => MeanOutcome::Mean { value, samples },
        Err(DecodeError::NoSampleData) => MeanOutcome::NoSampleData,
        Err(err) => MeanOutcome::Failed {
            error: EntryError::from(&err),
        },
    };
    log::debug!("{}/{}: {:?}", channel.name(), subchannel.name(), outcome);
    MeasurementEntry {
        channel: channel.name().to_string(),
        subchannel: subchannel.name().to_string(),
        value_type: value_type.ok(),
        outcome,
    }
}

fn decode_mean<S: BufferSubChannel>(
    subchannel: &S,
    value_type: ValueType,
    scan_count: usize,
) -> Result<(f64, u64), DecodeError> {
    let rows = 0..scan_count;
    let mut acc = MeanAccumulator::new();
    match value_type {
        ValueType::Byte8 => accumulate::<u8, _>(&mut acc, subchannel, rows)?,
        ValueType::Word16 => accumulate::<u16, _>(&mut acc, subchannel, rows)?,
        ValueType::DWord32 => accumulate::<u32, _>(&mut acc, subchannel, rows)?,
        ValueType::Int32 => accumulate::<i32, _>(&mut acc, subchannel, rows)?,
        ValueType::Float32 => accumulate::<f32, _>(&mut acc, subchannel, rows)?,
        ValueType::PackedRgb32 => {
            let matrix = subchannel.sample_matrix::<u32>(rows)?;
            acc.extend_rgb(matrix.samples());
        }
    }
    let mean = acc.finish()?;
    Ok((mean, acc.count()))
}

fn accumulate<T: Sample, S: BufferSubChannel>(
    acc: &mut MeanAccumulator,
    subchannel: &S,
    rows: std::ops::Range<usize>,
) -> Result<(), DecodeError> {
    let matrix = subchannel.sample_matrix::<T>(rows)?;
    acc.extend(matrix.samples());
    Ok(())
}
