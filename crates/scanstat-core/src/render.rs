//! Fixed-column text rendering of reports.

use std::fmt::Write;

use crate::{BufferReport, MarkOutcome, MeanOutcome, ReportEntry, SessionReport};

/// Render one decoded buffer, one line per entry.
///
/// # Examples
/// ```
/// use scanstat_core::{MemoryBuffer, MemoryChannel, MemorySubChannel};
/// use scanstat_core::{decode_buffer, render_buffer_text};
///
/// let buffer = MemoryBuffer::profile(
///     1,
///     vec![MemoryChannel::new(
///         "Hi3D 1",
///         vec![MemorySubChannel::measurement("Intensity", "BYTE", 4, vec![0, 10, 0, 20])],
///     )],
/// );
/// let text = render_buffer_text(&decode_buffer(&buffer));
/// assert!(text.starts_with("Hi3D 1"));
/// assert!(text.contains("Mean value:    15.00"));
/// ```
pub fn render_buffer_text(report: &BufferReport) -> String {
    let mut out = String::new();
    for entry in &report.entries {
        match entry {
            ReportEntry::Unsupported(_) => out.push_str("This is an image buffer.\n"),
            ReportEntry::Mark(mark) => match &mark.outcome {
                MarkOutcome::Decoded {
                    counter,
                    overtrig,
                    enable,
                } => {
                    let _ = writeln!(
                        out,
                        "{:<15}{:<15}{:<12}{:>8}{:>18}{:<8}{:>12}{:<4}",
                        mark.channel,
                        mark.subchannel,
                        "Counter: ",
                        counter,
                        "Overtrig: ",
                        overtrig,
                        "Enable: ",
                        u8::from(*enable)
                    );
                }
                MarkOutcome::Failed { error } => {
                    let _ = writeln!(
                        out,
                        "{:<15}{:<15}error: {}",
                        mark.channel, mark.subchannel, error.message
                    );
                }
            },
            ReportEntry::Measurement(m) => match &m.outcome {
                MeanOutcome::Mean { value, .. } => {
                    let _ = writeln!(
                        out,
                        "{:<15}{:<15}{:<12}{:>8}",
                        m.channel,
                        m.subchannel,
                        "Mean value: ",
                        format_grouped(*value)
                    );
                }
                MeanOutcome::NoSampleData => {
                    let _ = writeln!(
                        out,
                        "{:<15}{:<15}{:<12}{:>8}",
                        m.channel, m.subchannel, "Mean value: ", "no data"
                    );
                }
                MeanOutcome::Failed { error } => {
                    let _ = writeln!(
                        out,
                        "{:<15}{:<15}error: {}",
                        m.channel, m.subchannel, error.message
                    );
                }
            },
        }
    }
    out
}

/// Two decimals with `,` between groups of three integer digits.
fn format_grouped(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped.push('.');
    grouped.push_str(frac_part);
    grouped
}

/// Render every device buffer with its delivery header and warnings.
pub fn render_session_text(session: &SessionReport) -> String {
    let mut out = String::new();
    for device in &session.devices {
        for buffer in &device.buffers {
            let _ = write!(
                out,
                "\n{} received buffer {}.\n",
                device.device, buffer.sequence
            );
            for warning in &buffer.warnings {
                out.push_str(warning);
                out.push('\n');
            }
            out.push_str(&render_buffer_text(&buffer.report));
        }
    }
    out
}
