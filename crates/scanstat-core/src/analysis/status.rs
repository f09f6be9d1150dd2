use crate::GrabStatus;

/// Warnings for a buffer whose grab status is not all OK.
pub(crate) fn status_warnings(status: &GrabStatus) -> Vec<String> {
    let mut warnings = Vec::new();
    if status.all_ok() {
        return warnings;
    }
    if status.overflow {
        warnings.push("Buffer overflow occurred.".to_string());
    }
    if status.overtrigs != 0 {
        warnings.push(format!(
            "Camera reported {} overtrigs in the buffer.",
            status.overtrigs
        ));
    }
    if status.scans_lost != 0 {
        warnings.push(format!("Lost {} scans in the buffer.", status.scans_lost));
    }
    warnings
}
