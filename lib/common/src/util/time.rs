use std::{fmt::Write, time::Duration};

/// Pretty-print the elapsed time (used in progress bars)
pub fn elapsed_subsec(state: &indicatif::ProgressState, writer: &mut dyn Write) {
    let seconds = state.elapsed().as_secs();
    let sub_seconds = (state.elapsed().as_millis() % 1000) / 100;
    let _ = writer.write_str(&format!("{}.{}s", seconds, sub_seconds));
}

/// Pretty-print a duration with the largest unit that keeps it above one
/// (used in logs and reports)
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs_f64();

    if seconds >= 3_600.0 {
        format!("{:.3}h", seconds / 3_600.0)
    } else if seconds >= 60.0 {
        format!("{:.3}m", seconds / 60.0)
    } else if seconds >= 1.0 {
        format!("{:.3}s", seconds)
    } else if duration.as_millis() > 0 {
        format!("{:.3}ms", seconds * 1_000.0)
    } else {
        format!("{:.3}μs", seconds * 1_000_000.0)
    }
}
