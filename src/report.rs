//! Turns a frame delay into the sentence the command line prints.

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

/// Delay in seconds, rounded to 4 decimal places.
pub fn delay_seconds(delay_frames: i64, step_size: usize, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    let seconds = delay_frames as f64 * step_size as f64 / sample_rate as f64;
    (seconds * 10_000.0).round() / 10_000.0
}

/// Renders a non-negative duration as `[D day(s), ]H:MM:SS[.ffffff]`.
pub fn format_duration(seconds: f64) -> String {
    let micros = (seconds.abs() * MICROS_PER_SECOND as f64).round() as i64;
    let days = micros / MICROS_PER_DAY;
    let rest = micros % MICROS_PER_DAY;

    let total_secs = rest / MICROS_PER_SECOND;
    let fraction = rest % MICROS_PER_SECOND;
    let (hours, minutes, secs) = (total_secs / 3600, total_secs / 60 % 60, total_secs % 60);

    let mut out = String::new();
    if days > 0 {
        let plural = if days == 1 { "" } else { "s" };
        out.push_str(&format!("{days} day{plural}, "));
    }
    out.push_str(&format!("{hours}:{minutes:02}:{secs:02}"));
    if fraction > 0 {
        out.push_str(&format!(".{fraction:06}"));
    }
    out
}

pub fn describe_offset(delay_frames: i64, step_size: usize, sample_rate: u32) -> String {
    let seconds = delay_seconds(delay_frames, step_size, sample_rate);
    let term = if seconds > 0.0 { "ahead" } else { "behind" };
    format!(
        "\"self\" is {} {} of \"other\".",
        format_duration(seconds),
        term
    )
}
