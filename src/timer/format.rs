/// Format milliseconds as "HH:MM:SS.CC".
///
/// Truncates to centiseconds so the clock never shows more time than has
/// actually elapsed. Hours are not wrapped and grow past two digits.
pub fn format_elapsed(ms: f64) -> String {
    let total_cs = if ms.is_finite() && ms > 0.0 {
        (ms / 10.0).floor() as u64
    } else {
        0
    };

    let cs = total_cs % 100;
    let total_secs = total_cs / 100;
    let s = total_secs % 60;
    let m = (total_secs / 60) % 60;
    let h = total_secs / 3600;
    format!("{:02}:{:02}:{:02}.{:02}", h, m, s, cs)
}
