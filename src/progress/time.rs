use std::time::Duration;

/// Formats a number of seconds as zero-padded `HH:MM:SS`
///
/// Hours are not wrapped at 24, so long runs keep counting up.
///
/// # Example
///
/// ```
/// use sumi_harvest::progress::format_time;
///
/// assert_eq!(format_time(3661), "01:01:01");
/// assert_eq!(format_time(59), "00:00:59");
/// ```
pub fn format_time(secs: u64) -> String {
    let (m, s) = (secs / 60, secs % 60);
    let (h, m) = (m / 60, m % 60);
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// Formats a duration as `HH:MM:SS`, dropping sub-second precision
pub fn format_duration(duration: Duration) -> String {
    format_time(duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_examples() {
        assert_eq!(format_time(3661), "01:01:01");
        assert_eq!(format_time(59), "00:00:59");
        assert_eq!(format_time(0), "00:00:00");
        assert_eq!(format_time(3600), "01:00:00");
    }

    #[test]
    fn test_format_time_past_a_day() {
        assert_eq!(format_time(100 * 3600 + 5), "100:00:05");
    }

    #[test]
    fn test_format_time_shape() {
        for secs in [1, 61, 599, 3599, 86_399, 359_999] {
            let text = format_time(secs);
            let parts: Vec<&str> = text.split(':').collect();
            assert_eq!(parts.len(), 3, "bad shape for {}: {}", secs, text);
            assert!(parts.iter().all(|p| p.len() == 2));

            let h: u64 = parts[0].parse().unwrap();
            let m: u64 = parts[1].parse().unwrap();
            let s: u64 = parts[2].parse().unwrap();
            assert!(m < 60 && s < 60);
            assert_eq!(h * 3600 + m * 60 + s, secs);
        }
    }

    #[test]
    fn test_format_duration_truncates() {
        assert_eq!(format_duration(Duration::from_millis(59_999)), "00:00:59");
    }
}
