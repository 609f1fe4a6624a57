//! Time representation using nanoseconds.
//! Seek times arrive as seconds (f64) and are converted once at the request boundary.

/// Time in nanoseconds since the start of the video
pub type Time = i64;

/// Time constants for conversions
pub mod constants {
    use super::Time;

    pub const NANOS_PER_SECOND: Time = 1_000_000_000;
    pub const NANOS_PER_MILLI: Time = 1_000_000;
    pub const NANOS_PER_MICRO: Time = 1_000;
}

/// Time zero constant
pub const ZERO: Time = 0;

/// Convert seconds (f64) to nanoseconds (i64)
#[inline]
pub fn from_seconds(seconds: f64) -> Time {
    (seconds * constants::NANOS_PER_SECOND as f64).round() as Time
}

/// Convert nanoseconds (i64) to seconds (f64)
#[inline]
pub fn to_seconds(nanos: Time) -> f64 {
    nanos as f64 / constants::NANOS_PER_SECOND as f64
}

/// Convert nanoseconds to milliseconds
#[inline]
pub fn to_millis(nanos: Time) -> i64 {
    nanos / constants::NANOS_PER_MILLI
}

/// Convert nanoseconds to microseconds (FFmpeg's AV_TIME_BASE unit)
#[inline]
pub fn to_micros(nanos: Time) -> i64 {
    nanos / constants::NANOS_PER_MICRO
}

/// Format time as HH:MM:SS.mmm, used in log output
pub fn format_time(nanos: Time) -> String {
    let total_millis = to_millis(nanos.max(0));
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let seconds = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Format time as a player clock label: `m:ss`, or `h:mm:ss` past the hour.
/// Fractions are truncated and negative times render as `0:00`.
pub fn format_clock(nanos: Time) -> String {
    let total = (nanos.max(0) / constants::NANOS_PER_SECOND) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_conversion() {
        let time = from_seconds(2.5);
        assert_eq!(time, 2_500_000_000);
        assert!((to_seconds(time) - 2.5).abs() < 0.000001);
    }

    #[test]
    fn test_micros_conversion() {
        assert_eq!(to_micros(from_seconds(1.5)), 1_500_000);
        assert_eq!(to_millis(from_seconds(1.5)), 1500);
    }

    #[test]
    fn test_format_time() {
        let time = from_seconds(3661.5); // 1 hour, 1 minute, 1.5 seconds
        assert_eq!(format_time(time), "01:01:01.500");
        assert_eq!(format_time(ZERO), "00:00:00.000");
    }

    #[test]
    fn test_format_clock_minutes() {
        assert_eq!(format_clock(ZERO), "0:00");
        assert_eq!(format_clock(from_seconds(2.5)), "0:02");
        assert_eq!(format_clock(from_seconds(65.0)), "1:05");
        assert_eq!(format_clock(from_seconds(599.9)), "9:59");
    }

    #[test]
    fn test_format_clock_hours() {
        assert_eq!(format_clock(from_seconds(3600.0)), "1:00:00");
        assert_eq!(format_clock(from_seconds(3661.0)), "1:01:01");
        assert_eq!(format_clock(from_seconds(36_000.0 + 59.0)), "10:00:59");
    }

    #[test]
    fn test_format_clock_negative() {
        assert_eq!(format_clock(-from_seconds(5.0)), "0:00");
    }

    #[test]
    fn test_time_conversion_roundtrip() {
        let original_seconds = 123.456789;
        let converted_back = to_seconds(from_seconds(original_seconds));
        assert!((original_seconds - converted_back).abs() < 0.000001);
    }
}
