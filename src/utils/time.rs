//! Timecode parsing and formatting utilities
//!
//! Timecodes are fixed `HH:MM:SS` strings with whole-second precision. Parsing
//! comes in two flavours: a lenient one for live editing, where free-text
//! fields must never fail while the user is typing, and a strict validator
//! used when clips are submitted.

/// Converter between zero-based second offsets and `HH:MM:SS` timecodes
pub struct TimeCodec;

impl TimeCodec {
    /// Format whole seconds as `HH:MM:SS`
    ///
    /// Hours beyond 99 render with more digits; that range is not supported
    /// by the service but does not panic.
    pub fn to_timecode(seconds: u64) -> String {
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        let secs = seconds % 60;
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    }

    /// Format a fractional position, flooring to whole seconds
    pub fn from_seconds_f64(seconds: f64) -> String {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Self::to_timecode(0);
        }
        Self::to_timecode(seconds.floor() as u64)
    }

    /// Parse `H:MM:SS` / `HH:MM:SS`, falling back to 0 on any other shape
    pub fn parse_timecode(text: &str) -> u64 {
        Self::split_fields(text)
            .map(|(h, m, s)| h * 3600 + m * 60 + s)
            .unwrap_or(0)
    }

    /// Strict check used at submission time
    pub fn is_valid_timecode_format(text: &str) -> bool {
        matches!(Self::split_fields(text), Some((_, m, s)) if m < 60 && s < 60)
    }

    /// Duration between two timecodes as `HH:MM:SS`
    pub fn clip_duration(start: &str, end: &str) -> String {
        if !Self::is_valid_timecode_format(start) || !Self::is_valid_timecode_format(end) {
            return Self::to_timecode(0);
        }
        let start = Self::parse_timecode(start);
        let end = Self::parse_timecode(end);
        Self::to_timecode(end.saturating_sub(start))
    }

    /// Split `\d{1,2}:\d{2}:\d{2}` into its numeric fields
    fn split_fields(text: &str) -> Option<(u64, u64, u64)> {
        let parts: Vec<&str> = text.split(':').collect();
        if parts.len() != 3 {
            return None;
        }

        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !(1..=2).contains(&parts[0].len()) || parts[1].len() != 2 || parts[2].len() != 2 {
            return None;
        }
        if !parts.iter().all(|p| all_digits(p)) {
            return None;
        }

        let hours = parts[0].parse().ok()?;
        let minutes = parts[1].parse().ok()?;
        let seconds = parts[2].parse().ok()?;
        Some((hours, minutes, seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_timecode() {
        assert_eq!(TimeCodec::to_timecode(0), "00:00:00");
        assert_eq!(TimeCodec::to_timecode(59), "00:00:59");
        assert_eq!(TimeCodec::to_timecode(3661), "01:01:01");
        assert_eq!(TimeCodec::to_timecode(359_999), "99:59:59");
    }

    #[test]
    fn test_large_hours_do_not_panic() {
        assert_eq!(TimeCodec::to_timecode(360_000), "100:00:00");
    }

    #[test]
    fn test_parse_accepts_one_or_two_hour_digits() {
        assert_eq!(TimeCodec::parse_timecode("1:02:03"), 3723);
        assert_eq!(TimeCodec::parse_timecode("01:02:03"), 3723);
    }

    #[test]
    fn test_parse_falls_back_to_zero() {
        for text in ["", "abc", "1:2:3", "00:00", "001:00:00", "00:00:00:00", "0a:00:00", " 00:00:10"] {
            assert_eq!(TimeCodec::parse_timecode(text), 0, "input {:?}", text);
        }
    }

    #[test]
    fn test_round_trip_up_to_99_hours() {
        for n in 0..=359_999u64 {
            assert_eq!(TimeCodec::parse_timecode(&TimeCodec::to_timecode(n)), n);
        }
    }

    #[test]
    fn test_strict_validation() {
        assert!(TimeCodec::is_valid_timecode_format("00:01:30"));
        assert!(TimeCodec::is_valid_timecode_format("9:59:59"));
        assert!(!TimeCodec::is_valid_timecode_format("00:60:00"));
        assert!(!TimeCodec::is_valid_timecode_format("00:00:60"));
        assert!(!TimeCodec::is_valid_timecode_format("1:30"));
        assert!(!TimeCodec::is_valid_timecode_format("00:00:1x"));
    }

    #[test]
    fn test_from_seconds_f64_floors() {
        assert_eq!(TimeCodec::from_seconds_f64(12.9), "00:00:12");
        assert_eq!(TimeCodec::from_seconds_f64(-3.0), "00:00:00");
        assert_eq!(TimeCodec::from_seconds_f64(f64::NAN), "00:00:00");
    }

    #[test]
    fn test_clip_duration() {
        assert_eq!(TimeCodec::clip_duration("00:01:00", "00:02:30"), "00:01:30");
        assert_eq!(TimeCodec::clip_duration("00:02:00", "00:01:00"), "00:00:00");
        assert_eq!(TimeCodec::clip_duration("bad", "00:01:00"), "00:00:00");
    }
}
