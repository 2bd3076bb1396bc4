use anyhow::{Context, Result};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Parses a server timestamp, treating a bare ISO-8601 value as UTC.
///
/// The backend serializes `started_at` without an explicit UTC designator in
/// some responses. Interpreting such a value in the local timezone would skew
/// the countdown by the UTC offset, so a `Z` is appended before parsing.
pub(crate) fn parse_utc_timestamp(raw: &str) -> Result<OffsetDateTime> {
    let trimmed = raw.trim();

    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(parsed);
    }

    let assumed_utc = format!("{trimmed}Z");
    OffsetDateTime::parse(&assumed_utc, &Rfc3339)
        .with_context(|| format!("unparseable server timestamp: {raw}"))
}

/// Renders a countdown as `MM:SS`; `None` means the attempt is untimed.
pub(crate) fn format_clock(seconds: Option<i64>) -> String {
    match seconds {
        Some(value) => {
            let clamped = value.max(0);
            format!("{:02}:{:02}", clamped / 60, clamped % 60)
        }
        None => "--:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parse_bare_timestamp_as_utc() {
        let parsed = parse_utc_timestamp("2025-01-02T10:20:30").expect("bare timestamp");
        assert_eq!(parsed, datetime!(2025-01-02 10:20:30 UTC));
    }

    #[test]
    fn parse_explicit_utc_timestamp() {
        let parsed = parse_utc_timestamp("2025-01-02T10:20:30Z").expect("utc timestamp");
        assert_eq!(parsed, datetime!(2025-01-02 10:20:30 UTC));
    }

    #[test]
    fn parse_preserves_explicit_offset() {
        let parsed = parse_utc_timestamp("2025-01-02T13:20:30+03:00").expect("offset timestamp");
        assert_eq!(parsed, datetime!(2025-01-02 10:20:30 UTC));
    }

    #[test]
    fn parse_fractional_seconds() {
        let parsed = parse_utc_timestamp("2025-01-02T10:20:30.123456").expect("fractional");
        assert_eq!(parsed.second(), 30);
        assert_eq!(parsed.offset().whole_seconds(), 0);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_utc_timestamp("not a timestamp").is_err());
    }

    #[test]
    fn format_clock_renders_minutes_and_seconds() {
        assert_eq!(format_clock(Some(65)), "01:05");
        assert_eq!(format_clock(Some(0)), "00:00");
        assert_eq!(format_clock(Some(600)), "10:00");
    }

    #[test]
    fn format_clock_untimed_placeholder() {
        assert_eq!(format_clock(None), "--:--");
    }
}
