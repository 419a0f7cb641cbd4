//! Date arithmetic, ISO 8601 formatting and common durations.
//!
//! All arithmetic is on elapsed time, never calendar fields, so adding 90
//! seconds always moves a timestamp by exactly 90 seconds.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

pub const QUARTER_SECOND: Duration = Duration::from_millis(250);
pub const HALF_SECOND: Duration = Duration::from_millis(500);
pub const ONE_SECOND: Duration = Duration::from_secs(1);
pub const TWO_SECONDS: Duration = Duration::from_secs(2);
pub const THREE_SECONDS: Duration = Duration::from_secs(3);
pub const FOUR_SECONDS: Duration = Duration::from_secs(4);
pub const FIVE_SECONDS: Duration = Duration::from_secs(5);
pub const TEN_SECONDS: Duration = Duration::from_secs(10);
pub const TWENTY_SECONDS: Duration = Duration::from_secs(20);
pub const THIRTY_SECONDS: Duration = Duration::from_secs(30);
pub const SIXTY_SECONDS: Duration = Duration::from_secs(60);

const ISO8601: &str = "%Y-%m-%dT%H:%M:%SZ";
const ISO8601_FRACTIONAL: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub trait DateTimeExt: Sized {
    /// `None` if the result would fall outside the representable range.
    fn adding_seconds(&self, seconds: i64) -> Option<Self>;

    fn adding_minutes(&self, minutes: i64) -> Option<Self>;

    /// Seconds elapsed from `earlier` to `self` (negative if `earlier` is later).
    fn seconds_since(&self, earlier: &Self) -> f64;

    /// `2024-03-01T12:30:00Z`
    fn iso8601(&self) -> String;

    /// `2024-03-01T12:30:00.250Z`
    fn iso8601_with_fractional_seconds(&self) -> String;
}

impl DateTimeExt for DateTime<Utc> {
    fn adding_seconds(&self, seconds: i64) -> Option<Self> {
        self.checked_add_signed(TimeDelta::try_seconds(seconds)?)
    }

    fn adding_minutes(&self, minutes: i64) -> Option<Self> {
        self.checked_add_signed(TimeDelta::try_minutes(minutes)?)
    }

    fn seconds_since(&self, earlier: &Self) -> f64 {
        let delta = *self - *earlier;
        delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) / 1e9
    }

    fn iso8601(&self) -> String {
        self.format(ISO8601).to_string()
    }

    fn iso8601_with_fractional_seconds(&self) -> String {
        self.format(ISO8601_FRACTIONAL).to_string()
    }
}

/// Parse an internet date-time without fractional seconds.
///
/// Any UTC offset is accepted and normalised to UTC.
#[must_use]
pub fn parse_iso8601(input: &str) -> Option<DateTime<Utc>> {
    if has_fraction(input) {
        return None;
    }
    parse_internet_date_time(input)
}

/// Parse an internet date-time that carries fractional seconds.
#[must_use]
pub fn parse_iso8601_with_fractional_seconds(input: &str) -> Option<DateTime<Utc>> {
    if !has_fraction(input) {
        return None;
    }
    parse_internet_date_time(input)
}

fn has_fraction(input: &str) -> bool {
    input.contains('.')
}

fn parse_internet_date_time(input: &str) -> Option<DateTime<Utc>> {
    // RFC 3339 also permits a space separator; ISO 8601 internet date-times don't.
    if !input.contains(['T', 't']) {
        return None;
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    use super::{DateTimeExt, parse_iso8601, parse_iso8601_with_fractional_seconds};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap()
    }

    #[test]
    fn adding_seconds_crosses_year_boundary() {
        let later = reference().adding_seconds(90).unwrap();
        assert_eq!(later, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 30).unwrap());
        assert!((later.seconds_since(&reference()) - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn adding_is_exact_for_many_offsets() {
        let base = reference();
        for seconds in [-86_400, -90, -1, 0, 1, 59, 60, 90, 3_600, 86_399, 31_622_400] {
            let moved = base.adding_seconds(seconds).unwrap();
            assert_eq!((moved - base).num_seconds(), seconds);
        }
    }

    #[test]
    fn adding_minutes() {
        let later = reference().adding_minutes(2).unwrap();
        assert_eq!(later, Utc.with_ymd_and_hms(2025, 1, 1, 0, 1, 0).unwrap());
        let earlier = reference().adding_minutes(-59).unwrap();
        assert_eq!(earlier, Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap());
    }

    #[test]
    fn adding_overflow_is_none() {
        assert!(DateTime::<Utc>::MAX_UTC.adding_seconds(1).is_none());
        assert!(reference().adding_seconds(i64::MAX).is_none());
    }

    #[test]
    fn seconds_since_is_signed_and_fractional() {
        let a = reference();
        let b = a + TimeDelta::milliseconds(1_500);
        assert!((b.seconds_since(&a) - 1.5).abs() < 1e-9);
        assert!((a.seconds_since(&b) + 1.5).abs() < 1e-9);
    }

    #[test]
    fn formats_iso8601() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap()
            + TimeDelta::milliseconds(250);
        assert_eq!(t.iso8601(), "2024-03-01T12:30:05Z");
        assert_eq!(t.iso8601_with_fractional_seconds(), "2024-03-01T12:30:05.250Z");
    }

    #[test]
    fn parses_iso8601_variants() {
        let plain = parse_iso8601("2024-03-01T12:30:05Z").unwrap();
        assert_eq!(plain, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap());

        let offset = parse_iso8601("2024-03-01T14:30:05+02:00").unwrap();
        assert_eq!(offset, plain);

        let fractional = parse_iso8601_with_fractional_seconds("2024-03-01T12:30:05.250Z").unwrap();
        assert_eq!(fractional.iso8601_with_fractional_seconds(), "2024-03-01T12:30:05.250Z");
    }

    #[test]
    fn parse_rejects_mismatched_precision_and_garbage() {
        assert!(parse_iso8601("2024-03-01T12:30:05.250Z").is_none());
        assert!(parse_iso8601_with_fractional_seconds("2024-03-01T12:30:05Z").is_none());
        assert!(parse_iso8601("2024-03-01 12:30:05Z").is_none());
        assert!(parse_iso8601("yesterday").is_none());
        assert!(parse_iso8601("").is_none());
    }
}
