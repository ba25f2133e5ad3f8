//! General-purpose absolute date/time recognizer.
//!
//! Tried against the whole phrase before any fragment extraction: an
//! unambiguous absolute date must never be reinterpreted as fragments.
//! Formats are attempted in a fixed order; the first hit wins.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Formats carrying both a date and a time, interpreted as wall time in the
/// target zone. Month names and am/pm markers parse case-insensitively, so
/// lowercased input is fine.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%B %d, %Y %I:%M:%S %p",
    "%B %d, %Y %I:%M %p",
];

/// Date-only formats, resolved to midnight in the target zone. The
/// two-digit-year form comes first: `%y` rejects a four-digit year, while
/// `%Y` would happily read "3/15/22" as the year 22.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%B %d, %Y"];

/// Try every supported absolute format against the full phrase.
///
/// Returns `None` when no format matches, which sends the caller into the
/// fragment-extraction loop instead.
pub(crate) fn recognize(phrase: &str, zone: Tz) -> Option<DateTime<Tz>> {
    let s = phrase.trim();

    // RFC 3339 carries its own offset; everything else is local wall time.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&zone));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return zone.from_local_datetime(&naive).single();
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return zone.from_local_datetime(&naive).single();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::UTC;

    #[test]
    fn test_slash_date_resolves_to_midnight() {
        let dt = recognize("3/15/2022", UTC).unwrap();
        assert_eq!(dt, UTC.with_ymd_and_hms(2022, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_long_form_datetime_with_meridiem() {
        let dt = recognize("may 8, 2009 5:57:51 pm", UTC).unwrap();
        assert_eq!(dt, UTC.with_ymd_and_hms(2009, 5, 8, 17, 57, 51).unwrap());
    }

    #[test]
    fn test_iso_date_and_datetime() {
        let date = recognize("2022-03-15", UTC).unwrap();
        assert_eq!(date, UTC.with_ymd_and_hms(2022, 3, 15, 0, 0, 0).unwrap());

        let dt = recognize("2022-03-15 10:30:00", UTC).unwrap();
        assert_eq!(dt, UTC.with_ymd_and_hms(2022, 3, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_rfc3339_preserves_the_instant() {
        let dt = recognize("2026-06-15T10:00:00-04:00", UTC).unwrap();
        assert_eq!(dt, UTC.with_ymd_and_hms(2026, 6, 15, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_local_wall_time_in_named_zone() {
        let zone: Tz = "America/New_York".parse().unwrap();
        let dt = recognize("3/15/2022", zone).unwrap();
        assert_eq!(dt.to_rfc3339(), "2022-03-15T00:00:00-04:00");
    }

    #[test]
    fn test_relative_phrases_are_not_absolute() {
        assert!(recognize("yesterday", UTC).is_none());
        assert!(recognize("next tuesday at 3pm", UTC).is_none());
        assert!(recognize("", UTC).is_none());
    }
}
