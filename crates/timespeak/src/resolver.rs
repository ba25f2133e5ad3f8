//! Phrase Resolver: reduces an absolute-or-relative date phrase to a single
//! timestamp.
//!
//! Resolution happens in two stages with a fixed priority:
//!
//! 1. The general absolute recognizer is tried against the whole phrase
//!    (`3/15/2022`, `may 8, 2009 5:57:51 pm`, RFC 3339, ...).
//! 2. On failure, a bounded fragment-extraction loop repeatedly consumes one
//!    recognized fragment — weekday-relative expression, named-day synonym,
//!    or time-of-day clause, in that order — from the remaining text,
//!    accumulating a timestamp until the text is exhausted.
//!
//! The loop removes only the first occurrence of a match per pass and trims
//! whitespace between passes, so fragment order in the phrase does not
//! matter: date fragments always resolve before time-of-day clauses are
//! added on top of them.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use chrono_tz::Tz;

use crate::absolute;
use crate::error::{ParseError, Result};
use crate::pattern::{self, FragmentKind, RECOGNIZERS};

/// Pass ceiling for the fragment-extraction loop. Guarantees termination
/// when no recognizer can consume the remaining text.
const MAX_PASSES: usize = 5;

/// Resolve `phrase` to a timestamp, relative to `anchor` where needed.
///
/// The anchor is the current-moment snapshot for this call; every relative
/// fragment ("yesterday", "next tuesday", a bare "3pm") is computed against
/// it, never against the wall clock.
///
/// # Errors
///
/// Returns [`ParseError::UnrecognizedPhrase`] when no recognizer matches
/// before the pass ceiling, or the specific range/token error a matched
/// fragment produced. A phrase with no recognizable fragment at all is an
/// error, never a silent zero timestamp.
pub fn resolve(phrase: &str, anchor: DateTime<Tz>, zone: Tz) -> Result<DateTime<Tz>> {
    if let Some(dt) = absolute::recognize(phrase, zone) {
        return Ok(dt);
    }

    let mut remaining = phrase.trim().to_string();
    let mut accumulated: Option<DateTime<Tz>> = None;
    let mut passes = 0usize;

    while !remaining.is_empty() {
        let hit = RECOGNIZERS
            .iter()
            .find_map(|r| r.try_match(&remaining).map(|m| (r.kind, m.to_string())));

        match hit {
            Some((FragmentKind::WeekdayRelative, m)) => {
                accumulated = Some(weekday_relative(&m, phrase, anchor, zone)?);
                remaining = remaining.replacen(&m, "", 1);
            }
            Some((FragmentKind::DaySynonym, m)) => {
                accumulated = Some(day_synonym(&m, anchor, zone)?);
                remaining = remaining.replacen(&m, "", 1);
            }
            Some((FragmentKind::TimeOfDay, m)) => {
                // No date fragment yet means a bare time like "3pm":
                // start from midnight of the anchor day.
                let base = match accumulated {
                    Some(ts) => ts,
                    None => midnight(anchor.date_naive(), zone)?,
                };
                accumulated = Some(apply_time_clause(base, &m)?);
                remaining = remaining.replacen(&m, "", 1);
            }
            None => {
                if passes >= MAX_PASSES {
                    return Err(ParseError::UnrecognizedPhrase(phrase.to_string()));
                }
            }
        }

        remaining = remaining.trim().to_string();
        passes += 1;
    }

    accumulated.ok_or_else(|| ParseError::UnrecognizedPhrase(phrase.to_string()))
}

/// Resolve a `{last|this|next} {weekday}` expression to midnight of the
/// target day.
fn weekday_relative(
    matched: &str,
    phrase: &str,
    anchor: DateTime<Tz>,
    zone: Tz,
) -> Result<DateTime<Tz>> {
    let words: Vec<&str> = matched.split_whitespace().collect();
    if words.len() != 2 {
        return Err(ParseError::UnknownToken(format!(
            "could not split weekday expression '{matched}' in: {phrase}"
        )));
    }
    let (modifier, day_name) = (words[0], words[1]);

    let target = pattern::weekday_from_name(day_name).ok_or_else(|| {
        ParseError::UnknownToken(format!("unknown weekday '{day_name}' in: {phrase}"))
    })?;

    let week_shift = match modifier {
        "last" => -7,
        "this" => 0,
        "next" => 7,
        other => {
            return Err(ParseError::UnknownToken(format!(
                "unknown weekday modifier '{other}' in: {phrase}"
            )));
        }
    };

    // Same-week distance, Sunday-based. "this" may land in the past or the
    // future depending on where the anchor sits in its week.
    let delta = target.num_days_from_sunday() as i64
        - anchor.weekday().num_days_from_sunday() as i64
        + week_shift;
    midnight(anchor.date_naive() + Duration::days(delta), zone)
}

/// Resolve `yesterday`/`today`/`tomorrow` to midnight of the named day.
fn day_synonym(word: &str, anchor: DateTime<Tz>, zone: Tz) -> Result<DateTime<Tz>> {
    let offset = pattern::synonym_day_offset(word)
        .ok_or_else(|| ParseError::UnknownToken(format!("unknown day synonym '{word}'")))?;
    midnight(anchor.date_naive() + Duration::days(offset), zone)
}

/// Apply one time-of-day clause (`at 3pm`, `13:34:32`) on top of `base`.
///
/// Two clock forms are accepted:
///
/// - `H{am|pm}`: hour must be <= 12. `12am` adds nothing, `12pm` adds 12
///   hours, other `am` hours add themselves, other `pm` hours add 12 more.
/// - `HH:MM[:SS]` (24-hour): hour <= 23, minute and second <= 59.
fn apply_time_clause(base: DateTime<Tz>, clause: &str) -> Result<DateTime<Tz>> {
    let cleaned = clause.replace("at", "");
    let cleaned = cleaned.trim();

    if let Some(m) = pattern::AM_OR_PM.find(cleaned) {
        let text = m.as_str();
        let (digits, period) = text.split_at(text.len() - 2);
        let hour: i64 = digits.parse().map_err(|e| {
            ParseError::InvalidNumber(format!("hour '{digits}' in '{cleaned}': {e}"))
        })?;

        if hour > 12 {
            return Err(ParseError::OutOfRange(format!(
                "hour {hour} in '{cleaned}': hour cannot be > 12"
            )));
        }
        let offset = match (hour, period) {
            (12, "am") => 0,
            (12, "pm") => 12,
            (h, "am") => h,
            (h, _) => h + 12,
        };
        return Ok(base + Duration::hours(offset));
    }

    if pattern::CLOCK_TIME.is_match(cleaned) {
        let mut parts = cleaned.split(':');
        let hour = clock_field(parts.next(), "hour", 23, cleaned)?;
        let minute = clock_field(parts.next(), "minute", 59, cleaned)?;
        let second = match parts.next() {
            Some(s) => clock_field(Some(s), "second", 59, cleaned)?,
            None => 0,
        };
        return Ok(base
            + Duration::hours(hour)
            + Duration::minutes(minute)
            + Duration::seconds(second));
    }

    Err(ParseError::UnrecognizedPhrase(format!("unable to parse time clause: {cleaned}")))
}

/// Parse one `:`-separated clock field with an upper range check.
fn clock_field(value: Option<&str>, name: &str, max: i64, clause: &str) -> Result<i64> {
    let text = value.ok_or_else(|| {
        ParseError::MalformedInput(format!("missing {name} in: {clause}"))
    })?;
    let n: i64 = text.parse().map_err(|e| {
        ParseError::InvalidNumber(format!("{name} '{text}' in '{clause}': {e}"))
    })?;
    if n > max {
        return Err(ParseError::OutOfRange(format!(
            "{name} {n} in '{clause}': {name} cannot be > {max}"
        )));
    }
    Ok(n)
}

/// Midnight of `date` as a zone-aware instant.
fn midnight(date: NaiveDate, zone: Tz) -> Result<DateTime<Tz>> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ParseError::InvalidDatetime(format!("no midnight on {date}")))?;
    zone.from_local_datetime(&naive).single().ok_or_else(|| {
        ParseError::InvalidDatetime(format!(
            "ambiguous or nonexistent midnight on {date} in {zone}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use chrono_tz::UTC;
    use proptest::prelude::*;

    fn anchor() -> DateTime<Tz> {
        // Wednesday, February 18, 2026, 14:30:00 UTC
        UTC.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap()
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Tz> {
        UTC.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_resolve_absolute_date_takes_priority() {
        assert_eq!(resolve("3/15/2022", anchor(), UTC).unwrap(), at(2022, 3, 15, 0, 0, 0));
        assert_eq!(
            resolve("may 8, 2009 5:57:51 pm", anchor(), UTC).unwrap(),
            at(2009, 5, 8, 17, 57, 51)
        );
    }

    #[test]
    fn test_resolve_yesterday_is_previous_midnight() {
        assert_eq!(resolve("yesterday", anchor(), UTC).unwrap(), at(2026, 2, 17, 0, 0, 0));
    }

    #[test]
    fn test_resolve_today_and_tomorrow() {
        assert_eq!(resolve("today", anchor(), UTC).unwrap(), at(2026, 2, 18, 0, 0, 0));
        assert_eq!(resolve("tomorrow", anchor(), UTC).unwrap(), at(2026, 2, 19, 0, 0, 0));
    }

    #[test]
    fn test_resolve_synonym_with_time_clause() {
        assert_eq!(
            resolve("yesterday at 4pm", anchor(), UTC).unwrap(),
            at(2026, 2, 17, 16, 0, 0)
        );
        assert_eq!(
            resolve("yesterday at 13:34:32", anchor(), UTC).unwrap(),
            at(2026, 2, 17, 13, 34, 32)
        );
    }

    #[test]
    fn test_resolve_next_tuesday_with_seconds() {
        // Anchor is Wednesday Feb 18; next Tuesday is Feb 24.
        assert_eq!(
            resolve("next tuesday at 05:23:43", anchor(), UTC).unwrap(),
            at(2026, 2, 24, 5, 23, 43)
        );
    }

    #[test]
    fn test_resolve_every_weekday_and_modifier() {
        let days = [
            ("sunday", Weekday::Sun),
            ("monday", Weekday::Mon),
            ("tuesday", Weekday::Tue),
            ("wednesday", Weekday::Wed),
            ("thursday", Weekday::Thu),
            ("friday", Weekday::Fri),
            ("saturday", Weekday::Sat),
        ];
        // Anchor weekday is Wednesday = 3 days from Sunday.
        for (name, weekday) in days {
            for (modifier, shift) in [("last", -7i64), ("this", 0), ("next", 7)] {
                let phrase = format!("{modifier} {name}");
                let resolved = resolve(&phrase, anchor(), UTC).unwrap();
                let expected_delta = weekday.num_days_from_sunday() as i64 - 3 + shift;
                assert_eq!(resolved.weekday(), weekday, "{phrase}");
                assert_eq!(
                    resolved.date_naive(),
                    anchor().date_naive() + Duration::days(expected_delta),
                    "{phrase}"
                );
                assert_eq!(resolved.time(), chrono::NaiveTime::MIN, "{phrase}");
            }
        }
    }

    #[test]
    fn test_resolve_unknown_weekday_is_fatal() {
        let err = resolve("next blursday", anchor(), UTC).unwrap_err();
        // The weekday pattern only matches known stems, so the whole phrase
        // is unrecognizable rather than a bad weekday token.
        assert!(matches!(err, ParseError::UnrecognizedPhrase(_)), "got: {err}");
    }

    #[test]
    fn test_resolve_bare_time_means_anchor_day() {
        assert_eq!(resolve("  1pm", anchor(), UTC).unwrap(), at(2026, 2, 18, 13, 0, 0));
        assert_eq!(resolve("13:34:32", anchor(), UTC).unwrap(), at(2026, 2, 18, 13, 34, 32));
    }

    #[test]
    fn test_resolve_meridiem_rules() {
        let two_am = resolve("2am", anchor(), UTC).unwrap();
        let two_pm = resolve("2pm", anchor(), UTC).unwrap();
        assert_eq!(two_pm - two_am, Duration::hours(12));

        assert_eq!(resolve("12am", anchor(), UTC).unwrap(), at(2026, 2, 18, 0, 0, 0));
        assert_eq!(resolve("12pm", anchor(), UTC).unwrap(), at(2026, 2, 18, 12, 0, 0));
    }

    #[test]
    fn test_resolve_hour_over_twelve_with_meridiem_fails() {
        let err = resolve("13pm", anchor(), UTC).unwrap_err();
        assert!(matches!(err, ParseError::OutOfRange(_)), "got: {err}");
    }

    #[test]
    fn test_resolve_out_of_range_clock_fields() {
        let err = resolve("25:00", anchor(), UTC).unwrap_err();
        assert!(err.to_string().contains("hour cannot be > 23"), "got: {err}");

        let err = resolve("12:60", anchor(), UTC).unwrap_err();
        assert!(err.to_string().contains("minute cannot be > 59"), "got: {err}");

        let err = resolve("12:30:61", anchor(), UTC).unwrap_err();
        assert!(err.to_string().contains("second cannot be > 59"), "got: {err}");
    }

    #[test]
    fn test_resolve_tolerates_extra_whitespace() {
        assert_eq!(
            resolve("last tuesday   at   3pm", anchor(), UTC).unwrap(),
            at(2026, 2, 10, 15, 0, 0)
        );
    }

    #[test]
    fn test_resolve_time_before_date_fragment() {
        // Date fragments have recognizer priority, so the weekday resolves
        // first and the clause lands on top of it regardless of word order.
        assert_eq!(
            resolve("3pm next tuesday", anchor(), UTC).unwrap(),
            at(2026, 2, 24, 15, 0, 0)
        );
    }

    #[test]
    fn test_resolve_unrecognizable_phrase_errors() {
        let err = resolve("gobbledygook", anchor(), UTC).unwrap_err();
        assert!(matches!(err, ParseError::UnrecognizedPhrase(_)), "got: {err}");
        assert!(err.to_string().contains("gobbledygook"));
    }

    #[test]
    fn test_resolve_is_idempotent_for_fixed_anchor() {
        let first = resolve("next friday at 6pm", anchor(), UTC).unwrap();
        let second = resolve("next friday at 6pm", anchor(), UTC).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_round_trips_supported_formats() {
        let ts = at(2021, 9, 12, 15, 21, 22);
        for fmt in ["%m/%d/%Y %H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            let formatted = ts.format(fmt).to_string();
            assert_eq!(resolve(&formatted, anchor(), UTC).unwrap(), ts, "{formatted}");
        }
    }

    #[test]
    fn test_resolve_in_named_zone() {
        let zone: Tz = "America/New_York".parse().unwrap();
        let local_anchor = anchor().with_timezone(&zone);
        let resolved = resolve("yesterday at 4pm", local_anchor, zone).unwrap();
        // Feb 18 14:30 UTC is Feb 18 09:30 EST; yesterday is Feb 17.
        assert_eq!(resolved.to_rfc3339(), "2026-02-17T16:00:00-05:00");
    }

    proptest! {
        #[test]
        fn prop_clock_times_resolve_to_anchor_day(h in 0u32..24, m in 0u32..60, s in 0u32..60) {
            let phrase = format!("{h}:{m:02}:{s:02}");
            let resolved = resolve(&phrase, anchor(), UTC).unwrap();
            prop_assert_eq!(resolved, at(2026, 2, 18, h, m, s));
        }

        #[test]
        fn prop_meridiem_hours_stay_on_anchor_day(h in 1i64..=12, pm in proptest::bool::ANY) {
            let phrase = format!("{h}{}", if pm { "pm" } else { "am" });
            let resolved = resolve(&phrase, anchor(), UTC).unwrap();
            prop_assert_eq!(resolved.date_naive(), anchor().date_naive());
        }
    }
}
