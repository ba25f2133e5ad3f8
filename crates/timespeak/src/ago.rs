//! Duration Decomposer: turns an "N unit [N unit ...]" phrase into a
//! timestamp in the past, relative to the anchor.
//!
//! The phrase splits into two classes of unit. Calendar units (years,
//! months, days) shift the anchor's calendar date with borrow-aware
//! arithmetic, so "1 month ago" from March 31 lands where a real calendar
//! would put it. Clock units (hours, minutes, seconds) are folded into a
//! compact literal like `4h5m6s` and subtracted as a fixed span. The split
//! keeps large shifts calendar-correct without giving up exact clock math.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ParseError, Result};

static HOURS: Lazy<Regex> = Lazy::new(|| Regex::new(r"hour(s)?").unwrap());
static MINUTES: Lazy<Regex> = Lazy::new(|| Regex::new(r"minute(s)?").unwrap());
static SECONDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"second(s)?").unwrap());

/// Decompose a duration phrase ("3 days", "1 year 2 months 4 hours") and
/// subtract it from `anchor`.
///
/// # Errors
///
/// The phrase must be an alternating count/unit list, so the token count
/// must be even; odd counts are [`ParseError::MalformedInput`]. A count
/// that does not parse is [`ParseError::InvalidNumber`], an unknown unit
/// is [`ParseError::UnknownToken`], and a quantity that would push the
/// result outside the representable calendar is
/// [`ParseError::OutOfRange`].
pub fn decompose(phrase: &str, anchor: DateTime<Tz>, zone: Tz) -> Result<DateTime<Tz>> {
    let tokens: Vec<&str> = phrase.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(ParseError::MalformedInput(format!("empty duration phrase: {phrase}")));
    }
    if tokens.len() % 2 != 0 {
        return Err(ParseError::MalformedInput(format!(
            "number of input fields must be even: {phrase}"
        )));
    }

    let (base, remainder) = large_units(&tokens, anchor, zone)?;
    let small = small_units(&remainder)?;
    base.checked_sub_signed(small)
        .ok_or_else(|| ParseError::OutOfRange(format!("duration too large: {phrase}")))
}

/// Apply the calendar units (years, months, days) to the anchor and return
/// the shifted timestamp plus the tokens left over for the clock pass.
fn large_units<'t>(
    tokens: &[&'t str],
    anchor: DateTime<Tz>,
    zone: Tz,
) -> Result<(DateTime<Tz>, Vec<&'t str>)> {
    let has_large = tokens
        .iter()
        .any(|t| t.contains("year") || t.contains("month") || t.contains("day"));
    if !has_large {
        return Ok((anchor, tokens.to_vec()));
    }

    let mut years = 0i64;
    let mut months = 0i64;
    let mut days = 0i64;
    let mut consumed_through: Option<usize> = None;

    let mut i = 0;
    while i + 1 < tokens.len() {
        let unit = tokens[i + 1];
        if unit.contains("year") || unit.contains("month") || unit.contains("day") {
            let count: i64 = tokens[i].parse().map_err(|e| {
                ParseError::InvalidNumber(format!("count '{}' for unit '{unit}': {e}", tokens[i]))
            })?;
            // A repeated unit overwrites the earlier value; nothing sums.
            if unit.contains("year") {
                years = count;
            } else if unit.contains("month") {
                months = count;
            } else {
                days = count;
            }
            consumed_through = Some(i + 1);
        }
        i += 2;
    }

    let remainder = match consumed_through {
        Some(last) => tokens[last + 1..].to_vec(),
        None => tokens.to_vec(),
    };

    let shifted = calendar_shift(anchor.date_naive(), years, months, days)?;
    let naive = shifted
        .and_hms_opt(anchor.hour(), anchor.minute(), anchor.second())
        .ok_or_else(|| {
            ParseError::InvalidDatetime(format!("no {}:{}:{} on {shifted}", anchor.hour(), anchor.minute(), anchor.second()))
        })?;
    let base = zone.from_local_datetime(&naive).single().ok_or_else(|| {
        ParseError::InvalidDatetime(format!("ambiguous or nonexistent local time: {naive}"))
    })?;
    Ok((base, remainder))
}

/// Shift `date` back by whole years, months, and days, normalizing
/// out-of-range months and days the way a paper calendar would: going a
/// month back from March 31 overshoots February and lands in early March.
fn calendar_shift(date: NaiveDate, years: i64, months: i64, days: i64) -> Result<NaiveDate> {
    let out_of_range =
        || ParseError::OutOfRange(format!("calendar shift out of range: {years}y {months}mo {days}d from {date}"));

    let month0 = (date.month0() as i64).checked_sub(months).ok_or_else(out_of_range)?;
    let year = (date.year() as i64)
        .checked_sub(years)
        .and_then(|y| y.checked_add(month0.div_euclid(12)))
        .and_then(|y| i32::try_from(y).ok())
        .ok_or_else(out_of_range)?;
    let month = month0.rem_euclid(12) as u32 + 1;

    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
    let day_shift = (date.day() as i64 - 1).checked_sub(days).ok_or_else(out_of_range)?;
    Duration::try_days(day_shift)
        .and_then(|span| first_of_month.checked_add_signed(span))
        .ok_or_else(out_of_range)
}

/// Fold the clock units (hours, minutes, seconds) into a fixed span.
///
/// Tokens with no clock unit anywhere produce a zero span. Otherwise the
/// token list is rewritten to a compact literal ("4 hours 5 minutes" to
/// "4h5m") and scanned.
fn small_units(tokens: &[&str]) -> Result<Duration> {
    let has_small = tokens
        .iter()
        .any(|t| t.contains("hour") || t.contains("minute") || t.contains("second"));
    if !has_small {
        return Ok(Duration::zero());
    }

    let joined = tokens.join(" ");
    let compact = HOURS.replace_all(&joined, "h");
    let compact = MINUTES.replace_all(&compact, "m");
    let compact = SECONDS.replace_all(&compact, "s");
    let compact = compact.replace(' ', "");
    parse_clock_literal(&compact)
}

/// Scan a compact clock literal like `4h5m6s` into a span.
fn parse_clock_literal(literal: &str) -> Result<Duration> {
    let mut total = Duration::zero();
    let mut digits = String::new();

    for c in literal.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if digits.is_empty() {
            return Err(ParseError::InvalidDuration(format!(
                "unit '{c}' without a count in: {literal}"
            )));
        }
        let count: i64 = digits.parse().map_err(|e| {
            ParseError::InvalidNumber(format!("count '{digits}' in '{literal}': {e}"))
        })?;
        let span = match c {
            'h' => Duration::try_hours(count),
            'm' => Duration::try_minutes(count),
            's' => Duration::try_seconds(count),
            other => {
                return Err(ParseError::UnknownToken(format!(
                    "unknown duration unit '{other}' in: {literal}"
                )));
            }
        };
        total = span
            .and_then(|span| total.checked_add(&span))
            .ok_or_else(|| {
                ParseError::OutOfRange(format!("duration component too large: {count}{c} in: {literal}"))
            })?;
        digits.clear();
    }

    if !digits.is_empty() {
        return Err(ParseError::InvalidDuration(format!(
            "trailing count '{digits}' without a unit in: {literal}"
        )));
    }
    Ok(total)
}
