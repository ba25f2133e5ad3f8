//! Shared pattern tables: the compiled fragment patterns, the weekday map,
//! and the named-day synonym offsets.
//!
//! Patterns are compiled once into immutable statics, so concurrent parse
//! calls share them without synchronization. All input is lowercased before
//! any pattern is evaluated.

use chrono::Weekday;
use once_cell::sync::Lazy;
use regex::Regex;

/// `{last|this|next} {weekday}`, with the common abbreviations.
static WEEKDAY_RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(next|last|this)\s*((mon|tues?|wed(nes)?|thu(rs?)?|fri|sat(ur)?|sun)(day)?)")
        .unwrap()
});

/// `yesterday` / `today` / `tomorrow`.
static DAY_SYNONYM: Lazy<Regex> = Lazy::new(|| Regex::new(r"yesterday|today|tomorrow").unwrap());

/// `[at] H{am|pm}` or `[at] HH:MM[:SS]`.
static AT_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:at)?\s*(?:\d{1,2}am|\d{1,2}pm|\d{1,2}:\d{1,2}(?::\d{1,2})?)").unwrap()
});

/// The 12-hour clock form inside a time-of-day clause.
pub(crate) static AM_OR_PM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,2}(?:am|pm)").unwrap());

/// The 24-hour clock form inside a time-of-day clause.
pub(crate) static CLOCK_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,2}:\d{1,2}(?::\d{1,2})?").unwrap());

/// The kinds of fragment a phrase can be reduced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FragmentKind {
    WeekdayRelative,
    DaySynonym,
    TimeOfDay,
}

/// One fragment recognizer: a kind plus its compiled pattern.
pub(crate) struct Recognizer {
    pub kind: FragmentKind,
    pattern: &'static Lazy<Regex>,
}

impl Recognizer {
    /// Find the first occurrence of this recognizer's pattern in `text`.
    pub fn try_match<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern.find(text).map(|m| m.as_str())
    }
}

/// The fragment recognizers in their fixed precedence order. Reordering
/// this list changes how ambiguous phrases parse: date fragments must
/// resolve before time-of-day clauses are applied on top of them.
pub(crate) const RECOGNIZERS: [Recognizer; 3] = [
    Recognizer { kind: FragmentKind::WeekdayRelative, pattern: &WEEKDAY_RELATIVE },
    Recognizer { kind: FragmentKind::DaySynonym, pattern: &DAY_SYNONYM },
    Recognizer { kind: FragmentKind::TimeOfDay, pattern: &AT_TIME },
];

/// Map a weekday word (full name or an abbreviation the weekday pattern
/// accepts) to its chrono counterpart.
pub(crate) fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wednes" | "wed" => Some(Weekday::Wed),
        "thursday" | "thurs" | "thur" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "satur" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Whole-day offset from the anchor for the named-day synonyms.
pub(crate) fn synonym_day_offset(word: &str) -> Option<i64> {
    match word {
        "yesterday" => Some(-1),
        "today" => Some(0),
        "tomorrow" => Some(1),
        _ => None,
    }
}
