//! The top-level phrase parser and the [`TimeRange`] it produces.
//!
//! [`PhraseParser`] routes a whole phrase on its keyword ("since", "ago",
//! "until"/"til", "before", "after", "from ... to ...") and hands the
//! remainder to the resolver or the duration decomposer. Each `parse` call
//! snapshots the current moment exactly once, so both ends of a range are
//! computed against the same instant.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::ago;
use crate::error::{ParseError, Result};
use crate::resolver;

/// A half-open span of time produced by parsing a phrase.
///
/// Open-ended phrases ("since yesterday", "until 6pm") pin the missing end
/// to the moment the phrase was parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub from: DateTime<Tz>,
    pub to: DateTime<Tz>,
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "From: {}, To: {}", self.from.to_rfc2822(), self.to.to_rfc2822())
    }
}

impl FromStr for TimeRange {
    type Err = ParseError;

    /// Parse a self-contained phrase, with an optional trailing
    /// `in <timezone>` clause naming an IANA zone. Without the clause the
    /// phrase is interpreted in UTC.
    ///
    /// ```
    /// use timespeak::TimeRange;
    ///
    /// let range: TimeRange = "from 8am to 6pm in America/Chicago".parse().unwrap();
    /// assert_eq!(range.to.signed_duration_since(range.from).num_hours(), 10);
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        if s.split_whitespace().count() < 3 {
            return Err(ParseError::MalformedInput(format!(
                "input must have at least three fields: {s}"
            )));
        }

        let (phrase, zone) = match s.rfind(" in ") {
            Some(idx) => {
                let name = s[idx + 4..].trim();
                let zone: Tz = name.parse().map_err(|_| {
                    ParseError::InvalidTimezone(format!("unknown timezone '{name}' in: {s}"))
                })?;
                (&s[..idx], zone)
            }
            None => (s, chrono_tz::UTC),
        };

        PhraseParser::new(zone).parse(phrase)
    }
}

/// Parses time phrases against a fixed timezone.
///
/// The parser is stateless apart from its configuration, so one instance
/// can serve concurrent callers. By default every call anchors to the wall
/// clock; [`PhraseParser::with_anchor`] pins the anchor instead, which is
/// what reproducible tests and replay tooling want.
#[derive(Debug, Clone)]
pub struct PhraseParser {
    zone: Tz,
    anchor: Option<DateTime<Utc>>,
}

impl PhraseParser {
    pub fn new(zone: Tz) -> Self {
        Self { zone, anchor: None }
    }

    /// Pin the current moment instead of reading the wall clock.
    pub fn with_anchor(zone: Tz, anchor: DateTime<Utc>) -> Self {
        Self { zone, anchor: Some(anchor) }
    }

    /// The current-moment snapshot for one `parse` call. Taken once per
    /// call; everything downstream sees the same instant.
    fn now(&self) -> DateTime<Tz> {
        self.anchor.unwrap_or_else(Utc::now).with_timezone(&self.zone)
    }

    /// Parse a phrase into a [`TimeRange`].
    ///
    /// Routing is by keyword containment, checked in a fixed order: since,
    /// ago, until/til, before, after, then the two-ended from/to form. A
    /// phrase with none of these keywords is
    /// [`ParseError::UnsupportedFormat`].
    pub fn parse(&self, input: &str) -> Result<TimeRange> {
        let input = input.to_lowercase();
        let input = input.trim();
        let now = self.now();

        if input.contains("since") {
            self.starting_at(input, "since", now)
        } else if input.contains("ago") {
            self.ago(input, now)
        } else if input.contains("til") {
            // "until" contains "til", so one branch covers both spellings.
            self.ending_at(input, if input.contains("until") { "until" } else { "til" }, now)
        } else if input.contains("before") {
            self.ending_at(input, "before", now)
        } else if input.contains("after") {
            self.starting_at(input, "after", now)
        } else if input.contains("from") && input.contains("to") {
            self.from_to(input, now)
        } else {
            Err(ParseError::UnsupportedFormat(input.to_string()))
        }
    }

    /// `since X` / `after X`: the phrase names the start, now is the end.
    fn starting_at(&self, input: &str, keyword: &str, now: DateTime<Tz>) -> Result<TimeRange> {
        let phrase = keyword_phrase(input, keyword)?;
        let from = resolver::resolve(phrase, now, self.zone)?;
        Ok(TimeRange { from, to: now })
    }

    /// `before X` / `until X` / `til X`: the phrase names the end.
    fn ending_at(&self, input: &str, keyword: &str, now: DateTime<Tz>) -> Result<TimeRange> {
        let phrase = keyword_phrase(input, keyword)?;
        let to = resolver::resolve(phrase, now, self.zone)?;
        Ok(TimeRange { from: now, to })
    }

    /// `N unit [and] [N unit ...] ago`: a span back from now.
    fn ago(&self, input: &str, now: DateTime<Tz>) -> Result<TimeRange> {
        if input.split_whitespace().count() < 3 {
            return Err(ParseError::MalformedInput(format!(
                "input must have at least three fields: {input}"
            )));
        }
        let phrase = input.strip_suffix("ago").ok_or_else(|| {
            ParseError::MalformedInput(format!("input does not end with 'ago': {input}"))
        })?;

        // Commas and "and" are filler: "1 year, 2 months and 3 days ago".
        let cleaned = phrase
            .replace(',', " ")
            .split_whitespace()
            .filter(|t| *t != "and")
            .collect::<Vec<_>>()
            .join(" ");
        let from = ago::decompose(&cleaned, now, self.zone)?;
        Ok(TimeRange { from, to: now })
    }

    /// `from X to Y`: both ends named in one phrase.
    fn from_to(&self, input: &str, now: DateTime<Tz>) -> Result<TimeRange> {
        let rest = input.strip_prefix("from ").ok_or_else(|| {
            ParseError::MalformedInput(format!("first word must be 'from': {input}"))
        })?;
        let (from_phrase, to_phrase) = rest.split_once(" to ").ok_or_else(|| {
            ParseError::MalformedInput(format!("input must contain 'to': {input}"))
        })?;

        let from = resolver::resolve(from_phrase, now, self.zone)?;
        let to = resolver::resolve(to_phrase, now, self.zone)?;
        Ok(TimeRange { from, to })
    }
}

/// Strip `keyword` from the front of `input` and return the remainder.
fn keyword_phrase<'i>(input: &'i str, keyword: &str) -> Result<&'i str> {
    if input.split_whitespace().count() < 2 {
        return Err(ParseError::MalformedInput(format!(
            "input must have at least two fields: {input}"
        )));
    }
    let rest = input.strip_prefix(keyword).ok_or_else(|| {
        ParseError::MalformedInput(format!("input does not start with '{keyword}': {input}"))
    })?;
    Ok(rest.trim_start())
}
