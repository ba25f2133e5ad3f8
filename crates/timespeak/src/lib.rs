//! timespeak turns short English time phrases into concrete, timezone-aware
//! time ranges.
//!
//! Phrases come in six keyword forms: `since X`, `after X`, `before X`,
//! `until X` (or `til X`), `N unit ... ago`, and `from X to Y`. The `X`
//! inside them can be an absolute date (`3/15/2022`, `may 8, 2009 5:57:51
//! pm`), a weekday expression (`next tuesday`), a named day (`yesterday`),
//! a clock time (`4pm`, `13:34:32`), or a combination (`next tuesday at
//! 05:23:43`).
//!
//! Modules:
//!
//! - [`parser`]: the [`PhraseParser`] entry point and the [`TimeRange`]
//!   result type
//! - [`resolver`]: reduces one date phrase to a timestamp
//! - [`ago`]: decomposes "N unit" duration phrases
//! - [`error`]: the [`ParseError`] taxonomy
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use timespeak::PhraseParser;
//!
//! let anchor = Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap();
//! let parser = PhraseParser::with_anchor(chrono_tz::UTC, anchor);
//!
//! let range = parser.parse("since yesterday at 4pm").unwrap();
//! assert_eq!(range.from.to_rfc3339(), "2026-02-17T16:00:00+00:00");
//! assert_eq!(range.to, anchor);
//! ```

pub mod ago;
pub mod error;
pub mod parser;
pub mod resolver;

mod absolute;
mod pattern;

pub use error::{ParseError, Result};
pub use parser::{PhraseParser, TimeRange};
