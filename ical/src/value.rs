// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Property values as defined in RFC 5545 Section 3.3.
//!
//! Only the value types needed to describe a single-instance or simply
//! recurring `VEVENT` are modelled here: DATE, DATE-TIME, TEXT and a
//! frequency-only RECUR.

use std::fmt::{self, Display};
use std::str::FromStr;

use jiff::Timestamp;
use jiff::civil;
use jiff::tz::TimeZone;

use crate::keyword::{KW_RRULE_COUNT, KW_RRULE_FREQ, KW_RRULE_INTERVAL};

/// Errors raised while parsing a property value.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// Not a valid `YYYYMMDD` date.
    #[error("invalid DATE value: {0:?}")]
    Date(String),

    /// Not a valid `YYYYMMDDTHHMMSS[Z]` date-time.
    #[error("invalid DATE-TIME value: {0:?}")]
    DateTime(String),

    /// Not a valid recurrence rule.
    #[error("invalid RECUR value: {0:?}")]
    RecurrenceRule(String),
}

/// Date value in the iCalendar format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueDate {
    /// Year component.
    pub year: i16,

    /// Month component, 1-12.
    pub month: i8,

    /// Day component, 1-31.
    pub day: i8,
}

impl ValueDate {
    /// Parses a `YYYYMMDD` date.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not eight digits or names a day that
    /// does not exist in the proleptic Gregorian calendar.
    pub fn parse(s: &str) -> Result<Self, ValueError> {
        let err = || ValueError::Date(s.to_string());
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }

        let year = digits(s, 0..4).ok_or_else(err)?;
        let month = digits(s, 4..6).ok_or_else(err)?;
        let day = digits(s, 6..8).ok_or_else(err)?;
        civil::Date::new(year, month, day).map_err(|_| err())?;
        Ok(Self { year, month, day })
    }

    /// Convert to `jiff::civil::Date`.
    #[must_use]
    pub fn civil_date(self) -> civil::Date {
        self.into()
    }
}

impl From<ValueDate> for civil::Date {
    fn from(value: ValueDate) -> Self {
        civil::date(value.year, value.month, value.day)
    }
}

impl From<civil::Date> for ValueDate {
    fn from(value: civil::Date) -> Self {
        Self {
            year: value.year(),
            month: value.month(),
            day: value.day(),
        }
    }
}

impl Display for ValueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

/// Time value in the iCalendar format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueTime {
    /// Hour component, 0-23.
    pub hour: i8,

    /// Minute component, 0-59.
    pub minute: i8,

    /// Second component, 0-60.
    pub second: i8,

    /// Whether the time is in UTC (trailing `Z`).
    pub utc: bool,
}

impl Display for ValueTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}{:02}", self.hour, self.minute, self.second)?;
        if self.utc {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

/// Date-Time value defined in the RFC 5545 Section 3.3.5.
///
/// The value is either floating (no `Z`, no `TZID`), UTC (`Z`), or local to
/// the zone named by the owning property's `TZID` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueDateTime {
    /// Date component.
    pub date: ValueDate,

    /// Time component.
    pub time: ValueTime,
}

impl ValueDateTime {
    /// Parses a `YYYYMMDDTHHMMSS[Z]` date-time.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is malformed or out of range.
    pub fn parse(s: &str) -> Result<Self, ValueError> {
        let err = || ValueError::DateTime(s.to_string());

        let (date, rest) = s.split_once('T').ok_or_else(err)?;
        let date = ValueDate::parse(date).map_err(|_| err())?;

        let (time, utc) = match rest.strip_suffix('Z') {
            Some(time) => (time, true),
            None => (rest, false),
        };
        if time.len() != 6 || !time.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }

        let hour = digits(time, 0..2).ok_or_else(err)?;
        let minute = digits(time, 2..4).ok_or_else(err)?;
        let second: i8 = digits(time, 4..6).ok_or_else(err)?;
        // A leap second is clamped, jiff has no representation for it.
        civil::Time::new(hour, minute, second.min(59), 0).map_err(|_| err())?;

        Ok(Self {
            date,
            time: ValueTime {
                hour,
                minute,
                second,
                utc,
            },
        })
    }

    /// Builds a UTC date-time from a timestamp, truncating sub-second precision.
    #[must_use]
    pub fn from_timestamp(ts: Timestamp) -> Self {
        let dt = ts.to_zoned(TimeZone::UTC).datetime();
        Self {
            date: dt.date().into(),
            time: ValueTime {
                hour: dt.hour(),
                minute: dt.minute(),
                second: dt.second(),
                utc: true,
            },
        }
    }

    /// Whether the value carries the UTC designator.
    #[must_use]
    pub const fn is_utc(&self) -> bool {
        self.time.utc
    }

    /// Wall-clock fields as a `jiff::civil::DateTime`, ignoring any zone.
    #[must_use]
    pub fn civil_date_time(&self) -> civil::DateTime {
        civil::DateTime::from_parts(
            self.date.civil_date(),
            civil::time(self.time.hour, self.time.minute, self.time.second.min(59), 0),
        )
    }
}

impl Display for ValueDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}T{}", self.date, self.time)
    }
}

/// The value of a DTSTART / DTEND property: either a DATE or a DATE-TIME.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateOrDateTime {
    /// `VALUE=DATE`
    Date(ValueDate),

    /// `VALUE=DATE-TIME` (the default)
    DateTime(ValueDateTime),
}

impl Display for DateOrDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => d.fmt(f),
            Self::DateTime(dt) => dt.fmt(f),
        }
    }
}

/// Recurrence frequency
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[expect(missing_docs)]
pub enum RecurrenceFrequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Recurrence rule value, limited to `FREQ`, `INTERVAL` and `COUNT`.
///
/// Other rule parts found while parsing are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRecurrenceRule {
    /// Frequency of recurrence
    pub freq: RecurrenceFrequency,
    /// Interval between recurrences
    pub interval: Option<u32>,
    /// Number of occurrences
    pub count: Option<u32>,
}

impl ValueRecurrenceRule {
    /// Creates a rule with only a frequency.
    #[must_use]
    pub const fn new(freq: RecurrenceFrequency) -> Self {
        Self {
            freq,
            interval: None,
            count: None,
        }
    }
}

impl FromStr for ValueRecurrenceRule {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ValueError::RecurrenceRule(s.to_string());

        let mut freq = None;
        let mut interval = None;
        let mut count = None;
        for part in s.split(';').filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(err)?;
            match key.to_ascii_uppercase().as_str() {
                KW_RRULE_FREQ => freq = Some(value.parse().map_err(|_| err())?),
                KW_RRULE_INTERVAL => interval = Some(value.parse().map_err(|_| err())?),
                KW_RRULE_COUNT => count = Some(value.parse().map_err(|_| err())?),
                _ => {}
            }
        }

        Ok(Self {
            freq: freq.ok_or_else(err)?,
            interval,
            count,
        })
    }
}

impl Display for ValueRecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{KW_RRULE_FREQ}={}", self.freq)?;
        if let Some(interval) = self.interval {
            write!(f, ";{KW_RRULE_INTERVAL}={interval}")?;
        }
        if let Some(count) = self.count {
            write!(f, ";{KW_RRULE_COUNT}={count}")?;
        }
        Ok(())
    }
}

/// Escapes a TEXT value (RFC 5545 Section 3.3.11).
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Reverses [`escape_text`]. Unknown escapes keep the escaped character.
#[must_use]
pub fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn digits<T: FromStr>(s: &str, range: std::ops::Range<usize>) -> Option<T> {
    s.get(range)?.parse().ok()
}
