// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar (RFC 5545) formatter module.
//!
//! This module formats iCalendar data structures to the RFC 5545 text format,
//! writing to any `std::io::Write` implementer.
//!
//! # Example
//!
//! ```
//! use duesync_ical::{ICalendar, VEvent, formatter::format};
//!
//! let mut event = VEvent::new("super-productivity-t1");
//! event.summary = Some("Pay rent".to_string());
//! let ics = format(&ICalendar::with_event(event)).unwrap();
//! assert!(ics.contains("SUMMARY:Pay rent\r\n"));
//! ```

use std::io::{self, Write};

use crate::keyword::{
    KW_BEGIN, KW_DATE, KW_DTEND, KW_DTSTAMP, KW_DTSTART, KW_DURATION, KW_END, KW_PRODID,
    KW_RRULE, KW_SUMMARY, KW_TZID, KW_UID, KW_VALUE, KW_VCALENDAR, KW_VERSION, KW_VEVENT,
};
use crate::semantic::{ICalendar, VEvent};
use crate::value::{DateOrDateTime, escape_text};

/// Convenience function to format an `ICalendar` to a `String` (uses default options).
///
/// # Errors
///
/// Returns an error if writing to the internal buffer fails or if the output
/// contains invalid UTF-8 data.
pub fn format(calendar: &ICalendar) -> io::Result<String> {
    FormatOptions::default().write_to_string(calendar)
}

/// Formatting options for the iCalendar formatter.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Maximum line length in octets before folding.
    /// - `None`: no line folding
    /// - `Some(n)`: fold lines longer than n octets
    ///
    /// Default: `Some(75)` for RFC 5545 compliance.
    pub folding: Option<usize>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            folding: Some(75),
        }
    }
}

impl FormatOptions {
    /// Set the line folding option.
    #[must_use]
    pub fn folding(mut self, folding: Option<usize>) -> Self {
        self.folding = folding;
        self
    }

    /// Write an `ICalendar` to any `Write` implementer.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write(&self, calendar: &ICalendar, w: &mut impl Write) -> io::Result<()> {
        Formatter::new(w, *self).write(calendar)
    }

    /// Write an `ICalendar` to a `String`.
    ///
    /// # Errors
    /// Returns an error if writing fails or if the output contains invalid UTF-8 data.
    pub fn write_to_string(&self, calendar: &ICalendar) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write(calendar, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Line break plus the continuation whitespace of a folded line.
const FOLD: &[u8] = b"\r\n ";

/// iCalendar formatter that writes content lines to any `Write` implementer.
#[derive(Debug)]
pub struct Formatter<W: Write> {
    writer: W,
    options: FormatOptions,
}

impl<W: Write> Formatter<W> {
    /// Create a new formatter with options.
    #[must_use]
    pub fn new(writer: W, options: FormatOptions) -> Self {
        Self { writer, options }
    }

    /// Write an `ICalendar` to the underlying writer.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write(&mut self, calendar: &ICalendar) -> io::Result<()> {
        self.write_line(KW_BEGIN, &[], KW_VCALENDAR)?;
        self.write_line(KW_VERSION, &[], &calendar.version)?;
        self.write_line(KW_PRODID, &[], &escape_text(&calendar.prod_id))?;
        for event in &calendar.components {
            self.write_event(event)?;
        }
        self.write_line(KW_END, &[], KW_VCALENDAR)?;
        self.writer.flush()
    }

    fn write_event(&mut self, event: &VEvent) -> io::Result<()> {
        self.write_line(KW_BEGIN, &[], KW_VEVENT)?;
        self.write_line(KW_UID, &[], &escape_text(&event.uid))?;
        if let Some(dt_stamp) = &event.dt_stamp {
            self.write_line(KW_DTSTAMP, &[], &dt_stamp.to_string())?;
        }
        if let Some(summary) = &event.summary {
            self.write_line(KW_SUMMARY, &[], &escape_text(summary))?;
        }
        if let Some(start) = &event.dt_start {
            self.write_date_or_date_time(KW_DTSTART, start, event.tz_id.as_deref())?;
        }
        if let Some(end) = &event.dt_end {
            self.write_date_or_date_time(KW_DTEND, end, event.tz_id.as_deref())?;
        }
        if let Some(duration) = &event.duration {
            self.write_line(KW_DURATION, &[], duration)?;
        }
        if let Some(rrule) = &event.rrule {
            self.write_line(KW_RRULE, &[], &rrule.to_string())?;
        }
        self.write_line(KW_END, &[], KW_VEVENT)
    }

    fn write_date_or_date_time(
        &mut self,
        name: &str,
        value: &DateOrDateTime,
        tz_id: Option<&str>,
    ) -> io::Result<()> {
        match value {
            DateOrDateTime::Date(date) => {
                self.write_line(name, &[(KW_VALUE, KW_DATE)], &date.to_string())
            }
            DateOrDateTime::DateTime(dt) => match tz_id {
                Some(tz_id) if !dt.is_utc() => {
                    self.write_line(name, &[(KW_TZID, tz_id)], &dt.to_string())
                }
                _ => self.write_line(name, &[], &dt.to_string()),
            },
        }
    }

    /// Write one content line, folding it at the configured width.
    ///
    /// Folds never split a UTF-8 sequence.
    fn write_line(&mut self, name: &str, params: &[(&str, &str)], value: &str) -> io::Result<()> {
        let mut line = String::with_capacity(name.len() + value.len() + 1);
        line.push_str(name);
        for (key, val) in params {
            line.push(';');
            line.push_str(key);
            line.push('=');
            line.push_str(val);
        }
        line.push(':');
        line.push_str(value);

        let Some(max_len) = self.options.folding.filter(|&n| n > 1) else {
            // Folding disabled, write directly
            self.writer.write_all(line.as_bytes())?;
            return self.writer.write_all(b"\r\n");
        };

        let mut width = 0;
        for c in line.chars() {
            let len = c.len_utf8();
            if width + len > max_len {
                self.writer.write_all(FOLD)?;
                width = 1; // the continuation whitespace
            }
            let mut buf = [0; 4];
            self.writer.write_all(c.encode_utf8(&mut buf).as_bytes())?;
            width += len;
        }
        self.writer.write_all(b"\r\n")
    }
}
