// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use duesync_ical::{
    DateOrDateTime, ICalendar, RecurrenceFrequency, VEvent, ValueDateTime, ValueRecurrenceRule,
};
use jiff::Timestamp;

use crate::due::NormalizedDue;
use crate::task::RepeatConfig;

/// Frequencies a repeat configuration may map to, everything else is dropped.
pub const SUPPORTED_FREQUENCIES: [RecurrenceFrequency; 4] = [
    RecurrenceFrequency::Daily,
    RecurrenceFrequency::Weekly,
    RecurrenceFrequency::Monthly,
    RecurrenceFrequency::Yearly,
];

/// Builds the event written for a task.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventMaterializer;

impl EventMaterializer {
    /// Builds a fresh calendar object holding the event for a task.
    ///
    /// All-day events span one day with an exclusive DTEND. Timed events carry
    /// only a UTC DTSTART, so neither DTEND nor DURATION survive an update.
    #[must_use]
    pub fn materialize(
        uid: &str,
        title: &str,
        due: &NormalizedDue,
        repeat: Option<&RepeatConfig>,
        now: Timestamp,
    ) -> ICalendar {
        let mut event = VEvent::new(uid);
        event.dt_stamp = Some(ValueDateTime::from_timestamp(now));
        event.summary = Some(title.to_string());

        match due {
            NormalizedDue::AllDay(date) => {
                event.dt_start = Some(DateOrDateTime::Date((*date).into()));
                // only fails at the end of the supported date range
                event.dt_end = date
                    .tomorrow()
                    .ok()
                    .map(|end| DateOrDateTime::Date(end.into()));
            }
            NormalizedDue::Instant(ts) => {
                event.dt_start = Some(DateOrDateTime::DateTime(ValueDateTime::from_timestamp(*ts)));
            }
        }

        event.rrule = repeat.and_then(recurrence_rule);
        ICalendar::with_event(event)
    }
}

/// Maps a repeat configuration to a frequency-only recurrence rule.
#[must_use]
pub fn recurrence_rule(repeat: &RepeatConfig) -> Option<ValueRecurrenceRule> {
    let tag = repeat.frequency_tag()?;
    let freq = tag
        .parse::<RecurrenceFrequency>()
        .ok()
        .filter(|f| SUPPORTED_FREQUENCIES.contains(f));
    if freq.is_none() {
        tracing::debug!(%tag, "dropping unsupported repeat frequency");
    }
    freq.map(ValueRecurrenceRule::new)
}
