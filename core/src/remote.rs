// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use duesync_caldav::{CalendarResource, ETag, Href};
use duesync_ical::{DateOrDateTime, VEvent};
use jiff::tz::TimeZone;

use crate::due::NormalizedDue;

/// Prefix of every event UID written by duesync.
pub const UID_PREFIX: &str = "super-productivity";

/// The deterministic event UID of a task.
#[must_use]
pub fn uid_for(task_id: &str) -> String {
    format!("{UID_PREFIX}-{task_id}")
}

/// Where an existing event lives on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLocation {
    /// Resource href.
    pub href: Href,

    /// Entity tag of the fetched version, if the server sent one.
    pub etag: Option<ETag>,
}

/// The fields of an existing calendar event that reconciliation looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEvent {
    /// Event UID.
    pub uid: String,

    /// Normalized DTSTART, `None` if missing or out of range.
    pub start: Option<NormalizedDue>,

    /// SUMMARY, if any.
    pub summary: Option<String>,

    /// Server location of the event.
    pub location: EventLocation,
}

impl RemoteEvent {
    /// Reads the event with `uid` from a fetched resource.
    ///
    /// Falls back to the first VEVENT when none carries the UID, and to an
    /// empty event when the resource holds no VEVENT at all.
    #[must_use]
    pub fn from_resource(resource: CalendarResource, uid: &str) -> Self {
        let event = resource
            .data
            .components
            .iter()
            .find(|e| e.uid == uid)
            .or_else(|| resource.data.first_event());

        let location = EventLocation {
            href: resource.href.clone(),
            etag: resource.etag.clone(),
        };

        match event {
            Some(event) => Self::from_event(event, location),
            None => {
                tracing::warn!(href = %resource.href, "no VEVENT in existing resource");
                Self {
                    uid: uid.to_string(),
                    start: None,
                    summary: None,
                    location,
                }
            }
        }
    }

    /// Reads an event at a known location.
    #[must_use]
    pub fn from_event(event: &VEvent, location: EventLocation) -> Self {
        Self {
            uid: event.uid.clone(),
            start: event
                .dt_start
                .as_ref()
                .and_then(|start| normalize_start(start, event.tz_id.as_deref())),
            summary: event.summary.clone(),
            location,
        }
    }
}

/// Normalizes a DTSTART value.
///
/// UTC date-times are taken as is, `TZID` values are converted through the
/// tz database, and floating values or unknown zones are read as UTC.
#[must_use]
pub fn normalize_start(value: &DateOrDateTime, tz_id: Option<&str>) -> Option<NormalizedDue> {
    let dt = match value {
        DateOrDateTime::Date(date) => return Some(NormalizedDue::AllDay(date.civil_date())),
        DateOrDateTime::DateTime(dt) => dt,
    };

    let tz = match tz_id {
        Some(name) if !dt.is_utc() => TimeZone::get(name).unwrap_or_else(|err| {
            tracing::debug!(tz = name, %err, "unknown time zone, reading as UTC");
            TimeZone::UTC
        }),
        _ => TimeZone::UTC,
    };

    dt.civil_date_time()
        .to_zoned(tz)
        .ok()
        .map(|zoned| NormalizedDue::Instant(zoned.timestamp()))
}

#[cfg(test)]
mod tests {
    use duesync_ical::{ICalendar, ValueDate, ValueDateTime};
    use jiff::Timestamp;
    use jiff::civil::date;

    use super::*;

    fn location() -> EventLocation {
        EventLocation {
            href: Href::from("/cal/e.ics"),
            etag: None,
        }
    }

    #[test]
    fn uid_is_deterministic() {
        assert_eq!(uid_for("t1"), "super-productivity-t1");
        assert_eq!(uid_for("t1"), uid_for("t1"));
    }

    #[test]
    fn date_start_is_all_day() {
        let value = DateOrDateTime::Date(ValueDate::parse("20240301").unwrap());
        assert_eq!(
            normalize_start(&value, None),
            Some(NormalizedDue::AllDay(date(2024, 3, 1)))
        );
    }

    #[test]
    fn utc_and_floating_starts_are_equal() {
        let expected: Timestamp = "2024-03-01T12:00:00Z".parse().unwrap();
        for text in ["20240301T120000Z", "20240301T120000"] {
            let value = DateOrDateTime::DateTime(ValueDateTime::parse(text).unwrap());
            assert_eq!(
                normalize_start(&value, None),
                Some(NormalizedDue::Instant(expected)),
                "{text}"
            );
        }
    }

    #[test]
    fn tzid_start_is_converted() {
        let value = DateOrDateTime::DateTime(ValueDateTime::parse("20240301T130000").unwrap());
        assert_eq!(
            normalize_start(&value, Some("Europe/Berlin")),
            Some(NormalizedDue::Instant("2024-03-01T12:00:00Z".parse().unwrap()))
        );
    }

    #[test]
    fn unknown_tzid_reads_as_utc() {
        let value = DateOrDateTime::DateTime(ValueDateTime::parse("20240301T130000").unwrap());
        assert_eq!(
            normalize_start(&value, Some("Mars/Olympus_Mons")),
            Some(NormalizedDue::Instant("2024-03-01T13:00:00Z".parse().unwrap()))
        );
    }

    #[test]
    fn from_resource_picks_matching_uid() {
        let mut other = VEvent::new("someone-else");
        other.summary = Some("Other".to_string());
        let mut ours = VEvent::new("super-productivity-t1");
        ours.summary = Some("Pay rent".to_string());
        ours.dt_start = Some(DateOrDateTime::Date(ValueDate::parse("20240301").unwrap()));

        let mut data = ICalendar::with_event(other);
        data.components.push(ours);
        let resource = CalendarResource {
            href: Href::from("/cal/e.ics"),
            etag: Some(ETag::from("\"1\"")),
            data,
        };

        let event = RemoteEvent::from_resource(resource, "super-productivity-t1");
        assert_eq!(event.uid, "super-productivity-t1");
        assert_eq!(event.summary.as_deref(), Some("Pay rent"));
        assert_eq!(event.start, Some(NormalizedDue::AllDay(date(2024, 3, 1))));
        assert_eq!(event.location.etag, Some(ETag::from("\"1\"")));
    }

    #[test]
    fn from_resource_without_event_has_no_start() {
        let resource = CalendarResource {
            href: Href::from("/cal/e.ics"),
            etag: None,
            data: ICalendar::new(),
        };

        let event = RemoteEvent::from_resource(resource, "super-productivity-t1");
        assert_eq!(event.start, None);
        assert_eq!(event.summary, None);
        assert_eq!(event.location, location());
    }
}
