// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Strongly-typed calendar objects built from the raw component tree.
//!
//! Only `VCALENDAR` and `VEVENT` are modelled. Other components (`VTIMEZONE`,
//! `VALARM`, `VTODO`, ...) and unknown properties are skipped so that events
//! written by other clients can still be read.

use crate::keyword::{
    KW_DATE, KW_DTEND, KW_DTSTAMP, KW_DTSTART, KW_DURATION, KW_PRODID, KW_RRULE, KW_SUMMARY,
    KW_TZID, KW_UID, KW_VALUE, KW_VCALENDAR, KW_VERSION, KW_VERSION_2_0, KW_VEVENT,
};
use crate::syntax::{ContentLine, SyntaxComponent};
use crate::value::{
    DateOrDateTime, ValueDate, ValueDateTime, ValueError, ValueRecurrenceRule, unescape_text,
};

/// Default product identifier for calendars created by this crate.
pub const DEFAULT_PROD_ID: &str = "-//yzx9.xyz//duesync//EN";

/// Errors raised while interpreting the component tree.
#[derive(Debug, thiserror::Error)]
pub enum SemanticError {
    /// A property value could not be parsed.
    #[error("line {line}: {property}: {source}")]
    InvalidValue {
        /// Line of the property
        line: usize,
        /// Property name
        property: String,
        /// Underlying value error
        #[source]
        source: ValueError,
    },

    /// A required property is missing.
    #[error("{component} is missing required property {property}")]
    MissingProperty {
        /// Component name
        component: &'static str,
        /// Property name
        property: &'static str,
    },

    /// The tree does not have the expected shape.
    #[error("invalid structure: {0}")]
    InvalidStructure(String),
}

/// Main iCalendar object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ICalendar {
    /// Product identifier that generated the iCalendar data
    pub prod_id: String,
    /// Version of iCalendar specification
    pub version: String,
    /// Events in source order
    pub components: Vec<VEvent>,
}

impl ICalendar {
    /// Create a new empty `ICalendar` with default PRODID and VERSION
    #[must_use]
    pub fn new() -> Self {
        Self {
            prod_id: DEFAULT_PROD_ID.to_string(),
            version: KW_VERSION_2_0.to_string(),
            components: Vec::new(),
        }
    }

    /// Create a calendar holding a single event.
    #[must_use]
    pub fn with_event(event: VEvent) -> Self {
        let mut cal = Self::new();
        cal.components.push(event);
        cal
    }

    /// The first event, if any.
    #[must_use]
    pub fn first_event(&self) -> Option<&VEvent> {
        self.components.first()
    }
}

impl Default for ICalendar {
    fn default() -> Self {
        Self::new()
    }
}

/// Event component (VEVENT)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VEvent {
    /// Unique identifier for the event
    pub uid: String,

    /// Date/time the event representation was created
    pub dt_stamp: Option<ValueDateTime>,

    /// Date/time the event starts
    pub dt_start: Option<DateOrDateTime>,

    /// Date/time the event ends (exclusive)
    pub dt_end: Option<DateOrDateTime>,

    /// Raw duration of the event (alternative to `dt_end`)
    pub duration: Option<String>,

    /// Summary/title of the event
    pub summary: Option<String>,

    /// Recurrence rule
    pub rrule: Option<ValueRecurrenceRule>,

    /// Timezone identifier of `DTSTART`
    pub tz_id: Option<String>,
}

impl VEvent {
    /// Create an event with only a UID.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            dt_stamp: None,
            dt_start: None,
            dt_end: None,
            duration: None,
            summary: None,
            rrule: None,
            tz_id: None,
        }
    }
}

/// Interpret the component tree as iCalendar objects.
///
/// ## Errors
///
/// Returns an error if a root is not `VCALENDAR`, an event lacks a UID, or a
/// date value is malformed.
pub fn semantic_analysis(roots: Vec<SyntaxComponent>) -> Result<Vec<ICalendar>, SemanticError> {
    roots.into_iter().map(parse_icalendar).collect()
}

fn parse_icalendar(comp: SyntaxComponent) -> Result<ICalendar, SemanticError> {
    if comp.name != KW_VCALENDAR {
        return Err(SemanticError::InvalidStructure(format!(
            "expected VCALENDAR component, got '{}'",
            comp.name
        )));
    }

    let prod_id = comp
        .property(KW_PRODID)
        .map(|p| unescape_text(&p.value))
        .unwrap_or_default();
    let version = comp
        .property(KW_VERSION)
        .map_or_else(|| KW_VERSION_2_0.to_string(), |p| p.value.trim().to_string());

    let components = comp
        .children
        .iter()
        .filter(|child| child.name == KW_VEVENT)
        .map(parse_vevent)
        .collect::<Result<_, _>>()?;

    Ok(ICalendar {
        prod_id,
        version,
        components,
    })
}

fn parse_vevent(comp: &SyntaxComponent) -> Result<VEvent, SemanticError> {
    let mut event = VEvent::new(String::new());
    let mut has_uid = false;

    for prop in &comp.properties {
        match prop.name.to_ascii_uppercase().as_str() {
            KW_UID => {
                event.uid = unescape_text(prop.value.trim());
                has_uid = true;
            }
            KW_DTSTAMP => match date_or_date_time(prop)? {
                DateOrDateTime::DateTime(dt) => event.dt_stamp = Some(dt),
                DateOrDateTime::Date(_) => {
                    return Err(invalid(prop, ValueError::DateTime(prop.value.clone())));
                }
            },
            KW_DTSTART => {
                event.dt_start = Some(date_or_date_time(prop)?);
                event.tz_id = prop.parameter(KW_TZID).map(str::to_string);
            }
            KW_DTEND => event.dt_end = Some(date_or_date_time(prop)?),
            KW_DURATION => event.duration = Some(prop.value.trim().to_string()),
            KW_SUMMARY => event.summary = Some(unescape_text(&prop.value)),
            // Only FREQ/INTERVAL/COUNT are understood, anything else reads as no rule
            KW_RRULE => event.rrule = prop.value.trim().parse().ok(),
            _ => {}
        }
    }

    if !has_uid {
        return Err(SemanticError::MissingProperty {
            component: KW_VEVENT,
            property: KW_UID,
        });
    }
    Ok(event)
}

fn date_or_date_time(prop: &ContentLine) -> Result<DateOrDateTime, SemanticError> {
    let value = prop.value.trim();
    let is_date = match prop.parameter(KW_VALUE) {
        Some(kind) => kind.eq_ignore_ascii_case(KW_DATE),
        None => !value.contains('T'),
    };

    if is_date {
        ValueDate::parse(value)
            .map(DateOrDateTime::Date)
            .map_err(|e| invalid(prop, e))
    } else {
        ValueDateTime::parse(value)
            .map(DateOrDateTime::DateTime)
            .map_err(|e| invalid(prop, e))
    }
}

fn invalid(prop: &ContentLine, source: ValueError) -> SemanticError {
    SemanticError::InvalidValue {
        line: prop.line,
        property: prop.name.clone(),
        source,
    }
}
