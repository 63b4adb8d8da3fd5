// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Strategies for reading and writing events in the target calendar.

use async_trait::async_trait;
use duesync_caldav::{CalDavClient, Href, Precondition};
use duesync_ical::ICalendar;

use crate::error::BackendError;
use crate::remote::RemoteEvent;

/// Event lookup and write access to one calendar.
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Looks up the event with `uid`, `Ok(None)` when there is none.
    async fn find(&self, uid: &str) -> Result<Option<RemoteEvent>, BackendError>;

    /// Creates or replaces the event with `uid`.
    async fn upsert(
        &self,
        uid: &str,
        calendar: &ICalendar,
        existing: Option<&RemoteEvent>,
    ) -> Result<(), BackendError>;
}

/// The resource name of an event written by duesync.
#[must_use]
pub fn resource_href(calendar: &Href, uid: &str) -> Href {
    calendar.join(&format!("{uid}.ics"))
}

/// Finds events with a UID calendar-query and writes them with conditional PUTs.
#[derive(Debug, Clone)]
pub struct StructuredBackend {
    client: CalDavClient,
    calendar: Href,
}

impl StructuredBackend {
    /// Creates a backend for the calendar collection at `calendar`.
    #[must_use]
    pub const fn new(client: CalDavClient, calendar: Href) -> Self {
        Self { client, calendar }
    }
}

#[async_trait]
impl CalendarBackend for StructuredBackend {
    fn name(&self) -> &'static str {
        "structured"
    }

    async fn find(&self, uid: &str) -> Result<Option<RemoteEvent>, BackendError> {
        match self.client.find_by_uid(&self.calendar, uid).await {
            Ok(resource) => Ok(resource.map(|r| RemoteEvent::from_resource(r, uid))),
            Err(err) if err.is_not_found() => Ok(None),
            Err(source) => Err(BackendError::Lookup {
                uid: uid.to_string(),
                source,
            }),
        }
    }

    async fn upsert(
        &self,
        uid: &str,
        calendar: &ICalendar,
        existing: Option<&RemoteEvent>,
    ) -> Result<(), BackendError> {
        let (href, precondition) = match existing {
            Some(event) => (
                event.location.href.clone(),
                event
                    .location
                    .etag
                    .clone()
                    .map_or(Precondition::None, Precondition::IfMatch),
            ),
            None => (resource_href(&self.calendar, uid), Precondition::IfNoneMatch),
        };

        let etag = self
            .client
            .put_event(&href, calendar, precondition)
            .await
            .map_err(|source| BackendError::Write {
                uid: uid.to_string(),
                source,
            })?;
        tracing::debug!(%href, ?etag, "event saved");
        Ok(())
    }
}

/// Reads and uploads `<calendar>/<uid>.ics` directly.
#[derive(Debug, Clone)]
pub struct RawUploadBackend {
    client: CalDavClient,
    calendar: Href,
}

impl RawUploadBackend {
    /// Creates a backend for the calendar collection at `calendar`.
    #[must_use]
    pub const fn new(client: CalDavClient, calendar: Href) -> Self {
        Self { client, calendar }
    }
}

#[async_trait]
impl CalendarBackend for RawUploadBackend {
    fn name(&self) -> &'static str {
        "raw"
    }

    async fn find(&self, uid: &str) -> Result<Option<RemoteEvent>, BackendError> {
        let href = resource_href(&self.calendar, uid);
        match self.client.get_event(&href).await {
            Ok(resource) => Ok(Some(RemoteEvent::from_resource(resource, uid))),
            Err(err) if err.is_not_found() => Ok(None),
            Err(source) => Err(BackendError::Lookup {
                uid: uid.to_string(),
                source,
            }),
        }
    }

    async fn upsert(
        &self,
        uid: &str,
        calendar: &ICalendar,
        _existing: Option<&RemoteEvent>,
    ) -> Result<(), BackendError> {
        let href = resource_href(&self.calendar, uid);
        self.client
            .put_event(&href, calendar, Precondition::None)
            .await
            .map_err(|source| BackendError::Write {
                uid: uid.to_string(),
                source,
            })?;
        tracing::debug!(%href, "event uploaded");
        Ok(())
    }
}
