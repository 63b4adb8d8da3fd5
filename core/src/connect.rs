// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Locating the target calendar and choosing how to write to it.

use async_trait::async_trait;
use duesync_caldav::{CalDavClient, CalDavConfig, CalendarCollection, Url};

use crate::backend::{CalendarBackend, RawUploadBackend, StructuredBackend};
use crate::config::{CalendarConfig, WriteBackendKind};
use crate::error::ConnectError;

/// Path segment that separates the DAV root from a calendar path.
pub const CALENDARS_SEGMENT: &str = "/calendars/";

/// Produces a backend for the target calendar, once per cycle.
#[async_trait]
pub trait CalendarConnector: Send + Sync {
    /// Locates the calendar and picks a write strategy.
    async fn connect(&self) -> Result<Box<dyn CalendarBackend>, ConnectError>;
}

/// A calendar URL split into the server's DAV root and the calendar path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarUrl {
    /// URL everything else is resolved against.
    pub dav_root: String,

    /// `/calendars/...` path fragment without trailing slash, if the URL had one.
    pub calendar_path: Option<String>,

    /// Absolute path of the parent of the calendar, used when discovery finds no home set.
    pub home_path: String,
}

impl CalendarUrl {
    /// Splits `url` at the first `/calendars/` segment of its path.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::InvalidUrl`] if `url` is not an absolute URL.
    pub fn parse(url: &str) -> Result<Self, ConnectError> {
        let parsed = Url::parse(url).map_err(|e| ConnectError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let path = parsed.path();
        let (Some((_, rest)), Some((root, _))) = (
            path.split_once(CALENDARS_SEGMENT),
            url.split_once(CALENDARS_SEGMENT),
        ) else {
            return Ok(Self {
                dav_root: url.to_string(),
                calendar_path: None,
                home_path: String::new(),
            });
        };

        let calendar_path = format!("{CALENDARS_SEGMENT}{}", rest.trim_end_matches('/'));
        let home_path = match path.trim_end_matches('/').rsplit_once('/') {
            Some((parent, _)) => format!("{parent}/"),
            None => String::new(),
        };

        Ok(Self {
            dav_root: root.to_string(),
            calendar_path: Some(calendar_path),
            home_path,
        })
    }
}

/// Picks the calendar matching the configured path fragment or name.
///
/// Each collection is checked in order against the path fragment first, then
/// the display name and the last path segment.
#[must_use]
pub fn select_calendar<'a>(
    calendars: &'a [CalendarCollection],
    calendar_path: Option<&str>,
    name: Option<&str>,
) -> Option<&'a CalendarCollection> {
    calendars.iter().find(|calendar| {
        if calendar_path.is_some_and(|path| calendar.href.contains(path.trim_end_matches('/'))) {
            tracing::info!(href = %calendar.href, "matched calendar by path");
            return true;
        }

        let Some(name) = name else {
            return false;
        };
        let segment = calendar.href.trim_end_matches('/').rsplit('/').next();
        if calendar.display_name.as_deref() == Some(name) || segment == Some(name) {
            tracing::info!(href = %calendar.href, name, "matched calendar by name");
            return true;
        }
        false
    })
}

/// `CalDAV` connection settings derived from the calendar configuration.
#[derive(Debug, Clone)]
pub struct DavConnector {
    config: CalendarConfig,
    kind: WriteBackendKind,
}

impl DavConnector {
    /// Creates a connector for the configured calendar.
    #[must_use]
    pub const fn new(config: CalendarConfig, kind: WriteBackendKind) -> Self {
        Self { config, kind }
    }

    fn client(&self, url: &CalendarUrl) -> Result<CalDavClient, ConnectError> {
        let config = CalDavConfig {
            base_url: url.dav_root.clone(),
            calendar_home: url.home_path.clone(),
            auth: self.config.auth(),
            ..CalDavConfig::default()
        };
        Ok(CalDavClient::new(config)?)
    }

    /// Lists every calendar below the discovered calendar home.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery or listing fails.
    #[tracing::instrument(skip(self), fields(url = %self.config.url))]
    pub async fn list_calendars(&self) -> Result<Vec<CalendarCollection>, ConnectError> {
        let url = CalendarUrl::parse(&self.config.url)?;
        let client = self.client(&url)?;
        Self::discover_calendars(&client).await
    }

    async fn discover_calendars(
        client: &CalDavClient,
    ) -> Result<Vec<CalendarCollection>, ConnectError> {
        let discovered = client.discover().await?;
        let calendars = client.list_calendars(&discovered.calendar_home).await?;
        tracing::info!(
            home = %discovered.calendar_home,
            count = calendars.len(),
            "found calendars"
        );
        for calendar in &calendars {
            tracing::info!(
                href = %calendar.href,
                name = calendar.display_name.as_deref().unwrap_or(""),
                "calendar"
            );
        }
        Ok(calendars)
    }

    async fn select_kind(
        &self,
        client: &CalDavClient,
        calendar: &CalendarCollection,
    ) -> WriteBackendKind {
        match self.kind {
            WriteBackendKind::Auto => match client.supports_calendar_access(&calendar.href).await {
                Ok(true) => WriteBackendKind::Structured,
                Ok(false) => WriteBackendKind::Raw,
                Err(err) => {
                    tracing::warn!(%err, "capability probe failed, using raw upload");
                    WriteBackendKind::Raw
                }
            },
            kind => kind,
        }
    }
}

#[async_trait]
impl CalendarConnector for DavConnector {
    #[tracing::instrument(skip(self), fields(url = %self.config.url))]
    async fn connect(&self) -> Result<Box<dyn CalendarBackend>, ConnectError> {
        let url = CalendarUrl::parse(&self.config.url)?;
        tracing::info!(
            dav_root = %url.dav_root,
            path = ?url.calendar_path,
            "connecting to CalDAV server"
        );

        let client = self.client(&url)?;
        let calendars = Self::discover_calendars(&client).await?;
        let name = self.config.name.as_deref();
        let Some(calendar) = select_calendar(&calendars, url.calendar_path.as_deref(), name) else {
            return Err(ConnectError::CalendarNotFound {
                path: url.calendar_path,
                name: self.config.name.clone(),
            });
        };

        let kind = self.select_kind(&client, calendar).await;
        tracing::info!(href = %calendar.href, backend = %kind, "using calendar");
        let href = calendar.href.clone();
        let backend: Box<dyn CalendarBackend> = match kind {
            WriteBackendKind::Raw => Box::new(RawUploadBackend::new(client, href)),
            WriteBackendKind::Structured | WriteBackendKind::Auto => {
                Box::new(StructuredBackend::new(client, href))
            }
        };
        Ok(backend)
    }
}
