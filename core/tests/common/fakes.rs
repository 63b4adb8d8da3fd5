// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory stand-ins for the `WebDAV` source and the `CalDAV` calendar.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use duesync_caldav::{CalDavError, CalendarResource, Href};
use duesync_core::{
    BackendError, CalendarBackend, CalendarConnector, ConnectError, RemoteEvent, SourceFetcher,
    resource_href,
};
use duesync_ical::{ICalendar, formatter, parse};

/// Source files by URL, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct FakeSource {
    files: Arc<Mutex<HashMap<String, String>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl FakeSource {
    pub fn with_file(url: &str, text: impl Into<String>) -> Self {
        let source = Self::default();
        source.put(url, text);
        source
    }

    pub fn put(&self, url: &str, text: impl Into<String>) {
        lock(&self.files).insert(url.to_string(), text.into());
    }

    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl SourceFetcher for FakeSource {
    async fn fetch(&self, url: &str) -> Result<String, CalDavError> {
        lock(&self.requests).push(url.to_string());
        lock(&self.files)
            .get(url)
            .cloned()
            .ok_or_else(|| CalDavError::NotFound(Href::from(url)))
    }
}

#[derive(Debug, Default)]
struct CalendarState {
    /// Stored iCalendar text by UID.
    events: BTreeMap<String, String>,
    writes: Vec<String>,
    failing_writes: HashSet<String>,
    failing_lookups: HashSet<String>,
}

/// A calendar that keeps formatted event text in memory.
///
/// Events go through the real formatter and parser so reconciliation sees
/// exactly what a server would return.
#[derive(Debug, Clone, Default)]
pub struct MemoryCalendar {
    state: Arc<Mutex<CalendarState>>,
}

#[allow(dead_code)]
impl MemoryCalendar {
    pub const HREF: &'static str = "/dav/calendars/me/tasks/";

    /// Stores raw event text as if another client had written it.
    pub fn insert_raw(&self, uid: &str, text: &str) {
        lock(&self.state)
            .events
            .insert(uid.to_string(), text.to_string());
    }

    pub fn event_text(&self, uid: &str) -> Option<String> {
        lock(&self.state).events.get(uid).cloned()
    }

    pub fn uids(&self) -> Vec<String> {
        lock(&self.state).events.keys().cloned().collect()
    }

    /// UIDs written so far, in order.
    pub fn writes(&self) -> Vec<String> {
        lock(&self.state).writes.clone()
    }

    pub fn fail_writes_for(&self, uid: &str) {
        lock(&self.state).failing_writes.insert(uid.to_string());
    }

    pub fn fail_lookups_for(&self, uid: &str) {
        lock(&self.state).failing_lookups.insert(uid.to_string());
    }
}

#[async_trait]
impl CalendarBackend for MemoryCalendar {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find(&self, uid: &str) -> Result<Option<RemoteEvent>, BackendError> {
        let state = lock(&self.state);
        if state.failing_lookups.contains(uid) {
            return Err(BackendError::Lookup {
                uid: uid.to_string(),
                source: CalDavError::Status {
                    status: 500,
                    url: href_for(uid).to_string(),
                    body: String::new(),
                },
            });
        }

        let Some(text) = state.events.get(uid) else {
            return Ok(None);
        };
        let data = parse(text)
            .map_err(|err| BackendError::Lookup {
                uid: uid.to_string(),
                source: err.into(),
            })?
            .into_iter()
            .next()
            .unwrap_or_default();

        let resource = CalendarResource::new(href_for(uid), None, data);
        Ok(Some(RemoteEvent::from_resource(resource, uid)))
    }

    async fn upsert(
        &self,
        uid: &str,
        calendar: &ICalendar,
        _existing: Option<&RemoteEvent>,
    ) -> Result<(), BackendError> {
        let mut state = lock(&self.state);
        if state.failing_writes.contains(uid) {
            return Err(BackendError::Write {
                uid: uid.to_string(),
                source: CalDavError::PreconditionFailed(href_for(uid)),
            });
        }

        let text = formatter::format(calendar).expect("format event");
        state.events.insert(uid.to_string(), text);
        state.writes.push(uid.to_string());
        Ok(())
    }
}

/// Hands out a [`MemoryCalendar`], or fails like an unreachable server.
#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    pub calendar: MemoryCalendar,
    pub unreachable: bool,
    connects: Arc<Mutex<usize>>,
}

#[allow(dead_code)]
impl FakeConnector {
    pub fn new(calendar: MemoryCalendar) -> Self {
        Self {
            calendar,
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn connects(&self) -> usize {
        *lock(&self.connects)
    }
}

#[async_trait]
impl CalendarConnector for FakeConnector {
    async fn connect(&self) -> Result<Box<dyn CalendarBackend>, ConnectError> {
        *lock(&self.connects) += 1;
        if self.unreachable {
            return Err(ConnectError::CalendarNotFound {
                path: Some("/calendars/me/tasks".to_string()),
                name: Some("Tasks".to_string()),
            });
        }
        Ok(Box::new(self.calendar.clone()))
    }
}

fn href_for(uid: &str) -> Href {
    resource_href(&Href::from(MemoryCalendar::HREF), uid)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().expect("lock poisoned")
}
