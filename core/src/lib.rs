// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Mirrors due tasks of a Super Productivity export into a `CalDAV` calendar.
//!
//! A [`SyncCycle`] resolves the export through [`PayloadResolver`], turns each
//! task into a [`NormalizedDue`], asks the [`Reconciler`] whether the calendar
//! is out of date and writes what the [`EventMaterializer`] builds through a
//! [`CalendarBackend`].

mod backend;
mod config;
mod connect;
mod cycle;
mod due;
mod error;
mod materialize;
mod payload;
mod reconcile;
mod remote;
mod task;

pub use crate::backend::{CalendarBackend, RawUploadBackend, StructuredBackend, resource_href};
pub use crate::config::{
    APP_NAME, CalendarConfig, Config, DEFAULT_INTERVAL_SECS, SourceConfig, WriteBackendKind, env,
};
pub use crate::connect::{CalendarConnector, CalendarUrl, DavConnector, select_calendar};
pub use crate::cycle::{CycleReport, SyncCycle};
pub use crate::due::{DueNormalizer, Exclusion, NormalizedDue};
pub use crate::error::{
    BackendError, ConfigError, ConnectError, FetchError, PayloadError, SyncError, Unrecognized,
};
pub use crate::materialize::{EventMaterializer, SUPPORTED_FREQUENCIES, recurrence_rule};
pub use crate::payload::{
    PayloadResolver, PayloadShape, SourceFetcher, candidate_urls, classify, parse_payload,
    strip_envelope,
};
pub use crate::reconcile::{Reconciler, SyncDecision};
pub use crate::remote::{EventLocation, RemoteEvent, UID_PREFIX, normalize_start, uid_for};
pub use crate::task::{DEFAULT_TITLE, RepeatConfig, TaskMap, TaskRecord};
