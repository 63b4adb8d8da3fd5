// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use duesync_caldav::{CalDavError, WebDavClient};
use jiff::Timestamp;

use crate::backend::CalendarBackend;
use crate::config::Config;
use crate::connect::{CalendarConnector, DavConnector};
use crate::due::{DueNormalizer, Exclusion};
use crate::error::SyncError;
use crate::materialize::EventMaterializer;
use crate::payload::{PayloadResolver, SourceFetcher};
use crate::reconcile::{Reconciler, SyncDecision};
use crate::remote::uid_for;
use crate::task::TaskRecord;

/// Counts of what one cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Events created.
    pub created: usize,

    /// Events updated.
    pub updated: usize,

    /// Events already up to date.
    pub skipped: usize,

    /// Tasks without a usable due date, or subtasks.
    pub excluded: usize,

    /// Tasks whose lookup or write failed.
    pub failed: usize,
}

impl CycleReport {
    /// Number of events created or updated.
    #[must_use]
    pub const fn changed(&self) -> usize {
        self.created + self.updated
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} unchanged, {} excluded, {} failed",
            self.created, self.updated, self.skipped, self.excluded, self.failed
        )
    }
}

/// One pass from the task export to the calendar.
#[derive(Debug)]
pub struct SyncCycle<F, C> {
    resolver: PayloadResolver<F>,
    connector: C,
    dry_run: bool,
}

impl SyncCycle<WebDavClient, DavConnector> {
    /// Builds a cycle talking to the configured `WebDAV` and `CalDAV` servers.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn from_config(config: &Config) -> Result<Self, CalDavError> {
        let fetcher = WebDavClient::new(config.source.auth())?;
        let connector = DavConnector::new(config.calendar.clone(), config.write_backend);
        Ok(Self::new(fetcher, &config.source.url, connector))
    }
}

impl<F: SourceFetcher, C: CalendarConnector> SyncCycle<F, C> {
    /// Creates a cycle reading from `source_url` and writing through `connector`.
    pub fn new(fetcher: F, source_url: impl Into<String>, connector: C) -> Self {
        Self {
            resolver: PayloadResolver::new(fetcher, source_url),
            connector,
            dry_run: false,
        }
    }

    /// Only log decisions, never write.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Runs the cycle to completion.
    ///
    /// Tasks are processed one at a time in payload order. A failing task is
    /// logged, counted and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error, before any task is processed, if the payload cannot
    /// be resolved or the calendar cannot be connected.
    #[tracing::instrument(skip(self), fields(dry_run = self.dry_run))]
    pub async fn run(&self) -> Result<CycleReport, SyncError> {
        let tasks = self.resolver.resolve().await?;
        let backend = self.connector.connect().await?;
        tracing::info!(tasks = tasks.len(), backend = backend.name(), "checking tasks");

        let now = Timestamp::now();
        let mut report = CycleReport::default();
        for task in tasks.iter() {
            self.sync_task(backend.as_ref(), task, now, &mut report).await;
        }

        tracing::info!(
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            excluded = report.excluded,
            failed = report.failed,
            "sync complete"
        );
        Ok(report)
    }

    #[tracing::instrument(skip_all, fields(task_id = %task.id))]
    async fn sync_task(
        &self,
        backend: &dyn CalendarBackend,
        task: &TaskRecord,
        now: Timestamp,
        report: &mut CycleReport,
    ) {
        let due = match DueNormalizer::normalize(task) {
            Ok(due) => due,
            Err(reason @ Exclusion::InvalidDueDay(_)) => {
                tracing::warn!(%reason, "excluding task");
                report.excluded += 1;
                return;
            }
            Err(reason) => {
                tracing::trace!(%reason, "excluding task");
                report.excluded += 1;
                return;
            }
        };

        let uid = uid_for(&task.id);
        let existing = match backend.find(&uid).await {
            Ok(existing) => existing,
            Err(err) => {
                tracing::error!(%err, "lookup failed, skipping task");
                report.failed += 1;
                return;
            }
        };

        let summary = task.summary();
        let title = summary.as_ref();
        let decision = Reconciler::decide(&due, title, existing.as_ref());
        if decision == SyncDecision::Skip {
            tracing::debug!(%uid, "event up to date");
            report.skipped += 1;
            return;
        }

        if self.dry_run {
            tracing::info!(%uid, %decision, title, %due, "dry run, not writing");
        } else {
            let calendar =
                EventMaterializer::materialize(&uid, title, &due, task.repeat_config(), now);
            if let Err(err) = backend.upsert(&uid, &calendar, existing.as_ref()).await {
                tracing::error!(%err, %decision, "failed to save event");
                report.failed += 1;
                return;
            }
            tracing::info!(%uid, %decision, title, %due, "event saved");
        }

        match decision {
            SyncDecision::Create => report.created += 1,
            SyncDecision::Update => report.updated += 1,
            SyncDecision::Skip => report.skipped += 1,
        }
    }
}
