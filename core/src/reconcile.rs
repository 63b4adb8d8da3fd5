// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::due::NormalizedDue;
use crate::remote::RemoteEvent;

/// What to do with one task in this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncDecision {
    /// No event exists yet.
    Create,

    /// The event exists but its start or summary is out of date.
    Update,

    /// The event is up to date.
    Skip,
}

impl fmt::Display for SyncDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Skip => "skip",
        })
    }
}

/// Compares a task against its existing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler;

impl Reconciler {
    /// Decides between create, update and skip.
    ///
    /// The event is out of date when the start differs in value or kind, the
    /// start is missing, or the summary differs (case-sensitive). Recurrence
    /// is not compared.
    #[must_use]
    pub fn decide(due: &NormalizedDue, title: &str, existing: Option<&RemoteEvent>) -> SyncDecision {
        let Some(event) = existing else {
            return SyncDecision::Create;
        };

        let start_changed = event.start.as_ref() != Some(due);
        let summary_changed = event.summary.as_deref() != Some(title);
        if start_changed || summary_changed {
            tracing::debug!(
                uid = %event.uid,
                start_changed,
                summary_changed,
                kind_changed = event.start.is_some_and(|s| !s.same_kind(due)),
                "event out of date"
            );
            SyncDecision::Update
        } else {
            SyncDecision::Skip
        }
    }
}
