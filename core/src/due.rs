// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use jiff::{Timestamp, civil};

use crate::task::TaskRecord;

/// When a task is due, either a point in time or a whole day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizedDue {
    /// A UTC-anchored instant, compared after normalizing any offset away.
    Instant(Timestamp),

    /// A calendar date without time or timezone.
    AllDay(civil::Date),
}

impl NormalizedDue {
    /// Whether both values are of the same kind.
    #[must_use]
    pub const fn same_kind(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Instant(_), Self::Instant(_)) | (Self::AllDay(_), Self::AllDay(_))
        )
    }
}

impl fmt::Display for NormalizedDue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instant(ts) => ts.fmt(f),
            Self::AllDay(date) => date.fmt(f),
        }
    }
}

/// Why a task is not synchronized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Exclusion {
    /// The task has a parent.
    #[error("task is a subtask")]
    Subtask,

    /// The due day is not a `YYYY-MM-DD` date.
    #[error("invalid due day {0:?}")]
    InvalidDueDay(String),

    /// Neither a due instant nor a due day is set.
    #[error("task has no due date")]
    NoDue,
}

/// Turns task records into [`NormalizedDue`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DueNormalizer;

impl DueNormalizer {
    /// Normalizes the due information of a task.
    ///
    /// A due instant wins over a due day. Milliseconds are truncated to whole
    /// seconds, the precision calendar timestamps carry.
    ///
    /// # Errors
    ///
    /// Returns the [`Exclusion`] reason when the task is not synchronized.
    pub fn normalize(task: &TaskRecord) -> Result<NormalizedDue, Exclusion> {
        if task.is_subtask() {
            return Err(Exclusion::Subtask);
        }

        if let Some(ms) = task.due_with_time {
            if let Ok(ts) = Timestamp::from_second(ms.div_euclid(1000)) {
                return Ok(NormalizedDue::Instant(ts));
            }
            tracing::warn!(task_id = %task.id, ms, "due instant out of range, trying due day");
        }

        match &task.due_day {
            Some(day) => civil::Date::strptime("%Y-%m-%d", day.trim())
                .map(NormalizedDue::AllDay)
                .map_err(|_| Exclusion::InvalidDueDay(day.clone())),
            None => Err(Exclusion::NoDue),
        }
    }
}
