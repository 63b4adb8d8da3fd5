// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};

/// Title used for tasks that have none.
pub const DEFAULT_TITLE: &str = "Untitled Task";

/// A task entity from the Super Productivity export.
///
/// Falsy raw values (`0`, `""`, `null`) are read as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Task identifier, overwritten by the entity key when read from a [`TaskMap`].
    #[serde(default)]
    pub id: String,

    /// Task title, [`TaskRecord::title`] falls back to [`DEFAULT_TITLE`].
    #[serde(default)]
    pub title: Option<String>,

    /// Due day as `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "non_empty_string")]
    pub due_day: Option<String>,

    /// Due instant in epoch milliseconds.
    #[serde(default, deserialize_with = "epoch_millis")]
    pub due_with_time: Option<i64>,

    /// Parent task, set for subtasks.
    #[serde(default, deserialize_with = "non_empty_string")]
    pub parent_id: Option<String>,

    /// Repeat configuration.
    #[serde(default)]
    pub repeat: Option<RepeatConfig>,

    /// Repeat configuration, as written by some export versions.
    #[serde(default)]
    pub repeat_cfg: Option<RepeatConfig>,

    /// Reminder marker.
    #[serde(default, deserialize_with = "non_empty_string")]
    pub reminder_id: Option<String>,
}

impl TaskRecord {
    /// The title, or [`DEFAULT_TITLE`] when missing.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    /// The title as written to SUMMARY, with CRLF and lone CR line breaks
    /// turned into LF. TEXT values cannot carry a CR.
    #[must_use]
    pub fn summary(&self) -> Cow<'_, str> {
        let title = self.title();
        if title.contains('\r') {
            Cow::Owned(title.replace("\r\n", "\n").replace('\r', "\n"))
        } else {
            Cow::Borrowed(title)
        }
    }

    /// Whether this task belongs to another task.
    #[must_use]
    pub const fn is_subtask(&self) -> bool {
        self.parent_id.is_some()
    }

    /// The repeat configuration, `repeat` taking precedence over `repeatCfg`.
    #[must_use]
    pub fn repeat_config(&self) -> Option<&RepeatConfig> {
        self.repeat.as_ref().or(self.repeat_cfg.as_ref())
    }
}

/// How a task repeats.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RepeatConfig {
    /// A flat tag such as `"daily"`.
    Tag(String),

    /// A structured object carrying the frequency in `freq` or `repeatCycle`.
    Structured(Map<String, Value>),

    /// Anything else, never mapped to a recurrence.
    Unsupported(Value),
}

impl RepeatConfig {
    /// The frequency tag, uppercased. Not checked against any whitelist.
    #[must_use]
    pub fn frequency_tag(&self) -> Option<String> {
        let tag = match self {
            Self::Tag(tag) => tag.as_str(),
            Self::Structured(obj) => ["freq", "repeatCycle"]
                .iter()
                .find_map(|key| obj.get(*key).and_then(Value::as_str).filter(|s| !s.is_empty()))?,
            Self::Unsupported(_) => return None,
        };
        Some(tag.trim().to_ascii_uppercase())
    }
}

/// The canonical task collection, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskMap {
    tasks: Vec<TaskRecord>,
}

impl TaskMap {
    /// Reads the `entities` mapping of a task state object.
    ///
    /// Entities that fail to deserialise are logged and left out.
    #[must_use]
    pub fn from_task_state(state: &Value) -> Self {
        let Some(entities) = state.get("entities").and_then(Value::as_object) else {
            tracing::warn!("task state has no entities object");
            return Self::default();
        };

        let tasks = entities
            .iter()
            .filter_map(|(id, entity)| match TaskRecord::deserialize(entity) {
                Ok(mut task) => {
                    task.id.clone_from(id);
                    Some(task)
                }
                Err(err) => {
                    tracing::warn!(task_id = %id, %err, "skipping malformed task");
                    None
                }
            })
            .collect();

        Self { tasks }
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether there are no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterates over the tasks in document order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.iter()
    }
}

impl FromIterator<TaskRecord> for TaskMap {
    fn from_iter<I: IntoIterator<Item = TaskRecord>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[allow(clippy::cast_possible_truncation)]
fn epoch_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Number>::deserialize(deserializer)?;
    Ok(value
        .and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)))
        .filter(|ms| *ms != 0))
}
