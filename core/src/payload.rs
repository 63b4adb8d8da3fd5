// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Fetching the task export and reading it in any of its known shapes.

use async_trait::async_trait;
use duesync_caldav::{CalDavError, WebDavClient};
use serde_json::Value;

use crate::error::{FetchError, PayloadError, Unrecognized};
use crate::task::TaskMap;

/// Marker that starts the non-JSON envelope of sync files, e.g. `pf_4.4__{...}`.
pub const ENVELOPE_MARKER: &str = "pf_";

/// Separator between the envelope and the JSON body.
pub const ENVELOPE_SEPARATOR: &str = "__";

/// Reads raw text from a source location.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetches the text at `url`.
    async fn fetch(&self, url: &str) -> Result<String, CalDavError>;
}

#[async_trait]
impl SourceFetcher for WebDavClient {
    async fn fetch(&self, url: &str) -> Result<String, CalDavError> {
        self.get_text(url).await
    }
}

/// The known layouts of a task export, each pointing at its task state object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PayloadShape<'a> {
    /// A full backup, `{"task": {"entities": ...}}`.
    Backup(&'a Value),

    /// A single task file of a sync folder, `{"entities": ...}`.
    TaskFile(&'a Value),

    /// A sync meta file, `{"mainModelData": {"task": ...}}`.
    MetaFile(&'a Value),
}

impl<'a> PayloadShape<'a> {
    /// The task state object, the one holding `entities`.
    #[must_use]
    pub const fn task_state(&self) -> &'a Value {
        match self {
            Self::Backup(v) | Self::TaskFile(v) | Self::MetaFile(v) => *v,
        }
    }
}

/// Classifies a parsed document, first matching shape wins.
///
/// # Errors
///
/// Returns [`Unrecognized`] with the top-level keys if no shape matches.
pub fn classify(value: &Value) -> Result<PayloadShape<'_>, Unrecognized> {
    if let Some(task) = value.get("task").filter(|t| t.get("entities").is_some()) {
        return Ok(PayloadShape::Backup(task));
    }
    if value.get("entities").is_some() {
        return Ok(PayloadShape::TaskFile(value));
    }
    if let Some(task) = value.get("mainModelData").and_then(|m| m.get("task")) {
        return Ok(PayloadShape::MetaFile(task));
    }

    let keys = value
        .as_object()
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();
    Err(Unrecognized { keys })
}

/// Strips a `pf_...__` envelope, leaving other text untouched.
#[must_use]
pub fn strip_envelope(text: &str) -> &str {
    if !text.starts_with(ENVELOPE_MARKER) {
        return text;
    }
    match text.split_once(ENVELOPE_SEPARATOR) {
        Some((_, body)) => body,
        None => text,
    }
}

/// Parses raw export text into the canonical task map.
///
/// # Errors
///
/// Returns an error if the text is not JSON or has an unknown shape.
pub fn parse_payload(text: &str) -> Result<TaskMap, PayloadError> {
    let value: Value = serde_json::from_str(strip_envelope(text))?;
    let shape = classify(&value)?;
    tracing::debug!(shape = shape_name(&shape), "detected payload shape");
    Ok(TaskMap::from_task_state(shape.task_state()))
}

fn shape_name(shape: &PayloadShape<'_>) -> &'static str {
    match shape {
        PayloadShape::Backup(_) => "backup",
        PayloadShape::TaskFile(_) => "task file",
        PayloadShape::MetaFile(_) => "meta file",
    }
}

/// Locations tried for a configured source URL, most specific first.
#[must_use]
pub fn candidate_urls(url: &str) -> Vec<String> {
    let base = url.trim_end_matches('/');
    vec![
        url.to_string(),
        format!("{base}/task"),
        format!("{base}/task.json"),
    ]
}

/// Resolves the task export from the first candidate location that has one.
#[derive(Debug)]
pub struct PayloadResolver<F> {
    fetcher: F,
    url: String,
}

impl<F: SourceFetcher> PayloadResolver<F> {
    /// Creates a resolver for the configured source URL.
    pub fn new(fetcher: F, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }

    /// Tries each candidate location in order.
    ///
    /// Transport failures and unusable text move on to the next candidate.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotFound`] once every candidate is exhausted.
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    pub async fn resolve(&self) -> Result<TaskMap, FetchError> {
        let candidates = candidate_urls(&self.url);
        for url in &candidates {
            tracing::info!(%url, "fetching task data");
            let text = match self.fetcher.fetch(url).await {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(%url, %err, "fetch failed");
                    continue;
                }
            };

            match parse_payload(&text) {
                Ok(tasks) => {
                    tracing::info!(%url, tasks = tasks.len(), "resolved task data");
                    return Ok(tasks);
                }
                Err(PayloadError::Unrecognized(err)) => {
                    tracing::warn!(%url, keys = ?err.keys, "JSON has none of the expected keys");
                }
                Err(err) => {
                    let snippet: String = text.chars().take(100).collect();
                    tracing::warn!(%url, %err, %snippet, "unusable payload");
                }
            }
        }

        tracing::error!("could not find task data at any candidate location");
        Err(FetchError::NotFound { tried: candidates })
    }
}
