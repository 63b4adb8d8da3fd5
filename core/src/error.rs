// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use duesync_caldav::CalDavError;

/// No candidate source location produced task data.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Every candidate failed to fetch, failed to parse, or had an unknown shape.
    #[error("could not find task data at any of {}", tried.join(", "))]
    NotFound {
        /// The candidate locations that were tried, in order.
        tried: Vec<String>,
    },
}

/// Raw payload text that could not be turned into a task map.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The text is not JSON.
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON matches none of the known shapes.
    #[error(transparent)]
    Unrecognized(#[from] Unrecognized),
}

/// JSON document that matches none of the known payload shapes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("payload has none of the expected keys, found [{}]", keys.join(", "))]
pub struct Unrecognized {
    /// Top-level keys of the document, empty if it is not an object.
    pub keys: Vec<String>,
}

/// The target calendar could not be located.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// A discovery request failed.
    #[error("CalDAV discovery failed: {0}")]
    CalDav(#[from] CalDavError),

    /// The configured calendar URL does not parse.
    #[error("invalid calendar URL {url:?}: {reason}")]
    InvalidUrl {
        /// The configured URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No calendar collection matched the configured selector.
    #[error("calendar not found, tried path {path:?} and name {name:?}")]
    CalendarNotFound {
        /// Calendar path fragment taken from the configured URL.
        path: Option<String>,
        /// Configured calendar display name.
        name: Option<String>,
    },
}

/// A calendar backend call failed for one task.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Looking up the existing event failed for a reason other than absence.
    #[error("failed to look up {uid}: {source}")]
    Lookup {
        /// Event UID.
        uid: String,
        /// Underlying error.
        source: CalDavError,
    },

    /// Writing the event failed.
    #[error("failed to write {uid}: {source}")]
    Write {
        /// Event UID.
        uid: String,
        /// Underlying error.
        source: CalDavError,
    },
}

/// Failure that abandons a whole sync cycle.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The source payload could not be resolved.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The target calendar could not be connected.
    #[error(transparent)]
    Connect(#[from] ConnectError),
}

/// Invalid or incomplete configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Required values are missing, listed by their key or variable name.
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<String>),

    /// A value could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    Invalid {
        /// Key or variable name.
        key: String,
        /// The rejected value.
        value: String,
    },
}
