// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use duesync_caldav::AuthMethod;

use crate::error::ConfigError;

/// The name of the application.
pub const APP_NAME: &str = "duesync";

/// Default pause between two sync cycles.
pub const DEFAULT_INTERVAL_SECS: u64 = 900;

/// Environment variables the configuration can be read from.
pub mod env {
    #![allow(missing_docs)]

    pub const WEBDAV_URL: &str = "WEBDAV_URL";
    pub const WEBDAV_USERNAME: &str = "WEBDAV_USERNAME";
    pub const WEBDAV_PASSWORD: &str = "WEBDAV_PASSWORD";
    pub const CALDAV_URL: &str = "CALDAV_URL";
    pub const CALDAV_USERNAME: &str = "CALDAV_USERNAME";
    pub const CALDAV_PASSWORD: &str = "CALDAV_PASSWORD";
    pub const CALENDAR_NAME: &str = "CALENDAR_NAME";
    pub const SYNC_INTERVAL_SECS: &str = "SYNC_INTERVAL_SECS";
    pub const WRITE_BACKEND: &str = "WRITE_BACKEND";
}

/// Configuration for duesync, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Config {
    /// Seconds to sleep between two cycles. Zero means the default.
    #[serde(
        default = "default_interval_secs",
        deserialize_with = "deserialize_interval_secs"
    )]
    pub interval_secs: u64,

    /// How events are written to the calendar.
    #[serde(default)]
    pub write_backend: WriteBackendKind,

    /// Where the task export is read from.
    #[serde(default)]
    pub source: SourceConfig,

    /// The calendar events are mirrored into.
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// `WebDAV` location of the task export.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct SourceConfig {
    /// Export file or sync folder URL.
    #[serde(default)]
    pub url: String,

    /// `WebDAV` username.
    #[serde(default)]
    pub username: String,

    /// `WebDAV` password.
    #[serde(default)]
    pub password: String,
}

impl SourceConfig {
    /// Basic authentication for the source share.
    #[must_use]
    pub fn auth(&self) -> AuthMethod {
        AuthMethod::basic(&self.username, &self.password)
    }
}

/// `CalDAV` location of the target calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct CalendarConfig {
    /// Server or calendar URL, a path below `/calendars/` selects the calendar.
    #[serde(default)]
    pub url: String,

    /// `CalDAV` username.
    #[serde(default)]
    pub username: String,

    /// `CalDAV` password.
    #[serde(default)]
    pub password: String,

    /// Calendar display name or last path segment.
    #[serde(default)]
    pub name: Option<String>,
}

impl CalendarConfig {
    /// Basic authentication for the calendar server.
    #[must_use]
    pub fn auth(&self) -> AuthMethod {
        AuthMethod::basic(&self.username, &self.password)
    }
}

impl Config {
    /// Pause between two cycles.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Checks that every required value is present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] listing all absent keys at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing: Vec<String> = [
            ("source.url", &self.source.url),
            ("source.username", &self.source.username),
            ("source.password", &self.source.password),
            ("calendar.url", &self.calendar.url),
            ("calendar.username", &self.calendar.username),
            ("calendar.password", &self.calendar.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(key, _)| key.to_string())
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing))
        }
    }

    /// Builds the configuration from environment-style variables.
    ///
    /// All seven connection variables are required, `SYNC_INTERVAL_SECS` and
    /// `WRITE_BACKEND` are optional. Empty values count as missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming every absent variable, or
    /// [`ConfigError::Invalid`] for an unparsable optional value.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut required = |name: &str| match lookup(name).filter(|v| !v.is_empty()) {
            Some(v) => v,
            None => {
                missing.push(name.to_string());
                String::new()
            }
        };

        let source = SourceConfig {
            url: required(env::WEBDAV_URL),
            username: required(env::WEBDAV_USERNAME),
            password: required(env::WEBDAV_PASSWORD),
        };
        let calendar = CalendarConfig {
            url: required(env::CALDAV_URL),
            username: required(env::CALDAV_USERNAME),
            password: required(env::CALDAV_PASSWORD),
            name: Some(required(env::CALENDAR_NAME)),
        };
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let interval_secs = match lookup(env::SYNC_INTERVAL_SECS).filter(|v| !v.is_empty()) {
            Some(v) => v
                .trim()
                .parse()
                .map(interval_secs_or_default)
                .map_err(|_| ConfigError::Invalid {
                    key: env::SYNC_INTERVAL_SECS.to_string(),
                    value: v.clone(),
                })?,
            None => DEFAULT_INTERVAL_SECS,
        };

        let write_backend = match lookup(env::WRITE_BACKEND).filter(|v| !v.is_empty()) {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: env::WRITE_BACKEND.to_string(),
                value: v.clone(),
            })?,
            None => WriteBackendKind::default(),
        };

        Ok(Self {
            interval_secs,
            write_backend,
            source,
            calendar,
        })
    }
}

const fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

const fn interval_secs_or_default(secs: u64) -> u64 {
    if secs == 0 { DEFAULT_INTERVAL_SECS } else { secs }
}

fn deserialize_interval_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = <u64 as serde::Deserialize>::deserialize(deserializer)?;
    Ok(interval_secs_or_default(secs))
}

/// Strategy used to write events to the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteBackendKind {
    /// Probe the server for `calendar-access` once per cycle.
    #[default]
    Auto,

    /// REPORT lookup and conditional PUT.
    Structured,

    /// GET and unconditional PUT of `<calendar>/<uid>.ics`.
    Raw,
}

impl FromStr for WriteBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "structured" => Ok(Self::Structured),
            "raw" => Ok(Self::Raw),
            other => Err(format!("unknown write backend: {other}")),
        }
    }
}

impl fmt::Display for WriteBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Structured => "structured",
            Self::Raw => "raw",
        })
    }
}
