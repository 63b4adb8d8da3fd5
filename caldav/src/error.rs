// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::types::Href;

/// Errors talking to a `WebDAV` or `CalDAV` server.
#[non_exhaustive]
#[derive(Debug)]
pub enum CalDavError {
    /// The request could not be sent or its body not read.
    Transport(String),

    /// The server rejected the credentials.
    Unauthorized {
        /// 401 or 403.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The resource does not exist.
    NotFound(Href),

    /// An `If-Match` or `If-None-Match` condition did not hold.
    PreconditionFailed(Href),

    /// Any other non-success status.
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
        /// Start of the response body.
        body: String,
    },

    /// Malformed XML in a request or response body.
    Xml(String),

    /// Calendar data that could not be parsed or written.
    Ical(String),

    /// A calendar object without any VCALENDAR in it.
    EmptyCalendar(Href),

    /// A base URL or href that cannot be resolved.
    InvalidUrl(String),
}

impl CalDavError {
    /// Whether the error means the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl fmt::Display for CalDavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "request failed: {e}"),
            Self::Unauthorized { status, url } => {
                write!(f, "unauthorized ({status}) for {url}, check the credentials")
            }
            Self::NotFound(href) => write!(f, "not found: {href}"),
            Self::PreconditionFailed(href) => {
                write!(f, "{href} changed on the server since it was read")
            }
            Self::Status { status, url, body } if body.is_empty() => {
                write!(f, "unexpected status {status} for {url}")
            }
            Self::Status { status, url, body } => {
                write!(f, "unexpected status {status} for {url}: {body}")
            }
            Self::Xml(e) => write!(f, "invalid XML: {e}"),
            Self::Ical(e) => write!(f, "invalid calendar data: {e}"),
            Self::EmptyCalendar(href) => write!(f, "{href} holds no calendar data"),
            Self::InvalidUrl(e) => write!(f, "invalid URL: {e}"),
        }
    }
}

impl std::error::Error for CalDavError {}

impl From<reqwest::Error> for CalDavError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<quick_xml::Error> for CalDavError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

impl From<std::io::Error> for CalDavError {
    fn from(e: std::io::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

impl From<duesync_ical::ParseError> for CalDavError {
    fn from(e: duesync_ical::ParseError) -> Self {
        Self::Ical(e.to_string())
    }
}
