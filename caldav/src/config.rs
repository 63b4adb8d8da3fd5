// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::time::Duration;

use reqwest::RequestBuilder;

/// Default timeout of a single request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials sent with every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthMethod {
    /// Anonymous access.
    #[default]
    None,

    /// HTTP basic authentication.
    Basic {
        /// Account name.
        username: String,
        /// Account password or app token.
        password: String,
    },
}

impl AuthMethod {
    /// Basic authentication with the given credentials.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub(crate) fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match self {
            Self::None => req,
            Self::Basic { username, password } => req.basic_auth(username, Some(password)),
        }
    }
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Connection settings for a `WebDAV` or `CalDAV` server.
#[derive(Debug, Clone)]
pub struct CalDavConfig {
    /// DAV root every href is resolved against, e.g. `https://host/remote.php/dav`.
    pub base_url: String,

    /// Calendar home used when the server does not report one.
    pub calendar_home: String,

    /// Credentials.
    pub auth: AuthMethod,

    /// Timeout of a single request.
    pub timeout: Duration,

    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for CalDavConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            calendar_home: String::new(),
            auth: AuthMethod::None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("duesync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
