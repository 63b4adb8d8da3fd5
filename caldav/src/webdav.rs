// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use reqwest::Method;

use crate::config::{AuthMethod, CalDavConfig};
use crate::error::CalDavError;
use crate::http::HttpClient;

/// Reads plain files from a `WebDAV` share.
#[derive(Debug)]
pub struct WebDavClient {
    http: HttpClient,
}

impl WebDavClient {
    /// Creates a client that sends `auth` with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(auth: AuthMethod) -> Result<Self, CalDavError> {
        let config = CalDavConfig {
            auth,
            ..CalDavConfig::default()
        };
        Ok(Self {
            http: HttpClient::new(&config)?,
        })
    }

    /// Body of the file at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::NotFound`] for a missing file, or an error on
    /// any other failure.
    pub async fn get_text(&self, url: &str) -> Result<String, CalDavError> {
        let resp = self.http.send(self.http.request(Method::GET, url)).await?;
        let text = resp.text().await?;
        tracing::debug!(url, bytes = text.len(), "fetched file");
        Ok(text)
    }
}
