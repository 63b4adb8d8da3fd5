// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Authenticated requests and status handling shared by the DAV clients.

use reqwest::header::{ETAG, IF_MATCH, IF_NONE_MATCH};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};

use crate::config::{AuthMethod, CalDavConfig};
use crate::error::CalDavError;
use crate::types::{ETag, Href, Precondition};

/// Longest response body kept in a [`CalDavError::Status`].
const MAX_ERROR_BODY: usize = 256;

#[derive(Debug)]
pub(crate) struct HttpClient {
    client: Client,
    auth: AuthMethod,
}

impl HttpClient {
    pub fn new(config: &CalDavConfig) -> Result<Self, CalDavError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            auth: config.auth.clone(),
        })
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.auth.apply(self.client.request(method, url))
    }

    /// A request with a `WebDAV` extension method such as PROPFIND or REPORT.
    pub fn dav_request(&self, method: &str, url: &str) -> Result<RequestBuilder, CalDavError> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| CalDavError::Transport(format!("invalid method {method}: {e}")))?;
        Ok(self.request(method, url))
    }

    /// Sends the request, turning every non-success status into an error.
    pub async fn send(&self, req: RequestBuilder) -> Result<Response, CalDavError> {
        let resp = req.send().await?;
        let status = resp.status();
        tracing::debug!(%status, url = %resp.url(), "response received");
        if is_success(status) {
            return Ok(resp);
        }

        let url = resp.url().clone();
        let href = || Href::new(url.path().to_string());
        Err(match status {
            StatusCode::NOT_FOUND => CalDavError::NotFound(href()),
            StatusCode::PRECONDITION_FAILED => CalDavError::PreconditionFailed(href()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CalDavError::Unauthorized {
                status: status.as_u16(),
                url: url.to_string(),
            },
            _ => {
                let body = resp.text().await.unwrap_or_default();
                CalDavError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                    body: truncate(body.trim()),
                }
            }
        })
    }
}

fn is_success(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT | StatusCode::MULTI_STATUS
    )
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

/// `ETag` header of a response, if the server sent one.
pub(crate) fn etag(resp: &Response) -> Option<ETag> {
    resp.headers()
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(ETag::from)
}

pub(crate) fn with_precondition(req: RequestBuilder, precondition: &Precondition) -> RequestBuilder {
    match precondition {
        Precondition::None => req,
        Precondition::IfMatch(etag) => req.header(IF_MATCH, etag.as_str()),
        Precondition::IfNoneMatch => req.header(IF_NONE_MATCH, "*"),
    }
}
