// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `WebDAV` file access and a `CalDAV` client (RFC 4791) for looking up and
//! writing calendar events.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
#![allow(clippy::similar_names)]

mod client;
mod config;
mod error;
mod http;
mod request;
mod response;
mod types;
mod webdav;
mod xml;

pub use crate::client::{CalDavClient, DiscoverResult};
pub use crate::config::{AuthMethod, CalDavConfig, DEFAULT_TIMEOUT};
pub use crate::error::CalDavError;
pub use crate::request::{Prop, propfind_body, uid_query_body};
pub use crate::response::{MultiStatusResponse, Properties, PropStat, ResponseItem};
pub use crate::types::{CalendarCollection, CalendarResource, ETag, Href, Precondition};
pub use crate::webdav::WebDavClient;
pub use reqwest::Url;
