// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use duesync_ical::{ICalendar, formatter, parse};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};

use crate::config::CalDavConfig;
use crate::error::CalDavError;
use crate::http::{HttpClient, etag, with_precondition};
use crate::request::{Prop, propfind_body, uid_query_body};
use crate::response::MultiStatusResponse;
use crate::types::{CalendarCollection, CalendarResource, ETag, Href, Precondition};

const XML: &str = "application/xml; charset=utf-8";
const ICALENDAR: &str = "text/calendar; charset=utf-8";

/// Depth header of a DAV request.
#[derive(Debug, Clone, Copy)]
enum Depth {
    Zero,
    One,
}

impl Depth {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
        }
    }
}

/// `CalDAV` client scoped to one DAV root.
///
/// Cheap to clone, clones share the connection pool.
///
/// ```no_run
/// use duesync_caldav::{AuthMethod, CalDavClient, CalDavConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CalDavClient::new(CalDavConfig {
///     base_url: "https://cloud.example.com/remote.php/dav".to_string(),
///     auth: AuthMethod::basic("me", "app-token"),
///     ..Default::default()
/// })?;
/// let home = client.discover().await?.calendar_home;
/// for calendar in client.list_calendars(&home).await? {
///     println!("{}", calendar.href);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CalDavClient {
    http: Arc<HttpClient>,
    base: Url,
    calendar_home: Href,
}

impl CalDavClient {
    /// Creates a client for the DAV root in `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: CalDavConfig) -> Result<Self, CalDavError> {
        let root = format!("{}/", config.base_url.trim_end_matches('/'));
        let base =
            Url::parse(&root).map_err(|e| CalDavError::InvalidUrl(format!("{root}: {e}")))?;
        Ok(Self {
            http: Arc::new(HttpClient::new(&config)?),
            base,
            calendar_home: Href::new(config.calendar_home),
        })
    }

    /// Finds the current user principal and its calendar home.
    ///
    /// Servers that report neither fall back to the configured calendar home.
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails.
    #[tracing::instrument(skip(self), fields(base = %self.base))]
    pub async fn discover(&self) -> Result<DiscoverResult, CalDavError> {
        let root = self.calendar_home.clone();
        let principal = self
            .propfind(&root, Depth::Zero, &[Prop::CurrentUserPrincipal])
            .await?
            .find_prop(|p| p.current_user_principal.clone());

        let home = match &principal {
            Some(principal) => self
                .propfind(principal, Depth::Zero, &[Prop::CalendarHomeSet])
                .await?
                .find_prop(|p| p.calendar_home_set.clone()),
            None => None,
        };
        tracing::debug!(?principal, ?home, "discovered");

        Ok(DiscoverResult {
            principal,
            calendar_home: home.unwrap_or(root),
        })
    }

    /// Whether an OPTIONS on `href` advertises `calendar-access` in its
    /// `DAV` header.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn supports_calendar_access(&self, href: &Href) -> Result<bool, CalDavError> {
        let req = self.http.request(Method::OPTIONS, self.url(href)?.as_str());
        let resp = self.http.send(req).await?;
        Ok(resp
            .headers()
            .get_all("DAV")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .any(|class| class.trim() == "calendar-access"))
    }

    /// Calendar collections directly below `home`.
    ///
    /// # Errors
    ///
    /// Returns an error if the PROPFIND fails.
    pub async fn list_calendars(&self, home: &Href) -> Result<Vec<CalendarCollection>, CalDavError> {
        let props = [Prop::DisplayName, Prop::ResourceType, Prop::SupportedComponents];
        let multistatus = self.propfind(home, Depth::One, &props).await?;
        Ok(multistatus.into_collections())
    }

    /// The event with UID `uid` in `calendar`, wherever it is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the REPORT fails or returned calendar data does not
    /// parse.
    pub async fn find_by_uid(
        &self,
        calendar: &Href,
        uid: &str,
    ) -> Result<Option<CalendarResource>, CalDavError> {
        let multistatus = self
            .multistatus("REPORT", calendar, Depth::One, uid_query_body(uid)?)
            .await?;
        let found = multistatus
            .into_resources()?
            .into_iter()
            .find(|r| r.data.components.iter().any(|event| event.uid == uid));
        tracing::debug!(uid, found = found.is_some(), "looked up event");
        Ok(found)
    }

    /// Reads the calendar object at `href`.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::NotFound`] if nothing is stored there, or an
    /// error if the body is not a calendar.
    pub async fn get_event(&self, href: &Href) -> Result<CalendarResource, CalDavError> {
        let req = self.http.request(Method::GET, self.url(href)?.as_str());
        let resp = self.http.send(req).await?;
        let etag = etag(&resp);
        let body = resp.text().await?;
        let data = parse(&body)?
            .into_iter()
            .next()
            .ok_or_else(|| CalDavError::EmptyCalendar(href.clone()))?;
        Ok(CalendarResource::new(href.clone(), etag, data))
    }

    /// Stores `calendar` at `href` and returns the new `ETag` if the server
    /// reports one.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::PreconditionFailed`] if `precondition` does not
    /// hold, or an error if the request fails.
    pub async fn put_event(
        &self,
        href: &Href,
        calendar: &ICalendar,
        precondition: Precondition,
    ) -> Result<Option<ETag>, CalDavError> {
        let body = formatter::format(calendar).map_err(|e| CalDavError::Ical(e.to_string()))?;
        let req = self
            .http
            .request(Method::PUT, self.url(href)?.as_str())
            .header(CONTENT_TYPE, ICALENDAR)
            .body(body);
        let resp = self.http.send(with_precondition(req, &precondition)).await?;
        Ok(etag(&resp))
    }

    async fn propfind(
        &self,
        href: &Href,
        depth: Depth,
        props: &[Prop],
    ) -> Result<MultiStatusResponse, CalDavError> {
        self.multistatus("PROPFIND", href, depth, propfind_body(props)?)
            .await
    }

    async fn multistatus(
        &self,
        method: &str,
        href: &Href,
        depth: Depth,
        body: String,
    ) -> Result<MultiStatusResponse, CalDavError> {
        let req = self
            .http
            .dav_request(method, self.url(href)?.as_str())?
            .header(CONTENT_TYPE, XML)
            .header("Depth", depth.as_str())
            .body(body);
        let text = self.http.send(req).await?.text().await?;
        MultiStatusResponse::from_xml(&text)
    }

    /// Resolves `href` against the DAV root: absolute paths replace its
    /// path, relative ones extend it, full URLs stay as they are.
    fn url(&self, href: &Href) -> Result<Url, CalDavError> {
        self.base
            .join(href)
            .map_err(|e| CalDavError::InvalidUrl(format!("{href}: {e}")))
    }
}

/// What [`CalDavClient::discover`] found.
#[derive(Debug, Clone)]
pub struct DiscoverResult {
    /// Principal of the authenticated user, if reported.
    pub principal: Option<Href>,
    /// Calendar home to list calendars from.
    pub calendar_home: Href,
}
