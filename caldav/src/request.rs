// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! XML bodies of PROPFIND and REPORT requests.

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::CalDavError;
use crate::xml::{CALDAV_NS, DAV_NS};

/// A property that can be asked for in a PROPFIND.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prop {
    /// `D:displayname`
    DisplayName,
    /// `D:resourcetype`
    ResourceType,
    /// `D:getetag`
    GetETag,
    /// `D:current-user-principal`
    CurrentUserPrincipal,
    /// `C:calendar-home-set`
    CalendarHomeSet,
    /// `C:supported-calendar-component-set`
    SupportedComponents,
}

impl Prop {
    const fn tag(self) -> &'static str {
        match self {
            Self::DisplayName => "D:displayname",
            Self::ResourceType => "D:resourcetype",
            Self::GetETag => "D:getetag",
            Self::CurrentUserPrincipal => "D:current-user-principal",
            Self::CalendarHomeSet => "C:calendar-home-set",
            Self::SupportedComponents => "C:supported-calendar-component-set",
        }
    }
}

struct Body(Writer<Vec<u8>>);

impl Body {
    fn new(root: &str) -> Result<Self, CalDavError> {
        let mut body = Self(Writer::new_with_indent(Vec::new(), b' ', 2));
        let start = BytesStart::new(root)
            .with_attributes([("xmlns:D", DAV_NS), ("xmlns:C", CALDAV_NS)]);
        body.0.write_event(Event::Start(start))?;
        Ok(body)
    }

    fn open(&mut self, tag: &str, name: Option<&str>) -> Result<&mut Self, CalDavError> {
        let mut start = BytesStart::new(tag);
        if let Some(name) = name {
            start.push_attribute(("name", name));
        }
        self.0.write_event(Event::Start(start))?;
        Ok(self)
    }

    fn close(&mut self, tag: &str) -> Result<&mut Self, CalDavError> {
        self.0.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(self)
    }

    fn empty(&mut self, tag: &str) -> Result<&mut Self, CalDavError> {
        self.0.write_event(Event::Empty(BytesStart::new(tag)))?;
        Ok(self)
    }

    fn finish(mut self, root: &str) -> Result<String, CalDavError> {
        self.close(root)?;
        String::from_utf8(self.0.into_inner()).map_err(|e| CalDavError::Xml(e.to_string()))
    }
}

/// Body of a PROPFIND asking for `props`.
///
/// # Errors
///
/// Returns an error if the XML cannot be written.
pub fn propfind_body(props: &[Prop]) -> Result<String, CalDavError> {
    let mut body = Body::new("D:propfind")?;
    body.open("D:prop", None)?;
    for prop in props {
        body.empty(prop.tag())?;
    }
    body.close("D:prop")?;
    body.finish("D:propfind")
}

/// Body of a calendar-query REPORT for the VEVENT whose UID is exactly `uid`,
/// returning its `ETag` and calendar data.
///
/// # Errors
///
/// Returns an error if the XML cannot be written.
pub fn uid_query_body(uid: &str) -> Result<String, CalDavError> {
    let mut body = Body::new("C:calendar-query")?;
    body.open("D:prop", None)?
        .empty("D:getetag")?
        .empty("C:calendar-data")?
        .close("D:prop")?;

    body.open("C:filter", None)?
        .open("C:comp-filter", Some("VCALENDAR"))?
        .open("C:comp-filter", Some("VEVENT"))?
        .open("C:prop-filter", Some("UID"))?;

    let text_match = BytesStart::new("C:text-match").with_attributes([("collation", "i;octet")]);
    body.0.write_event(Event::Start(text_match))?;
    body.0.write_event(Event::Text(BytesText::new(uid)))?;
    body.close("C:text-match")?;

    body.close("C:prop-filter")?
        .close("C:comp-filter")?
        .close("C:comp-filter")?
        .close("C:filter")?;
    body.finish("C:calendar-query")
}
