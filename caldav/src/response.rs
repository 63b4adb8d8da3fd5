// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parsing of `207 Multi-Status` bodies.

use duesync_ical::parse;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::CalDavError;
use crate::types::{CalendarCollection, CalendarResource, ETag, Href};
use crate::xml::{XmlReader, attr, local, read_children, read_hrefs, read_text, skip};

/// A parsed multistatus body.
#[derive(Debug, Clone, Default)]
pub struct MultiStatusResponse {
    /// One entry per `D:response`.
    pub responses: Vec<ResponseItem>,
}

/// Properties reported for one resource.
#[derive(Debug, Clone)]
pub struct ResponseItem {
    /// The resource.
    pub href: Href,
    /// Property groups, one per status.
    pub prop_stats: Vec<PropStat>,
}

/// A group of properties sharing one status.
#[derive(Debug, Clone, Default)]
pub struct PropStat {
    /// The properties.
    pub props: Properties,
    /// Status line, e.g. `HTTP/1.1 200 OK`.
    pub status: String,
}

impl PropStat {
    /// Whether the status line is a 2xx.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status
            .split_whitespace()
            .nth(1)
            .is_some_and(|code| code.starts_with('2'))
    }
}

/// The properties duesync understands. Anything else is skipped.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    /// `D:displayname`
    pub display_name: Option<String>,
    /// `D:getetag`
    pub etag: Option<ETag>,
    /// `C:calendar-data`
    pub calendar_data: Option<String>,
    /// First href of `D:current-user-principal`.
    pub current_user_principal: Option<Href>,
    /// First href of `C:calendar-home-set`.
    pub calendar_home_set: Option<Href>,
    /// Names listed in `C:supported-calendar-component-set`.
    pub components: Vec<String>,
    /// `D:resourcetype` contains `D:collection`.
    pub is_collection: bool,
    /// `D:resourcetype` contains `C:calendar`.
    pub is_calendar: bool,
}

impl MultiStatusResponse {
    /// Parses a multistatus document.
    ///
    /// # Errors
    ///
    /// Returns an error if the XML is malformed.
    pub fn from_xml(xml: &str) -> Result<Self, CalDavError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().check_end_names = true;

        let mut responses = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Start(e) if local(&e) == b"response" => {
                    responses.push(read_response(&mut reader)?);
                }
                Event::Eof => return Ok(Self { responses }),
                _ => {}
            }
        }
    }

    /// First value `f` picks out of a successful propstat.
    pub fn find_prop<T>(&self, f: impl Fn(&Properties) -> Option<T>) -> Option<T> {
        self.ok_props().find_map(|(_, props)| f(props))
    }

    fn ok_props(&self) -> impl Iterator<Item = (&Href, &Properties)> {
        self.responses.iter().flat_map(|r| {
            r.prop_stats
                .iter()
                .filter(|p| p.is_ok())
                .map(move |p| (&r.href, &p.props))
        })
    }

    /// Calendar objects carried in `C:calendar-data`, one per VCALENDAR.
    ///
    /// # Errors
    ///
    /// Returns an error if any calendar data fails to parse.
    pub fn into_resources(self) -> Result<Vec<CalendarResource>, CalDavError> {
        let mut resources = Vec::new();
        for (href, props) in self.ok_props() {
            let Some(data) = props.calendar_data.as_deref() else {
                continue;
            };
            resources.extend(
                parse(data)?
                    .into_iter()
                    .map(|calendar| CalendarResource::new(href.clone(), props.etag.clone(), calendar)),
            );
        }
        Ok(resources)
    }

    /// Every resource typed both collection and calendar.
    #[must_use]
    pub fn into_collections(self) -> Vec<CalendarCollection> {
        self.ok_props()
            .filter(|(_, props)| props.is_collection && props.is_calendar)
            .map(|(href, props)| CalendarCollection {
                href: href.clone(),
                display_name: props.display_name.clone(),
                components: props.components.clone(),
            })
            .collect()
    }
}

fn read_response(reader: &mut XmlReader<'_>) -> Result<ResponseItem, CalDavError> {
    let mut href = None;
    let mut prop_stats = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match local(&e) {
                b"href" => href = Some(Href::new(read_text(reader)?.trim().to_string())),
                b"propstat" => prop_stats.push(read_propstat(reader)?),
                _ => skip(reader)?,
            },
            Event::End(_) => break,
            Event::Eof => return Err(CalDavError::Xml("unterminated response".to_string())),
            _ => {}
        }
    }

    let href = href.ok_or_else(|| CalDavError::Xml("response without href".to_string()))?;
    Ok(ResponseItem { href, prop_stats })
}

fn read_propstat(reader: &mut XmlReader<'_>) -> Result<PropStat, CalDavError> {
    let mut prop_stat = PropStat::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match local(&e) {
                b"prop" => prop_stat.props = read_props(reader)?,
                b"status" => prop_stat.status = read_text(reader)?.trim().to_string(),
                _ => skip(reader)?,
            },
            Event::End(_) => return Ok(prop_stat),
            Event::Eof => return Err(CalDavError::Xml("unterminated propstat".to_string())),
            _ => {}
        }
    }
}

fn read_props(reader: &mut XmlReader<'_>) -> Result<Properties, CalDavError> {
    let mut props = Properties::default();
    loop {
        let e = match reader.read_event()? {
            Event::Start(e) => e,
            Event::End(_) => return Ok(props),
            Event::Eof => return Err(CalDavError::Xml("unterminated prop".to_string())),
            _ => continue,
        };

        match local(&e) {
            b"displayname" => props.display_name = Some(read_text(reader)?.trim().to_string()),
            b"getetag" => props.etag = Some(ETag::new(read_text(reader)?.trim().to_string())),
            b"calendar-data" => props.calendar_data = Some(read_text(reader)?.trim().to_string()),
            b"current-user-principal" => {
                props.current_user_principal = read_hrefs(reader)?.into_iter().next().map(Href::new);
            }
            b"calendar-home-set" => {
                props.calendar_home_set = read_hrefs(reader)?.into_iter().next().map(Href::new);
            }
            b"resourcetype" => read_children(reader, |child| match local(child) {
                b"collection" => props.is_collection = true,
                b"calendar" => props.is_calendar = true,
                _ => {}
            })?,
            b"supported-calendar-component-set" => read_children(reader, |child| {
                if local(child) == b"comp" {
                    props.components.extend(attr(child, b"name"));
                }
            })?,
            _ => skip(reader)?,
        }
    }
}
