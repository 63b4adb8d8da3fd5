// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Pull-parser helpers. Every `read_*` function is called right after the
//! start tag of an element and consumes everything up to its end tag.

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};

use crate::error::CalDavError;

pub(crate) const DAV_NS: &str = "DAV:";
pub(crate) const CALDAV_NS: &str = "urn:ietf:params:xml:ns:caldav";

pub(crate) type XmlReader<'a> = Reader<&'a [u8]>;

/// Local name of an element, without its namespace prefix.
pub(crate) fn local<'a>(e: &'a BytesStart<'_>) -> &'a [u8] {
    e.local_name().into_inner()
}

/// Raw value of the attribute `key`. Only used for plain tokens such as
/// component names, so no unescaping.
pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().into_inner() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn eof() -> CalDavError {
    CalDavError::Xml("document ended inside an element".to_string())
}

fn decode_err(e: impl ToString) -> CalDavError {
    CalDavError::Xml(e.to_string())
}

/// Text content of the element, with character and predefined entity
/// references resolved and CDATA kept verbatim. Text of nested elements is
/// concatenated.
pub(crate) fn read_text(reader: &mut XmlReader<'_>) -> Result<String, CalDavError> {
    let mut text = String::new();
    let mut depth = 1_usize;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(text);
                }
            }
            Event::Text(e) => text.push_str(&e.decode().map_err(decode_err)?),
            Event::CData(e) => text.push_str(&e.decode().map_err(decode_err)?),
            Event::GeneralRef(e) => match e.resolve_char_ref().map_err(decode_err)? {
                Some(c) => text.push(c),
                None => {
                    let name = e.decode().map_err(decode_err)?;
                    let value = resolve_predefined_entity(&name)
                        .ok_or_else(|| CalDavError::Xml(format!("unknown entity &{name};")))?;
                    text.push_str(value);
                }
            },
            Event::Eof => return Err(eof()),
            _ => {}
        }
    }
}

/// Calls `visit` with every element nested in the current one, at any depth.
pub(crate) fn read_children(
    reader: &mut XmlReader<'_>,
    mut visit: impl FnMut(&BytesStart<'_>),
) -> Result<(), CalDavError> {
    let mut depth = 1_usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                visit(&e);
                depth += 1;
            }
            Event::Empty(e) => visit(&e),
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => return Err(eof()),
            _ => {}
        }
    }
}

/// Trimmed text of every `href` nested in the current element.
pub(crate) fn read_hrefs(reader: &mut XmlReader<'_>) -> Result<Vec<String>, CalDavError> {
    let mut hrefs = Vec::new();
    let mut depth = 1_usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) if local(&e) == b"href" => {
                hrefs.push(read_text(reader)?.trim().to_string());
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(hrefs);
                }
            }
            Event::Eof => return Err(eof()),
            _ => {}
        }
    }
}

/// Consumes the current element without looking at it.
pub(crate) fn skip(reader: &mut XmlReader<'_>) -> Result<(), CalDavError> {
    read_children(reader, |_| {})
}
