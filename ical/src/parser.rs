// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::semantic::{ICalendar, SemanticError, semantic_analysis};
use crate::syntax::{ContentLineError, TreeBuildError, build_tree, scan_content_lines};

/// Parse iCalendar objects from source text
///
/// ## Errors
///
/// Returns an error for a malformed content line, unbalanced BEGIN/END, or an
/// invalid date value in a known property.
///
/// ## Examples
///
/// ```
/// # use duesync_ical::parse;
/// let ical_src = "\
/// BEGIN:VCALENDAR\r\n\
/// BEGIN:VEVENT\r\n\
/// UID:1\r\n\
/// SUMMARY:Test Event\r\n\
/// END:VEVENT\r\n\
/// END:VCALENDAR\r\n\
/// ";
/// let calendars = parse(ical_src).unwrap();
/// assert_eq!(calendars[0].components[0].summary.as_deref(), Some("Test Event"));
/// ```
///
/// ```
/// # use duesync_ical::parse;
/// let invalid_ical_src = "\
/// BEGIN:VCALENDAR\r\n\
/// BEGIN:VEVENT\r\n\
/// END:VCALENDAR\r\n\
/// END:VEVENT\r\n\
/// ";
/// assert!(parse(invalid_ical_src).is_err());
/// ```
pub fn parse(src: &str) -> Result<Vec<ICalendar>, ParseError> {
    let lines = scan_content_lines(src)?;
    let roots = build_tree(lines)?;
    let calendars = semantic_analysis(roots)?;
    Ok(calendars)
}

/// Errors that can occur during parsing
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Errors from scanning content lines
    #[error("syntax error: {0}")]
    Syntax(#[from] ContentLineError),

    /// Errors from nesting components
    #[error("structure error: {0}")]
    Structure(#[from] TreeBuildError),

    /// Errors from interpreting properties
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}
