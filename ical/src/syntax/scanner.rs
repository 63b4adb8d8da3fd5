// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Scanner for iCalendar content lines.
//!
//! ```text
//! Source Text → Lexer → Token Stream → Scanner → Content Lines
//! ```
//!
//! Per RFC 5545, a content line has the format:
//! ```text
//! contentline = name *(";" param) ":" value CRLF
//! ```

use std::fmt;

use crate::syntax::lexer::{SpannedToken, Token, tokenize};

/// A scanned iCalendar content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name, as written in the source (e.g., "DTSTART", "SUMMARY")
    pub name: String,

    /// Property parameters (semicolon-separated)
    pub parameters: Vec<ScannedParameter>,

    /// Raw property value, unfolded but not unescaped
    pub value: String,

    /// 1-based physical line number where the content line starts
    pub line: usize,
}

impl ContentLine {
    /// Whether the name matches, ignoring ASCII case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// First value of the named parameter, ignoring ASCII case of the name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(|p| p.values.first())
            .map(String::as_str)
    }
}

/// A scanned parameter from a content line.
///
/// Parameters have the format: `name=value` or `name=value1,value2`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedParameter {
    /// Parameter name (e.g., "TZID", "VALUE")
    pub name: String,

    /// Parameter values (comma-separated), surrounding quotes removed
    pub values: Vec<String>,
}

/// Errors that can occur when scanning a content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLineError {
    /// Missing colon separator.
    ///
    /// Example: `PROPNAME value` instead of `PROPNAME:value`
    MissingColon {
        /// Line where the colon was expected
        line: usize,
    },

    /// Content line without a name.
    EmptyName {
        /// Offending line
        line: usize,
    },

    /// Parameter without `=`, or with an unterminated quoted value.
    InvalidParameter {
        /// Offending line
        line: usize,
    },
}

impl fmt::Display for ContentLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColon { line } => write!(f, "line {line}: missing ':' separator"),
            Self::EmptyName { line } => write!(f, "line {line}: missing property name"),
            Self::InvalidParameter { line } => write!(f, "line {line}: malformed parameter"),
        }
    }
}

impl std::error::Error for ContentLineError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Name,
    ParamName,
    ParamValue { quoted: bool },
    Value,
}

/// Scan source text into content lines. Blank lines are ignored.
///
/// ## Errors
///
/// Returns the first malformed content line.
pub fn scan_content_lines(src: &str) -> Result<Vec<ContentLine>, ContentLineError> {
    let mut lines = Vec::new();
    let mut builder = LineBuilder::default();
    let mut state = State::Name;

    for SpannedToken(token, span) in tokenize(src) {
        if builder.is_empty() && state == State::Name {
            builder.line = line_of(src, span.start);
        }

        state = match (state, token) {
            (_, Token::Newline) if matches!(state, State::ParamValue { quoted: true }) => {
                return Err(ContentLineError::InvalidParameter { line: builder.line });
            }
            (State::Name, Token::Newline) if builder.is_empty() => State::Name,
            (State::Name, Token::Newline) => {
                return Err(ContentLineError::MissingColon { line: builder.line });
            }
            (State::Value, Token::Newline) => {
                lines.push(builder.finish()?);
                State::Name
            }
            (State::ParamName | State::ParamValue { .. }, Token::Newline) => {
                return Err(ContentLineError::MissingColon { line: builder.line });
            }

            (State::Name, Token::Text(s)) => {
                builder.name.push_str(s);
                State::Name
            }
            (State::Name, Token::Semicolon) => State::ParamName,
            (State::Name, Token::Colon) => State::Value,
            (State::Name, _) => return Err(ContentLineError::EmptyName { line: builder.line }),

            (State::ParamName, Token::Text(s)) => {
                builder.param_name.push_str(s);
                State::ParamName
            }
            (State::ParamName, Token::Equal) => State::ParamValue { quoted: false },
            (State::ParamName, _) => {
                return Err(ContentLineError::InvalidParameter { line: builder.line });
            }

            (State::ParamValue { quoted: true }, Token::DQuote) => {
                State::ParamValue { quoted: false }
            }
            (State::ParamValue { quoted: true }, t) => {
                builder.param_value.push_str(t.as_str());
                State::ParamValue { quoted: true }
            }
            (State::ParamValue { quoted: false }, Token::DQuote) => {
                State::ParamValue { quoted: true }
            }
            (State::ParamValue { quoted: false }, Token::Comma) => {
                builder.push_param_value();
                State::ParamValue { quoted: false }
            }
            (State::ParamValue { quoted: false }, Token::Semicolon) => {
                builder.push_param();
                State::ParamName
            }
            (State::ParamValue { quoted: false }, Token::Colon) => {
                builder.push_param();
                State::Value
            }
            (State::ParamValue { quoted: false }, t) => {
                builder.param_value.push_str(t.as_str());
                State::ParamValue { quoted: false }
            }

            (State::Value, t) => {
                builder.value.push_str(t.as_str());
                State::Value
            }
        };
    }

    // Last line without a trailing newline
    match state {
        State::Value => lines.push(builder.finish()?),
        State::Name if builder.is_empty() => {}
        _ => return Err(ContentLineError::MissingColon { line: builder.line }),
    }

    Ok(lines)
}

fn line_of(src: &str, offset: usize) -> usize {
    src.get(..offset)
        .map_or(0, |head| head.bytes().filter(|&b| b == b'\n').count())
        + 1
}

#[derive(Debug, Default)]
struct LineBuilder {
    name: String,
    parameters: Vec<ScannedParameter>,
    param_name: String,
    param_values: Vec<String>,
    param_value: String,
    value: String,
    line: usize,
}

impl LineBuilder {
    fn is_empty(&self) -> bool {
        self.name.is_empty() && self.parameters.is_empty() && self.param_name.is_empty()
    }

    fn push_param_value(&mut self) {
        self.param_values.push(std::mem::take(&mut self.param_value));
    }

    fn push_param(&mut self) {
        self.push_param_value();
        self.parameters.push(ScannedParameter {
            name: std::mem::take(&mut self.param_name),
            values: std::mem::take(&mut self.param_values),
        });
    }

    fn finish(&mut self) -> Result<ContentLine, ContentLineError> {
        let line = std::mem::take(self);
        if line.name.trim().is_empty() {
            return Err(ContentLineError::EmptyName { line: line.line });
        }

        Ok(ContentLine {
            name: line.name,
            parameters: line.parameters,
            value: line.value,
            line: line.line,
        })
    }
}
