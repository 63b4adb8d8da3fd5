// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parse and represent the iCalendar events exchanged with a CalDAV server.

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
#![allow(clippy::similar_names, clippy::single_match_else)]

pub mod formatter;
#[allow(missing_docs)]
pub mod keyword;
mod parser;
pub mod semantic;
pub mod syntax;
pub mod value;

pub use crate::parser::{ParseError, parse};
pub use crate::semantic::{ICalendar, SemanticError, VEvent};
pub use crate::value::{
    DateOrDateTime, RecurrenceFrequency, ValueDate, ValueDateTime, ValueError,
    ValueRecurrenceRule, ValueTime,
};
