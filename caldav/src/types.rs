// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::Deref;

use duesync_ical::ICalendar;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Wraps a raw `", stringify!($name), "` value.")]
            #[must_use]
            pub const fn new(value: String) -> Self {
                Self(value)
            }

            /// The raw value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_newtype! {
    /// Path (or full URL) of a resource as the server reports it,
    /// e.g. `/remote.php/dav/calendars/me/tasks/`.
    Href
}

string_newtype! {
    /// Opaque entity tag of a resource, quotes included.
    ETag
}

impl Href {
    /// Href of a member `name` of this collection.
    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        Self(format!("{}/{name}", self.0.trim_end_matches('/')))
    }
}

/// An event resource read from a calendar.
///
/// Some servers omit the `ETag`.
#[derive(Debug, Clone)]
pub struct CalendarResource {
    /// Where the resource lives.
    pub href: Href,

    /// Entity tag at read time.
    pub etag: Option<ETag>,

    /// Parsed calendar data.
    pub data: ICalendar,
}

impl CalendarResource {
    /// Creates a resource.
    #[must_use]
    pub const fn new(href: Href, etag: Option<ETag>, data: ICalendar) -> Self {
        Self { href, etag, data }
    }
}

/// A calendar collection below a calendar home.
#[derive(Debug, Clone)]
pub struct CalendarCollection {
    /// Collection href, usually with a trailing slash.
    pub href: Href,

    /// Human readable name.
    pub display_name: Option<String>,

    /// Component types the calendar accepts, empty if the server did not say.
    pub components: Vec<String>,
}

impl CalendarCollection {
    /// Creates a collection with no metadata.
    #[must_use]
    pub const fn new(href: Href) -> Self {
        Self {
            href,
            display_name: None,
            components: Vec::new(),
        }
    }

    /// Whether the calendar accepts `component`; unknown means yes.
    #[must_use]
    pub fn accepts(&self, component: &str) -> bool {
        self.components.is_empty()
            || self
                .components
                .iter()
                .any(|c| c.eq_ignore_ascii_case(component))
    }
}

/// Condition attached to a PUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// Write unconditionally.
    None,

    /// Replace only if the resource still has this `ETag`.
    IfMatch(ETag),

    /// Create only, never overwrite.
    IfNoneMatch,
}
