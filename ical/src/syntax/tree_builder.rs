// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Tree builder for constructing component hierarchy from content lines.
//!
//! The tree builder uses a stack-based algorithm:
//! 1. On BEGIN:X, push a new component onto the stack
//! 2. On property, add to the current component (top of stack)
//! 3. On END:X, pop from stack and add to parent component

use std::fmt;

use crate::keyword::{KW_BEGIN, KW_END};
use crate::syntax::scanner::ContentLine;

/// A raw iCalendar component (e.g., VCALENDAR, VEVENT, VTODO)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxComponent {
    /// Component name, uppercased (e.g., "VCALENDAR", "VEVENT")
    pub name: String,
    /// Properties in original order
    pub properties: Vec<ContentLine>,
    /// Nested child components
    pub children: Vec<SyntaxComponent>,
}

impl SyntaxComponent {
    fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_ascii_uppercase(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// First property with the given name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&ContentLine> {
        self.properties.iter().find(|p| p.is(name))
    }
}

/// Errors raised while nesting components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeBuildError {
    /// `END` does not close the innermost open component.
    MismatchedEnd {
        /// Line of the `END`
        line: usize,
        /// Component that is open
        expected: String,
        /// Component named by `END`
        found: String,
    },

    /// `END` with no open component.
    UnexpectedEnd {
        /// Line of the `END`
        line: usize,
    },

    /// Property that appears outside any component.
    OrphanProperty {
        /// Line of the property
        line: usize,
    },

    /// Input ended while a component was open.
    Unclosed {
        /// Component left open
        name: String,
    },
}

impl fmt::Display for TreeBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MismatchedEnd {
                line,
                expected,
                found,
            } => write!(f, "line {line}: expected END:{expected}, found END:{found}"),
            Self::UnexpectedEnd { line } => write!(f, "line {line}: END without BEGIN"),
            Self::OrphanProperty { line } => write!(f, "line {line}: property outside component"),
            Self::Unclosed { name } => write!(f, "component {name} is never closed"),
        }
    }
}

impl std::error::Error for TreeBuildError {}

/// Build the component tree from scanned content lines.
///
/// ## Errors
///
/// Returns an error if BEGIN/END lines are unbalanced.
pub fn build_tree(lines: Vec<ContentLine>) -> Result<Vec<SyntaxComponent>, TreeBuildError> {
    let mut roots = Vec::new();
    let mut stack: Vec<SyntaxComponent> = Vec::new();

    for line in lines {
        if line.is(KW_BEGIN) {
            stack.push(SyntaxComponent::new(&line.value));
        } else if line.is(KW_END) {
            let Some(component) = stack.pop() else {
                return Err(TreeBuildError::UnexpectedEnd { line: line.line });
            };

            if !component.name.eq_ignore_ascii_case(line.value.trim()) {
                return Err(TreeBuildError::MismatchedEnd {
                    line: line.line,
                    expected: component.name,
                    found: line.value,
                });
            }

            match stack.last_mut() {
                Some(parent) => parent.children.push(component),
                None => roots.push(component),
            }
        } else {
            match stack.last_mut() {
                Some(current) => current.properties.push(line),
                None => return Err(TreeBuildError::OrphanProperty { line: line.line }),
            }
        }
    }

    match stack.pop() {
        Some(component) => Err(TreeBuildError::Unclosed {
            name: component.name,
        }),
        None => Ok(roots),
    }
}
