// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Untyped iCalendar syntax: tokens, content lines and the component tree.

pub mod lexer;
pub mod scanner;
pub mod tree_builder;

pub use lexer::{SpannedToken, Token, tokenize};
pub use scanner::{ContentLine, ContentLineError, ScannedParameter, scan_content_lines};
pub use tree_builder::{SyntaxComponent, TreeBuildError, build_tree};
