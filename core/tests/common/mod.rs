// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory source and calendar doubles, plus Super Productivity payloads
//! to feed them.

mod fakes;
mod fixtures;

#[allow(unused_imports)]
pub use fakes::{FakeConnector, FakeSource, MemoryCalendar};
#[allow(unused_imports)]
pub use fixtures::{SOURCE_URL, backup_payload, task_file_payload};
