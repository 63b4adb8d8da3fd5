// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Test data factories for integration tests.

use serde_json::{Map, Value, json};

/// Source URL configured in tests.
pub const SOURCE_URL: &str = "https://dav.example.com/sp/";

/// Builds a task state object from `(id, entity)` pairs, keeping their order.
fn task_state(tasks: &[(&str, Value)]) -> Value {
    let entities: Map<String, Value> = tasks
        .iter()
        .map(|(id, task)| ((*id).to_string(), task.clone()))
        .collect();
    let ids: Vec<&str> = tasks.iter().map(|(id, _)| *id).collect();
    json!({ "ids": ids, "entities": entities })
}

/// A sync folder task file, `{"entities": ...}`.
#[must_use]
pub fn task_file_payload(tasks: &[(&str, Value)]) -> String {
    task_state(tasks).to_string()
}

/// A full backup, `{"task": {"entities": ...}}`.
#[allow(dead_code)]
#[must_use]
pub fn backup_payload(tasks: &[(&str, Value)]) -> String {
    json!({ "task": task_state(tasks), "project": { "entities": {} } }).to_string()
}
