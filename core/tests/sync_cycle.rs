// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end sync cycle tests against in-memory source and calendar.

mod common;

use duesync_core::{CycleReport, FetchError, SyncCycle, SyncError};
use serde_json::json;

use common::{
    FakeConnector, FakeSource, MemoryCalendar, SOURCE_URL, backup_payload, task_file_payload,
};

fn cycle(source: &FakeSource, calendar: &MemoryCalendar) -> SyncCycle<FakeSource, FakeConnector> {
    SyncCycle::new(source.clone(), SOURCE_URL, FakeConnector::new(calendar.clone()))
}

fn pay_rent(due_day: &str) -> serde_json::Value {
    json!({ "id": "t1", "title": "Pay rent", "dueDay": due_day })
}

fn rent_source(due_day: &str) -> FakeSource {
    FakeSource::with_file(SOURCE_URL, task_file_payload(&[("t1", pay_rent(due_day))]))
}

#[tokio::test]
async fn creates_all_day_event() {
    let source = rent_source("2024-03-01");
    let calendar = MemoryCalendar::default();

    let report = cycle(&source, &calendar).run().await.unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(calendar.uids(), ["super-productivity-t1"]);
    let text = calendar.event_text("super-productivity-t1").unwrap();
    assert!(text.contains("UID:super-productivity-t1\r\n"));
    assert!(text.contains("SUMMARY:Pay rent\r\n"));
    assert!(text.contains("DTSTART;VALUE=DATE:20240301\r\n"));
    assert!(text.contains("DTEND;VALUE=DATE:20240302\r\n"));
    assert!(!text.contains("RRULE"));
}

#[tokio::test]
async fn second_run_is_idempotent() {
    let payload = backup_payload(&[
        ("t1", pay_rent("2024-03-01")),
        (
            "t2",
            json!({ "title": "Call bank", "dueWithTime": 1_709_294_400_500_i64, "repeat": "WEEKLY" }),
        ),
        (
            "t3",
            json!({ "title": "Stretch", "dueDay": "2024-03-02", "repeatCfg": { "freq": "daily" } }),
        ),
        ("t4", json!({ "title": "Someday" })),
    ]);
    let source = FakeSource::with_file(SOURCE_URL, payload);
    let calendar = MemoryCalendar::default();
    let cycle = cycle(&source, &calendar);

    let first = cycle.run().await.unwrap();
    assert_eq!(first.created, 3);
    assert_eq!(first.excluded, 1);

    let second = cycle.run().await.unwrap();
    assert_eq!(
        second,
        CycleReport {
            skipped: 3,
            excluded: 1,
            ..CycleReport::default()
        }
    );
    assert_eq!(second.changed(), 0);
    assert_eq!(calendar.writes().len(), 3);
}

#[tokio::test]
async fn due_day_change_updates_event() {
    let source = rent_source("2024-03-01");
    let calendar = MemoryCalendar::default();
    let cycle = cycle(&source, &calendar);
    cycle.run().await.unwrap();

    source.put(SOURCE_URL, task_file_payload(&[("t1", pay_rent("2024-03-05"))]));
    let report = cycle.run().await.unwrap();

    assert_eq!(report.updated, 1);
    let text = calendar.event_text("super-productivity-t1").unwrap();
    assert!(text.contains("DTSTART;VALUE=DATE:20240305\r\n"));
    assert!(text.contains("DTEND;VALUE=DATE:20240306\r\n"));
    assert!(!text.contains("20240301"));
}

#[tokio::test]
async fn title_change_updates_event() {
    let source = rent_source("2024-03-01");
    let calendar = MemoryCalendar::default();
    let cycle = cycle(&source, &calendar);
    cycle.run().await.unwrap();

    let renamed = json!({ "title": "Pay rent, finally", "dueDay": "2024-03-01" });
    source.put(SOURCE_URL, task_file_payload(&[("t1", renamed)]));
    let report = cycle.run().await.unwrap();

    assert_eq!(report.updated, 1);
    let text = calendar.event_text("super-productivity-t1").unwrap();
    assert!(text.contains("SUMMARY:Pay rent\\, finally\r\n"));

    assert_eq!(cycle.run().await.unwrap().changed(), 0);
}

#[tokio::test]
async fn multiline_title_is_written_once() {
    let task = json!({ "title": "Line one\r\nLine two", "dueDay": "2024-03-01" });
    let source = FakeSource::with_file(SOURCE_URL, task_file_payload(&[("t1", task)]));
    let calendar = MemoryCalendar::default();
    let cycle = cycle(&source, &calendar);

    assert_eq!(cycle.run().await.unwrap().created, 1);
    let text = calendar.event_text("super-productivity-t1").unwrap();
    assert!(text.contains("SUMMARY:Line one\\nLine two\r\n"));

    for _ in 0..2 {
        let report = cycle.run().await.unwrap();
        assert_eq!(
            report,
            CycleReport {
                skipped: 1,
                ..CycleReport::default()
            }
        );
    }
    assert_eq!(calendar.writes().len(), 1);
}

#[tokio::test]
async fn all_day_to_timed_clears_end() {
    let source = rent_source("2024-03-01");
    let calendar = MemoryCalendar::default();
    let cycle = cycle(&source, &calendar);
    cycle.run().await.unwrap();
    assert!(calendar.event_text("super-productivity-t1").unwrap().contains("DTEND"));

    let timed = json!({
        "title": "Pay rent",
        "dueDay": "2024-03-01",
        "dueWithTime": 1_709_294_400_000_i64,
    });
    source.put(SOURCE_URL, task_file_payload(&[("t1", timed)]));
    let report = cycle.run().await.unwrap();

    assert_eq!(report.updated, 1);
    let text = calendar.event_text("super-productivity-t1").unwrap();
    assert!(text.contains("DTSTART:20240301T120000Z\r\n"));
    assert!(!text.contains("DTEND"));
    assert!(!text.contains("DURATION"));
}

#[tokio::test]
async fn subtasks_are_never_synced() {
    let payload = task_file_payload(&[
        ("p1", json!({ "title": "Move", "dueDay": "2024-04-01" })),
        ("c1", json!({ "title": "Pack boxes", "dueDay": "2024-03-30", "parentId": "p1" })),
    ]);
    let source = FakeSource::with_file(SOURCE_URL, payload);
    let calendar = MemoryCalendar::default();
    let cycle = cycle(&source, &calendar);

    let report = cycle.run().await.unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.excluded, 1);
    assert_eq!(calendar.uids(), ["super-productivity-p1"]);

    let report = cycle.run().await.unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(report.excluded, 1);
}

#[tokio::test]
async fn recurrence_is_mapped_from_whitelist_only() {
    let payload = task_file_payload(&[
        ("t1", json!({ "title": "Water plants", "dueDay": "2024-03-01", "repeat": "daily" })),
        ("t2", json!({ "title": "Payday", "dueDay": "2024-03-15", "repeat": "BIWEEKLY" })),
    ]);
    let source = FakeSource::with_file(SOURCE_URL, payload);
    let calendar = MemoryCalendar::default();

    cycle(&source, &calendar).run().await.unwrap();

    let daily = calendar.event_text("super-productivity-t1").unwrap();
    assert!(daily.contains("RRULE:FREQ=DAILY\r\n"));
    let biweekly = calendar.event_text("super-productivity-t2").unwrap();
    assert!(!biweekly.contains("RRULE"));
}

#[tokio::test]
async fn enveloped_task_file_found_at_second_candidate() {
    let source = FakeSource::with_file(
        "https://dav.example.com/sp/task",
        format!("pf_4.4__{}", task_file_payload(&[("t1", pay_rent("2024-03-01"))])),
    );
    let calendar = MemoryCalendar::default();

    let report = cycle(&source, &calendar).run().await.unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(
        source.requests(),
        [SOURCE_URL, "https://dav.example.com/sp/task"]
    );
}

#[tokio::test]
async fn unrecognized_json_moves_to_next_candidate() {
    let source = FakeSource::with_file(SOURCE_URL, r#"{"lastUpdate": 1}"#);
    source.put(
        "https://dav.example.com/sp/task.json",
        json!({ "mainModelData": { "task": { "entities": { "t1": pay_rent("2024-03-01") } } } })
            .to_string(),
    );
    let calendar = MemoryCalendar::default();

    let report = cycle(&source, &calendar).run().await.unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(source.requests().len(), 3);
}

#[tokio::test]
async fn fetch_failure_skips_cycle() {
    let source = FakeSource::with_file(SOURCE_URL, "<html>not json</html>");
    let calendar = MemoryCalendar::default();
    let connector = FakeConnector::new(calendar.clone());
    let cycle = SyncCycle::new(source.clone(), SOURCE_URL, connector.clone());

    let err = cycle.run().await.unwrap_err();

    match err {
        SyncError::Fetch(FetchError::NotFound { tried }) => assert_eq!(tried.len(), 3),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(connector.connects(), 0);
    assert!(calendar.writes().is_empty());
}

#[tokio::test]
async fn connect_failure_skips_cycle() {
    let source = rent_source("2024-03-01");
    let cycle = SyncCycle::new(source, SOURCE_URL, FakeConnector::unreachable());

    let err = cycle.run().await.unwrap_err();
    assert!(matches!(err, SyncError::Connect(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn per_task_failures_do_not_stop_cycle() {
    let payload = task_file_payload(&[
        ("t1", pay_rent("2024-03-01")),
        ("t2", json!({ "title": "Broken date", "dueDay": "next week" })),
        ("t3", json!({ "title": "Lookup fails", "dueDay": "2024-03-03" })),
        ("t4", json!({ "title": "Fine", "dueDay": "2024-03-04" })),
    ]);
    let source = FakeSource::with_file(SOURCE_URL, payload);
    let calendar = MemoryCalendar::default();
    calendar.fail_writes_for("super-productivity-t1");
    calendar.fail_lookups_for("super-productivity-t3");

    let report = cycle(&source, &calendar).run().await.unwrap();

    assert_eq!(
        report,
        CycleReport {
            created: 1,
            excluded: 1,
            failed: 2,
            ..CycleReport::default()
        }
    );
    assert_eq!(calendar.uids(), ["super-productivity-t4"]);
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let source = rent_source("2024-03-01");
    let calendar = MemoryCalendar::default();

    let report = cycle(&source, &calendar).dry_run(true).run().await.unwrap();

    assert_eq!(report.created, 1);
    assert!(calendar.writes().is_empty());
    assert!(calendar.uids().is_empty());
}

#[tokio::test]
async fn event_written_elsewhere_with_equal_fields_is_skipped() {
    let payload = task_file_payload(&[(
        "t2",
        json!({ "title": "Call bank", "dueWithTime": 1_709_294_400_000_i64 }),
    )]);
    let source = FakeSource::with_file(SOURCE_URL, payload);
    let calendar = MemoryCalendar::default();
    // floating time, folded summary, LF line endings
    calendar.insert_raw(
        "super-productivity-t2",
        "BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//Other//EN\nBEGIN:VEVENT\n\
         UID:super-productivity-t2\nDTSTAMP:20240101T000000Z\nDTSTART:20240301T120000\n\
         SUMMARY:Call\n  bank\nEND:VEVENT\nEND:VCALENDAR\n",
    );

    let report = cycle(&source, &calendar).run().await.unwrap();

    assert_eq!(report.skipped, 1);
    assert!(calendar.writes().is_empty());
}

#[tokio::test]
async fn event_in_other_zone_is_compared_in_utc() {
    let payload = task_file_payload(&[(
        "t2",
        json!({ "title": "Call bank", "dueWithTime": 1_709_294_400_000_i64 }),
    )]);
    let source = FakeSource::with_file(SOURCE_URL, payload);
    let calendar = MemoryCalendar::default();
    calendar.insert_raw(
        "super-productivity-t2",
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Other//EN\r\nBEGIN:VEVENT\r\n\
         UID:super-productivity-t2\r\nDTSTART;TZID=Europe/Berlin:20240301T130000\r\n\
         SUMMARY:Call bank\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
    );

    let report = cycle(&source, &calendar).run().await.unwrap();
    assert_eq!(report.skipped, 1);
}
