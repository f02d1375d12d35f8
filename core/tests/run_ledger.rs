//! Run ledger persistence tests.

use amabutho_core::{
    analysis::AnalysisResult,
    parser::parse,
    selector::SelectionMode,
    store::{ledger_timestamp, RunStore},
};
use chrono::{FixedOffset, Local, TimeZone};

fn result(run_id: &str, day: u32, reply: &str) -> AnalysisResult {
    AnalysisResult {
        run_id:             run_id.to_string(),
        generated_at:       Local.with_ymd_and_hms(2025, 4, day, 9, 0, 0).unwrap(),
        selection_mode:     SelectionMode::Random,
        clamped:            true,
        seed:               None,
        fields:             vec!["DeviceType".to_string(), "CurrentPlan".to_string()],
        subscriber_headers: vec!["MSISDN".to_string()],
        subscribers:        Vec::new(),
        prompt:             String::new(),
        response:           reply.to_string(),
        parsed:             parse(reply),
    }
}

fn store() -> RunStore {
    let store = RunStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

#[test]
fn recorded_run_round_trips() {
    let store = store();
    let reply = "| MSISDN | Category |\n| 1 | Data |\n| 2 | Voice |\n- Upgrade data users\n";
    let recorded = result("run-a", 1, reply);
    store.record_run(&recorded, "gemini-test").unwrap();

    assert_eq!(store.run_count().unwrap(), 1);
    let runs = store.recent_runs(5).unwrap();
    let run = &runs[0];
    assert_eq!(run.run_id, "run-a");
    assert_eq!(run.generated_at, ledger_timestamp(&recorded.generated_at));
    assert!(run.generated_at.ends_with('Z'));
    assert_eq!(run.selection_mode, "random");
    assert!(run.clamped);
    assert_eq!(run.fields, "DeviceType, CurrentPlan");
    assert_eq!(run.model, "gemini-test");
    assert!(run.table_found);
    assert_eq!(run.row_count, 2);
    assert_eq!(run.insight_count, 1);
}

#[test]
fn degraded_run_records_missing_table() {
    let store = store();
    store.record_run(&result("run-b", 2, "no table"), "m").unwrap();
    let run = &store.recent_runs(1).unwrap()[0];
    assert!(!run.table_found);
    assert_eq!(run.row_count, 0);
}

#[test]
fn recent_runs_newest_first_and_limited() {
    let store = store();
    for (id, day) in [("run-1", 1), ("run-3", 3), ("run-2", 2)] {
        store.record_run(&result(id, day, "x"), "m").unwrap();
    }
    let ids: Vec<_> = store.recent_runs(2).unwrap().into_iter().map(|r| r.run_id).collect();
    assert_eq!(ids, vec!["run-3", "run-2"]);
}

/// Migrations can be applied to an existing ledger again.
#[test]
fn migrate_is_repeatable() {
    let store = store();
    store.migrate().unwrap();
    assert_eq!(store.run_count().unwrap(), 0);
}

/// Timestamps are stored in UTC so runs from different offsets sort by instant.
#[test]
fn ledger_timestamps_sort_by_instant_across_offsets() {
    // 08:00 UTC, written at +02:00.
    let east = FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 4, 1, 10, 0, 0)
        .unwrap();
    // 11:00 UTC, written at -05:00.
    let west = FixedOffset::west_opt(5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 4, 1, 6, 0, 0)
        .unwrap();

    assert!(east.to_rfc3339() > west.to_rfc3339());
    assert!(ledger_timestamp(&east) < ledger_timestamp(&west));
    assert_eq!(ledger_timestamp(&east), "2025-04-01T08:00:00.000000Z");
}
