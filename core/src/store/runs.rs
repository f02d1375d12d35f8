use super::RunStore;
use crate::{analysis::AnalysisResult, error::RecResult};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use rusqlite::params;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunLedgerEntry {
    pub run_id:         String,
    /// UTC, fixed-width RFC 3339, so text order is time order.
    pub generated_at:   String,
    pub selection_mode: String,
    pub record_count:   i64,
    pub clamped:        bool,
    pub fields:         String,
    pub model:          String,
    pub table_found:    bool,
    pub row_count:      i64,
    pub insight_count:  i64,
}

/// Ledger form of a run timestamp, e.g. `2025-04-01T07:00:00.000000Z`.
pub fn ledger_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    at.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl RunStore {
    // ── Runs ──────────────────────────────────────────────────────

    pub fn record_run(&self, result: &AnalysisResult, model: &str) -> RecResult<()> {
        let row_count = result.parsed.table.as_ref().map_or(0, |t| t.len());
        self.conn.execute(
            "INSERT INTO analysis_run (
                run_id, generated_at, selection_mode, record_count, clamped,
                fields, model, table_found, row_count, insight_count
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                &result.run_id,
                ledger_timestamp(&result.generated_at),
                result.selection_mode.label(),
                result.subscriber_count() as i64,
                if result.clamped { 1 } else { 0 },
                result.fields_label(),
                model,
                if result.parsed.table.is_some() { 1 } else { 0 },
                row_count as i64,
                result.parsed.insights.len() as i64,
            ],
        )?;
        Ok(())
    }

    /// Most recent runs first.
    pub fn recent_runs(&self, limit: usize) -> RecResult<Vec<RunLedgerEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, generated_at, selection_mode, record_count, clamped,
                    fields, model, table_found, row_count, insight_count
             FROM analysis_run
             ORDER BY generated_at DESC, rowid DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(RunLedgerEntry {
                run_id:         row.get(0)?,
                generated_at:   row.get(1)?,
                selection_mode: row.get(2)?,
                record_count:   row.get(3)?,
                clamped:        row.get::<_, i32>(4)? != 0,
                fields:         row.get(5)?,
                model:          row.get(6)?,
                table_found:    row.get::<_, i32>(7)? != 0,
                row_count:      row.get(8)?,
                insight_count:  row.get(9)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn run_count(&self) -> RecResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM analysis_run", [], |row| row.get(0))?;
        Ok(n)
    }
}
