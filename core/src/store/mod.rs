//! SQLite run ledger.
//!
//! RULE: Only the store talks to the database.
//! The ledger records run metadata; prompts and model responses are never
//! persisted.

use crate::error::RecResult;
use rusqlite::Connection;

mod runs;

pub use runs::{ledger_timestamp, RunLedgerEntry};

pub struct RunStore {
    conn: Connection,
}

impl RunStore {
    /// Open (or create) the ledger at `path`.
    pub fn open(path: &str) -> RecResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory ledger (used in tests and when no path is given).
    pub fn in_memory() -> RecResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> RecResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_run_ledger.sql"))?;
        Ok(())
    }
}
