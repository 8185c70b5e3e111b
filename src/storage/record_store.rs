//! Record Store
//!
//! Append-only SQLite table of every completed task/result pair.

use std::path::Path;
use std::time::Duration;

use chrono::Local;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::task::{TaskId, TaskRecord, TaskResult};

/// A row of the `results` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRecord {
    /// Auto-increment row id
    pub id: i64,
    pub task: TaskRecord,
    pub result: TaskResult,
    /// Local wall-clock time of the insert, `%Y-%m-%d %H:%M:%S`
    pub timestamp: String,
}

/// SQLite-backed structured store
///
/// ## Concurrency:
/// A single connection guarded by a mutex. Inserts are independent rows,
/// so workers only contend for the duration of one INSERT.
pub struct RecordStore {
    conn: Mutex<Connection>,
}

impl RecordStore {
    const TIMESTAMP_FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";
    const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Open the database and create the `results` table if absent
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Self::BUSY_TIMEOUT)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task TEXT NOT NULL,
                result TEXT NOT NULL,
                ts TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Append a row, returning its id
    pub fn append(&self, task: &TaskRecord, result: &TaskResult) -> Result<i64> {
        let task_json = serde_json::to_string(task)?;
        let result_json = serde_json::to_string(result)?;
        let ts = Local::now().format(Self::TIMESTAMP_FORMAT).to_string();

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO results (task, result, ts) VALUES (?1, ?2, ?3)",
            params![task_json, result_json, ts],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent row for a task id
    pub fn find_by_task(&self, id: &TaskId) -> Result<Option<PersistedRecord>> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT id, task, result, ts FROM results
                 WHERE json_extract(task, '$.id') = ?1
                 ORDER BY id DESC LIMIT 1",
                params![id.to_string()],
                Self::read_columns,
            )
            .optional()?;

        row.map(Self::decode).transpose()
    }

    /// Every row, oldest first
    pub fn list(&self) -> Result<Vec<PersistedRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id, task, result, ts FROM results ORDER BY id")?;
        let rows = stmt
            .query_map([], Self::read_columns)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::decode).collect()
    }

    /// Number of rows
    pub fn count(&self) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn read_columns(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, String)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    }

    fn decode((id, task, result, timestamp): (i64, String, String, String)) -> Result<PersistedRecord> {
        Ok(PersistedRecord {
            id,
            task: serde_json::from_str(&task)?,
            result: serde_json::from_str(&result)?,
            timestamp,
        })
    }
}
