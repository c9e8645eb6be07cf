//! Durable storage for sensor readings.
//!
//! Every accepted reading is appended to a single `sensor_data` table. The
//! display window is only ever a truncated view of what lands here; the
//! table itself is the full session history, bounded only by the export
//! scan.

use std::path::Path;

use rusqlite::{params, Connection};
use tracing::debug;

use crate::data::Reading;
use crate::error::MonitorError;

/// One persisted row, as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReading {
    /// RFC 3339 timestamp text, as written at insert time.
    pub timestamp: String,
    pub co_level: f64,
    pub helmet_worn: bool,
}

/// Append-only store over a SQLite database.
///
/// Each insert commits independently; durability is best-effort per reading,
/// not transactional across a session.
#[derive(Debug)]
pub struct SensorStore {
    conn: Connection,
}

impl SensorStore {
    /// Open (or create) the database at `path` and ensure the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MonitorError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            MonitorError::Persistence(format!("failed to open database {}: {e}", path.display()))
        })?;
        debug!("opened sensor database at {}", path.display());
        Self::init(conn)
    }

    /// In-memory store for tests and dry runs.
    pub fn open_in_memory() -> Result<Self, MonitorError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| MonitorError::Persistence(format!("failed to open in-memory db: {e}")))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, MonitorError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS sensor_data (
                 timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                 co_level REAL,
                 helmet_worn BOOLEAN)",
            [],
        )?;
        Ok(Self { conn })
    }

    /// Insert one reading with its wall-clock timestamp.
    ///
    /// No batching and no cross-reading transaction: each call is one
    /// independent durable insert.
    pub fn append(&self, reading: &Reading) -> Result<(), MonitorError> {
        self.conn.execute(
            "INSERT INTO sensor_data (timestamp, co_level, helmet_worn) VALUES (?1, ?2, ?3)",
            params![
                reading.recorded_at.to_rfc3339(),
                reading.co_level,
                reading.worn
            ],
        )?;
        Ok(())
    }

    /// Every persisted row, in insertion order.
    pub fn rows(&self) -> Result<Vec<StoredReading>, MonitorError> {
        Ok(self.scan()?)
    }

    /// Number of persisted rows.
    pub fn row_count(&self) -> Result<u64, MonitorError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM sensor_data", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Write every persisted row to `path` as CSV, in storage order.
    ///
    /// Columns are `timestamp,co_level,helmet_worn` with a header row.
    /// Returns the number of exported rows. Failure is reported as
    /// [`MonitorError::Export`] with the underlying cause; nothing in the
    /// store or the core's in-memory state changes.
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<u64, MonitorError> {
        let path = path.as_ref();
        let rows = self
            .scan()
            .map_err(|e| MonitorError::Export(format!("query failed: {e}")))?;

        let mut out = String::from("timestamp,co_level,helmet_worn\n");
        for row in &rows {
            out.push_str(&format!(
                "{},{},{}\n",
                row.timestamp,
                row.co_level,
                if row.helmet_worn { 1 } else { 0 }
            ));
        }

        std::fs::write(path, out).map_err(|e| {
            MonitorError::Export(format!("failed to write {}: {e}", path.display()))
        })?;
        debug!("exported {} readings to {}", rows.len(), path.display());
        Ok(rows.len() as u64)
    }

    fn scan(&self) -> Result<Vec<StoredReading>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp, co_level, helmet_worn FROM sensor_data ORDER BY rowid",
        )?;
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(StoredReading {
                timestamp: row.get(0)?,
                co_level: row.get(1)?,
                helmet_worn: row.get(2)?,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(readings: &[(f64, bool)]) -> SensorStore {
        let store = SensorStore::open_in_memory().unwrap();
        for &(co, worn) in readings {
            store.append(&Reading::new(co, worn)).unwrap();
        }
        store
    }

    #[test]
    fn test_open_creates_schema() {
        let store = SensorStore::open_in_memory().unwrap();
        assert_eq!(store.row_count().unwrap(), 0);
        assert!(store.rows().unwrap().is_empty());
    }

    #[test]
    fn test_append_preserves_order_and_values() {
        let store = store_with(&[(100.0, true), (200.5, false), (300.0, true)]);
        let rows = store.rows().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].co_level, 100.0);
        assert!(rows[0].helmet_worn);
        assert_eq!(rows[1].co_level, 200.5);
        assert!(!rows[1].helmet_worn);
        assert_eq!(rows[2].co_level, 300.0);
    }

    #[test]
    fn test_timestamps_are_rfc3339() {
        let store = store_with(&[(42.0, true)]);
        let rows = store.rows().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&rows[0].timestamp).is_ok());
    }

    #[test]
    fn test_open_on_disk_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("helmet_data.db");

        {
            let store = SensorStore::open(&db_path).unwrap();
            store.append(&Reading::new(55.0, true)).unwrap();
        }

        let reopened = SensorStore::open(&db_path).unwrap();
        assert_eq!(reopened.row_count().unwrap(), 1);
        assert_eq!(reopened.rows().unwrap()[0].co_level, 55.0);
    }

    #[test]
    fn test_export_round_trip() {
        let store = store_with(&[(100.0, true), (650.0, false)]);
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("export.csv");

        let exported = store.export_csv(&csv_path).unwrap();
        assert_eq!(exported, 2);

        let content = std::fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,co_level,helmet_worn");
        assert!(lines[1].ends_with(",100,1"));
        assert!(lines[2].ends_with(",650,0"));
    }

    #[test]
    fn test_export_empty_store_writes_header_only() {
        let store = SensorStore::open_in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("empty.csv");

        assert_eq!(store.export_csv(&csv_path).unwrap(), 0);
        let content = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(content, "timestamp,co_level,helmet_worn\n");
    }

    #[test]
    fn test_export_to_bad_path_is_export_error() {
        let store = store_with(&[(1.0, true)]);
        let result = store.export_csv("/nonexistent/dir/export.csv");
        assert!(matches!(result, Err(MonitorError::Export(_))));
        // Store is untouched by the failed export.
        assert_eq!(store.row_count().unwrap(), 1);
    }
}
