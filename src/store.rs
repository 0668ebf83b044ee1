//! Local measurement database
//!
//! One table `bp` keyed by (timestamp, systolic, diastolic). Rows are only
//! ever inserted; a reading already present is ignored, even when its pulse
//! differs.

use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::fmt;
use std::path::Path;

use crate::measurement::Measurement;

/// Timestamps are stored as text in this format, so ordering
/// by the column is chronological.
const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS bp (
    ts    TEXT    NOT NULL,
    sys   INTEGER NOT NULL,
    dia   INTEGER NOT NULL,
    pulse INTEGER NOT NULL,
    PRIMARY KEY (ts, sys, dia) ON CONFLICT IGNORE
);";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Invalid value in database: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Mean values over a set of stored readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Averages {
    pub systolic: f64,
    pub diastolic: f64,
    pub pulse: f64,
}

impl fmt::Display for Averages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sys: {:.1} Dia: {:.1} Pulse: {:.1}",
            self.systolic, self.diastolic, self.pulse
        )
    }
}

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file and make sure the table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        info!("Database opened at {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert all measurements in one transaction.
    ///
    /// Returns the number of rows actually added. On error nothing of the
    /// batch is kept.
    pub fn upsert_all(&mut self, measurements: &[Measurement]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt =
                tx.prepare_cached("INSERT OR IGNORE INTO bp VALUES (?1, ?2, ?3, ?4)")?;
            for mea in measurements {
                inserted += stmt.execute(params![
                    mea.timestamp.format(TS_FORMAT).to_string(),
                    mea.systolic,
                    mea.diastolic,
                    mea.pulse,
                ])?;
            }
        }
        tx.commit()?;
        debug!(
            "Inserted {} of {} measurements",
            inserted,
            measurements.len()
        );
        Ok(inserted)
    }

    pub fn total_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM bp", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| StoreError::InvalidValue(format!("row count {count}")))
    }

    /// Mean of the `n` most recent readings, `None` if the table is empty.
    ///
    /// Readings sharing a timestamp are picked in the order SQLite returns them.
    pub fn recent_average(&self, n: usize) -> Result<Option<Averages>> {
        let limit = i64::try_from(n)
            .map_err(|_| StoreError::InvalidValue(format!("limit {n}")))?;
        let row = self
            .conn
            .query_row(
                "SELECT AVG(sys), AVG(dia), AVG(pulse)
                 FROM (SELECT sys, dia, pulse FROM bp ORDER BY ts DESC LIMIT ?1)",
                params![limit],
                |row| {
                    Ok((
                        row.get::<_, Option<f64>>(0)?,
                        row.get::<_, Option<f64>>(1)?,
                        row.get::<_, Option<f64>>(2)?,
                    ))
                },
            )
            .optional()?;

        Ok(match row {
            Some((Some(systolic), Some(diastolic), Some(pulse))) => Some(Averages {
                systolic,
                diastolic,
                pulse,
            }),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn mea(day: u32, systolic: u16, diastolic: u16, pulse: u16) -> Measurement {
        Measurement {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, day)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
            systolic,
            diastolic,
            pulse,
        }
    }

    #[test]
    fn test_empty_batch() {
        let mut store = Store::open_in_memory().unwrap();
        assert_eq!(store.upsert_all(&[]).unwrap(), 0);
        assert_eq!(store.total_count().unwrap(), 0);
    }

    #[test]
    fn test_ensure_schema_twice() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.ensure_schema().is_ok());
    }

    #[test]
    fn test_duplicate_ignored() {
        let mut store = Store::open_in_memory().unwrap();
        assert_eq!(store.upsert_all(&[mea(1, 120, 80, 60)]).unwrap(), 1);
        assert_eq!(store.total_count().unwrap(), 1);

        // Same key, other pulse: first write wins
        assert_eq!(store.upsert_all(&[mea(1, 120, 80, 99)]).unwrap(), 0);
        assert_eq!(store.total_count().unwrap(), 1);
        let avg = store.recent_average(2).unwrap().unwrap();
        assert_eq!(avg.pulse, 60.0);
    }

    #[test]
    fn test_duplicate_within_batch() {
        let mut store = Store::open_in_memory().unwrap();
        let batch = [mea(1, 120, 80, 60), mea(1, 120, 80, 60), mea(1, 121, 80, 60)];
        assert_eq!(store.upsert_all(&batch).unwrap(), 2);
        assert_eq!(store.total_count().unwrap(), 2);
    }

    #[test]
    fn test_failed_batch_rolls_back() {
        let mut store = Store::open_in_memory().unwrap();
        store.upsert_all(&[mea(1, 110, 70, 60)]).unwrap();
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER fail_insert BEFORE INSERT ON bp WHEN NEW.sys = 999
                 BEGIN SELECT RAISE(ABORT, 'simulated failure'); END;",
            )
            .unwrap();

        let batch = [mea(2, 120, 80, 60), mea(3, 130, 85, 70), mea(4, 999, 85, 70)];
        assert!(store.upsert_all(&batch).is_err());
        assert_eq!(store.total_count().unwrap(), 1);
    }

    #[test]
    fn test_recent_average_two_rows() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .upsert_all(&[mea(1, 120, 80, 60), mea(2, 130, 85, 70)])
            .unwrap();
        assert_eq!(
            store.recent_average(2).unwrap(),
            Some(Averages {
                systolic: 125.0,
                diastolic: 82.5,
                pulse: 65.0
            })
        );
    }

    #[test]
    fn test_recent_average_uses_newest() {
        let mut store = Store::open_in_memory().unwrap();
        // Insert out of calendar order
        store
            .upsert_all(&[mea(3, 140, 90, 80), mea(1, 100, 60, 50), mea(2, 120, 80, 60)])
            .unwrap();
        let avg = store.recent_average(2).unwrap().unwrap();
        assert_eq!(avg.systolic, 130.0);
        assert_eq!(avg.diastolic, 85.0);
        assert_eq!(avg.pulse, 70.0);
    }

    #[test]
    fn test_recent_average_fewer_rows() {
        let mut store = Store::open_in_memory().unwrap();
        store.upsert_all(&[mea(1, 120, 80, 60)]).unwrap();
        let avg = store.recent_average(2).unwrap().unwrap();
        assert_eq!(avg.systolic, 120.0);
        assert_eq!(avg.to_string(), "Sys: 120.0 Dia: 80.0 Pulse: 60.0");
    }

    #[test]
    fn test_recent_average_empty() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.recent_average(2).unwrap(), None);
    }

    #[test]
    fn test_reopen_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bm58.sqlite");
        {
            let mut store = Store::open(&path).unwrap();
            store.upsert_all(&[mea(1, 120, 80, 60)]).unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert_eq!(store.total_count().unwrap(), 1);
    }
}
