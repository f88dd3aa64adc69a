use std::path::Path;
use std::sync::Mutex;

use chrono::{Days, NaiveDate, Utc};

use cruise_feed::{
    CabinPrice, CruiseId, CruiseStore, IngestedCruiseRecord, LineId, SailingReference, StoreError,
};

use crate::schema;

/// When a line was last synced, for staleness reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSyncStatus {
    pub line_id: LineId,
    pub last_synced_at: Option<String>,
}

/// SQLite-backed cruise store.
///
/// Each upsert runs in its own transaction; enumeration reads build the
/// sailing references the path resolver consumes.
pub struct SqliteCruiseStore {
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteCruiseStore {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = rusqlite::Connection::open(path)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: rusqlite::Connection) -> Result<Self, StoreError> {
        schema::migrations()
            .to_latest(&mut conn)
            .map_err(|e| StoreError::Unavailable(format!("migration failed: {e}")))?;

        tracing::debug!("cruise store opened, schema is current");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Last-sync times for every line the store has seen.
    pub fn line_sync_statuses(&self) -> Result<Vec<LineSyncStatus>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT line_id, last_synced_at FROM cruise_lines ORDER BY line_id")
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let statuses = stmt
            .query_map([], |row| {
                Ok(LineSyncStatus {
                    line_id: LineId::new(row.get::<_, u32>(0)?),
                    last_synced_at: row.get(1)?,
                })
            })
            .map_err(|e| StoreError::Query(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(statuses)
    }

    pub fn cruise_count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM cruises", [], |row| {
            row.get::<_, i64>(0).map(|n| n as u64)
        })
        .map_err(|e| StoreError::Query(e.to_string()))
    }

    /// Fetch one persisted record back out, mostly for tests and spot
    /// checks; the sync pipeline itself only writes.
    pub fn cruise(&self, cruise_id: &CruiseId) -> Result<Option<IngestedCruiseRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT cruise_id, line_id, ship_id, name, sail_date, nights, currency,
                        cheapest_inside, cheapest_outside, cheapest_balcony, cheapest_suite,
                        cabin_prices_json
                 FROM cruises WHERE cruise_id = ?1",
            )
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut rows = stmt
            .query_map([cruise_id.as_str()], Self::row_to_record)
            .map_err(|e| StoreError::Query(e.to_string()))?;

        match rows.next() {
            None => Ok(None),
            Some(row) => row
                .map(Some)
                .map_err(|e| StoreError::Query(e.to_string())),
        }
    }

    fn row_to_sailing(row: &rusqlite::Row) -> rusqlite::Result<SailingReference> {
        let cruise_id: String = row.get(0)?;
        let line_id: u32 = row.get(1)?;
        let ship_id: Option<u32> = row.get(2)?;
        let sail_date: String = row.get(3)?;

        let (year, month) = split_sail_date(&sail_date).unwrap_or((0, 0));

        Ok(SailingReference {
            cruise_id: CruiseId::new(cruise_id),
            line_id: LineId::new(line_id),
            ship_id,
            year,
            month,
        })
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<IngestedCruiseRecord> {
        let cruise_id: String = row.get(0)?;
        let line_id: u32 = row.get(1)?;
        let ship_id: Option<u32> = row.get(2)?;
        let name: Option<String> = row.get(3)?;
        let sail_date: String = row.get(4)?;
        let nights: Option<u32> = row.get(5)?;
        let currency: Option<String> = row.get(6)?;
        let cheapest = cruise_feed::CategoryPrices {
            inside: row.get(7)?,
            outside: row.get(8)?,
            balcony: row.get(9)?,
            suite: row.get(10)?,
        };
        let cabin_prices_json: String = row.get(11)?;

        let cabin_prices: Vec<CabinPrice> =
            serde_json::from_str(&cabin_prices_json).unwrap_or_default();

        Ok(IngestedCruiseRecord {
            cruise_id: CruiseId::new(cruise_id),
            line_id: LineId::new(line_id),
            ship_id,
            name,
            sail_date: NaiveDate::parse_from_str(&sail_date, "%Y-%m-%d")
                .unwrap_or_default(),
            nights,
            currency,
            cheapest,
            cabin_prices,
        })
    }
}

/// Year and month of an ISO `YYYY-MM-DD` date string.
fn split_sail_date(sail_date: &str) -> Option<(u16, u8)> {
    let date = NaiveDate::parse_from_str(sail_date, "%Y-%m-%d").ok()?;
    use chrono::Datelike;
    Some((date.year() as u16, date.month() as u8))
}

#[async_trait::async_trait]
impl CruiseStore for SqliteCruiseStore {
    async fn sailings_for_line(&self, line: LineId) -> Result<Vec<SailingReference>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT cruise_id, line_id, ship_id, sail_date
                 FROM cruises WHERE line_id = ?1
                 ORDER BY sail_date, cruise_id",
            )
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let sailings = stmt
            .query_map([line.get()], Self::row_to_sailing)
            .map_err(|e| StoreError::Query(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(sailings)
    }

    async fn sailings_in_window(&self, days: u32) -> Result<Vec<SailingReference>, StoreError> {
        let today = Utc::now().date_naive();
        let cutoff = today
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(today);

        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT cruise_id, line_id, ship_id, sail_date
                 FROM cruises WHERE sail_date >= ?1 AND sail_date <= ?2
                 ORDER BY sail_date, cruise_id",
            )
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let sailings = stmt
            .query_map(
                [today.to_string(), cutoff.to_string()],
                Self::row_to_sailing,
            )
            .map_err(|e| StoreError::Query(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(sailings)
    }

    async fn upsert(&self, record: &IngestedCruiseRecord) -> Result<(), StoreError> {
        let cabin_prices_json = serde_json::to_string(&record.cabin_prices)
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut conn = self.conn.lock().unwrap();

        // One transaction per record, never per batch.
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        tx.execute(
            "INSERT INTO cruises
                (cruise_id, line_id, ship_id, name, sail_date, nights, currency,
                 cheapest_inside, cheapest_outside, cheapest_balcony, cheapest_suite,
                 cabin_prices_json, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, datetime('now'))
             ON CONFLICT(cruise_id) DO UPDATE SET
                line_id = excluded.line_id,
                ship_id = excluded.ship_id,
                name = excluded.name,
                sail_date = excluded.sail_date,
                nights = excluded.nights,
                currency = excluded.currency,
                cheapest_inside = excluded.cheapest_inside,
                cheapest_outside = excluded.cheapest_outside,
                cheapest_balcony = excluded.cheapest_balcony,
                cheapest_suite = excluded.cheapest_suite,
                cabin_prices_json = excluded.cabin_prices_json,
                updated_at = excluded.updated_at",
            rusqlite::params![
                record.cruise_id.as_str(),
                record.line_id.get(),
                record.ship_id,
                record.name,
                record.sail_date.to_string(),
                record.nights,
                record.currency,
                record.cheapest.inside,
                record.cheapest.outside,
                record.cheapest.balcony,
                record.cheapest.suite,
                cabin_prices_json,
            ],
        )
        .map_err(|e| StoreError::Query(e.to_string()))?;

        tx.commit().map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn record_line_sync(&self, line: LineId) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO cruise_lines (line_id, last_synced_at)
             VALUES (?1, datetime('now'))
             ON CONFLICT(line_id) DO UPDATE SET last_synced_at = excluded.last_synced_at",
            [line.get()],
        )
        .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }
}
