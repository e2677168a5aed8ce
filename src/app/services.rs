use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::Connection;
use thiserror::Error;

use crate::adapters::db;
use crate::adapters::db::DbError;
use crate::domain::models::StationReport;

const BUSY_BACKOFF_STEP: Duration = Duration::from_millis(20);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database stayed busy after {attempts} attempts")]
    Busy { attempts: u32 },
    #[error("database operation failed: {0}")]
    Database(#[from] DbError),
}

pub trait StationStatusStore: Send + Sync {
    fn upsert(&self, report: &StationReport) -> Result<(), StoreError>;
}

pub trait StationStatusQuery {
    fn get(&self, station_id: i64) -> Result<Option<StationReport>, StoreError>;
    fn list(&self) -> Result<Vec<StationReport>, StoreError>;
    fn count(&self) -> Result<i64, StoreError>;
}

// Single writer: upserts are applied in lock acquisition order.
#[derive(Clone)]
pub struct SqliteStationStore {
    connection: Arc<Mutex<Connection>>,
    busy_retries: u32,
}

impl SqliteStationStore {
    pub fn new(connection: Arc<Mutex<Connection>>, busy_retries: u32) -> Self {
        Self {
            connection,
            busy_retries,
        }
    }

    pub fn open(path: &str, busy_timeout: Duration, busy_retries: u32) -> Result<Self, StoreError> {
        let connection = db::open_connection(path)?;
        db::set_busy_timeout(&connection, busy_timeout)?;
        let store = Self::new(Arc::new(Mutex::new(connection)), busy_retries);
        store.init_schema()?;
        Ok(store)
    }

    pub fn init_schema(&self) -> Result<(), StoreError> {
        let mut connection = self.lock();
        db::init_schema(&mut connection).map_err(StoreError::from)
    }

    // A writer that panicked mid-statement leaves no open transaction behind,
    // so the connection stays usable.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.connection.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("database lock poisoned by a panicked writer; recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    fn with_connection<T>(
        &self,
        op: impl Fn(&Connection) -> Result<T, DbError>,
    ) -> Result<T, StoreError> {
        let mut attempt = 0_u32;
        loop {
            attempt += 1;
            let result = {
                let connection = self.lock();
                op(&connection)
            };

            match result {
                Ok(value) => return Ok(value),
                Err(error) if error.is_busy() => {
                    if attempt > self.busy_retries {
                        return Err(StoreError::Busy { attempts: attempt });
                    }
                    tracing::debug!(attempt, error = %error, "database busy, retrying");
                    std::thread::sleep(BUSY_BACKOFF_STEP * attempt);
                }
                Err(error) => return Err(StoreError::from(error)),
            }
        }
    }
}

impl StationStatusStore for SqliteStationStore {
    fn upsert(&self, report: &StationReport) -> Result<(), StoreError> {
        self.with_connection(|connection| db::upsert_station_status(connection, report))
    }
}

impl StationStatusQuery for SqliteStationStore {
    fn get(&self, station_id: i64) -> Result<Option<StationReport>, StoreError> {
        self.with_connection(|connection| db::get_station_status(connection, station_id))
    }

    fn list(&self) -> Result<Vec<StationReport>, StoreError> {
        self.with_connection(db::list_station_statuses)
    }

    fn count(&self) -> Result<i64, StoreError> {
        self.with_connection(db::count_station_statuses)
    }
}
