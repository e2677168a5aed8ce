use std::time::Duration;

use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use thiserror::Error;

use crate::domain::models::StationReport;

pub const LATEST_SCHEMA_VERSION: u32 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS station_status (
    station_id INTEGER PRIMARY KEY,
    last_date TEXT NOT NULL,
    alarm1 INTEGER NOT NULL CHECK (alarm1 IN (0, 1)),
    alarm2 INTEGER NOT NULL CHECK (alarm2 IN (0, 1))
);
"#;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database operation failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unsupported schema version {current}; latest supported is {latest}")]
    UnsupportedSchemaVersion { current: u32, latest: u32 },
}

impl DbError {
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(failure, _))
                if matches!(failure.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
        )
    }
}

pub fn open_connection(path: &str) -> Result<Connection, DbError> {
    Connection::open(path).map_err(DbError::from)
}

pub fn set_busy_timeout(connection: &Connection, timeout: Duration) -> Result<(), DbError> {
    connection.busy_timeout(timeout).map_err(DbError::from)
}

pub fn init_schema(connection: &mut Connection) -> Result<(), DbError> {
    let current_version = schema_version(connection)?;

    if current_version > LATEST_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            current: current_version,
            latest: LATEST_SCHEMA_VERSION,
        });
    }

    let transaction = connection.transaction()?;
    transaction.execute_batch(SCHEMA)?;
    if current_version < LATEST_SCHEMA_VERSION {
        transaction.pragma_update(None, "user_version", LATEST_SCHEMA_VERSION)?;
    }
    transaction.commit()?;

    Ok(())
}

pub fn schema_version(connection: &Connection) -> Result<u32, DbError> {
    let version = connection.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

pub fn upsert_station_status(
    connection: &Connection,
    report: &StationReport,
) -> Result<(), DbError> {
    connection.execute(
        "INSERT INTO station_status (station_id, last_date, alarm1, alarm2)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(station_id) DO UPDATE SET
             last_date = excluded.last_date,
             alarm1 = excluded.alarm1,
             alarm2 = excluded.alarm2",
        params![
            report.station_id,
            report.last_seen,
            report.alarm1,
            report.alarm2,
        ],
    )?;

    Ok(())
}

pub fn get_station_status(
    connection: &Connection,
    station_id: i64,
) -> Result<Option<StationReport>, DbError> {
    connection
        .query_row(
            "SELECT station_id, last_date, alarm1, alarm2
             FROM station_status
             WHERE station_id = ?1",
            params![station_id],
            |row| {
                Ok(StationReport {
                    station_id: row.get(0)?,
                    last_seen: row.get(1)?,
                    alarm1: row.get(2)?,
                    alarm2: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(DbError::from)
}

pub fn list_station_statuses(connection: &Connection) -> Result<Vec<StationReport>, DbError> {
    let mut statement = connection.prepare(
        "SELECT station_id, last_date, alarm1, alarm2
         FROM station_status
         ORDER BY station_id ASC",
    )?;

    let rows = statement.query_map([], |row| {
        Ok(StationReport {
            station_id: row.get(0)?,
            last_seen: row.get(1)?,
            alarm1: row.get(2)?,
            alarm2: row.get(3)?,
        })
    })?;

    let mut reports = Vec::new();
    for row in rows {
        reports.push(row?);
    }

    Ok(reports)
}

pub fn count_station_statuses(connection: &Connection) -> Result<i64, DbError> {
    connection
        .query_row("SELECT COUNT(*) FROM station_status", [], |row| row.get(0))
        .map_err(DbError::from)
}

#[cfg(test)]
mod tests {
    use rusqlite::params;

    use super::{
        DbError, LATEST_SCHEMA_VERSION, count_station_statuses, get_station_status, init_schema,
        list_station_statuses, open_connection, schema_version, upsert_station_status,
    };
    use crate::domain::models::StationReport;
    use crate::test_support::temp_db_path;

    fn report(station_id: i64, last_seen: &str, alarm1: bool, alarm2: bool) -> StationReport {
        StationReport {
            station_id,
            last_seen: last_seen.to_string(),
            alarm1,
            alarm2,
        }
    }

    #[test]
    fn initializes_fresh_database() {
        let db_path = temp_db_path("fresh.sqlite");
        let mut connection =
            open_connection(db_path.to_string_lossy().as_ref()).expect("db connection should open");

        init_schema(&mut connection).expect("schema init should succeed");

        let version = schema_version(&connection).expect("schema version should be queryable");
        assert_eq!(version, LATEST_SCHEMA_VERSION);

        let table_exists: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='station_status'",
                [],
                |row| row.get(0),
            )
            .expect("station_status table check should work");
        assert_eq!(table_exists, 1);
    }

    #[test]
    fn schema_init_is_idempotent_and_keeps_rows() {
        let db_path = temp_db_path("idempotent.sqlite");
        let mut connection =
            open_connection(db_path.to_string_lossy().as_ref()).expect("db connection should open");

        init_schema(&mut connection).expect("first init should succeed");
        upsert_station_status(&connection, &report(1, "2026-10-19 08:00", true, false))
            .expect("upsert should succeed");
        init_schema(&mut connection).expect("second init should succeed");

        assert_eq!(count_station_statuses(&connection).expect("count"), 1);
        assert_eq!(
            schema_version(&connection).expect("schema version"),
            LATEST_SCHEMA_VERSION
        );
    }

    #[test]
    fn accepts_table_created_by_legacy_collector() {
        let db_path = temp_db_path("legacy.sqlite");
        let mut connection =
            open_connection(db_path.to_string_lossy().as_ref()).expect("db connection should open");
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS station_status (
                    station_id INTEGER,
                    last_date TEXT,
                    alarm1 INTEGER,
                    alarm2 INTEGER,
                    PRIMARY KEY(station_id)
                );",
            )
            .expect("legacy table should be created");
        connection
            .execute(
                "INSERT INTO station_status VALUES (?1, ?2, ?3, ?4)",
                params![5, "2024-01-01 10:00", 0, 1],
            )
            .expect("legacy insert should succeed");

        init_schema(&mut connection).expect("init over legacy table should succeed");
        upsert_station_status(&connection, &report(5, "2026-10-19 09:15", true, true))
            .expect("upsert should succeed");

        let stored = get_station_status(&connection, 5)
            .expect("query should succeed")
            .expect("row should exist");
        assert_eq!(stored, report(5, "2026-10-19 09:15", true, true));
    }

    #[test]
    fn rejects_newer_schema_version() {
        let db_path = temp_db_path("newer.sqlite");
        let mut connection =
            open_connection(db_path.to_string_lossy().as_ref()).expect("db connection should open");
        connection
            .pragma_update(None, "user_version", LATEST_SCHEMA_VERSION + 1)
            .expect("pragma update should succeed");

        let result = init_schema(&mut connection);
        assert!(matches!(
            result,
            Err(DbError::UnsupportedSchemaVersion { .. })
        ));
    }

    #[test]
    fn upsert_replaces_existing_row() {
        let db_path = temp_db_path("replace.sqlite");
        let mut connection =
            open_connection(db_path.to_string_lossy().as_ref()).expect("db connection should open");
        init_schema(&mut connection).expect("schema init should succeed");

        upsert_station_status(&connection, &report(7, "2026-10-19 08:00", true, true))
            .expect("first upsert should succeed");
        upsert_station_status(&connection, &report(7, "2026-10-19 08:01", false, true))
            .expect("second upsert should succeed");

        assert_eq!(count_station_statuses(&connection).expect("count"), 1);
        let stored = get_station_status(&connection, 7)
            .expect("query should succeed")
            .expect("row should exist");
        assert_eq!(stored, report(7, "2026-10-19 08:01", false, true));
    }

    #[test]
    fn repeated_upsert_of_same_report_leaves_single_row() {
        let db_path = temp_db_path("idempotent-upsert.sqlite");
        let mut connection =
            open_connection(db_path.to_string_lossy().as_ref()).expect("db connection should open");
        init_schema(&mut connection).expect("schema init should succeed");

        let same = report(11, "2026-10-19 12:30", false, false);
        upsert_station_status(&connection, &same).expect("first upsert should succeed");
        upsert_station_status(&connection, &same).expect("second upsert should succeed");

        assert_eq!(
            list_station_statuses(&connection).expect("list should succeed"),
            vec![same]
        );
    }

    #[test]
    fn returns_none_for_unknown_station() {
        let db_path = temp_db_path("unknown.sqlite");
        let mut connection =
            open_connection(db_path.to_string_lossy().as_ref()).expect("db connection should open");
        init_schema(&mut connection).expect("schema init should succeed");

        let stored = get_station_status(&connection, 404).expect("query should succeed");
        assert_eq!(stored, None);
    }

    #[test]
    fn lists_rows_ordered_by_station_id() {
        let db_path = temp_db_path("list.sqlite");
        let mut connection =
            open_connection(db_path.to_string_lossy().as_ref()).expect("db connection should open");
        init_schema(&mut connection).expect("schema init should succeed");

        for station_id in [30, 10, 20] {
            upsert_station_status(
                &connection,
                &report(station_id, "2026-10-19 07:45", false, true),
            )
            .expect("upsert should succeed");
        }

        let ids: Vec<i64> = list_station_statuses(&connection)
            .expect("list should succeed")
            .into_iter()
            .map(|row| row.station_id)
            .collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn check_constraint_rejects_out_of_range_alarm() {
        let db_path = temp_db_path("check.sqlite");
        let mut connection =
            open_connection(db_path.to_string_lossy().as_ref()).expect("db connection should open");
        init_schema(&mut connection).expect("schema init should succeed");

        let result = connection.execute(
            "INSERT INTO station_status (station_id, last_date, alarm1, alarm2) VALUES (1, 'x', 2, 0)",
            [],
        );
        assert!(result.is_err());
    }
}
