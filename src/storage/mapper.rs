//! Maps result rows onto records and derives their status.

use chrono::{DateTime, Utc};
use rusqlite::Row;

use super::resource::{Columns, Resource};
use crate::error::{ListingError, ListingResult};
use crate::types::Status;

/// Source of the current time for status derivation.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Scans one row in the `TableShape::select` column order.
///
/// Status is computed against `now`, never read from the row.
pub fn scan<R: Resource>(row: &Row<'_>, now: DateTime<Utc>) -> ListingResult<R> {
    let shape_err = |e: rusqlite::Error| {
        ListingError::Mapping(format!("{} row has unexpected shape: {}", R::SINGULAR, e))
    };

    let start_text: String = row.get(5).map_err(shape_err)?;
    let advertised_start_time = parse_timestamp(&start_text).ok_or_else(|| {
        ListingError::Mapping(format!(
            "invalid advertised_start_time `{}` in {}",
            start_text,
            R::SHAPE.table
        ))
    })?;

    let columns = Columns {
        id: row.get(0).map_err(shape_err)?,
        grouping_id: row.get(1).map_err(shape_err)?,
        name: row.get(2).map_err(shape_err)?,
        number: row.get(3).map_err(shape_err)?,
        visible: row.get(4).map_err(shape_err)?,
        advertised_start_time,
    };
    let status = Status::at(advertised_start_time, now);
    Ok(R::from_columns(columns, status))
}

/// Stored form of `advertised_start_time`: RFC 3339, whole seconds, `Z`.
///
/// Only this form is accepted so that text ordering in SQL matches time
/// ordering.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    chrono::NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Race, Sport};
    use chrono::{Duration, TimeZone};
    use rusqlite::Connection;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    fn scan_one<R: Resource>(
        conn: &Connection,
        sql: &str,
        now: DateTime<Utc>,
    ) -> ListingResult<R> {
        let mut stmt = conn.prepare(sql).unwrap();
        let mut rows = stmt.query([]).unwrap();
        let row = rows.next().unwrap().unwrap();
        scan::<R>(row, now)
    }

    #[test]
    fn test_scan_past_start_is_open() {
        let conn = Connection::open_in_memory().unwrap();
        let race: Race = scan_one(
            &conn,
            "SELECT 1, 2, 'Cup', 3, 1, '2024-06-01T09:59:59Z'",
            now(),
        )
        .unwrap();
        assert_eq!(race.id, 1);
        assert_eq!(race.meeting_id, 2);
        assert_eq!(race.name, "Cup");
        assert_eq!(race.number, 3);
        assert!(race.visible);
        assert_eq!(race.status, Status::Open);
    }

    #[test]
    fn test_scan_exact_start_is_open() {
        let conn = Connection::open_in_memory().unwrap();
        let sport: Sport = scan_one(
            &conn,
            "SELECT 1, 2, 'Final', 3, 0, '2024-06-01T10:00:00Z'",
            now(),
        )
        .unwrap();
        assert_eq!(sport.status, Status::Open);
        assert!(!sport.visible);
    }

    #[test]
    fn test_scan_future_start_is_closed() {
        let conn = Connection::open_in_memory().unwrap();
        let race: Race = scan_one(
            &conn,
            "SELECT 1, 2, 'Cup', 3, 1, '2024-06-01T10:00:01Z'",
            now(),
        )
        .unwrap();
        assert_eq!(race.status, Status::Closed);
        assert_eq!(race.advertised_start_time, now() + Duration::seconds(1));
    }

    #[test]
    fn test_status_follows_clock_not_row() {
        let conn = Connection::open_in_memory().unwrap();
        let sql = "SELECT 1, 2, 'Cup', 3, 1, '2024-06-01T10:00:00Z'";
        let before: Race = scan_one(&conn, sql, now() - Duration::minutes(5)).unwrap();
        let after: Race = scan_one(&conn, sql, now() + Duration::minutes(5)).unwrap();
        assert_eq!(before.status, Status::Closed);
        assert_eq!(after.status, Status::Open);
    }

    #[test]
    fn test_scan_type_mismatch_is_mapping_error() {
        let conn = Connection::open_in_memory().unwrap();
        let err = scan_one::<Race>(
            &conn,
            "SELECT 'abc', 2, 'Cup', 3, 1, '2024-06-01T10:00:00Z'",
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, ListingError::Mapping(_)));
    }

    #[test]
    fn test_scan_bad_timestamp_is_mapping_error() {
        let conn = Connection::open_in_memory().unwrap();
        let err = scan_one::<Race>(&conn, "SELECT 1, 2, 'Cup', 3, 1, 'soon'", now()).unwrap_err();
        assert!(matches!(err, ListingError::Mapping(_)));
    }

    #[test]
    fn test_non_canonical_timestamps_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        for start in [
            "2024-06-01 10:00:00",
            "2024-06-01T10:00:00+00:00",
            "2024-06-01T20:00:00+10:00",
            "2024-06-01T10:00:00.500Z",
        ] {
            let sql = format!("SELECT 1, 2, 'Cup', 3, 1, '{}'", start);
            let err = scan_one::<Race>(&conn, &sql, now()).unwrap_err();
            assert!(matches!(err, ListingError::Mapping(_)), "accepted {}", start);
        }
    }

    #[test]
    fn test_timestamp_format_round_trip() {
        let text = format_timestamp(now());
        assert_eq!(text, "2024-06-01T10:00:00Z");
        assert_eq!(parse_timestamp(&text), Some(now()));
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(now()).now(), now());
    }
}
