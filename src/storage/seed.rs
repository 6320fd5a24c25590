//! Baseline rows written on first initialization.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rusqlite::{params, Connection};

use super::mapper::format_timestamp;
use super::resource::Resource;
use crate::error::{ListingError, ListingResult};

/// Meeting ids are drawn from `1..=MEETINGS`.
const MEETINGS: i64 = 10;

/// Start times fall within this many hours either side of `now`.
const START_WINDOW_HOURS: i64 = 48;

/// Inserts rows `1..=count` into the resource table.
///
/// Ids are fixed, so rows already present are left untouched. Returns the
/// number of rows actually written.
pub fn seed<R: Resource>(
    conn: &mut Connection,
    count: u32,
    now: DateTime<Utc>,
) -> ListingResult<usize> {
    let shape = R::SHAPE;
    let sql = format!(
        "INSERT OR IGNORE INTO {} (id, {}, name, number, visible, advertised_start_time) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        shape.table, shape.grouping_column
    );

    let tx = conn
        .transaction()
        .map_err(|e| ListingError::store(format!("begin {} seed", shape.table), e))?;
    let mut written = 0;
    {
        let mut stmt = tx
            .prepare(&sql)
            .map_err(|e| ListingError::store(format!("prepare {} seed", shape.table), e))?;
        let mut rng = rand::thread_rng();
        let window = START_WINDOW_HOURS * 60;

        for id in 1..=i64::from(count) {
            let offset = Duration::minutes(rng.gen_range(-window..=window));
            let start = format_timestamp(now + offset);
            written += stmt
                .execute(params![
                    id,
                    rng.gen_range(1..=MEETINGS),
                    R::seed_name(id),
                    rng.gen_range(2..=12_i64),
                    rng.gen_bool(0.5),
                    start,
                ])
                .map_err(|e| ListingError::store(format!("insert {} {}", R::SINGULAR, id), e))?;
        }
    }
    tx.commit()
        .map_err(|e| ListingError::store(format!("commit {} seed", shape.table), e))?;

    Ok(written)
}
