//! The listable-resource abstraction shared by races and sports.

use chrono::{DateTime, Utc};

use crate::types::{Race, Sport, Status};

/// Table layout of a listable resource.
#[derive(Debug, Clone, Copy)]
pub struct TableShape {
    pub table: &'static str,
    /// Column matched by the filter's id set.
    pub grouping_column: &'static str,
    /// Columns callers may order by.
    pub sortable_fields: &'static [&'static str],
}

impl TableShape {
    /// Base `SELECT` in the column order the row mapper expects.
    pub fn select(&self) -> String {
        format!(
            "SELECT id, {}, name, number, visible, advertised_start_time FROM {}",
            self.grouping_column, self.table
        )
    }

    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable_fields.contains(&field)
    }
}

const DEFAULT_SORTABLE: &[&str] = &[
    "id",
    "meeting_id",
    "name",
    "number",
    "visible",
    "advertised_start_time",
];

/// Columns read from one row, before status is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct Columns {
    pub id: i64,
    pub grouping_id: i64,
    pub name: String,
    pub number: i64,
    pub visible: bool,
    pub advertised_start_time: DateTime<Utc>,
}

/// A record type served by the generic listing pipeline.
pub trait Resource: Sized + Send + Sync + 'static {
    /// Singular name used in response envelopes and logs.
    const SINGULAR: &'static str;
    /// Plural name used in routes and list envelopes.
    const PLURAL: &'static str;
    const SHAPE: TableShape;

    fn from_columns(columns: Columns, status: Status) -> Self;

    /// Display name for the n-th seeded row.
    fn seed_name(n: i64) -> String;
}

impl Resource for Race {
    const SINGULAR: &'static str = "race";
    const PLURAL: &'static str = "races";
    const SHAPE: TableShape = TableShape {
        table: "races",
        grouping_column: "meeting_id",
        sortable_fields: DEFAULT_SORTABLE,
    };

    fn from_columns(columns: Columns, status: Status) -> Self {
        Race {
            id: columns.id,
            meeting_id: columns.grouping_id,
            name: columns.name,
            number: columns.number,
            visible: columns.visible,
            advertised_start_time: columns.advertised_start_time,
            status,
        }
    }

    fn seed_name(n: i64) -> String {
        const VENUES: [&str; 6] = [
            "Flemington",
            "Randwick",
            "Ascot",
            "Eagle Farm",
            "Morphettville",
            "Ellerslie",
        ];
        format!("{} Race {}", VENUES[(n as usize) % VENUES.len()], n)
    }
}

impl Resource for Sport {
    const SINGULAR: &'static str = "sport";
    const PLURAL: &'static str = "sports";
    const SHAPE: TableShape = TableShape {
        table: "sports",
        grouping_column: "meeting_id",
        sortable_fields: DEFAULT_SORTABLE,
    };

    fn from_columns(columns: Columns, status: Status) -> Self {
        Sport {
            id: columns.id,
            meeting_id: columns.grouping_id,
            name: columns.name,
            number: columns.number,
            visible: columns.visible,
            advertised_start_time: columns.advertised_start_time,
            status,
        }
    }

    fn seed_name(n: i64) -> String {
        const EVENTS: [&str; 6] = [
            "Football",
            "Basketball",
            "Tennis",
            "Cricket",
            "Rugby",
            "Baseball",
        ];
        format!("{} Match {}", EVENTS[(n as usize) % EVENTS.len()], n)
    }
}
