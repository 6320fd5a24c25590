//! Request, response and record types for the listing API.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::storage::Resource;

/// Read-time status of a race or sport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Closed,
    Open,
}

impl Status {
    /// OPEN once the advertised start has been reached (inclusive).
    pub fn at(advertised_start: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now >= advertised_start {
            Status::Open
        } else {
            Status::Closed
        }
    }
}

/// Sort direction for `ORDER BY`.
///
/// Accepts the name (`"ASC"`, `"desc"`) or the wire number (0, 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DirectionRepr {
    Name(String),
    Number(i64),
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match DirectionRepr::deserialize(deserializer)? {
            DirectionRepr::Name(name) => match name.as_str() {
                "ASC" | "asc" => Ok(Direction::Asc),
                "DESC" | "desc" => Ok(Direction::Desc),
                other => Err(de::Error::custom(format!("unknown direction `{}`", other))),
            },
            DirectionRepr::Number(0) => Ok(Direction::Asc),
            DirectionRepr::Number(1) => Ok(Direction::Desc),
            DirectionRepr::Number(other) => {
                Err(de::Error::custom(format!("unknown direction {}", other)))
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(i64),
    Text(String),
}

/// int64 ids may arrive as JSON numbers or as decimal strings.
fn ids_from_numbers_or_strings<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<i64>, D::Error> {
    Vec::<IdRepr>::deserialize(deserializer)?
        .into_iter()
        .map(|id| match id {
            IdRepr::Number(n) => Ok(n),
            IdRepr::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| de::Error::custom(format!("id `{}` is not an integer", text))),
        })
        .collect()
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Ordering requested by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub direction: Direction,
}

/// Filter applied to a list call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilter {
    /// Meeting ids to restrict to; empty means no restriction.
    #[serde(
        default,
        alias = "meeting_ids",
        alias = "groupingIds",
        deserialize_with = "ids_from_numbers_or_strings"
    )]
    pub meeting_ids: Vec<i64>,
    /// Restrict to visible rows. `false` does not mean "only hidden".
    #[serde(default, alias = "only_visible")]
    pub only_visible: bool,
    #[serde(default, alias = "order_by", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
}

/// List request envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest {
    #[serde(default)]
    pub filter: Option<ListFilter>,
}

/// Fetch-by-id request envelope. The id travels as text, as in the HTTP path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    pub id: String,
}

/// List response, serialized under the resource's plural name.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResponse<R> {
    pub records: Vec<R>,
}

impl<R: Resource + Serialize> Serialize for ListResponse<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(R::PLURAL, &self.records)?;
        map.end()
    }
}

/// Fetch response, serialized under the resource's singular name.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse<R> {
    pub record: Option<R>,
}

impl<R: Resource + Serialize> Serialize for FetchResponse<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(R::SINGULAR, &self.record)?;
        map.end()
    }
}

/// A race at a meeting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: i64,
    pub meeting_id: i64,
    pub name: String,
    pub number: i64,
    pub visible: bool,
    pub advertised_start_time: DateTime<Utc>,
    pub status: Status,
}

/// A sporting event at a meeting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sport {
    pub id: i64,
    pub meeting_id: i64,
    pub name: String,
    pub number: i64,
    pub visible: bool,
    pub advertised_start_time: DateTime<Utc>,
    pub status: Status,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_status_boundary_is_open() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(Status::at(start, start), Status::Open);
        assert_eq!(Status::at(start, start + Duration::seconds(1)), Status::Open);
        assert_eq!(Status::at(start, start - Duration::seconds(1)), Status::Closed);
    }

    #[test]
    fn test_filter_accepts_gateway_json() {
        let json = r#"{"filter": {"meetingIds": [1, 2], "onlyVisible": true,
            "orderBy": {"fields": ["number"], "direction": "DESC"}}}"#;
        let req: ListRequest = serde_json::from_str(json).unwrap();
        let filter = req.filter.unwrap();
        assert_eq!(filter.meeting_ids, vec![1, 2]);
        assert!(filter.only_visible);
        let order = filter.order_by.unwrap();
        assert_eq!(order.fields, vec!["number".to_string()]);
        assert_eq!(order.direction, Direction::Desc);
    }

    #[test]
    fn test_filter_accepts_snake_case_and_defaults() {
        let json = r#"{"meeting_ids": [3], "order_by": {"fields": ["name"]}}"#;
        let filter: ListFilter = serde_json::from_str(json).unwrap();
        assert_eq!(filter.meeting_ids, vec![3]);
        assert!(!filter.only_visible);
        assert_eq!(filter.order_by.unwrap().direction, Direction::Asc);
    }

    #[test]
    fn test_filter_accepts_string_ids_and_numeric_direction() {
        let json = r#"{"meetingIds": ["1", "2", 3], "orderBy": {"fields": ["number"], "direction": 1}}"#;
        let filter: ListFilter = serde_json::from_str(json).unwrap();
        assert_eq!(filter.meeting_ids, vec![1, 2, 3]);
        assert_eq!(filter.order_by.unwrap().direction, Direction::Desc);

        let order: OrderBy = serde_json::from_str(r#"{"direction": 0}"#).unwrap();
        assert_eq!(order.direction, Direction::Asc);
        let order: OrderBy = serde_json::from_str(r#"{"direction": "asc"}"#).unwrap();
        assert_eq!(order.direction, Direction::Asc);
    }

    #[test]
    fn test_filter_rejects_bad_ids_and_directions() {
        assert!(serde_json::from_str::<ListFilter>(r#"{"meetingIds": ["one"]}"#).is_err());
        assert!(serde_json::from_str::<OrderBy>(r#"{"direction": 2}"#).is_err());
        assert!(serde_json::from_str::<OrderBy>(r#"{"direction": "UP"}"#).is_err());
    }

    #[test]
    fn test_direction_serializes_as_name() {
        assert_eq!(serde_json::to_string(&Direction::Desc).unwrap(), r#""DESC""#);
    }

    #[test]
    fn test_empty_list_request() {
        let req: ListRequest = serde_json::from_str("{}").unwrap();
        assert!(req.filter.is_none());
    }

    #[test]
    fn test_list_response_uses_plural_key() {
        let response = ListResponse {
            records: vec![Race {
                id: 7,
                meeting_id: 2,
                name: "Cup".to_string(),
                number: 4,
                visible: true,
                advertised_start_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
                status: Status::Open,
            }],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["races"][0]["meetingId"], 2);
        assert_eq!(value["races"][0]["status"], "OPEN");
        assert_eq!(value["races"][0]["advertisedStartTime"], "2024-03-01T12:00:00Z");
    }

    #[test]
    fn test_fetch_response_missing_record_is_null() {
        let response: FetchResponse<Sport> = FetchResponse { record: None };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value["sport"].is_null());
    }
}
