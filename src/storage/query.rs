//! Builds parameterized list queries from a filter.

use rusqlite::types::Value;

use super::resource::TableShape;
use crate::error::{ListingError, ListingResult};
use crate::types::ListFilter;

/// Appends the filter's `WHERE` and `ORDER BY` clauses to `base`.
///
/// `base` must be a plain `SELECT` without either clause. Returns the final
/// SQL and its positional bind values. Order fields are checked against the
/// shape's allow-list; nothing here touches the store.
pub fn compose(
    base: &str,
    shape: &TableShape,
    filter: Option<&ListFilter>,
) -> ListingResult<(String, Vec<Value>)> {
    let mut query = base.to_string();
    let mut args: Vec<Value> = Vec::new();

    let Some(filter) = filter else {
        return Ok((query, args));
    };

    let mut clauses: Vec<String> = Vec::new();

    // visible = false means "any visibility", so only the true case restricts.
    if filter.only_visible {
        clauses.push("visible = true".to_string());
    }

    if !filter.meeting_ids.is_empty() {
        let placeholders = vec!["?"; filter.meeting_ids.len()].join(",");
        clauses.push(format!("{} IN ({})", shape.grouping_column, placeholders));
        args.extend(filter.meeting_ids.iter().map(|id| Value::Integer(*id)));
    }

    if !clauses.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&clauses.join(" AND "));
    }

    if let Some(order) = filter.order_by.as_ref().filter(|o| !o.fields.is_empty()) {
        if let Some(bad) = order.fields.iter().find(|f| !shape.is_sortable(f)) {
            return Err(ListingError::InvalidArgument(format!(
                "cannot order {} by `{}`",
                shape.table, bad
            )));
        }
        query.push_str(&format!(
            " ORDER BY {} {}",
            order.fields.join(", "),
            order.direction.as_sql()
        ));
    }

    Ok((query, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Resource;
    use crate::types::{Direction, OrderBy, Race};

    const BASE: &str =
        "SELECT id, meeting_id, name, number, visible, advertised_start_time FROM races";

    fn compose_races(filter: Option<&ListFilter>) -> ListingResult<(String, Vec<Value>)> {
        compose(BASE, &Race::SHAPE, filter)
    }

    #[test]
    fn test_no_filter_returns_base() {
        let (query, args) = compose_races(None).unwrap();
        assert_eq!(query, BASE);
        assert!(args.is_empty());
    }

    #[test]
    fn test_default_filter_returns_base() {
        let (query, args) = compose_races(Some(&ListFilter::default())).unwrap();
        assert_eq!(query, BASE);
        assert!(args.is_empty());
    }

    #[test]
    fn test_only_visible() {
        let filter = ListFilter {
            only_visible: true,
            ..Default::default()
        };
        let (query, args) = compose_races(Some(&filter)).unwrap();
        assert_eq!(query, format!("{BASE} WHERE visible = true"));
        assert!(args.is_empty());
    }

    #[test]
    fn test_meeting_ids_keep_caller_order() {
        for ids in [vec![5], vec![3, 1], vec![9, 2, 7, 4]] {
            let filter = ListFilter {
                meeting_ids: ids.clone(),
                ..Default::default()
            };
            let (query, args) = compose_races(Some(&filter)).unwrap();

            let placeholders = vec!["?"; ids.len()].join(",");
            assert_eq!(query, format!("{BASE} WHERE meeting_id IN ({placeholders})"));
            assert_eq!(query.matches('?').count(), ids.len());
            let expected: Vec<Value> = ids.iter().map(|id| Value::Integer(*id)).collect();
            assert_eq!(args, expected);
        }
    }

    #[test]
    fn test_clause_order_and_join() {
        let filter = ListFilter {
            meeting_ids: vec![1, 2],
            only_visible: true,
            order_by: None,
        };
        let (query, args) = compose_races(Some(&filter)).unwrap();
        assert_eq!(
            query,
            format!("{BASE} WHERE visible = true AND meeting_id IN (?,?)")
        );
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_order_by_desc() {
        let filter = ListFilter {
            order_by: Some(OrderBy {
                fields: vec!["number".to_string()],
                direction: Direction::Desc,
            }),
            ..Default::default()
        };
        let (query, _) = compose_races(Some(&filter)).unwrap();
        assert_eq!(query, format!("{BASE} ORDER BY number DESC"));
    }

    #[test]
    fn test_order_by_follows_where_and_defaults_asc() {
        let filter = ListFilter {
            meeting_ids: vec![4],
            only_visible: false,
            order_by: Some(OrderBy {
                fields: vec!["advertised_start_time".to_string(), "id".to_string()],
                ..Default::default()
            }),
        };
        let (query, _) = compose_races(Some(&filter)).unwrap();
        assert_eq!(
            query,
            format!("{BASE} WHERE meeting_id IN (?) ORDER BY advertised_start_time, id ASC")
        );
    }

    #[test]
    fn test_empty_order_fields_ignored() {
        let filter = ListFilter {
            order_by: Some(OrderBy {
                fields: vec![],
                direction: Direction::Desc,
            }),
            ..Default::default()
        };
        let (query, _) = compose_races(Some(&filter)).unwrap();
        assert_eq!(query, BASE);
    }

    #[test]
    fn test_unknown_order_field_rejected() {
        let filter = ListFilter {
            order_by: Some(OrderBy {
                fields: vec!["number".to_string(), "1; DROP TABLE races".to_string()],
                direction: Direction::Asc,
            }),
            ..Default::default()
        };
        let err = compose_races(Some(&filter)).unwrap_err();
        assert!(matches!(err, ListingError::InvalidArgument(_)));
    }

    #[test]
    fn test_deterministic() {
        let filter = ListFilter {
            meeting_ids: vec![2, 8],
            only_visible: true,
            order_by: Some(OrderBy {
                fields: vec!["name".to_string()],
                direction: Direction::Asc,
            }),
        };
        assert_eq!(
            compose_races(Some(&filter)).unwrap(),
            compose_races(Some(&filter)).unwrap()
        );
    }
}
