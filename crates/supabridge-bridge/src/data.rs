// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data adapter: table calls become one `TableQuery` each.
//
// Data calls never reject once the client exists. Validation failures and
// backend errors alike resolve as `{data: null, error}`.

use serde_json::Value;
use tracing::{debug, warn};

use supabridge_core::backend::BackendSdk;
use supabridge_core::config::BridgeSettings;
use supabridge_core::error::{Result, SupabridgeError};
use supabridge_core::operation::Operation;
use supabridge_core::query::{FilterValue, TableQuery, check_filter_column};
use supabridge_core::types::{JsonObject, QueryResult};

use crate::marshal::{Args, to_object};
use crate::traits::BridgeObject;

fn with_filters(mut query: TableQuery, filter: Option<&JsonObject>) -> Result<TableQuery> {
    for (column, value) in filter.into_iter().flatten() {
        check_filter_column(column)?;
        query = query.eq(column.as_str(), FilterValue::from_json(column, value)?);
    }
    Ok(query)
}

/// Filter for a mutation; absent or empty filters are refused.
fn mutation_filter<'a>(args: &'a Args, action: &str) -> Result<&'a JsonObject> {
    match args.optional_object("filter")? {
        Some(filter) if !filter.is_empty() => Ok(filter),
        _ => Err(SupabridgeError::EmptyFilter(action.to_owned())),
    }
}

pub(crate) fn select_query(settings: &BridgeSettings, args: &Args) -> Result<TableQuery> {
    let table = args.required_str("table")?;
    let columns = args.optional_str("columns")?.unwrap_or("*");
    let mut query = with_filters(TableQuery::select(table, columns), args.optional_object("filter")?)?;

    let order_by = match args.optional_str("orderBy")? {
        Some(column) => Some(column),
        None => settings.default_order_by.as_deref(),
    };
    if let Some(column) = order_by {
        query = query.order(column, args.optional_bool("ascending")?.unwrap_or(true));
    }

    let limit = args.optional_u64("limit")?;
    if limit == Some(0) {
        return Err(SupabridgeError::invalid("limit", "must be at least 1"));
    }
    match (args.optional_u64("offset")?, limit) {
        (Some(offset), limit) => {
            let count = limit.unwrap_or(settings.default_page_size).max(1);
            query = query.range(offset, offset.saturating_add(count - 1));
        }
        (None, Some(limit)) => query = query.limit(limit),
        (None, None) => {}
    }

    if args.optional_bool("single")?.unwrap_or(false) {
        query = query.single();
    }
    Ok(query)
}

/// Inserts return the new row as a single object.
pub(crate) fn insert_query(args: &Args) -> Result<TableQuery> {
    let table = args.required_str("table")?;
    let values = args.required_object("values")?;
    Ok(TableQuery::insert(table, Value::Object(values.clone()))
        .returning("*")
        .single())
}

pub(crate) fn update_query(args: &Args) -> Result<TableQuery> {
    let table = args.required_str("table")?;
    let values = args.required_object("values")?;
    let filter = mutation_filter(args, "update")?;
    with_filters(TableQuery::update(table, Value::Object(values.clone())), Some(filter))
        .map(|q| q.returning("*"))
}

pub(crate) fn delete_query(args: &Args) -> Result<TableQuery> {
    let table = args.required_str("table")?;
    let filter = mutation_filter(args, "delete")?;
    with_filters(TableQuery::delete(table), Some(filter)).map(|q| q.returning("*"))
}

fn row_count(data: &Value) -> usize {
    match data {
        Value::Array(rows) => rows.len(),
        Value::Null => 0,
        _ => 1,
    }
}

/// Run a built query and shape the outcome for the shell.
pub(crate) async fn run(
    sdk: &dyn BackendSdk,
    op: Operation,
    built: Result<TableQuery>,
) -> BridgeObject {
    let query = match built {
        Ok(query) => query,
        Err(e) => {
            warn!(%op, error = %e, "data call rejected before reaching the backend");
            return query_object(QueryResult::failed(e.to_string()));
        }
    };

    let result = match sdk.execute(query).await {
        Ok(data) => {
            let count = row_count(&data);
            debug!(%op, rows = count, "data call succeeded");
            match op {
                Operation::Select => QueryResult::ok(data),
                _ => QueryResult::ok(data).with_count(count),
            }
        }
        Err(e) => {
            warn!(%op, error = %e, "data call failed");
            QueryResult::failed(e.to_string())
        }
    };
    query_object(result)
}

fn query_object(result: QueryResult) -> BridgeObject {
    match to_object(&result) {
        Ok(obj) => obj,
        Err(e) => {
            warn!(error = %e, "could not serialise query result");
            let mut obj = BridgeObject::new();
            obj.insert("data".into(), Value::Null);
            obj.insert("error".into(), Value::String(e.to_string()));
            obj
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use supabridge_core::query::{Ordering, RowRange};

    fn args(value: Value) -> Args {
        match value {
            Value::Object(obj) => Args::new(obj),
            _ => panic!("test options must be an object"),
        }
    }

    #[test]
    fn select_defaults() {
        let query = select_query(&BridgeSettings::default(), &args(json!({ "table": "t" }))).unwrap();
        assert_eq!(query.selected_columns(), Some("*"));
        assert!(query.filters().is_empty());
        assert!(query.ordering().is_none());
        assert!(query.row_limit().is_none());
        assert!(!query.is_single());
    }

    #[test]
    fn configured_default_order_applies() {
        let settings = BridgeSettings {
            default_order_by: Some("id".into()),
            ..BridgeSettings::default()
        };
        let query = select_query(&settings, &args(json!({ "table": "t", "ascending": false }))).unwrap();
        assert_eq!(
            query.ordering(),
            Some(&Ordering {
                column: "id".into(),
                ascending: false
            })
        );

        let query = select_query(&settings, &args(json!({ "table": "t", "orderBy": "name" }))).unwrap();
        assert_eq!(query.ordering().unwrap().column, "name");
    }

    #[test]
    fn offset_without_limit_uses_page_size() {
        let query = select_query(&BridgeSettings::default(), &args(json!({ "table": "t", "offset": 40 })))
            .unwrap();
        assert_eq!(query.row_range(), Some(RowRange { from: 40, to: 1039 }));

        let query = select_query(
            &BridgeSettings::default(),
            &args(json!({ "table": "t", "offset": 10, "limit": 5 })),
        )
        .unwrap();
        assert_eq!(query.row_range(), Some(RowRange { from: 10, to: 14 }));
    }

    #[test]
    fn zero_limit_is_invalid() {
        assert!(matches!(
            select_query(&BridgeSettings::default(), &args(json!({ "table": "t", "limit": 0 }))),
            Err(SupabridgeError::InvalidField { .. })
        ));
    }

    #[test]
    fn mutations_require_a_filter() {
        for filter in [json!(null), json!({})] {
            let a = args(json!({ "table": "t", "values": { "x": 1 }, "filter": filter }));
            assert!(matches!(update_query(&a), Err(SupabridgeError::EmptyFilter(_))));
            assert!(matches!(delete_query(&a), Err(SupabridgeError::EmptyFilter(_))));
        }
    }

    #[test]
    fn insert_is_single_and_returning() {
        let query = insert_query(&args(json!({ "table": "t", "values": { "name": "x" } }))).unwrap();
        assert!(query.is_single());
        assert_eq!(query.returning_columns(), Some("*"));
        assert_eq!(query.body(), Some(&json!({ "name": "x" })));
    }

    #[test]
    fn array_filter_values_are_rejected() {
        let a = args(json!({ "table": "t", "filter": { "id": [1, 2] } }));
        assert!(matches!(
            select_query(&BridgeSettings::default(), &a),
            Err(SupabridgeError::UnsupportedFilterValue { .. })
        ));
    }

    #[test]
    fn failed_result_has_null_data() {
        let obj = query_object(QueryResult::failed("boom"));
        assert_eq!(Value::Object(obj), json!({ "data": null, "error": "boom" }));
    }

    #[test]
    fn count_is_only_present_when_set() {
        let rows = json!([{ "id": 1 }]);
        let obj = query_object(QueryResult::ok(rows.clone()).with_count(1));
        assert_eq!(
            Value::Object(obj),
            json!({ "data": [{ "id": 1 }], "error": null, "count": 1 })
        );

        let obj = query_object(QueryResult::ok(rows));
        assert!(!obj.contains_key("count"));
        assert_eq!(obj["error"], Value::Null);
    }

    #[test]
    fn reserved_parameter_names_cannot_be_filter_columns() {
        for column in ["order", "select", "limit", "offset"] {
            let options = json!({ "table": "t", "filter": { column: 1 } });
            match select_query(&BridgeSettings::default(), &args(options)) {
                Err(SupabridgeError::InvalidField { field, .. }) => assert_eq!(field, column),
                other => panic!("expected {column} to be refused, got {other:?}"),
            }
        }

        let options = json!({ "table": "t", "filter": { "order": 1 }, "values": { "a": 1 } });
        assert!(matches!(
            update_query(&args(options)),
            Err(SupabridgeError::InvalidField { .. })
        ));
    }
}
