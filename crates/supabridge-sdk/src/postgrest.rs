// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PostgREST data API binding.
//
// A `TableQuery` maps onto one request against `/rest/v1/<table>`:
//   select -> GET,  insert -> POST,  update -> PATCH,  delete -> DELETE
// Filters, ordering and paging travel in the query string; single-row mode
// and mutation return behaviour travel in headers.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument};

use supabridge_core::backend::PostgrestSdk;
use supabridge_core::error::{Result, SupabridgeError};
use supabridge_core::query::{QueryAction, TableQuery, check_filter_column};

use crate::client::{HttpSdk, parse_json, postgrest_error_message, read_body, transport_error};

const SINGLE_OBJECT_MEDIA_TYPE: &str = "application/vnd.pgrst.object+json";

/// Strip whitespace from a column list, keeping quoted identifiers intact.
fn compact_columns(columns: &str) -> String {
    let mut quoted = false;
    columns
        .chars()
        .filter(|c| {
            if *c == '"' {
                quoted = !quoted;
            }
            quoted || !c.is_whitespace()
        })
        .collect()
}

/// Query-string pairs for a table query, in request order.
///
/// Filters are keyed by column name, so a column named like one of
/// [`RESERVED_PARAMS`](supabridge_core::query::RESERVED_PARAMS) cannot be
/// expressed; `execute` refuses such queries.
pub fn query_params(query: &TableQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();

    if let Some(columns) = query.selected_columns() {
        params.push(("select".to_owned(), compact_columns(columns)));
    }
    for filter in query.filters() {
        params.push((filter.column.clone(), format!("eq.{}", filter.value)));
    }
    if let Some(order) = query.ordering() {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_owned(), format!("{}.{direction}", order.column)));
    }
    match query.row_range() {
        Some(range) => {
            params.push(("offset".to_owned(), range.from.to_string()));
            params.push(("limit".to_owned(), range.row_count().to_string()));
        }
        None => {
            if let Some(limit) = query.row_limit() {
                params.push(("limit".to_owned(), limit.to_string()));
            }
        }
    }
    params
}

fn method_for(action: &QueryAction) -> Method {
    match action {
        QueryAction::Select { .. } => Method::GET,
        QueryAction::Insert { .. } => Method::POST,
        QueryAction::Update { .. } => Method::PATCH,
        QueryAction::Delete => Method::DELETE,
    }
}

#[async_trait]
impl PostgrestSdk for HttpSdk {
    #[instrument(skip_all, fields(table = query.table(), action = query.action().name()))]
    async fn execute(&self, query: TableQuery) -> Result<Value> {
        for filter in query.filters() {
            check_filter_column(&filter.column)?;
        }
        let url = self.config().endpoint(&["rest", "v1", query.table()]);
        let mut request = self
            .session_request(method_for(query.action()), url)
            .query(&query_params(&query));

        if let Some(body) = query.body() {
            request = request.json(body);
        }
        if query.is_single() {
            request = request.header("Accept", SINGLE_OBJECT_MEDIA_TYPE);
        }
        if !matches!(query.action(), QueryAction::Select { .. }) {
            let prefer = if query.returning_columns().is_some() {
                "return=representation"
            } else {
                "return=minimal"
            };
            request = request.header("Prefer", prefer);
        }

        let response = request.send().await.map_err(transport_error)?;
        let (status, text) = read_body(response).await?;
        if !status.is_success() {
            return Err(SupabridgeError::Query(postgrest_error_message(status, &text)));
        }

        let data = match parse_json(&text)? {
            Value::Null if !query.is_single() => Value::Array(Vec::new()),
            other => other,
        };
        debug!(status = status.as_u16(), "query completed");
        Ok(data)
    }
}
