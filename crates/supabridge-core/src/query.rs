// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Postgrest-style table query description.
//
// The bridge builds a `TableQuery` from call options; a backend binding turns
// it into whatever its transport needs (query string + headers for the HTTP
// binding). Only the features the bridge surface exposes are modelled:
// equality filters, one ordering column, limit/range and single-row mode.

use std::fmt;

use serde_json::Value;

use crate::error::{Result, SupabridgeError};

/// What a query does to the table.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryAction {
    Select { columns: String },
    Insert { values: Value },
    Update { values: Value },
    Delete,
}

impl QueryAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Select { .. } => "select",
            Self::Insert { .. } => "insert",
            Self::Update { .. } => "update",
            Self::Delete => "delete",
        }
    }
}

/// Scalar accepted on the right-hand side of an equality filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl FilterValue {
    /// Convert a JSON scalar into a filter value.
    ///
    /// Null, arrays and objects have no equality overload and are rejected
    /// rather than stringified or dropped.
    pub fn from_json(column: &str, value: &Value) -> Result<Self> {
        let unsupported = |kind: &str| SupabridgeError::UnsupportedFilterValue {
            column: column.to_owned(),
            kind: kind.to_owned(),
        };
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Bool(b) => Ok(Self::Boolean(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(unsupported("number"))
                }
            }
            Value::Null => Err(unsupported("null")),
            Value::Array(_) => Err(unsupported("array")),
            Value::Object(_) => Err(unsupported("object")),
        }
    }

    /// The value as JSON, for bindings that compare rows in memory.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Boolean(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Query-string keys PostgREST claims for itself. A filter on a column with
/// one of these names would be read as a modifier instead.
pub const RESERVED_PARAMS: [&str; 4] = ["select", "order", "limit", "offset"];

/// Refuse filter columns that collide with [`RESERVED_PARAMS`].
pub fn check_filter_column(column: &str) -> Result<()> {
    if RESERVED_PARAMS.contains(&column) {
        return Err(SupabridgeError::invalid(
            column,
            "reserved PostgREST parameter name",
        ));
    }
    Ok(())
}

/// One `column = value` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct EqFilter {
    pub column: String,
    pub value: FilterValue,
}

/// Result ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub column: String,
    pub ascending: bool,
}

/// Inclusive row range `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub from: u64,
    pub to: u64,
}

impl RowRange {
    /// Number of rows the range spans.
    pub fn row_count(&self) -> u64 {
        self.to.saturating_sub(self.from) + 1
    }
}

/// Whether the caller expects many rows or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    #[default]
    Many,
    Single,
}

/// A fully described query against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    table: String,
    action: QueryAction,
    filters: Vec<EqFilter>,
    order: Option<Ordering>,
    limit: Option<u64>,
    range: Option<RowRange>,
    returning: Option<String>,
    cardinality: Cardinality,
}

impl TableQuery {
    fn new(table: impl Into<String>, action: QueryAction) -> Self {
        Self {
            table: table.into(),
            action,
            filters: Vec::new(),
            order: None,
            limit: None,
            range: None,
            returning: None,
            cardinality: Cardinality::Many,
        }
    }

    pub fn select(table: impl Into<String>, columns: impl Into<String>) -> Self {
        Self::new(
            table,
            QueryAction::Select {
                columns: columns.into(),
            },
        )
    }

    pub fn insert(table: impl Into<String>, values: Value) -> Self {
        Self::new(table, QueryAction::Insert { values })
    }

    pub fn update(table: impl Into<String>, values: Value) -> Self {
        Self::new(table, QueryAction::Update { values })
    }

    pub fn delete(table: impl Into<String>) -> Self {
        Self::new(table, QueryAction::Delete)
    }

    pub fn eq(mut self, column: impl Into<String>, value: FilterValue) -> Self {
        self.filters.push(EqFilter {
            column: column.into(),
            value,
        });
        self
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Ordering {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    /// Restrict to rows `from..=to`. `to < from` is clamped to a single row.
    pub fn range(mut self, from: u64, to: u64) -> Self {
        self.range = Some(RowRange {
            from,
            to: to.max(from),
        });
        self
    }

    /// Require exactly one row; zero or several rows is a backend error.
    pub fn single(mut self) -> Self {
        self.cardinality = Cardinality::Single;
        self
    }

    /// Ask a mutation to return the affected rows with these columns.
    pub fn returning(mut self, columns: impl Into<String>) -> Self {
        self.returning = Some(columns.into());
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn action(&self) -> &QueryAction {
        &self.action
    }

    pub fn filters(&self) -> &[EqFilter] {
        &self.filters
    }

    pub fn ordering(&self) -> Option<&Ordering> {
        self.order.as_ref()
    }

    pub fn row_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn row_range(&self) -> Option<RowRange> {
        self.range
    }

    pub fn returning_columns(&self) -> Option<&str> {
        self.returning.as_deref()
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_single(&self) -> bool {
        self.cardinality == Cardinality::Single
    }

    /// Columns the response rows carry, if the query returns rows at all.
    pub fn selected_columns(&self) -> Option<&str> {
        match &self.action {
            QueryAction::Select { columns } => Some(columns),
            _ => self.returning.as_deref(),
        }
    }

    /// Request body for inserts and updates.
    pub fn body(&self) -> Option<&Value> {
        match &self.action {
            QueryAction::Insert { values } | QueryAction::Update { values } => Some(values),
            _ => None,
        }
    }
}
