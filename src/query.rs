//! Filters and ordering for [`RemoteStore::select`](crate::traits::RemoteStore::select)
//!
//! A [`Query`] can be evaluated locally (this is what the [`Cache`](crate::cache::Cache) does),
//! or encoded into the query string of a PostgREST request (this is what the [`Client`](crate::client::Client) does).

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

/// A stored record, as a map from column names to values
pub type Row = serde_json::Map<String, Value>;

/// A condition on a single column
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// `column == value`
    Eq(String, Value),
    /// `column >= value`
    Gte(String, Value),
    /// `column <= value`
    Lte(String, Value),
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::Gte(c, _) | Filter::Lte(c, _) => c,
        }
    }

    /// Whether a row satisfies this condition.
    /// Rows that miss the column, or hold a value that cannot be compared, never match.
    pub fn matches(&self, row: &Row) -> bool {
        let (value, expected) = match row.get(self.column()) {
            None => return false,
            Some(v) => (v, self.operand()),
        };

        match (self, compare_values(value, expected)) {
            (Filter::Eq(..), Some(ord)) => ord == Ordering::Equal,
            (Filter::Gte(..), Some(ord)) => ord != Ordering::Less,
            (Filter::Lte(..), Some(ord)) => ord != Ordering::Greater,
            (_, None) => false,
        }
    }

    fn operand(&self) -> &Value {
        match self {
            Filter::Eq(_, v) | Filter::Gte(_, v) | Filter::Lte(_, v) => v,
        }
    }

    fn operator(&self) -> &'static str {
        match self {
            Filter::Eq(..) => "eq",
            Filter::Gte(..) => "gte",
            Filter::Lte(..) => "lte",
        }
    }
}

/// The order the selected rows are returned in
#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A set of filters (all of them must match), and an optional ordering
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    filters: Vec<Filter>,
    order: Option<Order>,
}

impl Query {
    /// A query that matches every row
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq<V: Into<Value>>(mut self, column: &str, value: V) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.into()));
        self
    }

    pub fn gte<V: Into<Value>>(mut self, column: &str, value: V) -> Self {
        self.filters.push(Filter::Gte(column.to_string(), value.into()));
        self
    }

    pub fn lte<V: Into<Value>>(mut self, column: &str, value: V) -> Self {
        self.filters.push(Filter::Lte(column.to_string(), value.into()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order { column: column.to_string(), ascending });
        self
    }

    pub fn filters(&self) -> &[Filter] { &self.filters }
    pub fn ordering(&self) -> Option<&Order> { self.order.as_ref() }

    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Sort rows the way this query asks for. This is a stable sort, so ties keep their relative order.
    pub fn sort(&self, rows: &mut Vec<Row>) {
        let order = match &self.order {
            None => return,
            Some(o) => o,
        };

        rows.sort_by(|a, b| {
            let ord = match (a.get(&order.column), b.get(&order.column)) {
                (Some(va), Some(vb)) => compare_values(va, vb).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if order.ascending { ord } else { ord.reverse() }
        });
    }

    /// Encode this query as PostgREST query string parameters, e.g. `start_time=gte.2021-03-01T00:00:00Z` or `order=created_at.desc`
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self.filters.iter()
            .map(|f| (f.column().to_string(), format!("{}.{}", f.operator(), value_to_param(f.operand()))))
            .collect();

        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            pairs.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }
        pairs
    }
}

fn value_to_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Compares two JSON values of the same kind.
/// Strings that both are RFC3339 timestamps are compared as instants, so that different offsets or precisions compare correctly.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::String(l), Value::String(r)) => {
            match (parse_instant(l), parse_instant(r)) {
                (Some(il), Some(ir)) => Some(il.cmp(&ir)),
                _ => Some(l.cmp(r)),
            }
        },
        _ => None,
    }
}

fn parse_instant(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}
