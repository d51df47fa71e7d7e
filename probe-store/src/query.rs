//! Filter/order builder shared by the REST and in-memory stores.

use std::cmp::Ordering;

use serde_json::{Map, Value};

/// A filtered read or update target.
///
/// Only equality filters and a single ordering column are needed by the
/// application, so that is all this supports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    columns: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<(String, bool)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict returned columns (comma separated). Defaults to `*`.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        let columns: String = columns.into();
        self.columns = Some(columns.split(',').map(str::trim).collect::<Vec<_>>().join(","));
        self
    }

    /// Keep rows where `column` equals `value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((column.into(), value.to_string()));
        self
    }

    /// Order rows by `column`.
    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some((column.into(), ascending));
        self
    }

    /// Query-string pairs in the PostgREST dialect.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![(
            "select".to_string(),
            self.columns.clone().unwrap_or_else(|| "*".to_string()),
        )];
        for (column, value) in &self.filters {
            params.push((column.clone(), format!("eq.{}", value)));
        }
        if let Some((column, ascending)) = &self.order {
            let direction = if *ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", column, direction)));
        }
        params
    }

    /// Filter pairs only, for update requests.
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|(column, value)| (column.clone(), format!("eq.{}", value)))
            .collect()
    }

    /// Whether a row passes every equality filter.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|(column, expected)| match row.get(column) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == *expected,
        })
    }

    /// Sort rows in place according to the ordering column.
    pub fn sort(&self, rows: &mut [Value]) {
        if let Some((column, ascending)) = &self.order {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(column), b.get(column));
                if *ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
    }

    /// Keep only the selected columns of a row.
    pub fn project(&self, row: &Value) -> Value {
        let (Some(columns), Value::Object(fields)) = (&self.columns, row) else {
            return row.clone();
        };
        if columns == "*" {
            return row.clone();
        }
        let projected: Map<String, Value> = columns
            .split(',')
            .filter_map(|c| fields.get(c).map(|v| (c.to_string(), v.clone())))
            .collect();
        Value::Object(projected)
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
