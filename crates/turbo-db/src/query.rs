//! Row filters.

use crate::{Row, Value};

/// A predicate over a row. A query matches rows satisfying every filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Column equals the value.
    Eq(String, Value),
    /// Column equals any of the values.
    In(String, Vec<Value>),
}

impl Filter {
    /// Column equals `value`.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(column.into(), value.into())
    }

    /// Column is one of `values`.
    pub fn is_in<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Filter::In(column.into(), values.into_iter().map(Into::into).collect())
    }

    /// Check the filter against a row. Missing columns compare as null.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::Eq(column, value) => row.get(column).unwrap_or(&Value::Null) == value,
            Filter::In(column, values) => {
                let actual = row.get(column).unwrap_or(&Value::Null);
                values.iter().any(|v| v == actual)
            }
        }
    }
}

pub(crate) fn matches_all(filters: &[Filter], row: &Row) -> bool {
    filters.iter().all(|f| f.matches(row))
}
