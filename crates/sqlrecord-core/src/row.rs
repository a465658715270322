//! Rows and result sets returned by a [`Connection`](crate::Connection).

use std::sync::Arc;

use crate::value::Value;

/// A single result row: ordered column names paired with values.
///
/// Column names are shared between all rows of a [`ResultSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row. `values` must be parallel to `columns`.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column names in result order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Value at a column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value of the first column with the given name.
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Iterate `(column, value)` pairs in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Consume the row, yielding owned `(column, value)` pairs.
    pub fn into_pairs(self) -> impl Iterator<Item = (String, Value)> {
        let columns = self.columns;
        self.values
            .into_iter()
            .enumerate()
            .map(move |(idx, value)| (columns[idx].clone(), value))
    }
}

/// The outcome of executing a statement.
///
/// Column descriptors are always present, even when no rows matched; schema
/// introspection relies on this.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    columns: Arc<[String]>,
    rows: Vec<Row>,
}

impl ResultSet {
    /// Create a result set from column descriptors and rows.
    pub fn new(columns: Arc<[String]>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// A result set with no columns and no rows, as returned by DML.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Column descriptors of the statement.
    pub fn columns(&self) -> &Arc<[String]> {
        &self.columns
    }

    /// Returned rows, in backend order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume the set, returning its rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no rows were returned.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_lookup_by_name() {
        let row = Row::from_pairs([("id", Value::BigInt(1)), ("name", Value::from("Degrom"))]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get_named("name").and_then(Value::as_str), Some("Degrom"));
        assert!(row.get_named("missing").is_none());
        assert_eq!(row.get(0), Some(&Value::BigInt(1)));
    }

    #[test]
    fn test_into_pairs_keeps_order() {
        let row = Row::from_pairs([("b", 2_i64), ("a", 1_i64)]);
        let names: Vec<String> = row.into_pairs().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_empty_result_set_keeps_columns() {
        let columns: Arc<[String]> = vec!["id".to_string(), "name".to_string()].into();
        let rs = ResultSet::new(columns, Vec::new());
        assert!(rs.is_empty());
        assert_eq!(rs.columns().len(), 2);
    }
}
