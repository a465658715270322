//! Query builders for INSERT and UPDATE.
//!
//! Both builders take explicit `(column, value)` pairs in the order they should
//! appear in the statement and emit positional `?` placeholders only.

use sqlrecord_core::{Error, Result, Value, validate_identifier};

/// A column-value pair for INSERT or UPDATE SET.
#[derive(Debug, Clone)]
struct Assignment {
    column: String,
    value: Value,
}

/// INSERT query builder.
///
/// # Example
///
/// ```
/// use sqlrecord_query::InsertBuilder;
///
/// let (sql, params) = InsertBuilder::new("players")
///     .value("name", "Alonso")
///     .value("manager_id", 1_i64)
///     .build()
///     .unwrap();
/// assert_eq!(sql, "INSERT INTO players (name, manager_id) VALUES (?, ?)");
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: String,
    values: Vec<Assignment>,
}

impl InsertBuilder {
    /// Create a new INSERT builder for `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
        }
    }

    /// Bind a value to a column.
    pub fn value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push(Assignment {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Build the INSERT SQL and parameters.
    ///
    /// With no bound columns this is `INSERT INTO <table> DEFAULT VALUES`.
    pub fn build(&self) -> Result<(String, Vec<Value>)> {
        let table = validate_identifier(&self.table)?;
        if self.values.is_empty() {
            return Ok((format!("INSERT INTO {} DEFAULT VALUES", table), Vec::new()));
        }

        let mut columns = Vec::with_capacity(self.values.len());
        let mut params = Vec::with_capacity(self.values.len());
        for assignment in &self.values {
            columns.push(validate_identifier(&assignment.column)?);
            params.push(assignment.value.clone());
        }
        let placeholders = vec!["?"; params.len()].join(", ");

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );
        tracing::trace!(sql = %sql, params = params.len(), "Built INSERT");
        Ok((sql, params))
    }
}

/// UPDATE query builder keyed on a single column.
///
/// # Example
///
/// ```
/// use sqlrecord_query::UpdateBuilder;
///
/// let (sql, params) = UpdateBuilder::new("players")
///     .set("id", 2_i64)
///     .set("name", "Thor")
///     .key("id", 2_i64)
///     .build()
///     .unwrap();
/// assert_eq!(sql, "UPDATE players SET id = ?, name = ? WHERE id = ?");
/// assert_eq!(params.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    sets: Vec<Assignment>,
    key: Option<Assignment>,
}

impl UpdateBuilder {
    /// Create a new UPDATE builder for `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            sets: Vec::new(),
            key: None,
        }
    }

    /// Set a column to a value.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.sets.push(Assignment {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Restrict the update to rows where `column = value`.
    pub fn key(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.key = Some(Assignment {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Build the UPDATE SQL and parameters. The key value is bound last.
    ///
    /// Fails without a key (an unkeyed UPDATE would touch every row) or
    /// without any SET column.
    pub fn build(&self) -> Result<(String, Vec<Value>)> {
        let table = validate_identifier(&self.table)?;
        let Some(key) = &self.key else {
            return Err(Error::EmptyWhere {
                table: self.table.clone(),
            });
        };
        if self.sets.is_empty() {
            return Err(Error::InvalidPersistenceState {
                model: self.table.clone(),
                reason: "UPDATE with no columns to set".to_string(),
            });
        }

        let mut set_clauses = Vec::with_capacity(self.sets.len());
        let mut params = Vec::with_capacity(self.sets.len() + 1);
        for assignment in &self.sets {
            set_clauses.push(format!("{} = ?", validate_identifier(&assignment.column)?));
            params.push(assignment.value.clone());
        }
        params.push(key.value.clone());

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            table,
            set_clauses.join(", "),
            validate_identifier(&key.column)?
        );
        tracing::trace!(sql = %sql, params = params.len(), "Built UPDATE");
        Ok((sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_column_order() {
        let (sql, params) = InsertBuilder::new("managers")
            .value("fname", "Carlos")
            .value("lname", "Mendoza")
            .value("team_id", Value::Null)
            .build()
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO managers (fname, lname, team_id) VALUES (?, ?, ?)"
        );
        assert_eq!(
            params,
            vec![Value::from("Carlos"), Value::from("Mendoza"), Value::Null]
        );
    }

    #[test]
    fn test_insert_without_columns_uses_defaults() {
        let (sql, params) = InsertBuilder::new("teams").build().unwrap();
        assert_eq!(sql, "INSERT INTO teams DEFAULT VALUES");
        assert!(params.is_empty());
    }

    #[test]
    fn test_insert_rejects_bad_column() {
        let err = InsertBuilder::new("teams")
            .value("name) VALUES ('x'); --", "y")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier(_)));
    }

    #[test]
    fn test_update_binds_key_last() {
        let (sql, params) = UpdateBuilder::new("players")
            .set("id", 2_i64)
            .set("name", "Thor")
            .set("manager_id", 1_i64)
            .key("id", 2_i64)
            .build()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE players SET id = ?, name = ?, manager_id = ? WHERE id = ?"
        );
        assert_eq!(
            params,
            vec![
                Value::BigInt(2),
                Value::from("Thor"),
                Value::BigInt(1),
                Value::BigInt(2)
            ]
        );
    }

    #[test]
    fn test_update_requires_key() {
        let err = UpdateBuilder::new("players")
            .set("name", "Thor")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::EmptyWhere { .. }));
    }

    #[test]
    fn test_update_requires_sets() {
        let err = UpdateBuilder::new("players")
            .key("id", 1_i64)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPersistenceState { .. }));
    }
}
