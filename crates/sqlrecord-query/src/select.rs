//! SELECT builders: equality WHERE clauses, full scans and introspection.

use sqlrecord_core::{Error, Result, Value, validate_identifier};

/// SELECT with an AND-ed list of `column = ?` constraints.
///
/// # Example
///
/// ```
/// use sqlrecord_query::Select;
///
/// let (sql, params) = Select::from_table("managers")
///     .eq("fname", "Joe")
///     .eq("team_id", 2_i64)
///     .build()
///     .unwrap();
/// assert_eq!(sql, "SELECT * FROM managers WHERE fname = ? AND team_id = ?");
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Select {
    table: String,
    constraints: Vec<(String, Value)>,
}

impl Select {
    /// Start a SELECT against `table`.
    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            constraints: Vec::new(),
        }
    }

    /// Add a `column = value` constraint.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constraints.push((column.into(), value.into()));
        self
    }

    /// Add several constraints, keeping their order.
    pub fn eq_all<K, V, I>(mut self, constraints: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.constraints
            .extend(constraints.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Build the SQL and its positional parameters.
    ///
    /// An empty constraint list is rejected rather than treated as match-all.
    pub fn build(&self) -> Result<(String, Vec<Value>)> {
        let table = validate_identifier(&self.table)?;
        if self.constraints.is_empty() {
            return Err(Error::EmptyWhere {
                table: self.table.clone(),
            });
        }

        let mut clauses = Vec::with_capacity(self.constraints.len());
        let mut params = Vec::with_capacity(self.constraints.len());
        for (column, value) in &self.constraints {
            clauses.push(format!("{} = ?", validate_identifier(column)?));
            params.push(value.clone());
        }

        let sql = format!("SELECT * FROM {} WHERE {}", table, clauses.join(" AND "));
        tracing::trace!(sql = %sql, params = params.len(), "Built SELECT");
        Ok((sql, params))
    }
}

/// `SELECT * FROM <table> WHERE <c1> = ? AND ...` for an ordered constraint list.
pub fn build_where<K: AsRef<str>>(
    table: &str,
    constraints: &[(K, Value)],
) -> Result<(String, Vec<Value>)> {
    Select::from_table(table)
        .eq_all(
            constraints
                .iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.clone())),
        )
        .build()
}

/// `SELECT * FROM <table>`.
pub fn select_all(table: &str) -> Result<String> {
    Ok(format!("SELECT * FROM {}", validate_identifier(table)?))
}

/// `SELECT * FROM <table> LIMIT 0`: zero rows, full column descriptors.
pub fn introspect(table: &str) -> Result<String> {
    Ok(format!("SELECT * FROM {} LIMIT 0", validate_identifier(table)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_constraint() {
        let (sql, params) = Select::from_table("players").eq("name", "Degrom").build().unwrap();
        assert_eq!(sql, "SELECT * FROM players WHERE name = ?");
        assert_eq!(params, vec![Value::from("Degrom")]);
    }

    #[test]
    fn test_constraints_keep_input_order() {
        let (sql, params) = build_where(
            "managers",
            &[("team_id", Value::BigInt(2)), ("fname", Value::from("Joe"))],
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM managers WHERE team_id = ? AND fname = ?");
        assert_eq!(params, vec![Value::BigInt(2), Value::from("Joe")]);
    }

    #[test]
    fn test_values_are_never_interpolated() {
        let hostile = "x' OR '1'='1";
        let (sql, params) = Select::from_table("players").eq("name", hostile).build().unwrap();
        assert!(!sql.contains(hostile));
        assert_eq!(params, vec![Value::from(hostile)]);
    }

    #[test]
    fn test_empty_constraints_rejected() {
        let err = build_where::<&str>("players", &[]).unwrap_err();
        assert!(matches!(err, Error::EmptyWhere { ref table } if table == "players"));
    }

    #[test]
    fn test_invalid_column_rejected() {
        let err = Select::from_table("players")
            .eq("name = name OR 1", 1_i64)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier(_)));
    }

    #[test]
    fn test_select_all_and_introspect() {
        assert_eq!(select_all("teams").unwrap(), "SELECT * FROM teams");
        assert_eq!(introspect("teams").unwrap(), "SELECT * FROM teams LIMIT 0");
        assert!(introspect("teams; --").is_err());
    }
}
