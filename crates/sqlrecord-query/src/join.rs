//! The JOIN used to resolve has-one-through associations.

use sqlrecord_core::{Result, Value, validate_identifier};

/// Two-hop lookup from a through table into a source table.
///
/// Builds
///
/// ```text
/// SELECT <source>.* FROM <through> JOIN <source>
///   ON <through>.<source_foreign_key> = <source>.<source_primary_key>
/// WHERE <through>.<through_primary_key> = ?
/// ```
///
/// # Example
///
/// ```
/// use sqlrecord_query::ThroughJoin;
///
/// let (sql, params) = ThroughJoin {
///     through_table: "managers",
///     through_primary_key: "id",
///     source_table: "teams",
///     source_foreign_key: "team_id",
///     source_primary_key: "id",
/// }
/// .build(3_i64)
/// .unwrap();
/// assert_eq!(
///     sql,
///     "SELECT teams.* FROM managers JOIN teams ON managers.team_id = teams.id WHERE managers.id = ?"
/// );
/// assert_eq!(params.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThroughJoin<'a> {
    /// Table of the intermediate model.
    pub through_table: &'a str,
    /// Column of the through table matched against the owner's foreign key.
    pub through_primary_key: &'a str,
    /// Table of the final model.
    pub source_table: &'a str,
    /// Column of the through table referring to the source table.
    pub source_foreign_key: &'a str,
    /// Column of the source table the foreign key refers to.
    pub source_primary_key: &'a str,
}

impl ThroughJoin<'_> {
    /// Build the SQL bound with the owner's foreign key value.
    pub fn build(&self, key: impl Into<Value>) -> Result<(String, Vec<Value>)> {
        let through = validate_identifier(self.through_table)?;
        let source = validate_identifier(self.source_table)?;
        let sql = format!(
            "SELECT {source}.* FROM {through} JOIN {source} ON {through}.{fk} = {source}.{spk} WHERE {through}.{tpk} = ?",
            fk = validate_identifier(self.source_foreign_key)?,
            spk = validate_identifier(self.source_primary_key)?,
            tpk = validate_identifier(self.through_primary_key)?,
        );
        tracing::trace!(sql = %sql, "Built through JOIN");
        Ok((sql, vec![key.into()]))
    }
}
