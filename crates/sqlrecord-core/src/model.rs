//! The `Model` trait implemented by typed model wrappers.

use crate::record::Record;
use crate::relationship::RelationshipInfo;

/// A typed model: a named table mapping over a [`Record`].
///
/// Usually derived:
///
/// ```ignore
/// #[derive(Model, Debug, Clone, PartialEq)]
/// #[sqlrecord(table = "managers", columns(id, fname, lname, team_id))]
/// #[sqlrecord(has_many(players, foreign_key = "manager_id"), belongs_to(team))]
/// pub struct Manager(Record);
/// ```
pub trait Model: Sized {
    /// Model type name, used for association defaults and lookups.
    const NAME: &'static str;

    /// Explicit table name; `None` derives it from [`Model::NAME`].
    const TABLE_NAME: Option<&'static str> = None;

    /// Columns with generated accessors. Checked against the live table on finalize.
    const COLUMNS: &'static [&'static str] = &[];

    /// Declared associations.
    const RELATIONSHIPS: &'static [RelationshipInfo] = &[];

    /// Wrap a record of this model.
    fn from_record(record: Record) -> Self;

    /// Borrow the underlying record.
    fn record(&self) -> &Record;

    /// Mutably borrow the underlying record.
    fn record_mut(&mut self) -> &mut Record;

    /// Unwrap the underlying record.
    fn into_record(self) -> Record;
}
