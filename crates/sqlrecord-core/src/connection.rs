//! The database connection contract.

use crate::error::Result;
use crate::row::ResultSet;
use crate::value::Value;

/// The two primitives sqlrecord needs from a database driver.
///
/// Calls block until the backend answers. Failures must be reported as
/// [`Error::Query`](crate::Error::Query) with the SQL text attached; the core
/// never retries.
pub trait Connection {
    /// Execute `sql` with positional `?` parameters and return its result set.
    ///
    /// Statements that return no rows (INSERT, UPDATE) yield an empty set.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<ResultSet>;

    /// Row id generated by the most recent successful INSERT.
    fn last_insert_id(&self) -> Result<i64>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        (**self).execute(sql, params)
    }

    fn last_insert_id(&self) -> Result<i64> {
        (**self).last_insert_id()
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        (**self).execute(sql, params)
    }

    fn last_insert_id(&self) -> Result<i64> {
        (**self).last_insert_id()
    }
}
