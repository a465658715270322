//! `Connection` implementation on top of `rusqlite`.

use std::io;
use std::sync::Arc;

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{ErrorCode, params_from_iter};
use sqlrecord_core::{Connection, Error, QueryError, QueryErrorKind, Result, ResultSet, Row, Value};

use crate::config::SqliteConfig;

/// A single SQLite database handle.
///
/// Not shared across threads; open one per thread if needed.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
    config: SqliteConfig,
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SqliteConnection {
    /// Open the configured database as-is.
    pub fn open(config: SqliteConfig) -> Result<Self> {
        let conn = connect(&config)?;
        tracing::debug!(
            path = ?config.path,
            memory = config.is_memory(),
            "Opened SQLite database"
        );
        Ok(Self { conn, config })
    }

    /// Open a fresh in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::open(SqliteConfig::new())
    }

    /// Open the configured database and rebuild it from the seed script.
    pub fn open_fresh(config: SqliteConfig) -> Result<Self> {
        let mut connection = Self::open(config)?;
        connection.reset()?;
        Ok(connection)
    }

    /// The configuration this connection was opened with.
    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Run a script of `;`-separated statements without parameters.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.log(sql, &[]);
        self.conn
            .execute_batch(sql)
            .map_err(|e| query_error(e, sql))
    }

    /// Replay the configured seed script, if any.
    pub fn seed(&self) -> Result<()> {
        let Some(path) = &self.config.seed_sql else {
            return Ok(());
        };
        let script = std::fs::read_to_string(path).map_err(|e| {
            Error::Query(
                QueryError::new(
                    QueryErrorKind::Connection,
                    format!("failed to read seed script {}: {}", path.display(), e),
                )
                .with_source(e),
            )
        })?;
        tracing::debug!(script = %path.display(), "Seeding SQLite database");
        self.conn
            .execute_batch(&script)
            .map_err(|e| query_error(e, &script))
    }

    /// Delete the database file (if file-backed), reopen and replay the seed script.
    pub fn reset(&mut self) -> Result<()> {
        let placeholder =
            rusqlite::Connection::open_in_memory().map_err(|e| query_error(e, ":memory:"))?;
        drop(std::mem::replace(&mut self.conn, placeholder));

        if let Some(path) = &self.config.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(Error::Query(
                        QueryError::new(
                            QueryErrorKind::Connection,
                            format!("failed to remove {}: {}", path.display(), e),
                        )
                        .with_source(e),
                    ));
                }
            }
        }

        self.conn = connect(&self.config)?;
        tracing::debug!(path = ?self.config.path, "Reset SQLite database");
        self.seed()
    }

    fn log(&self, sql: &str, params: &[Value]) {
        if self.config.log_queries {
            tracing::trace!(sql = %sql, params = ?params, "SQLite statement");
        }
    }
}

impl Connection for SqliteConnection {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        self.log(sql, params);

        let mut stmt = self.conn.prepare(sql).map_err(|e| query_error(e, sql))?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let mut rows = stmt
            .query(params_from_iter(params.iter().map(Param)))
            .map_err(|e| query_error(e, sql))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(|e| query_error(e, sql))? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                let value = row.get_ref(idx).map_err(|e| query_error(e, sql))?;
                values.push(read_value(value));
            }
            out.push(Row::new(Arc::clone(&columns), values));
        }

        Ok(ResultSet::new(columns, out))
    }

    fn last_insert_id(&self) -> Result<i64> {
        Ok(self.conn.last_insert_rowid())
    }
}

fn connect(config: &SqliteConfig) -> Result<rusqlite::Connection> {
    let conn = match &config.path {
        Some(path) => rusqlite::Connection::open(path),
        None => rusqlite::Connection::open_in_memory(),
    }
    .map_err(|e| {
        let target = config
            .path
            .as_ref()
            .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string());
        Error::Query(
            QueryError::new(
                QueryErrorKind::Connection,
                format!("failed to open {}: {}", target, e),
            )
            .with_source(e),
        )
    })?;

    if let Some(timeout) = config.busy_timeout {
        conn.busy_timeout(timeout)
            .map_err(|e| query_error(e, "PRAGMA busy_timeout"))?;
    }
    Ok(conn)
}

/// Borrowed parameter adapter.
struct Param<'a>(&'a Value);

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Bool(b) => ToSqlOutput::from(*b),
            Value::Int(i) => ToSqlOutput::from(*i),
            Value::BigInt(i) => ToSqlOutput::from(*i),
            Value::Double(f) => ToSqlOutput::from(*f),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
            Value::Bytes(b) => ToSqlOutput::from(b.as_slice()),
        })
    }
}

fn read_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::BigInt(i),
        ValueRef::Real(f) => Value::Double(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}

fn query_error(err: rusqlite::Error, sql: &str) -> Error {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(e, _) => match e.code {
            ErrorCode::ConstraintViolation => QueryErrorKind::Constraint,
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked => QueryErrorKind::Connection,
            ErrorCode::Unknown => QueryErrorKind::Syntax,
            _ => QueryErrorKind::Database,
        },
        rusqlite::Error::SqlInputError { .. }
        | rusqlite::Error::InvalidColumnName(_)
        | rusqlite::Error::InvalidParameterCount(_, _) => QueryErrorKind::Syntax,
        _ => QueryErrorKind::Database,
    };
    Error::Query(
        QueryError::new(kind, err.to_string())
            .with_sql(sql)
            .with_source(err),
    )
}
