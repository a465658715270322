//! Error types.

use std::error::Error as StdError;
use std::fmt;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// All failures surfaced by sqlrecord.
#[derive(Debug)]
pub enum Error {
    /// An attribute mapping named a column that is not in the model's column set.
    UnknownAttribute { model: String, attribute: String },
    /// An association name is not registered on the model.
    AssociationNotFound {
        model: String,
        name: String,
        side: Option<ThroughSide>,
    },
    /// Insert on a persisted record, update on a new one, or a missing column value.
    InvalidPersistenceState { model: String, reason: String },
    /// The connection collaborator failed.
    Query(QueryError),
    /// A WHERE clause was requested with no constraints.
    EmptyWhere { table: String },
    /// Schema introspection for a table failed.
    Schema { table: String, source: QueryError },
    /// A model name was never registered.
    UnknownModel(String),
    /// A typed accessor resolved to a different model than requested.
    ModelMismatch { expected: String, found: String },
    /// A table or column name is not a plain SQL identifier.
    InvalidIdentifier(String),
    /// Registry or driver configuration problem.
    Config(String),
}

/// Which leg of a through-association failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThroughSide {
    /// The association on the owning model.
    Through,
    /// The association on the through model's target.
    Source,
}

impl fmt::Display for ThroughSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThroughSide::Through => write!(f, "through"),
            ThroughSide::Source => write!(f, "source"),
        }
    }
}

/// Classification of backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Could not open or reach the database.
    Connection,
    /// The statement did not parse or named a missing table/column.
    Syntax,
    /// A constraint (unique, foreign key, not null) was violated.
    Constraint,
    /// Any other database-reported failure.
    Database,
}

/// A failure reported by the connection collaborator, tagged with its SQL.
#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub message: String,
    pub sql: Option<String>,
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl QueryError {
    /// Create an error without SQL context.
    pub fn new(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            sql: None,
            source: None,
        }
    }

    /// Attach the SQL text that was being executed.
    #[must_use]
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }

    /// Attach the underlying driver error.
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} error: {}", self.kind, self.message)?;
        if let Some(sql) = &self.sql {
            write!(f, " (sql: {})", sql)?;
        }
        Ok(())
    }
}

impl StdError for QueryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownAttribute { model, attribute } => {
                write!(f, "unknown attribute '{}' for {}", attribute, model)
            }
            Error::AssociationNotFound {
                model,
                name,
                side: Some(side),
            } => write!(
                f,
                "{} association '{}' not found on {}",
                side, name, model
            ),
            Error::AssociationNotFound {
                model,
                name,
                side: None,
            } => write!(f, "association '{}' not found on {}", name, model),
            Error::InvalidPersistenceState { model, reason } => {
                write!(f, "invalid persistence state for {}: {}", model, reason)
            }
            Error::Query(e) => write!(f, "{}", e),
            Error::EmptyWhere { table } => {
                write!(f, "refusing to build WHERE clause with no constraints on {}", table)
            }
            Error::Schema { table, source } => {
                write!(f, "failed to introspect table {}: {}", table, source)
            }
            Error::UnknownModel(name) => write!(f, "model '{}' is not registered", name),
            Error::ModelMismatch { expected, found } => {
                write!(f, "expected model {}, association resolves to {}", expected, found)
            }
            Error::InvalidIdentifier(name) => write!(f, "invalid SQL identifier: {:?}", name),
            Error::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Query(e) | Error::Schema { source: e, .. } => {
                Some(e as &(dyn StdError + 'static))
            }
            _ => None,
        }
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}
