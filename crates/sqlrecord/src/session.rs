//! The pairing of a registry and a connection.
//!
//! Every query sqlrecord issues goes through a [`Session`]. Sessions are
//! cheap to create and hold nothing but two borrows; all state lives in the
//! [`Registry`] (schema cache) and in the database.
//!
//! Persistence lives in `persist.rs` and association loading in
//! `resolve.rs`; both extend `Session` with further inherent methods.

use std::sync::Arc;

use sqlrecord_core::{
    Connection, Error, Model, ModelId, Record, Result, ResultSet, Row, Value,
};
use sqlrecord_query::introspect;

use crate::registry::{ModelEntry, Registry};

/// Executes statements for the models of one registry over one connection.
///
/// # Example
///
/// ```
/// use sqlrecord::{Registry, Session, Value};
/// use sqlrecord_sqlite::SqliteConnection;
///
/// let conn = SqliteConnection::open_memory().unwrap();
/// conn.execute_batch("CREATE TABLE teams (id INTEGER PRIMARY KEY, name TEXT);").unwrap();
///
/// let registry = Registry::builder().model_named("Team", None).build().unwrap();
/// let session = Session::new(&registry, &conn);
/// let team = registry.model_id("Team").unwrap();
///
/// let mut mets = session.new_record(team, [("name", "Mets")]).unwrap();
/// session.save(&mut mets).unwrap();
/// assert_eq!(mets.primary_key(), Some(&Value::BigInt(1)));
/// ```
#[derive(Debug)]
pub struct Session<'a, C: Connection> {
    registry: &'a Registry,
    conn: &'a C,
}

impl<C: Connection> Clone for Session<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Connection> Copy for Session<'_, C> {}

impl<'a, C: Connection> Session<'a, C> {
    pub fn new(registry: &'a Registry, conn: &'a C) -> Self {
        Self { registry, conn }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn connection(&self) -> &'a C {
        self.conn
    }

    /// Run one statement, logging it first.
    pub(crate) fn run(&self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        tracing::debug!(sql = %sql, params = params.len(), "Executing statement");
        self.conn.execute(sql, params)
    }

    pub(crate) fn entry(&self, model: ModelId) -> Result<&'a ModelEntry> {
        self.registry.entry(model)
    }

    /// Ordered column set of `model`, introspected on first use.
    ///
    /// Issues `SELECT * FROM <table> LIMIT 0` once per model type; later
    /// calls return the cached list.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn columns(&self, model: ModelId) -> Result<Arc<[String]>> {
        let entry = self.entry(model)?;
        entry.schema().get_or_load(|| {
            let sql = introspect(entry.table_name())?;
            tracing::debug!(
                model = entry.name(),
                table = entry.table_name(),
                "Introspecting table columns"
            );
            match self.run(&sql, &[]) {
                Ok(result) => Ok(Arc::clone(result.columns())),
                Err(Error::Query(source)) => Err(Error::Schema {
                    table: entry.table_name().to_string(),
                    source,
                }),
                Err(other) => Err(other),
            }
        })
    }

    /// Load the column set of `M` and check every declared column exists.
    pub fn finalize<M: Model>(&self) -> Result<ModelId> {
        let model = self.registry.model_id_of::<M>()?;
        self.finalize_model(model)?;
        Ok(model)
    }

    /// Finalize every registered model.
    pub fn finalize_all(&self) -> Result<()> {
        for entry in self.registry.models() {
            self.finalize_model(entry.id())?;
        }
        Ok(())
    }

    fn finalize_model(&self, model: ModelId) -> Result<()> {
        let entry = self.entry(model)?;
        let columns = self.columns(model)?;
        if let Some(missing) = entry
            .declared_columns()
            .iter()
            .find(|declared| !columns.contains(*declared))
        {
            return Err(Error::UnknownAttribute {
                model: entry.name().to_string(),
                attribute: missing.clone(),
            });
        }
        Ok(())
    }

    /// A new, unsaved record of `model` built from an attribute mapping.
    ///
    /// Fails with [`Error::UnknownAttribute`] if a key is not a column.
    pub fn new_record<K, V, I>(&self, model: ModelId, attributes: I) -> Result<Record>
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let entry = self.entry(model)?;
        let columns = self.columns(model)?;
        Record::with_attributes(model, entry.shared_name(), columns, attributes)
    }

    /// A new, unsaved typed model built from an attribute mapping.
    pub fn build<M, K, V, I>(&self, attributes: I) -> Result<M>
    where
        M: Model,
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let model = self.registry.model_id_of::<M>()?;
        self.new_record(model, attributes).map(M::from_record)
    }

    /// Turn result rows into records of `model`, preserving row order.
    pub fn parse_all(&self, model: ModelId, rows: Vec<Row>) -> Result<Vec<Record>> {
        let entry = self.entry(model)?;
        let columns = self.columns(model)?;
        rows.into_iter()
            .map(|row| Record::from_row(model, entry.shared_name(), Arc::clone(&columns), row))
            .collect()
    }

    pub(crate) fn first(&self, model: ModelId, result: ResultSet) -> Result<Option<Record>> {
        Ok(self.parse_all(model, result.into_rows())?.into_iter().next())
    }
}

/// Result of loading an association by name.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    /// A belongs-to or has-one-through association.
    One(Option<Record>),
    /// A has-many association.
    Many(Vec<Record>),
}

impl Loaded {
    /// The single record, if this is a single-valued association.
    pub fn into_one(self) -> Option<Record> {
        match self {
            Loaded::One(record) => record,
            Loaded::Many(_) => None,
        }
    }

    /// The records, treating a single-valued result as zero or one element.
    pub fn into_many(self) -> Vec<Record> {
        match self {
            Loaded::One(record) => record.into_iter().collect(),
            Loaded::Many(records) => records,
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, Loaded::Many(_))
    }
}
