//! Finding, inserting and updating records.

use sqlrecord_core::{Connection, Error, Model, ModelId, Record, Result, Value};
use sqlrecord_query::{InsertBuilder, Select, UpdateBuilder, build_where, select_all};

use crate::session::Session;

impl<C: Connection> Session<'_, C> {
    /// The record of `model` whose primary key equals `id`.
    #[tracing::instrument(level = "debug", skip(self, id))]
    pub fn find(&self, model: ModelId, id: impl Into<Value>) -> Result<Option<Record>> {
        let entry = self.entry(model)?;
        let columns = self.columns(model)?;
        let Some(pk) = columns.first() else {
            return Err(no_columns(entry.name()));
        };

        let (sql, params) = Select::from_table(entry.table_name()).eq(pk.as_str(), id).build()?;
        let result = self.run(&sql, &params)?;
        self.first(model, result)
    }

    /// Every row of `model`'s table.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn all(&self, model: ModelId) -> Result<Vec<Record>> {
        let sql = select_all(self.entry(model)?.table_name())?;
        let result = self.run(&sql, &[])?;
        self.parse_all(model, result.into_rows())
    }

    /// Rows of `model` matching every `column = value` constraint.
    ///
    /// An empty constraint list is rejected with [`Error::EmptyWhere`].
    #[tracing::instrument(level = "debug", skip(self, constraints))]
    pub fn find_where<K: AsRef<str>>(
        &self,
        model: ModelId,
        constraints: &[(K, Value)],
    ) -> Result<Vec<Record>> {
        let (sql, params) = build_where(self.entry(model)?.table_name(), constraints)?;
        let result = self.run(&sql, &params)?;
        self.parse_all(model, result.into_rows())
    }

    /// Typed [`Session::find`].
    pub fn find_as<M: Model>(&self, id: impl Into<Value>) -> Result<Option<M>> {
        let model = self.registry().model_id_of::<M>()?;
        Ok(self.find(model, id)?.map(M::from_record))
    }

    /// Typed [`Session::all`].
    pub fn all_as<M: Model>(&self) -> Result<Vec<M>> {
        let model = self.registry().model_id_of::<M>()?;
        Ok(self.all(model)?.into_iter().map(M::from_record).collect())
    }

    /// Typed [`Session::find_where`].
    pub fn where_as<M: Model, K: AsRef<str>>(&self, constraints: &[(K, Value)]) -> Result<Vec<M>> {
        let model = self.registry().model_id_of::<M>()?;
        Ok(self
            .find_where(model, constraints)?
            .into_iter()
            .map(M::from_record)
            .collect())
    }

    /// INSERT a new record and store the generated primary key on it.
    ///
    /// The primary key must be unset and every other column must have a value.
    #[tracing::instrument(level = "debug", skip(self, record), fields(model = record.model_name()))]
    pub fn insert(&self, record: &mut Record) -> Result<()> {
        let entry = self.entry(record.model())?;
        if let Some(pk) = record.primary_key() {
            return Err(Error::InvalidPersistenceState {
                model: record.model_name().to_string(),
                reason: format!("cannot insert a record that already has primary key {}", pk),
            });
        }

        let mut insert = InsertBuilder::new(entry.table_name());
        for (idx, column) in record.columns().iter().enumerate().skip(1) {
            let value = record.value_at(idx).ok_or_else(|| missing_value(record, column))?;
            insert = insert.value(column.as_str(), value.clone());
        }

        let (sql, params) = insert.build()?;
        self.run(&sql, &params)?;
        let id = self.connection().last_insert_id()?;
        record.set_primary_key(id)?;

        tracing::debug!(model = record.model_name(), id, "Inserted record");
        Ok(())
    }

    /// UPDATE every column of a persisted record, keyed on its primary key.
    #[tracing::instrument(level = "debug", skip(self, record), fields(model = record.model_name()))]
    pub fn update(&self, record: &Record) -> Result<()> {
        let entry = self.entry(record.model())?;
        let (Some(pk_column), Some(pk)) = (record.primary_key_column(), record.primary_key())
        else {
            return Err(Error::InvalidPersistenceState {
                model: record.model_name().to_string(),
                reason: "cannot update a record without a primary key".to_string(),
            });
        };

        let mut update = UpdateBuilder::new(entry.table_name());
        for (idx, column) in record.columns().iter().enumerate() {
            let value = record.value_at(idx).ok_or_else(|| missing_value(record, column))?;
            update = update.set(column.as_str(), value.clone());
        }

        let (sql, params) = update.key(pk_column, pk.clone()).build()?;
        self.run(&sql, &params)?;
        Ok(())
    }

    /// INSERT when the primary key is unset, UPDATE otherwise.
    pub fn save(&self, record: &mut Record) -> Result<()> {
        if record.is_new() {
            self.insert(record)
        } else {
            self.update(record)
        }
    }
}

fn no_columns(model: &str) -> Error {
    Error::InvalidPersistenceState {
        model: model.to_string(),
        reason: "table has no columns".to_string(),
    }
}

fn missing_value(record: &Record, column: &str) -> Error {
    Error::InvalidPersistenceState {
        model: record.model_name().to_string(),
        reason: format!("column '{}' has no value", column),
    }
}
