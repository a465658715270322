//! The per-instance attribute store.
//!
//! A [`Record`] holds one optional value per column of its model's column
//! set. `None` means the attribute was never set; `Some(Value::Null)` means it
//! was set to NULL. Both read back as "absent" through the primary key
//! helpers, but only the former counts as a missing value on insert.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::row::Row;
use crate::value::Value;

/// Runtime tag identifying a registered model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(usize);

impl ModelId {
    /// Wrap a registry slot index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The registry slot index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A model instance: column values plus the model it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    model: ModelId,
    model_name: Arc<str>,
    columns: Arc<[String]>,
    values: Vec<Option<Value>>,
}

impl Record {
    /// An instance with every attribute unset.
    pub fn new(model: ModelId, model_name: Arc<str>, columns: Arc<[String]>) -> Self {
        let values = vec![None; columns.len()];
        Self {
            model,
            model_name,
            columns,
            values,
        }
    }

    /// An instance built from an attribute mapping.
    ///
    /// Fails with [`Error::UnknownAttribute`] on the first key that is not a column.
    pub fn with_attributes<K, V, I>(
        model: ModelId,
        model_name: Arc<str>,
        columns: Arc<[String]>,
        attributes: I,
    ) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut record = Self::new(model, model_name, columns);
        for (key, value) in attributes {
            record.set(key.as_ref(), value)?;
        }
        Ok(record)
    }

    /// An instance built from a result row.
    pub fn from_row(
        model: ModelId,
        model_name: Arc<str>,
        columns: Arc<[String]>,
        row: Row,
    ) -> Result<Self> {
        Self::with_attributes(model, model_name, columns, row.into_pairs())
    }

    /// The model type tag.
    pub fn model(&self) -> ModelId {
        self.model
    }

    /// The model type name.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// The column set this record was built against.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Index of `column` in the column set.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Stored value of `column`; `None` if never set or not a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.position(column).and_then(|idx| self.value_at(idx))
    }

    /// Stored value by column index.
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Store a value.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> Result<()> {
        let idx = self.position(column).ok_or_else(|| Error::UnknownAttribute {
            model: self.model_name.to_string(),
            attribute: column.to_string(),
        })?;
        self.values[idx] = Some(value.into());
        Ok(())
    }

    /// Whether `column` has been assigned, NULL included.
    pub fn is_set(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Name of the primary key column: the first column of the set.
    pub fn primary_key_column(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }

    /// Primary key value, treating NULL as absent.
    pub fn primary_key(&self) -> Option<&Value> {
        self.value_at(0).filter(|v| !v.is_null())
    }

    /// True until the record has a primary key.
    pub fn is_new(&self) -> bool {
        self.primary_key().is_none()
    }

    /// Overwrite the primary key.
    pub fn set_primary_key(&mut self, value: impl Into<Value>) -> Result<()> {
        if self.values.is_empty() {
            return Err(Error::InvalidPersistenceState {
                model: self.model_name.to_string(),
                reason: "model has no columns".to_string(),
            });
        }
        self.values[0] = Some(value.into());
        Ok(())
    }

    /// Values of the assigned attributes, in column-set order.
    pub fn attribute_values(&self) -> Vec<Value> {
        self.values.iter().flatten().cloned().collect()
    }

    /// Assigned `(column, value)` pairs, in column-set order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .zip(self.values.iter())
            .filter_map(|(c, v)| v.as_ref().map(|v| (c.as_str(), v)))
    }

    /// Assigned attributes as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .attributes()
            .map(|(c, v)| (c.to_string(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}
