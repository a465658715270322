//! Per-model memoized column lists.

use std::sync::{Arc, PoisonError, RwLock};

use sqlrecord_core::Result;

/// Column set cache for one model type.
///
/// Filled at most once. Concurrent first readers serialize on the write lock
/// and re-check before loading, so the loader runs exactly once on success.
/// A failed load leaves the slot empty.
#[derive(Debug, Default)]
pub struct SchemaSlot {
    columns: RwLock<Option<Arc<[String]>>>,
}

impl SchemaSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached columns, if already loaded.
    pub fn get(&self) -> Option<Arc<[String]>> {
        self.columns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Cached columns, loading them with `load` on first use.
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<[String]>>
    where
        F: FnOnce() -> Result<Arc<[String]>>,
    {
        if let Some(columns) = self.get() {
            return Ok(columns);
        }

        let mut slot = self
            .columns
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(columns) = slot.as_ref() {
            return Ok(Arc::clone(columns));
        }
        let columns = load()?;
        *slot = Some(Arc::clone(&columns));
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlrecord_core::{Error, QueryError, QueryErrorKind};
    use std::cell::Cell;

    fn columns(names: &[&str]) -> Arc<[String]> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_loads_once() {
        let slot = SchemaSlot::new();
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Ok(columns(&["id", "name"]))
        };

        assert!(slot.get().is_none());
        assert_eq!(slot.get_or_load(load).unwrap().len(), 2);
        assert_eq!(slot.get_or_load(load).unwrap().len(), 2);
        assert_eq!(calls.get(), 1);
        assert!(slot.get().is_some());
    }

    #[test]
    fn test_failure_is_not_cached() {
        let slot = SchemaSlot::new();
        let err = slot
            .get_or_load(|| {
                Err(Error::Query(QueryError::new(
                    QueryErrorKind::Syntax,
                    "no such table: ghosts",
                )))
            })
            .unwrap_err();
        assert!(matches!(err, Error::Query(_)));
        assert!(slot.get().is_none());

        let cols = slot.get_or_load(|| Ok(columns(&["id"]))).unwrap();
        assert_eq!(&cols[..], ["id"]);
    }
}
