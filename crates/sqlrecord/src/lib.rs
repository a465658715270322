//! sqlrecord: a small active-record style mapper.
//!
//! Rows of a table map to [`Record`]s; model types declare associations to
//! one another and those associations are resolved lazily into further
//! parameterized queries.
//!
//! # Pieces
//!
//! - [`Registry`]: model types, table names, association descriptors and the
//!   per-model schema cache. Built once with [`Registry::builder`].
//! - [`Session`]: a registry paired with a [`Connection`]. Every query goes
//!   through it: `find`, `all`, `find_where`, `insert`, `update`, `save`,
//!   `belongs_to`, `has_many`, `has_one_through`.
//! - [`Model`]: derive it on a `struct Name(Record);` newtype to get typed
//!   column accessors and association accessors.
//!
//! # Example
//!
//! ```
//! use sqlrecord::{Model, Record, Registry, Session, Value};
//! use sqlrecord_sqlite::SqliteConnection;
//!
//! #[derive(Model, Debug, Clone, PartialEq)]
//! #[sqlrecord(columns(id, name))]
//! #[sqlrecord(has_many(players))]
//! pub struct Manager(Record);
//!
//! #[derive(Model, Debug, Clone, PartialEq)]
//! #[sqlrecord(columns(id, name, manager_id))]
//! #[sqlrecord(belongs_to(manager))]
//! pub struct Player(Record);
//!
//! let conn = SqliteConnection::open_memory().unwrap();
//! conn.execute_batch(
//!     "CREATE TABLE managers (id INTEGER PRIMARY KEY, name TEXT);
//!      CREATE TABLE players (id INTEGER PRIMARY KEY, name TEXT, manager_id INTEGER);
//!      INSERT INTO managers (id, name) VALUES (1, 'Carlos');
//!      INSERT INTO players (id, name, manager_id) VALUES (1, 'Alonso', 1);",
//! )
//! .unwrap();
//!
//! let registry = Registry::builder()
//!     .model::<Manager>()
//!     .model::<Player>()
//!     .build()
//!     .unwrap();
//! let session = Session::new(&registry, &conn);
//! session.finalize_all().unwrap();
//!
//! let player: Player = session.find_as(1_i64).unwrap().unwrap();
//! assert_eq!(player.name(), Some(&Value::from("Alonso")));
//!
//! let manager = player.manager(&session).unwrap().unwrap();
//! assert_eq!(manager.get("name"), Some(&Value::from("Carlos")));
//! ```

mod persist;
pub mod registry;
mod resolve;
mod schema;
pub mod session;

pub use registry::{ModelEntry, Registry, RegistryBuilder};
pub use session::{Loaded, Session};

pub use sqlrecord_core::{
    AssocOptions, AssocTarget, AssociationDescriptor, Connection, Error, Model, ModelId,
    QueryError, QueryErrorKind, Record, RelationshipInfo, RelationshipKind, Result, ResultSet,
    Row, ThroughDescriptor, ThroughSide, Value, inflect,
};
pub use sqlrecord_macros::Model;
pub use sqlrecord_query as query;

/// Common imports.
pub mod prelude {
    pub use crate::{
        AssocOptions, Connection, Error, Loaded, Model, ModelId, Record, Registry, Result,
        Session, Value,
    };
}
