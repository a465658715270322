//! SQLite driver for sqlrecord.
//!
//! [`SqliteConnection`] implements [`sqlrecord_core::Connection`] over a
//! single `rusqlite` handle. Values map onto SQLite storage classes as
//! follows:
//!
//! | `Value` | SQLite |
//! |---|---|
//! | `Null` | NULL |
//! | `Bool`, `Int`, `BigInt` | INTEGER (read back as `BigInt`) |
//! | `Double` | REAL |
//! | `Text` | TEXT |
//! | `Bytes` | BLOB |
//!
//! # Example
//!
//! ```
//! use sqlrecord_core::{Connection, Value};
//! use sqlrecord_sqlite::SqliteConnection;
//!
//! let conn = SqliteConnection::open_memory().unwrap();
//! conn.execute_batch("CREATE TABLE teams (id INTEGER PRIMARY KEY, name TEXT);").unwrap();
//! conn.execute("INSERT INTO teams (name) VALUES (?)", &[Value::from("Mets")]).unwrap();
//! assert_eq!(conn.last_insert_id().unwrap(), 1);
//! ```

pub mod config;
pub mod connection;

pub use config::SqliteConfig;
pub use connection::SqliteConnection;
