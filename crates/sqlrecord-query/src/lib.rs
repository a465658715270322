//! SQL builders for sqlrecord.
//!
//! `sqlrecord-query` turns table names, column names and values into
//! `(sql, params)` pairs. It never executes anything; the facade's `Session`
//! hands the output to a [`Connection`](sqlrecord_core::Connection).
//!
//! Every builder:
//!
//! - validates table and column names as plain SQL identifiers,
//! - emits positional `?` placeholders and never interpolates values,
//! - returns parameters in placeholder order.
//!
//! # Example
//!
//! ```
//! use sqlrecord_query::{build_where, introspect};
//! use sqlrecord_core::Value;
//!
//! assert_eq!(introspect("players").unwrap(), "SELECT * FROM players LIMIT 0");
//!
//! let (sql, params) = build_where("players", &[("manager_id", Value::BigInt(1))]).unwrap();
//! assert_eq!(sql, "SELECT * FROM players WHERE manager_id = ?");
//! assert_eq!(params, vec![Value::BigInt(1)]);
//! ```

pub mod builder;
pub mod join;
pub mod select;

pub use builder::{InsertBuilder, UpdateBuilder};
pub use join::ThroughJoin;
pub use select::{Select, build_where, introspect, select_all};
