//! Core types and traits for sqlrecord.
//!
//! `sqlrecord-core` is the **foundation layer** of the workspace. It defines
//! the contracts and data types that the query builders, the SQLite driver and
//! the `sqlrecord` facade share.
//!
//! # Role In The Architecture
//!
//! - **Contract layer**: [`Connection`] is the only thing a database driver
//!   implements; [`Model`] is implemented (usually derived) by typed models.
//! - **Data model**: [`Value`], [`Row`] and [`ResultSet`] carry parameters and
//!   results; [`Record`] is the per-instance attribute store.
//! - **Association metadata**: [`RelationshipInfo`] declarations and the
//!   defaulting rules that turn them into [`AssociationDescriptor`]s.
//! - **Naming**: [`inflect`] derives table names and association defaults.
//!
//! Most applications should use the `sqlrecord` facade; reach for this crate
//! directly when writing a driver.

pub mod connection;
pub mod error;
pub mod identifiers;
pub mod inflect;
pub mod model;
pub mod record;
pub mod relationship;
pub mod row;
pub mod value;

pub use connection::Connection;
pub use error::{Error, QueryError, QueryErrorKind, Result, ThroughSide};
pub use identifiers::{is_valid_identifier, validate_identifier};
pub use model::Model;
pub use record::{ModelId, Record};
pub use relationship::{
    AssocOptions, AssocTarget, AssociationDescriptor, RelationshipInfo, RelationshipKind,
    ThroughDescriptor,
};
pub use row::{ResultSet, Row};
pub use value::Value;
