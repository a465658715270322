//! Procedural macros for sqlrecord.
//!
//! `#[derive(Model)]` turns a newtype over `Record` into a typed model:
//!
//! ```ignore
//! use sqlrecord::{Model, Record};
//!
//! #[derive(Model, Debug, Clone, PartialEq)]
//! #[sqlrecord(table = "players", columns(id, name, manager_id))]
//! #[sqlrecord(belongs_to(manager), has_one_through(team, through = "manager", source = "team"))]
//! pub struct Player(Record);
//! ```
//!
//! The derive emits the `Model` impl (`NAME`, `TABLE_NAME`, `COLUMNS`,
//! `RELATIONSHIPS`), a `col()` / `set_col()` pair per declared column and one
//! accessor per association that loads it through a `Session`.
//!
//! Generated code refers to `::sqlrecord`, so the derive is meant to be used
//! through the facade crate.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod model_derive;

/// Derive `Model` for a `struct Name(Record);` newtype.
///
/// Struct-level `#[sqlrecord(...)]` keys:
///
/// - `name = "..."`: model name (defaults to the struct name)
/// - `table = "..."`: table name (defaults to the pluralized, lower-cased model name)
/// - `columns(a, b, ...)`: columns that get accessors; the first is the primary key
/// - `belongs_to(name, foreign_key = "...", class_name = "...", primary_key = "...")`
/// - `has_many(name, foreign_key = "...", class_name = "...", primary_key = "...")`
/// - `has_one_through(name, through = "...", source = "...")`
#[proc_macro_derive(Model, attributes(sqlrecord))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match model_derive::parse_model(&input) {
        Ok(def) => model_derive::generate_model_impl(&def).into(),
        Err(err) => err.to_compile_error().into(),
    }
}
