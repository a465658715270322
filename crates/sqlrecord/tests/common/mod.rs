//! Shared fixtures for the scenario tests.

#![allow(dead_code)]

use std::cell::RefCell;

use sqlrecord::{Connection, Model, Record, Registry, Result, ResultSet, Value};
use sqlrecord_sqlite::SqliteConnection;

pub const BASEBALL_SQL: &str = include_str!("../fixtures/baseball.sql");

#[derive(Model, Debug, Clone, PartialEq)]
#[sqlrecord(columns(id, name))]
#[sqlrecord(has_many(managers))]
pub struct Team(Record);

#[derive(Model, Debug, Clone, PartialEq)]
#[sqlrecord(table = "managers", columns(id, fname, lname, team_id))]
#[sqlrecord(belongs_to(team), has_many(players, foreign_key = "manager_id"))]
pub struct Manager(Record);

#[derive(Model, Debug, Clone, PartialEq)]
#[sqlrecord(columns(id, name, manager_id))]
#[sqlrecord(belongs_to(manager, class_name = "Manager", foreign_key = "manager_id"))]
#[sqlrecord(has_one_through(team, through = "manager", source = "team"))]
pub struct Player(Record);

/// Connection wrapper that remembers every statement it executed.
pub struct Recording<C> {
    inner: C,
    statements: RefCell<Vec<String>>,
}

impl<C: Connection> Recording<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            statements: RefCell::new(Vec::new()),
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.statements.borrow().len()
    }

    /// Number of executed statements containing `needle`.
    pub fn count_matching(&self, needle: &str) -> usize {
        self.statements
            .borrow()
            .iter()
            .filter(|sql| sql.contains(needle))
            .count()
    }

    pub fn clear(&self) {
        self.statements.borrow_mut().clear();
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Connection> Connection for Recording<C> {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        self.statements.borrow_mut().push(sql.to_string());
        self.inner.execute(sql, params)
    }

    fn last_insert_id(&self) -> Result<i64> {
        self.inner.last_insert_id()
    }
}

/// In-memory database seeded with teams, managers and players.
pub fn baseball_db() -> Recording<SqliteConnection> {
    let conn = SqliteConnection::open_memory().expect("open in-memory database");
    conn.execute_batch(BASEBALL_SQL).expect("seed baseball fixture");
    Recording::new(conn)
}

pub fn baseball_registry() -> Registry {
    Registry::builder()
        .model::<Team>()
        .model::<Manager>()
        .model::<Player>()
        .build()
        .expect("baseball registry")
}
