mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use common::{Player, baseball_db, baseball_registry};
use sqlrecord::{
    Connection, Error, Model, QueryErrorKind, Record, Registry, Result, ResultSet, Session, Value,
};

/// Thread-safe connection whose introspection is slow enough for readers to race.
struct SlowIntrospection {
    introspections: AtomicUsize,
}

impl Connection for SlowIntrospection {
    fn execute(&self, sql: &str, _params: &[Value]) -> Result<ResultSet> {
        if sql.ends_with("LIMIT 0") {
            self.introspections.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
        }
        let columns: Arc<[String]> = vec!["id".to_string(), "name".to_string()].into();
        Ok(ResultSet::new(columns, Vec::new()))
    }

    fn last_insert_id(&self) -> Result<i64> {
        Ok(0)
    }
}

#[test]
fn sqlite_columns_introspected_once() {
    let conn = baseball_db();
    let registry = baseball_registry();
    let session = Session::new(&registry, &conn);
    let player = registry.model_id("Player").unwrap();

    for _ in 0..5 {
        let columns = session.columns(player).unwrap();
        assert_eq!(&columns[..], ["id", "name", "manager_id"]);
    }
    assert_eq!(conn.count_matching("SELECT * FROM players LIMIT 0"), 1);

    session.find(player, 1_i64).unwrap();
    session.all(player).unwrap();
    assert_eq!(conn.count_matching("LIMIT 0"), 1);
}

#[test]
fn concurrent_first_reads_introspect_once() {
    let conn = SlowIntrospection {
        introspections: AtomicUsize::new(0),
    };
    let registry = Registry::builder()
        .model_named("Team", None)
        .build()
        .unwrap();
    let team = registry.model_id("Team").unwrap();
    let (registry, conn_ref) = (&registry, &conn);

    thread::scope(|scope| {
        let readers: Vec<_> = (0..8)
            .map(|_| scope.spawn(move || Session::new(registry, conn_ref).columns(team).unwrap()))
            .collect();
        for reader in readers {
            assert_eq!(&reader.join().unwrap()[..], ["id", "name"]);
        }
    });
    assert_eq!(conn.introspections.load(Ordering::SeqCst), 1);
}

#[test]
fn sqlite_cache_survives_sessions() {
    let conn = baseball_db();
    let registry = baseball_registry();
    let player = registry.model_id("Player").unwrap();

    Session::new(&registry, &conn).columns(player).unwrap();
    Session::new(&registry, &conn).columns(player).unwrap();
    assert_eq!(conn.count_matching("LIMIT 0"), 1);
    assert!(registry.entry(player).unwrap().cached_columns().is_some());
}

#[test]
fn sqlite_separate_registries_do_not_share_cache() {
    let conn = baseball_db();
    let first = baseball_registry();
    let second = baseball_registry();

    Session::new(&first, &conn).finalize::<Player>().unwrap();
    Session::new(&second, &conn).finalize::<Player>().unwrap();
    assert_eq!(conn.count_matching("SELECT * FROM players LIMIT 0"), 2);
}

#[test]
fn sqlite_finalize_all_introspects_every_model() {
    let conn = baseball_db();
    let registry = baseball_registry();
    let session = Session::new(&registry, &conn);

    session.finalize_all().unwrap();
    assert_eq!(conn.count_matching("LIMIT 0"), 3);
    assert!(registry.models().all(|m| m.cached_columns().is_some()));
}

#[test]
fn sqlite_missing_table_is_schema_error() {
    let conn = baseball_db();
    let registry = Registry::builder()
        .model_named("Umpire", None)
        .build()
        .unwrap();
    let session = Session::new(&registry, &conn);
    let umpire = registry.model_id("Umpire").unwrap();

    match session.columns(umpire).unwrap_err() {
        Error::Schema { table, source } => {
            assert_eq!(table, "umpires");
            assert_eq!(source.kind, QueryErrorKind::Syntax);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(registry.entry(umpire).unwrap().cached_columns().is_none());
}

#[derive(Model, Debug, Clone, PartialEq)]
#[sqlrecord(table = "players", columns(id, name, jersey_number))]
struct Ballplayer(Record);

#[test]
fn sqlite_finalize_checks_declared_columns() {
    let conn = baseball_db();
    let registry = Registry::builder()
        .model::<Ballplayer>()
        .build()
        .unwrap();
    let session = Session::new(&registry, &conn);

    match session.finalize::<Ballplayer>().unwrap_err() {
        Error::UnknownAttribute { model, attribute } => {
            assert_eq!(model, "Ballplayer");
            assert_eq!(attribute, "jersey_number");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn sqlite_unregistered_typed_model() {
    let conn = baseball_db();
    let registry = Registry::builder()
        .model_named("Team", None)
        .build()
        .unwrap();
    let session = Session::new(&registry, &conn);

    assert!(matches!(
        session.find_as::<Player>(1_i64),
        Err(Error::UnknownModel(ref name)) if name == "Player"
    ));
}
