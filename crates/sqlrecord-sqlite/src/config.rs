//! SQLite connection configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the database file.
pub const DB_FILE_ENV: &str = "SQLRECORD_DB_FILE";
/// Environment variable naming the SQL file replayed on reset.
pub const SQL_FILE_ENV: &str = "SQLRECORD_SQL_FILE";
/// Environment variable enabling statement logging (`true` or `1`).
pub const PRINT_QUERIES_ENV: &str = "SQLRECORD_PRINT_QUERIES";

/// SQLite connection configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Database file; `None` opens an in-memory database.
    pub path: Option<PathBuf>,
    /// SQL script replayed by `reset` to rebuild the database.
    pub seed_sql: Option<PathBuf>,
    /// Emit every executed statement at `trace` level.
    pub log_queries: bool,
    /// How long to wait on a locked database before failing.
    pub busy_timeout: Option<Duration>,
}

impl SqliteConfig {
    /// An in-memory configuration with no seed script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for a database file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new().path(path)
    }

    /// Build a configuration from `SQLRECORD_*` environment variables.
    ///
    /// Unset variables leave the corresponding default in place.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();
        if let Some(path) = lookup(DB_FILE_ENV).filter(|v| !v.is_empty()) {
            config.path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup(SQL_FILE_ENV).filter(|v| !v.is_empty()) {
            config.seed_sql = Some(PathBuf::from(path));
        }
        if let Some(flag) = lookup(PRINT_QUERIES_ENV) {
            config.log_queries = matches!(flag.trim(), "true" | "1");
        }
        config
    }

    /// Set the database file.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the SQL script replayed on reset.
    pub fn seed_sql(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_sql = Some(path.into());
        self
    }

    /// Enable or disable statement logging.
    pub fn log_queries(mut self, enabled: bool) -> Self {
        self.log_queries = enabled;
        self
    }

    /// Set the busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    /// Whether this configuration opens an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.path.is_none()
    }

    /// The database file, if file-backed.
    pub fn db_file(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_is_memory() {
        let config = SqliteConfig::new();
        assert!(config.is_memory());
        assert!(config.seed_sql.is_none());
        assert!(!config.log_queries);
    }

    #[test]
    fn test_builder() {
        let config = SqliteConfig::file("baseball.db")
            .seed_sql("baseball.sql")
            .log_queries(true)
            .busy_timeout(Duration::from_millis(250));

        assert_eq!(config.db_file(), Some(Path::new("baseball.db")));
        assert_eq!(config.seed_sql, Some(PathBuf::from("baseball.sql")));
        assert!(config.log_queries);
        assert_eq!(config.busy_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (DB_FILE_ENV, "/tmp/baseball.db"),
            (SQL_FILE_ENV, "/tmp/baseball.sql"),
            (PRINT_QUERIES_ENV, "true"),
        ]
        .into_iter()
        .collect();

        let config = SqliteConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()));
        assert_eq!(config.db_file(), Some(Path::new("/tmp/baseball.db")));
        assert_eq!(config.seed_sql, Some(PathBuf::from("/tmp/baseball.sql")));
        assert!(config.log_queries);
    }

    #[test]
    fn test_from_lookup_ignores_empty_and_false() {
        let config = SqliteConfig::from_lookup(|key| match key {
            DB_FILE_ENV => Some(String::new()),
            PRINT_QUERIES_ENV => Some("false".to_string()),
            _ => None,
        });
        assert!(config.is_memory());
        assert!(!config.log_queries);
    }
}
