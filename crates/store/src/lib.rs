//! Interchangeable row storage for the CRM backend.
//!
//! Three backends implement the same [`RowStore`] contract: an embedded
//! SQLite file, a local PostgreSQL server (both via [`SqlStore`]), and a
//! managed Supabase project spoken to over PostgREST ([`SupabaseStore`]).
//! The backend is selected once at process start from [`StoreConfig`];
//! nothing above this crate ever branches on the backend kind.
//!
//! The store is a dumb row store: rows are JSON objects keyed by storage
//! column names, and all field-name translation and tenant scoping happens
//! in the repositories upstream.

mod error;
mod sql;
mod supabase;

pub use error::{StoreError, StoreResult};
pub use sql::SqlStore;
pub use supabase::SupabaseStore;

use std::sync::Arc;

use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use serde_json::{Map, Value};

/// A storage row in column naming, as returned by the backend.
pub type Row = Map<String, Value>;

/// Sort direction for [`OrderBy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Single-column ordering applied to multi-row reads.
#[derive(Clone, Copy, Debug)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: Direction,
}

/// Conjunction of row predicates: column equality, a less-than bound, and
/// an optional case-insensitive substring match across text columns.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    eq: Vec<(String, Value)>,
    lt: Vec<(String, Value)>,
    contains: Option<(Vec<String>, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.eq.push((column.to_string(), value.into()));
        self
    }

    pub fn lt(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.lt.push((column.to_string(), value.into()));
        self
    }

    /// Match rows where any of `columns` contains `needle`, ignoring case.
    pub fn contains(mut self, columns: &[&str], needle: &str) -> Self {
        self.contains = Some((
            columns.iter().map(|c| c.to_string()).collect(),
            needle.to_string(),
        ));
        self
    }

    pub fn eq_terms(&self) -> &[(String, Value)] {
        &self.eq
    }

    pub fn lt_terms(&self) -> &[(String, Value)] {
        &self.lt
    }

    pub fn contains_term(&self) -> Option<(&[String], &str)> {
        self.contains
            .as_ref()
            .map(|(columns, needle)| (columns.as_slice(), needle.as_str()))
    }
}

/// The uniform CRUD contract all backends implement.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Insert a row and return it as stored. Null values are ignored.
    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row>;

    async fn find_many(
        &self,
        table: &str,
        filter: &Filter,
        order: Option<&OrderBy>,
    ) -> StoreResult<Vec<Row>>;

    async fn find_one(&self, table: &str, filter: &Filter) -> StoreResult<Option<Row>>;

    /// Apply `changes` to every matching row and return the first updated
    /// row, or `None` when nothing matched. A JSON null in `changes` sets
    /// the column to NULL.
    async fn update(&self, table: &str, filter: &Filter, changes: Row) -> StoreResult<Option<Row>>;

    /// Returns whether at least one row was deleted.
    async fn delete(&self, table: &str, filter: &Filter) -> StoreResult<bool>;
}

/// Which concrete backend to bind at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Sqlite,
    Postgres,
    Supabase,
}

impl BackendKind {
    /// Unknown selector values fail closed to the embedded store.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => BackendKind::Postgres,
            "supabase" => BackendKind::Supabase,
            "sqlite" | "" => BackendKind::Sqlite,
            other => {
                tracing::warn!(backend = other, "unknown DB_BACKEND, falling back to sqlite");
                BackendKind::Sqlite
            }
        }
    }
}

/// Startup-time storage configuration, read once from the environment.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub backend: BackendKind,
    pub sqlite_path: String,
    pub database_url: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            backend: BackendKind::parse(&std::env::var("DB_BACKEND").unwrap_or_default()),
            sqlite_path: std::env::var("SQLITE_PATH").unwrap_or_else(|_| "data/crm.sqlite".into()),
            database_url: std::env::var("DATABASE_URL").ok(),
            supabase_url: std::env::var("SUPABASE_URL").ok(),
            supabase_key: std::env::var("SUPABASE_ANON_KEY").ok(),
        }
    }

    /// Connection URL for the SQL backends. Errors for Supabase, which is
    /// not reached over a database connection.
    pub fn sql_url(&self) -> StoreResult<String> {
        match self.backend {
            BackendKind::Sqlite => {
                if self.sqlite_path == ":memory:" {
                    Ok("sqlite::memory:".into())
                } else {
                    Ok(format!("sqlite://{}?mode=rwc", self.sqlite_path))
                }
            }
            BackendKind::Postgres => self
                .database_url
                .clone()
                .ok_or_else(|| StoreError::Config("DATABASE_URL missing".into())),
            BackendKind::Supabase => Err(StoreError::Config(
                "supabase backend has no SQL connection URL".into(),
            )),
        }
    }
}

/// Connect the configured backend. SQL backends run pending migrations on
/// connect; a Supabase project is expected to be provisioned already.
pub async fn connect(config: &StoreConfig) -> StoreResult<Arc<dyn RowStore>> {
    match config.backend {
        BackendKind::Sqlite | BackendKind::Postgres => {
            let sql = SqlStore::connect(&config.sql_url()?).await?;
            Migrator::up(sql.connection(), None)
                .await
                .map_err(StoreError::from)?;
            Ok(Arc::new(sql))
        }
        BackendKind::Supabase => {
            let url = config
                .supabase_url
                .as_deref()
                .ok_or_else(|| StoreError::Config("SUPABASE_URL missing".into()))?;
            let key = config
                .supabase_key
                .as_deref()
                .ok_or_else(|| StoreError::Config("SUPABASE_ANON_KEY missing".into()))?;
            Ok(Arc::new(SupabaseStore::new(url, key)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_backend_falls_back_to_sqlite() {
        assert_eq!(BackendKind::parse("mongodb"), BackendKind::Sqlite);
        assert_eq!(BackendKind::parse(""), BackendKind::Sqlite);
        assert_eq!(BackendKind::parse("PostgreSQL"), BackendKind::Postgres);
        assert_eq!(BackendKind::parse("supabase"), BackendKind::Supabase);
    }

    #[test]
    fn sql_url_shapes() {
        let mut config = StoreConfig {
            backend: BackendKind::Sqlite,
            sqlite_path: "data/crm.sqlite".into(),
            database_url: None,
            supabase_url: None,
            supabase_key: None,
        };
        assert_eq!(
            config.sql_url().unwrap(),
            "sqlite://data/crm.sqlite?mode=rwc"
        );
        config.sqlite_path = ":memory:".into();
        assert_eq!(config.sql_url().unwrap(), "sqlite::memory:");
        config.backend = BackendKind::Postgres;
        assert!(matches!(config.sql_url(), Err(StoreError::Config(_))));
    }
}
