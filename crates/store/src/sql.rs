//! SQL row store over sea-orm, covering the embedded SQLite file and a
//! local PostgreSQL server with a single code path. Statements are built
//! dynamically with sea-query against whichever backend the connection
//! reports, and reads come back as JSON rows.

use sea_orm::sea_query::{Alias, Asterisk, Cond, Expr, Func, Order, Query, SimpleExpr};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection,
    FromQueryResult, JsonValue,
};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::{Direction, Filter, OrderBy, Row, RowStore};

pub struct SqlStore {
    db: DatabaseConnection,
}

impl SqlStore {
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let mut options = ConnectOptions::new(url.to_string());
        if url.contains(":memory:") {
            // A pooled in-memory SQLite would hand every connection its
            // own empty database.
            options.max_connections(1);
        }
        let db = Database::connect(options).await.map_err(StoreError::from)?;
        if db.get_database_backend() == DatabaseBackend::Sqlite {
            db.execute_unprepared("PRAGMA foreign_keys = ON;")
                .await
                .map_err(StoreError::from)?;
        }
        Ok(Self { db })
    }

    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn condition(filter: &Filter) -> Cond {
        let mut cond = Cond::all();
        for (column, value) in filter.eq_terms() {
            if let Some(value) = bind_value(value) {
                cond = cond.add(Expr::col(Alias::new(column)).eq(value));
            }
        }
        for (column, value) in filter.lt_terms() {
            if let Some(value) = bind_value(value) {
                cond = cond.add(Expr::col(Alias::new(column)).lt(value));
            }
        }
        if let Some((columns, needle)) = filter.contains_term() {
            let pattern = format!("%{}%", needle.to_lowercase());
            let mut any = Cond::any();
            for column in columns {
                any = any.add(
                    Expr::expr(Func::lower(Expr::col(Alias::new(column)))).like(pattern.clone()),
                );
            }
            cond = cond.add(any);
        }
        cond
    }
}

/// Non-null JSON scalars become bind parameters; nulls are handled by the
/// caller (skipped on insert, explicit NULL on update).
fn bind_value(value: &Value) -> Option<sea_orm::Value> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some((*flag).into()),
        Value::Number(number) => number
            .as_i64()
            .map(sea_orm::Value::from)
            .or_else(|| number.as_f64().map(sea_orm::Value::from)),
        Value::String(text) => Some(text.clone().into()),
        other => Some(other.to_string().into()),
    }
}

fn into_row(value: JsonValue) -> StoreResult<Row> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::backend(format!(
            "expected object row, got {other}"
        ))),
    }
}

#[async_trait::async_trait]
impl RowStore for SqlStore {
    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        let mut columns = Vec::new();
        let mut values: Vec<SimpleExpr> = Vec::new();
        for (column, value) in &row {
            if let Some(value) = bind_value(value) {
                columns.push(Alias::new(column));
                values.push(value.into());
            }
        }
        let mut insert = Query::insert();
        insert.into_table(Alias::new(table)).columns(columns);
        insert
            .values(values)
            .map_err(|err| StoreError::backend(err.to_string()))?;
        insert.returning_all();

        let statement = self.db.get_database_backend().build(&insert);
        let created = JsonValue::find_by_statement(statement)
            .one(&self.db)
            .await
            .map_err(StoreError::from)?
            .ok_or_else(|| StoreError::backend("insert returned no row"))?;
        into_row(created)
    }

    async fn find_many(
        &self,
        table: &str,
        filter: &Filter,
        order: Option<&OrderBy>,
    ) -> StoreResult<Vec<Row>> {
        let mut select = Query::select();
        select
            .column(Asterisk)
            .from(Alias::new(table))
            .cond_where(Self::condition(filter));
        if let Some(order) = order {
            let direction = match order.direction {
                Direction::Asc => Order::Asc,
                Direction::Desc => Order::Desc,
            };
            select.order_by(Alias::new(order.column), direction);
        }
        let statement = self.db.get_database_backend().build(&select);
        let rows = JsonValue::find_by_statement(statement)
            .all(&self.db)
            .await
            .map_err(StoreError::from)?;
        rows.into_iter().map(into_row).collect()
    }

    async fn find_one(&self, table: &str, filter: &Filter) -> StoreResult<Option<Row>> {
        let mut select = Query::select();
        select
            .column(Asterisk)
            .from(Alias::new(table))
            .cond_where(Self::condition(filter))
            .limit(1);
        let statement = self.db.get_database_backend().build(&select);
        let row = JsonValue::find_by_statement(statement)
            .one(&self.db)
            .await
            .map_err(StoreError::from)?;
        row.map(into_row).transpose()
    }

    async fn update(&self, table: &str, filter: &Filter, changes: Row) -> StoreResult<Option<Row>> {
        if changes.is_empty() {
            return self.find_one(table, filter).await;
        }
        let mut update = Query::update();
        update.table(Alias::new(table));
        for (column, value) in &changes {
            let bound = bind_value(value)
                .unwrap_or_else(|| sea_orm::Value::String(None));
            update.value(Alias::new(column), bound);
        }
        update.cond_where(Self::condition(filter));
        update.returning_all();

        let statement = self.db.get_database_backend().build(&update);
        let updated = JsonValue::find_by_statement(statement)
            .one(&self.db)
            .await
            .map_err(StoreError::from)?;
        updated.map(into_row).transpose()
    }

    async fn delete(&self, table: &str, filter: &Filter) -> StoreResult<bool> {
        let mut delete = Query::delete();
        delete
            .from_table(Alias::new(table))
            .cond_where(Self::condition(filter));
        let statement = self.db.get_database_backend().build(&delete);
        let result = self.db.execute(statement).await.map_err(StoreError::from)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn memory_store() -> SqlStore {
        let store = SqlStore::connect("sqlite::memory:").await.unwrap();
        store
            .connection()
            .execute_unprepared(
                r#"
                CREATE TABLE contacts (
                    id TEXT PRIMARY KEY,
                    company_id TEXT NOT NULL,
                    name TEXT NOT NULL,
                    email TEXT UNIQUE,
                    age INTEGER,
                    created_at TEXT NOT NULL
                );
                "#,
            )
            .await
            .unwrap();
        store
    }

    fn contact(id: &str, company: &str, name: &str, email: &str) -> Row {
        match json!({
            "id": id,
            "company_id": company,
            "name": name,
            "email": email,
            "created_at": "2026-01-01T00:00:00Z",
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn insert_and_read_back() {
        let store = memory_store().await;
        let created = store
            .insert("contacts", contact("c1", "t1", "Ada", "ada@example.test"))
            .await
            .unwrap();
        assert_eq!(created["name"], "Ada");

        let found = store
            .find_one("contacts", &Filter::new().eq("id", "c1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["email"], "ada@example.test");
    }

    #[tokio::test]
    async fn unique_violation_maps_to_duplicate_key() {
        let store = memory_store().await;
        store
            .insert("contacts", contact("c1", "t1", "Ada", "ada@example.test"))
            .await
            .unwrap();
        let err = store
            .insert("contacts", contact("c2", "t1", "Ada Two", "ada@example.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn contains_filter_is_case_insensitive() {
        let store = memory_store().await;
        store
            .insert("contacts", contact("c1", "t1", "Grace Hopper", "grace@navy.test"))
            .await
            .unwrap();
        let hits = store
            .find_many(
                "contacts",
                &Filter::new()
                    .eq("company_id", "t1")
                    .contains(&["name", "email"], "HOPPER"),
                None,
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let misses = store
            .find_many(
                "contacts",
                &Filter::new()
                    .eq("company_id", "t1")
                    .contains(&["name", "email"], "zzz-no-match"),
                None,
            )
            .await
            .unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn update_returns_none_for_missing_row() {
        let store = memory_store().await;
        let mut changes = Row::new();
        changes.insert("name".into(), json!("Renamed"));
        let updated = store
            .update("contacts", &Filter::new().eq("id", "absent"), changes)
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn update_null_clears_column() {
        let store = memory_store().await;
        store
            .insert("contacts", contact("c1", "t1", "Ada", "ada@example.test"))
            .await
            .unwrap();
        let mut changes = Row::new();
        changes.insert("email".into(), Value::Null);
        let updated = store
            .update("contacts", &Filter::new().eq("id", "c1"), changes)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["email"], Value::Null);
    }

    #[tokio::test]
    async fn delete_reports_outcome() {
        let store = memory_store().await;
        store
            .insert("contacts", contact("c1", "t1", "Ada", "ada@example.test"))
            .await
            .unwrap();
        assert!(store
            .delete("contacts", &Filter::new().eq("id", "c1"))
            .await
            .unwrap());
        assert!(!store
            .delete("contacts", &Filter::new().eq("id", "c1"))
            .await
            .unwrap());
    }
}
