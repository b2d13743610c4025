//! Generic tenant-scoped repository. Every entity shares the same CRUD
//! mechanics; an `EntitySchema` supplies the table, the api/column field map,
//! validation rules, and presentation details.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use store::{Filter, OrderBy, Row, RowStore, StoreError};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::validate::FieldRule;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Int,
    Float,
    Bool,
}

/// One writable field: its camelCase api name, its snake_case column, and the
/// JSON kind clients must send.
pub struct FieldDef {
    pub api: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

/// Maps a unique column back to the label used in duplicate-key messages.
pub struct UniqueField {
    pub column: &'static str,
    pub label: &'static str,
}

pub struct EntitySchema {
    pub table: &'static str,
    pub singular: &'static str,
    pub plural: &'static str,
    pub fields: &'static [FieldDef],
    pub rules: &'static [FieldRule],
    pub unique: &'static [UniqueField],
    /// Columns never echoed back to clients.
    pub redacted: &'static [&'static str],
    pub search_columns: &'static [&'static str],
    pub order: OrderBy,
    pub tenant_scoped: bool,
}

impl EntitySchema {
    pub fn field_by_api(&self, api: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.api == api)
    }

    pub fn has_field(&self, api: &str) -> bool {
        self.field_by_api(api).is_some()
    }
}

/// Millisecond-precision RFC 3339 in UTC; lexicographic order matches
/// chronological order, which the overdue query relies on.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub struct Repository {
    store: Arc<dyn RowStore>,
    schema: &'static EntitySchema,
}

impl Repository {
    pub fn new(store: Arc<dyn RowStore>, schema: &'static EntitySchema) -> Self {
        Self { store, schema }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    /// Base filter for every read and write. Non-scoped entities (companies)
    /// get an empty filter and are addressed by id alone.
    pub fn tenant_filter(&self, tenant_id: Uuid) -> Filter {
        if self.schema.tenant_scoped {
            Filter::new().eq("company_id", tenant_id.to_string())
        } else {
            Filter::new()
        }
    }

    /// Translate an api payload to column names, dropping anything the schema
    /// does not list. Spoofed `id` / `companyId` / timestamps die here.
    fn to_columns(&self, fields: Row) -> Row {
        let mut row = Row::new();
        for (api, value) in fields {
            let Some(field) = self.schema.field_by_api(&api) else {
                continue;
            };
            if value.is_null() && field.kind != FieldKind::Text {
                continue;
            }
            row.insert(field.column.to_string(), value);
        }
        row
    }

    /// Translate a stored row to the api shape: redacted columns dropped,
    /// column names mapped back, sqlite's 0/1 booleans normalized.
    pub fn present(&self, row: Row) -> Row {
        let mut out = Row::new();
        for (column, value) in row {
            if self.schema.redacted.contains(&column.as_str()) {
                continue;
            }
            let api = match column.as_str() {
                "id" => "id",
                "company_id" => "companyId",
                "created_at" => "createdAt",
                "updated_at" => "updatedAt",
                other => match self.schema.fields.iter().find(|f| f.column == other) {
                    Some(field) => {
                        out.insert(field.api.to_string(), coerce(field.kind, value));
                        continue;
                    }
                    None => continue,
                },
            };
            out.insert(api.to_string(), value);
        }
        out
    }

    fn not_found(&self) -> ApiError {
        ApiError::NotFound(format!(
            "{} not found or access denied",
            self.schema.singular
        ))
    }

    fn map_store_err(&self, err: StoreError) -> ApiError {
        match err {
            StoreError::DuplicateKey { message } => {
                // The backend names the violated column; use it to pick a
                // human label, falling back to a generic one.
                let label = self
                    .schema
                    .unique
                    .iter()
                    .find(|u| message.contains(u.column))
                    .map(|u| u.label)
                    .unwrap_or("value");
                ApiError::Duplicate(format!(
                    "A {} with this {} already exists",
                    self.schema.singular.to_lowercase(),
                    label
                ))
            }
            other => ApiError::Storage(other.to_string()),
        }
    }

    pub async fn create(&self, tenant_id: Option<Uuid>, fields: Row) -> ApiResult<Row> {
        let mut row = self.to_columns(fields);
        row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        if self.schema.tenant_scoped {
            let tenant = tenant_id
                .ok_or_else(|| ApiError::Storage("tenant id required for create".to_string()))?;
            row.insert("company_id".to_string(), Value::String(tenant.to_string()));
        }
        let now = now_rfc3339();
        row.insert("created_at".to_string(), Value::String(now.clone()));
        row.insert("updated_at".to_string(), Value::String(now));

        let created = self
            .store
            .insert(self.schema.table, row)
            .await
            .map_err(|e| self.map_store_err(e))?;
        Ok(self.present(created))
    }

    pub async fn find_all_for_tenant(&self, tenant_id: Uuid) -> ApiResult<Vec<Row>> {
        let filter = self.tenant_filter(tenant_id);
        self.find_filtered(filter, None).await
    }

    pub async fn find_filtered(
        &self,
        filter: Filter,
        order: Option<&OrderBy>,
    ) -> ApiResult<Vec<Row>> {
        let rows = self
            .store
            .find_many(
                self.schema.table,
                &filter,
                Some(order.unwrap_or(&self.schema.order)),
            )
            .await
            .map_err(|e| self.map_store_err(e))?;
        Ok(rows.into_iter().map(|row| self.present(row)).collect())
    }

    pub async fn find_by_id_for_tenant(&self, id: &str, tenant_id: Uuid) -> ApiResult<Row> {
        let filter = self.tenant_filter(tenant_id).eq("id", id);
        let row = self
            .store
            .find_one(self.schema.table, &filter)
            .await
            .map_err(|e| self.map_store_err(e))?
            .ok_or_else(|| self.not_found())?;
        Ok(self.present(row))
    }

    pub async fn update_for_tenant(
        &self,
        id: &str,
        tenant_id: Uuid,
        fields: Row,
    ) -> ApiResult<Row> {
        let mut changes = self.to_columns(fields);
        changes.insert("updated_at".to_string(), Value::String(now_rfc3339()));
        let filter = self.tenant_filter(tenant_id).eq("id", id);
        let row = self
            .store
            .update(self.schema.table, &filter, changes)
            .await
            .map_err(|e| self.map_store_err(e))?
            .ok_or_else(|| self.not_found())?;
        Ok(self.present(row))
    }

    pub async fn delete_for_tenant(&self, id: &str, tenant_id: Uuid) -> ApiResult<()> {
        let filter = self.tenant_filter(tenant_id).eq("id", id);
        let deleted = self
            .store
            .delete(self.schema.table, &filter)
            .await
            .map_err(|e| self.map_store_err(e))?;
        if deleted {
            Ok(())
        } else {
            Err(self.not_found())
        }
    }

    /// Unscoped single-row lookup by one column, for flows that have no
    /// tenant in hand yet (login, token resolution, signup pre-checks).
    /// Returns the raw column-named row, not the api shape.
    pub async fn find_one_global(&self, column: &str, value: &str) -> ApiResult<Option<Row>> {
        let filter = Filter::new().eq(column, value);
        self.store
            .find_one(self.schema.table, &filter)
            .await
            .map_err(|e| self.map_store_err(e))
    }

    pub async fn search(&self, tenant_id: Uuid, query: &str) -> ApiResult<Vec<Row>> {
        let needle = query.trim();
        if needle.is_empty() {
            return Err(ApiError::Validation(vec![crate::error::FieldError::new(
                "q",
                "search query is required",
            )]));
        }
        let filter = self
            .tenant_filter(tenant_id)
            .contains(self.schema.search_columns, needle);
        self.find_filtered(filter, None).await
    }
}

fn coerce(kind: FieldKind, value: Value) -> Value {
    match (kind, value) {
        (FieldKind::Bool, Value::Number(n)) => Value::Bool(n.as_i64() != Some(0)),
        (_, value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use store::Direction;

    const FIELDS: &[FieldDef] = &[
        FieldDef {
            api: "fullName",
            column: "full_name",
            kind: FieldKind::Text,
        },
        FieldDef {
            api: "isActive",
            column: "is_active",
            kind: FieldKind::Bool,
        },
        FieldDef {
            api: "secretHash",
            column: "secret_hash",
            kind: FieldKind::Text,
        },
    ];
    static SCHEMA: EntitySchema = EntitySchema {
        table: "people",
        singular: "Person",
        plural: "People",
        fields: FIELDS,
        rules: &[],
        unique: &[UniqueField {
            column: "full_name",
            label: "name",
        }],
        redacted: &["secret_hash"],
        search_columns: &["full_name"],
        order: OrderBy {
            column: "created_at",
            direction: Direction::Desc,
        },
        tenant_scoped: true,
    };

    fn repo() -> Repository {
        struct NoStore;
        #[async_trait::async_trait]
        impl RowStore for NoStore {
            async fn insert(&self, _: &str, _: Row) -> store::StoreResult<Row> {
                unimplemented!()
            }
            async fn find_many(
                &self,
                _: &str,
                _: &Filter,
                _: Option<&OrderBy>,
            ) -> store::StoreResult<Vec<Row>> {
                unimplemented!()
            }
            async fn find_one(&self, _: &str, _: &Filter) -> store::StoreResult<Option<Row>> {
                unimplemented!()
            }
            async fn update(&self, _: &str, _: &Filter, _: Row) -> store::StoreResult<Option<Row>> {
                unimplemented!()
            }
            async fn delete(&self, _: &str, _: &Filter) -> store::StoreResult<bool> {
                unimplemented!()
            }
        }
        Repository::new(Arc::new(NoStore), &SCHEMA)
    }

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn to_columns_drops_unknown_and_reserved_fields() {
        let out = repo().to_columns(row(json!({
            "fullName": "Ada",
            "companyId": "spoofed",
            "id": "spoofed",
            "nonsense": 1,
        })));
        assert_eq!(out.len(), 1);
        assert_eq!(out["full_name"], json!("Ada"));
    }

    #[test]
    fn to_columns_keeps_null_only_for_text() {
        let out = repo().to_columns(row(json!({ "fullName": null, "isActive": null })));
        assert_eq!(out.len(), 1);
        assert!(out["full_name"].is_null());
    }

    #[test]
    fn present_redacts_and_renames() {
        let out = repo().present(row(json!({
            "id": "x",
            "company_id": "c",
            "full_name": "Ada",
            "secret_hash": "nope",
            "is_active": 1,
            "created_at": "2026-01-01T00:00:00.000Z",
        })));
        assert_eq!(out["id"], json!("x"));
        assert_eq!(out["companyId"], json!("c"));
        assert_eq!(out["fullName"], json!("Ada"));
        assert_eq!(out["isActive"], json!(true));
        assert_eq!(out["createdAt"], json!("2026-01-01T00:00:00.000Z"));
        assert!(!out.contains_key("secret_hash"));
        assert!(!out.contains_key("secretHash"));
    }

    #[test]
    fn duplicate_message_names_the_field() {
        let err = repo().map_store_err(StoreError::DuplicateKey {
            message: "UNIQUE constraint failed: people.full_name".to_string(),
        });
        match err {
            ApiError::Duplicate(message) => {
                assert_eq!(message, "A person with this name already exists")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
