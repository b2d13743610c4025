use serde_json::Value;
use store::{Direction, OrderBy, Row};

use super::{default_field, ApiEntity};
use crate::error::ApiResult;
use crate::repo::FieldKind::{Bool, Text};
use crate::repo::{EntitySchema, FieldDef, UniqueField};
use crate::validate::{FieldRule, Rule, WriteMode};

pub struct Users;

const FIELDS: &[FieldDef] = &[
    FieldDef { api: "roleId", column: "role_id", kind: Text },
    FieldDef { api: "email", column: "email", kind: Text },
    // Written by `prepare`, never taken from the payload directly.
    FieldDef { api: "passwordHash", column: "password_hash", kind: Text },
    FieldDef { api: "firstName", column: "first_name", kind: Text },
    FieldDef { api: "lastName", column: "last_name", kind: Text },
    FieldDef { api: "phoneNumber", column: "phone_number", kind: Text },
    FieldDef { api: "department", column: "department", kind: Text },
    FieldDef { api: "position", column: "position", kind: Text },
    FieldDef { api: "isActive", column: "is_active", kind: Bool },
    FieldDef { api: "lastLoginAt", column: "last_login_at", kind: Text },
];

const RULES: &[FieldRule] = &[
    FieldRule { field: "email", rules: &[Rule::Required, Rule::Email, Rule::MaxLen(100)] },
    FieldRule { field: "password", rules: &[Rule::Required, Rule::MinLen(8)] },
    FieldRule { field: "firstName", rules: &[Rule::Required, Rule::MaxLen(50)] },
    FieldRule { field: "lastName", rules: &[Rule::Required, Rule::MaxLen(50)] },
    FieldRule { field: "phoneNumber", rules: &[Rule::Phone] },
    FieldRule { field: "department", rules: &[Rule::MaxLen(100)] },
    FieldRule { field: "position", rules: &[Rule::MaxLen(100)] },
];

pub static SCHEMA: EntitySchema = EntitySchema {
    table: "users",
    singular: "User",
    plural: "Users",
    fields: FIELDS,
    rules: RULES,
    unique: &[UniqueField { column: "email", label: "email" }],
    redacted: &["password_hash"],
    search_columns: &["first_name", "last_name", "email", "department", "position"],
    order: OrderBy { column: "created_at", direction: Direction::Desc },
    tenant_scoped: true,
};

impl ApiEntity for Users {
    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    /// Swaps the plaintext `password` field for a hash. The payload key
    /// `passwordHash` itself is dropped first so clients cannot supply one.
    fn prepare(fields: &mut Row, mode: WriteMode) -> ApiResult<()> {
        fields.remove("passwordHash");
        if let Some(Value::String(password)) = fields.remove("password") {
            let hash = crate::auth::hash_password(&password)?;
            fields.insert("passwordHash".to_string(), Value::String(hash));
        }
        if mode == WriteMode::Create {
            default_field(fields, "isActive", Value::from(true));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prepare_hashes_password_and_drops_client_hash() {
        let mut fields = Row::new();
        fields.insert("password".into(), json!("correct horse battery"));
        fields.insert("passwordHash".into(), json!("forged"));
        Users::prepare(&mut fields, WriteMode::Create).unwrap();
        assert!(!fields.contains_key("password"));
        let hash = fields["passwordHash"].as_str().unwrap();
        assert_ne!(hash, "forged");
        assert!(crate::auth::verify_password("correct horse battery", hash));
        assert_eq!(fields["isActive"], json!(true));
    }
}
