use serde_json::Value;
use store::{Direction, OrderBy, Row};

use super::{default_field, ApiEntity};
use crate::error::ApiResult;
use crate::repo::FieldKind::Text;
use crate::repo::{EntitySchema, FieldDef, UniqueField};
use crate::validate::{FieldRule, Rule, WriteMode};

pub struct Customers;

const FIELDS: &[FieldDef] = &[
    FieldDef { api: "firstName", column: "first_name", kind: Text },
    FieldDef { api: "lastName", column: "last_name", kind: Text },
    FieldDef { api: "dateOfBirth", column: "date_of_birth", kind: Text },
    FieldDef { api: "mobileNumber", column: "mobile_number", kind: Text },
    FieldDef { api: "email", column: "email", kind: Text },
    FieldDef { api: "address", column: "address", kind: Text },
    FieldDef { api: "city", column: "city", kind: Text },
    FieldDef { api: "state", column: "state", kind: Text },
    FieldDef { api: "zipCode", column: "zip_code", kind: Text },
    FieldDef { api: "country", column: "country", kind: Text },
    FieldDef { api: "company", column: "company", kind: Text },
    FieldDef { api: "jobTitle", column: "job_title", kind: Text },
    FieldDef { api: "industry", column: "industry", kind: Text },
    FieldDef { api: "leadSource", column: "lead_source", kind: Text },
    FieldDef { api: "status", column: "status", kind: Text },
    FieldDef { api: "notes", column: "notes", kind: Text },
    FieldDef { api: "createdBy", column: "created_by", kind: Text },
];

const RULES: &[FieldRule] = &[
    FieldRule { field: "firstName", rules: &[Rule::Required, Rule::MaxLen(50)] },
    FieldRule { field: "lastName", rules: &[Rule::Required, Rule::MaxLen(50)] },
    FieldRule { field: "mobileNumber", rules: &[Rule::Required, Rule::Phone] },
    FieldRule { field: "email", rules: &[Rule::Email, Rule::MaxLen(100)] },
    FieldRule { field: "dateOfBirth", rules: &[Rule::Date] },
    FieldRule {
        field: "status",
        rules: &[Rule::OneOf(&["active", "inactive", "lead", "prospect"])],
    },
    FieldRule { field: "notes", rules: &[Rule::MaxLen(1000)] },
];

pub static SCHEMA: EntitySchema = EntitySchema {
    table: "customers",
    singular: "Customer",
    plural: "Customers",
    fields: FIELDS,
    rules: RULES,
    unique: &[
        UniqueField { column: "mobile_number", label: "mobile number" },
        UniqueField { column: "email", label: "email" },
    ],
    redacted: &[],
    search_columns: &["first_name", "last_name", "email", "mobile_number", "notes"],
    order: OrderBy { column: "created_at", direction: Direction::Desc },
    tenant_scoped: true,
};

impl ApiEntity for Customers {
    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn prepare(fields: &mut Row, mode: WriteMode) -> ApiResult<()> {
        if mode == WriteMode::Create {
            default_field(fields, "status", Value::from("active"));
        }
        Ok(())
    }
}
