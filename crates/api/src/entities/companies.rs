use store::{Direction, OrderBy};

use super::ApiEntity;
use crate::repo::FieldKind::Text;
use crate::repo::{EntitySchema, FieldDef, UniqueField};
use crate::validate::{FieldRule, Rule};

/// The tenant record itself. Not tenant-scoped: a company is addressed by
/// its own id, which protected routes take from the caller's token.
pub struct Companies;

const FIELDS: &[FieldDef] = &[
    FieldDef { api: "companyName", column: "company_name", kind: Text },
    FieldDef { api: "firstName", column: "first_name", kind: Text },
    FieldDef { api: "lastName", column: "last_name", kind: Text },
    FieldDef { api: "email", column: "email", kind: Text },
    FieldDef { api: "phoneNumber", column: "phone_number", kind: Text },
    FieldDef { api: "address", column: "address", kind: Text },
    FieldDef { api: "city", column: "city", kind: Text },
    FieldDef { api: "zipCode", column: "zip_code", kind: Text },
    FieldDef { api: "country", column: "country", kind: Text },
    FieldDef { api: "website", column: "website", kind: Text },
    FieldDef { api: "industry", column: "industry", kind: Text },
    FieldDef { api: "companySize", column: "company_size", kind: Text },
];

const RULES: &[FieldRule] = &[
    FieldRule { field: "companyName", rules: &[Rule::Required, Rule::MaxLen(100)] },
    FieldRule { field: "firstName", rules: &[Rule::Required, Rule::MaxLen(50)] },
    FieldRule { field: "lastName", rules: &[Rule::Required, Rule::MaxLen(50)] },
    FieldRule { field: "email", rules: &[Rule::Required, Rule::Email, Rule::MaxLen(100)] },
    FieldRule { field: "phoneNumber", rules: &[Rule::Required, Rule::Phone] },
    FieldRule { field: "website", rules: &[Rule::MaxLen(200)] },
];

pub static SCHEMA: EntitySchema = EntitySchema {
    table: "companies",
    singular: "Company",
    plural: "Companies",
    fields: FIELDS,
    rules: RULES,
    unique: &[UniqueField { column: "email", label: "email" }],
    redacted: &[],
    search_columns: &["company_name", "email"],
    order: OrderBy { column: "created_at", direction: Direction::Desc },
    tenant_scoped: false,
};

impl ApiEntity for Companies {
    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }
}
