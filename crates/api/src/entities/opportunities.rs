use serde_json::Value;
use store::{Direction, OrderBy, Row};

use super::{default_field, ApiEntity};
use crate::error::ApiResult;
use crate::repo::FieldKind::{Float, Int, Text};
use crate::repo::{EntitySchema, FieldDef};
use crate::validate::{FieldRule, Rule, WriteMode};

pub struct Opportunities;

const FIELDS: &[FieldDef] = &[
    FieldDef { api: "customerId", column: "customer_id", kind: Text },
    FieldDef { api: "title", column: "title", kind: Text },
    FieldDef { api: "description", column: "description", kind: Text },
    FieldDef { api: "stage", column: "stage", kind: Text },
    FieldDef { api: "status", column: "status", kind: Text },
    FieldDef { api: "value", column: "value", kind: Float },
    FieldDef { api: "probability", column: "probability", kind: Int },
    FieldDef { api: "expectedCloseDate", column: "expected_close_date", kind: Text },
    FieldDef { api: "assignedTo", column: "assigned_to", kind: Text },
    FieldDef { api: "notes", column: "notes", kind: Text },
    FieldDef { api: "createdBy", column: "created_by", kind: Text },
];

const RULES: &[FieldRule] = &[
    FieldRule { field: "title", rules: &[Rule::Required, Rule::MaxLen(200)] },
    FieldRule { field: "description", rules: &[Rule::MaxLen(1000)] },
    FieldRule {
        field: "stage",
        rules: &[Rule::OneOf(&[
            "prospecting",
            "qualification",
            "proposal",
            "negotiation",
            "closed_won",
            "closed_lost",
        ])],
    },
    FieldRule { field: "status", rules: &[Rule::OneOf(&["open", "won", "lost"])] },
    FieldRule { field: "value", rules: &[Rule::NonNegative] },
    FieldRule { field: "probability", rules: &[Rule::IntRange(0, 100)] },
    FieldRule { field: "expectedCloseDate", rules: &[Rule::Date] },
];

pub static SCHEMA: EntitySchema = EntitySchema {
    table: "opportunities",
    singular: "Opportunity",
    plural: "Opportunities",
    fields: FIELDS,
    rules: RULES,
    unique: &[],
    redacted: &[],
    search_columns: &["title", "description", "notes"],
    order: OrderBy { column: "created_at", direction: Direction::Desc },
    tenant_scoped: true,
};

impl ApiEntity for Opportunities {
    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn prepare(fields: &mut Row, mode: WriteMode) -> ApiResult<()> {
        if mode == WriteMode::Create {
            default_field(fields, "stage", Value::from("prospecting"));
            default_field(fields, "status", Value::from("open"));
        }
        Ok(())
    }
}
