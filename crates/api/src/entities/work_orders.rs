use serde_json::Value;
use store::{Direction, OrderBy, Row};

use super::{default_field, ApiEntity};
use crate::error::ApiResult;
use crate::repo::FieldKind::{Float, Text};
use crate::repo::{EntitySchema, FieldDef};
use crate::validate::{FieldRule, Rule, WriteMode};

pub struct WorkOrders;

const FIELDS: &[FieldDef] = &[
    FieldDef { api: "customerId", column: "customer_id", kind: Text },
    FieldDef { api: "opportunityId", column: "opportunity_id", kind: Text },
    FieldDef { api: "title", column: "title", kind: Text },
    FieldDef { api: "description", column: "description", kind: Text },
    FieldDef { api: "status", column: "status", kind: Text },
    FieldDef { api: "priority", column: "priority", kind: Text },
    FieldDef { api: "scheduledDate", column: "scheduled_date", kind: Text },
    FieldDef { api: "completedDate", column: "completed_date", kind: Text },
    FieldDef { api: "estimatedHours", column: "estimated_hours", kind: Float },
    FieldDef { api: "actualHours", column: "actual_hours", kind: Float },
    FieldDef { api: "notes", column: "notes", kind: Text },
    FieldDef { api: "createdBy", column: "created_by", kind: Text },
];

const RULES: &[FieldRule] = &[
    FieldRule { field: "title", rules: &[Rule::Required, Rule::MaxLen(200)] },
    FieldRule { field: "description", rules: &[Rule::MaxLen(1000)] },
    FieldRule {
        field: "status",
        rules: &[Rule::OneOf(&["pending", "in_progress", "completed", "cancelled"])],
    },
    FieldRule { field: "priority", rules: &[Rule::OneOf(&["low", "medium", "high"])] },
    FieldRule { field: "scheduledDate", rules: &[Rule::Date] },
    FieldRule { field: "completedDate", rules: &[Rule::Date] },
    FieldRule { field: "estimatedHours", rules: &[Rule::NonNegative] },
    FieldRule { field: "actualHours", rules: &[Rule::NonNegative] },
];

pub static SCHEMA: EntitySchema = EntitySchema {
    table: "work_orders",
    singular: "Work order",
    plural: "Work orders",
    fields: FIELDS,
    rules: RULES,
    unique: &[],
    redacted: &[],
    search_columns: &["title", "description", "notes"],
    order: OrderBy { column: "created_at", direction: Direction::Desc },
    tenant_scoped: true,
};

impl ApiEntity for WorkOrders {
    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn prepare(fields: &mut Row, mode: WriteMode) -> ApiResult<()> {
        if mode == WriteMode::Create {
            default_field(fields, "status", Value::from("pending"));
            default_field(fields, "priority", Value::from("medium"));
        }
        Ok(())
    }
}
