use serde_json::Value;
use store::{Direction, OrderBy, Row};

use super::{default_field, ApiEntity};
use crate::error::ApiResult;
use crate::repo::FieldKind::{Bool, Int, Text};
use crate::repo::{EntitySchema, FieldDef};
use crate::validate::{FieldRule, Rule, WriteMode};

pub struct Events;

const FIELDS: &[FieldDef] = &[
    FieldDef { api: "customerId", column: "customer_id", kind: Text },
    FieldDef { api: "opportunityId", column: "opportunity_id", kind: Text },
    FieldDef { api: "caseId", column: "case_id", kind: Text },
    FieldDef { api: "title", column: "title", kind: Text },
    FieldDef { api: "description", column: "description", kind: Text },
    FieldDef { api: "startDate", column: "start_date", kind: Text },
    FieldDef { api: "endDate", column: "end_date", kind: Text },
    FieldDef { api: "allDay", column: "all_day", kind: Bool },
    FieldDef { api: "location", column: "location", kind: Text },
    FieldDef { api: "eventType", column: "event_type", kind: Text },
    FieldDef { api: "status", column: "status", kind: Text },
    FieldDef { api: "priority", column: "priority", kind: Text },
    FieldDef { api: "assignedTo", column: "assigned_to", kind: Text },
    FieldDef { api: "reminderMinutes", column: "reminder_minutes", kind: Int },
    FieldDef { api: "notes", column: "notes", kind: Text },
    FieldDef { api: "createdBy", column: "created_by", kind: Text },
];

const RULES: &[FieldRule] = &[
    FieldRule { field: "title", rules: &[Rule::Required, Rule::MaxLen(200)] },
    FieldRule { field: "description", rules: &[Rule::MaxLen(1000)] },
    FieldRule { field: "startDate", rules: &[Rule::Required, Rule::DateTime] },
    FieldRule { field: "endDate", rules: &[Rule::DateTime] },
    FieldRule {
        field: "eventType",
        rules: &[Rule::OneOf(&["meeting", "call", "site_visit", "follow_up", "other"])],
    },
    FieldRule {
        field: "status",
        rules: &[Rule::OneOf(&["scheduled", "completed", "cancelled", "rescheduled"])],
    },
    FieldRule { field: "priority", rules: &[Rule::OneOf(&["low", "medium", "high"])] },
    FieldRule { field: "reminderMinutes", rules: &[Rule::IntRange(0, 10080)] },
];

pub static SCHEMA: EntitySchema = EntitySchema {
    table: "events",
    singular: "Event",
    plural: "Events",
    fields: FIELDS,
    rules: RULES,
    unique: &[],
    redacted: &[],
    search_columns: &["title", "description", "location"],
    order: OrderBy { column: "start_date", direction: Direction::Asc },
    tenant_scoped: true,
};

impl ApiEntity for Events {
    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn prepare(fields: &mut Row, mode: WriteMode) -> ApiResult<()> {
        if mode == WriteMode::Create {
            default_field(fields, "eventType", Value::from("meeting"));
            default_field(fields, "status", Value::from("scheduled"));
            default_field(fields, "priority", Value::from("medium"));
            default_field(fields, "allDay", Value::from(false));
        }
        Ok(())
    }
}
