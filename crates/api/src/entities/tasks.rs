use serde_json::Value;
use store::{Direction, OrderBy, Row};

use super::{default_field, ApiEntity};
use crate::error::ApiResult;
use crate::repo::FieldKind::Text;
use crate::repo::{EntitySchema, FieldDef};
use crate::validate::{FieldRule, Rule, WriteMode};

pub struct Tasks;

const FIELDS: &[FieldDef] = &[
    FieldDef { api: "customerId", column: "customer_id", kind: Text },
    FieldDef { api: "title", column: "title", kind: Text },
    FieldDef { api: "description", column: "description", kind: Text },
    FieldDef { api: "status", column: "status", kind: Text },
    FieldDef { api: "priority", column: "priority", kind: Text },
    FieldDef { api: "dueDate", column: "due_date", kind: Text },
    FieldDef { api: "completedAt", column: "completed_at", kind: Text },
    FieldDef { api: "assignedTo", column: "assigned_to", kind: Text },
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
    FieldRule { field: "dueDate", rules: &[Rule::DateTime] },
];

pub static SCHEMA: EntitySchema = EntitySchema {
    table: "tasks",
    singular: "Task",
    plural: "Tasks",
    fields: FIELDS,
    rules: RULES,
    unique: &[],
    redacted: &[],
    search_columns: &["title", "description"],
    order: OrderBy { column: "created_at", direction: Direction::Desc },
    tenant_scoped: true,
};

impl ApiEntity for Tasks {
    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn prepare(fields: &mut Row, mode: WriteMode) -> ApiResult<()> {
        if mode == WriteMode::Create {
            default_field(fields, "status", Value::from("pending"));
            default_field(fields, "priority", Value::from("medium"));
        }
        // Completion stamps completed_at; moving back out of completed
        // clears it.
        let status = fields.get("status").and_then(Value::as_str).map(str::to_owned);
        match status.as_deref() {
            Some("completed") => {
                if fields.get("completedAt").is_none_or(Value::is_null) {
                    fields.insert("completedAt".to_string(), Value::from(crate::repo::now_rfc3339()));
                }
            }
            Some(_) if mode == WriteMode::Update => {
                fields.insert("completedAt".to_string(), Value::Null);
            }
            _ => {}
        }
        Ok(())
    }
}
