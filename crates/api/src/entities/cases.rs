use serde_json::Value;
use store::{Direction, OrderBy, Row};
use uuid::Uuid;

use super::{default_field, ApiEntity};
use crate::error::ApiResult;
use crate::repo::FieldKind::{Bool, Int, Text};
use crate::repo::{EntitySchema, FieldDef, UniqueField};
use crate::validate::{FieldRule, Rule, WriteMode};

pub struct Cases;

const FIELDS: &[FieldDef] = &[
    FieldDef { api: "caseNumber", column: "case_number", kind: Text },
    FieldDef { api: "customerId", column: "customer_id", kind: Text },
    FieldDef { api: "title", column: "title", kind: Text },
    FieldDef { api: "description", column: "description", kind: Text },
    FieldDef { api: "caseType", column: "case_type", kind: Text },
    FieldDef { api: "priority", column: "priority", kind: Text },
    FieldDef { api: "status", column: "status", kind: Text },
    FieldDef { api: "contactPerson", column: "contact_person", kind: Text },
    FieldDef { api: "contactEmail", column: "contact_email", kind: Text },
    FieldDef { api: "contactPhone", column: "contact_phone", kind: Text },
    FieldDef { api: "assignedTo", column: "assigned_to", kind: Text },
    FieldDef { api: "resolutionNotes", column: "resolution_notes", kind: Text },
    FieldDef { api: "escalationLevel", column: "escalation_level", kind: Int },
    FieldDef { api: "escalatedTo", column: "escalated_to", kind: Text },
    FieldDef { api: "escalationReason", column: "escalation_reason", kind: Text },
    FieldDef { api: "slaDeadline", column: "sla_deadline", kind: Text },
    FieldDef { api: "slaBreached", column: "sla_breached", kind: Bool },
    FieldDef { api: "notes", column: "notes", kind: Text },
    FieldDef { api: "createdBy", column: "created_by", kind: Text },
];

const RULES: &[FieldRule] = &[
    FieldRule { field: "title", rules: &[Rule::Required, Rule::MaxLen(200)] },
    FieldRule { field: "description", rules: &[Rule::MaxLen(2000)] },
    FieldRule { field: "priority", rules: &[Rule::OneOf(&["low", "medium", "high", "critical"])] },
    FieldRule {
        field: "status",
        rules: &[Rule::OneOf(&[
            "open",
            "in_progress",
            "pending_customer",
            "escalated",
            "resolved",
            "closed",
        ])],
    },
    FieldRule { field: "contactEmail", rules: &[Rule::Email] },
    FieldRule { field: "contactPhone", rules: &[Rule::Phone] },
    FieldRule { field: "escalationLevel", rules: &[Rule::IntRange(0, 5)] },
    FieldRule { field: "slaDeadline", rules: &[Rule::DateTime] },
    FieldRule { field: "resolutionNotes", rules: &[Rule::MaxLen(2000)] },
];

pub static SCHEMA: EntitySchema = EntitySchema {
    table: "cases",
    singular: "Case",
    plural: "Cases",
    fields: FIELDS,
    rules: RULES,
    unique: &[UniqueField { column: "case_number", label: "case number" }],
    redacted: &[],
    search_columns: &["case_number", "title", "description", "contact_person"],
    order: OrderBy { column: "created_at", direction: Direction::Desc },
    tenant_scoped: true,
};

fn new_case_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("CS-{}", suffix[..8].to_uppercase())
}

impl ApiEntity for Cases {
    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn prepare(fields: &mut Row, mode: WriteMode) -> ApiResult<()> {
        if mode == WriteMode::Create {
            default_field(fields, "caseNumber", Value::from(new_case_number()));
            default_field(fields, "status", Value::from("open"));
            default_field(fields, "priority", Value::from("medium"));
            default_field(fields, "escalationLevel", Value::from(0));
            default_field(fields, "slaBreached", Value::from(false));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_case_numbers_have_the_expected_shape() {
        let n = new_case_number();
        assert!(n.starts_with("CS-"));
        assert_eq!(n.len(), 11);
        assert!(n[3..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
