use serde_json::Value;
use store::{Direction, OrderBy, Row};

use super::ApiEntity;
use crate::repo::FieldKind::{Bool, Text};
use crate::repo::{EntitySchema, FieldDef};
use crate::validate::{FieldRule, Rule};

/// Roles are not exposed over REST; one Super Admin role is created per
/// tenant at signup and user management happens through `/api/users`.
pub struct Roles;

const FIELDS: &[FieldDef] = &[
    FieldDef { api: "roleName", column: "role_name", kind: Text },
    FieldDef { api: "description", column: "description", kind: Text },
    FieldDef { api: "companyAccessRead", column: "company_access_read", kind: Bool },
    FieldDef { api: "companyAccessEdit", column: "company_access_edit", kind: Bool },
    FieldDef { api: "companyAccessDelete", column: "company_access_delete", kind: Bool },
    FieldDef { api: "userAccessRead", column: "user_access_read", kind: Bool },
    FieldDef { api: "userAccessEdit", column: "user_access_edit", kind: Bool },
    FieldDef { api: "userAccessDelete", column: "user_access_delete", kind: Bool },
    FieldDef { api: "customerAccessRead", column: "customer_access_read", kind: Bool },
    FieldDef { api: "customerAccessEdit", column: "customer_access_edit", kind: Bool },
    FieldDef { api: "customerAccessDelete", column: "customer_access_delete", kind: Bool },
    FieldDef { api: "opportunityAccessRead", column: "opportunity_access_read", kind: Bool },
    FieldDef { api: "opportunityAccessEdit", column: "opportunity_access_edit", kind: Bool },
    FieldDef { api: "opportunityAccessDelete", column: "opportunity_access_delete", kind: Bool },
    FieldDef { api: "workOrderAccessRead", column: "work_order_access_read", kind: Bool },
    FieldDef { api: "workOrderAccessEdit", column: "work_order_access_edit", kind: Bool },
    FieldDef { api: "workOrderAccessDelete", column: "work_order_access_delete", kind: Bool },
    FieldDef { api: "taskAccessRead", column: "task_access_read", kind: Bool },
    FieldDef { api: "taskAccessEdit", column: "task_access_edit", kind: Bool },
    FieldDef { api: "taskAccessDelete", column: "task_access_delete", kind: Bool },
    FieldDef { api: "caseAccessRead", column: "case_access_read", kind: Bool },
    FieldDef { api: "caseAccessEdit", column: "case_access_edit", kind: Bool },
    FieldDef { api: "caseAccessDelete", column: "case_access_delete", kind: Bool },
    FieldDef { api: "eventAccessRead", column: "event_access_read", kind: Bool },
    FieldDef { api: "eventAccessEdit", column: "event_access_edit", kind: Bool },
    FieldDef { api: "eventAccessDelete", column: "event_access_delete", kind: Bool },
    FieldDef { api: "roleAccessRead", column: "role_access_read", kind: Bool },
    FieldDef { api: "roleAccessEdit", column: "role_access_edit", kind: Bool },
    FieldDef { api: "roleAccessDelete", column: "role_access_delete", kind: Bool },
    FieldDef { api: "systemAdmin", column: "system_admin", kind: Bool },
    FieldDef { api: "canManageUsers", column: "can_manage_users", kind: Bool },
    FieldDef { api: "canManageRoles", column: "can_manage_roles", kind: Bool },
];

const RULES: &[FieldRule] = &[
    FieldRule { field: "roleName", rules: &[Rule::Required, Rule::MaxLen(50)] },
    FieldRule { field: "description", rules: &[Rule::MaxLen(200)] },
];

pub static SCHEMA: EntitySchema = EntitySchema {
    table: "roles",
    singular: "Role",
    plural: "Roles",
    fields: FIELDS,
    rules: RULES,
    unique: &[],
    redacted: &[],
    search_columns: &["role_name", "description"],
    order: OrderBy { column: "created_at", direction: Direction::Desc },
    tenant_scoped: true,
};

impl ApiEntity for Roles {
    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }
}

/// Payload for the Super Admin role stamped out at signup: every capability
/// flag set.
pub fn super_admin_fields() -> Row {
    let mut fields = Row::new();
    fields.insert("roleName".to_string(), Value::from("Super Admin"));
    fields.insert(
        "description".to_string(),
        Value::from("Full system access with all permissions"),
    );
    for field in FIELDS {
        if matches!(field.kind, Bool) {
            fields.insert(field.api.to_string(), Value::from(true));
        }
    }
    fields
}
