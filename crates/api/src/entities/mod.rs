//! One module per exposed entity. Each carries a static [`EntitySchema`]
//! (field map, rule table, presentation hints) and implements [`ApiEntity`]
//! so the generic CRUD handlers can be instantiated over it.

pub mod cases;
pub mod companies;
pub mod customers;
pub mod events;
pub mod opportunities;
pub mod roles;
pub mod tasks;
pub mod users;
pub mod work_orders;

use serde_json::Value;
use store::Row;

use crate::error::ApiResult;
use crate::repo::EntitySchema;
use crate::validate::WriteMode;

pub trait ApiEntity: Send + Sync + 'static {
    fn schema() -> &'static EntitySchema;

    /// Hook run after validation and before storage: defaults on create,
    /// derived fields on either mode.
    fn prepare(_fields: &mut Row, _mode: WriteMode) -> ApiResult<()> {
        Ok(())
    }
}

/// Insert `value` unless the caller already supplied a non-null one.
pub(crate) fn default_field(row: &mut Row, api: &str, value: Value) {
    if row.get(api).is_none_or(Value::is_null) {
        row.insert(api.to_string(), value);
    }
}
