use std::sync::Arc;

use store::RowStore;

use crate::auth::AuthConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RowStore>,
    pub auth: Arc<AuthConfig>,
}
