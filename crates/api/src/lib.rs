//! REST API for the multi-tenant CRM: auth, tenant-scoped repositories,
//! and generic CRUD handlers instantiated per entity schema.

pub mod auth;
pub mod entities;
pub mod error;
pub mod repo;
pub mod routes;
pub mod state;
pub mod validate;

pub use routes::build_router;
pub use state::AppState;
