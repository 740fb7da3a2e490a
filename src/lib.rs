// Core modules
mod config;
mod pagination;
mod types;
mod utils;

pub mod api;
pub mod auth;
pub mod context;
pub mod db;

// Re-export key types and functions
pub use api::{AppState, create_router};
pub use config::{AuthConfig, DEFAULT_TTL_MINUTES, DEV_SECRET};
pub use db::{DatabaseConfig, create_connection, ensure_schema};
pub use pagination::{Paging, PaginationInfo};
pub use types::{Email, RequestId, SubjectId};
pub use utils::normalize_roles;

use anyhow::Result;
use axum::Router;

/// Convenience function to create a fully wired application.
///
/// Connects to the database, applies the schema, builds the shared state
/// (token codec, revocation registry, principal resolver, identity store)
/// and returns the router plus the state for callers that need direct
/// access to the auth core.
pub async fn create_app(
    db_config: DatabaseConfig,
    auth_config: AuthConfig,
) -> Result<(Router, AppState)> {
    let db = db::create_connection(db_config).await?;
    db::ensure_schema(&db).await?;

    let state = AppState::new(db, &auth_config);
    let router = api::create_router(state.clone());

    Ok((router, state))
}
