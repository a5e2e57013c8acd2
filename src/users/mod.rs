pub mod dto;
pub mod filter;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::routes())
}
