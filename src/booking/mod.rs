pub mod dto;
pub mod handlers;
pub mod repo;
pub mod slots;
pub mod wizard;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::public_routes()
}
