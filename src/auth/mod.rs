mod dto;
pub mod extractors;
pub mod handlers;
pub mod lockout;
pub mod session;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
