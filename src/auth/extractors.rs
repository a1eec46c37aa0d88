use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use tracing::warn;

use crate::auth::session::{Session, SessionGuard};
use crate::state::AppState;

/// Guard for admin routes. Validates (and thereby refreshes) the stored
/// session; rejection is a plain 401 and the caller is expected to redirect
/// to the login view.
pub struct AdminSession(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let guard = SessionGuard::new(
            state.store.as_ref(),
            state.clock.as_ref(),
            &state.config.session,
        );

        if !guard.validate_session().await {
            warn!("admin request without a live session");
            return Err((
                StatusCode::UNAUTHORIZED,
                "Session expired or invalid".to_string(),
            ));
        }

        let session = guard.session().await.ok_or((
            StatusCode::UNAUTHORIZED,
            "Session expired or invalid".to_string(),
        ))?;
        Ok(AdminSession(session))
    }
}
