use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::{
    dto::{LoginRequest, LoginResponse, SessionInfo},
    extractors::AdminSession,
    lockout::LockoutGuard,
    session::SessionGuard,
};
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(get_session))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    let lockout = LockoutGuard::new(
        state.store.as_ref(),
        state.clock.as_ref(),
        &state.config.lockout,
    );

    if lockout.is_locked().await {
        let seconds = lockout.remaining_seconds().await;
        return Err((
            StatusCode::LOCKED,
            format!("Too many failed attempts. Try again in {seconds} seconds"),
        ));
    }

    // The original UI simulated network latency here; kept configurable so
    // tests can zero it out.
    if state.config.login_delay_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(state.config.login_delay_ms)).await;
    }

    let admin = &state.config.admin;
    if payload.username != admin.username || payload.password != admin.password {
        let attempts = lockout.record_failure().await.map_err(internal)?;
        warn!(attempts, "failed login attempt");
        if lockout.is_locked().await {
            let seconds = lockout.remaining_seconds().await;
            return Err((
                StatusCode::LOCKED,
                format!("Too many failed attempts. Try again in {seconds} seconds"),
            ));
        }
        return Err((
            StatusCode::UNAUTHORIZED,
            "Invalid username or password".to_string(),
        ));
    }

    lockout.reset().await.map_err(internal)?;
    let guard = SessionGuard::new(
        state.store.as_ref(),
        state.clock.as_ref(),
        &state.config.session,
    );
    let session = guard.log_in(&payload.username, "admin").await.map_err(internal)?;
    info!(user = %session.display_name, "admin logged in");

    Ok(Json(LoginResponse {
        display_name: session.display_name,
        role: session.role,
        login_time: session.login_time,
    }))
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Result<StatusCode, (StatusCode, String)> {
    let guard = SessionGuard::new(
        state.store.as_ref(),
        state.clock.as_ref(),
        &state.config.session,
    );
    guard.log_out().await.map_err(internal)?;
    info!("admin logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(_state))]
pub async fn get_session(
    State(_state): State<AppState>,
    AdminSession(session): AdminSession,
) -> Json<SessionInfo> {
    Json(SessionInfo {
        display_name: session.display_name,
        role: session.role,
        login_time: session.login_time,
        last_activity: session.last_activity,
    })
}

pub(crate) fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use time::macros::datetime;
    use time::Duration;

    fn fake_with_clock() -> (AppState, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(datetime!(2025-06-01 12:00 UTC)));
        let config = AppState::fake().config;
        let state = AppState::from_parts(Arc::new(MemoryStore::new()), clock.clone(), config);
        (state, clock)
    }

    async fn attempt(state: &AppState, username: &str, password: &str) -> Result<Json<LoginResponse>, (StatusCode, String)> {
        login(
            State(state.clone()),
            Json(LoginRequest {
                username: username.into(),
                password: password.into(),
            }),
        )
        .await
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let state = AppState::fake();
        let err = attempt(&state, "admin", "nope").await.unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn fifth_failure_locks_and_sixth_attempt_runs_after_expiry() {
        let (state, clock) = fake_with_clock();

        for _ in 0..4 {
            let err = attempt(&state, "admin", "nope").await.unwrap_err();
            assert_eq!(err.0, StatusCode::UNAUTHORIZED);
        }
        let err = attempt(&state, "admin", "nope").await.unwrap_err();
        assert_eq!(err.0, StatusCode::LOCKED);

        // still locked with the right password
        let err = attempt(&state, "admin", "123456").await.unwrap_err();
        assert_eq!(err.0, StatusCode::LOCKED);

        clock.advance(Duration::minutes(15) + Duration::seconds(1));
        let ok = attempt(&state, "admin", "123456").await.unwrap();
        assert_eq!(ok.0.display_name, "admin");
    }

    #[tokio::test]
    async fn successful_login_creates_session_and_resets_counter() {
        let state = AppState::fake();
        attempt(&state, "admin", "nope").await.unwrap_err();
        attempt(&state, "admin", "123456").await.unwrap();

        let guard = SessionGuard::new(
            state.store.as_ref(),
            state.clock.as_ref(),
            &state.config.session,
        );
        assert!(guard.validate_session().await);

        // counter was reset, four fresh failures do not lock
        attempt(&state, "admin", "123456").await.unwrap();
        for _ in 0..4 {
            let err = attempt(&state, "admin", "nope").await.unwrap_err();
            assert_eq!(err.0, StatusCode::UNAUTHORIZED);
        }
    }
}
