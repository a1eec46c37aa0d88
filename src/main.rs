use std::time::Duration;

mod admin;
mod app;
mod auth;
mod booking;
mod catalog;
mod clock;
mod config;
mod state;
mod store;

use crate::auth::session::SessionGuard;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "dermacare=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init()?;

    // Clears an expired admin session even when no request comes in. The
    // sweep never counts as activity.
    let sweeper_state = state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            let guard = SessionGuard::new(
                sweeper_state.store.as_ref(),
                sweeper_state.clock.as_ref(),
                &sweeper_state.config.session,
            );
            if guard.sweep().await {
                tracing::info!("expired admin session cleared");
            }
        }
    });

    let app = app::build_app(state);
    app::serve(app).await
}
