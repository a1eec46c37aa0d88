use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::store::{keys, save, KvStore};

/// The stored session blob. Timestamps are epoch millis, as the dashboard
/// has always written them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub login_time: i64,
    pub last_activity: i64,
    pub display_name: String,
    pub role: String,
}

pub struct SessionGuard<'a> {
    store: &'a dyn KvStore,
    clock: &'a dyn Clock,
    config: &'a SessionConfig,
}

impl<'a> SessionGuard<'a> {
    pub fn new(store: &'a dyn KvStore, clock: &'a dyn Clock, config: &'a SessionConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// True iff a live session exists. Refreshes the activity timestamp on
    /// success and removes the blob on any failure, so a false return means
    /// the caller has to log in again. Never errors: a corrupt or unreadable
    /// blob counts as no session.
    pub async fn validate_session(&self) -> bool {
        let mut session = match self.read().await {
            Some(session) => session,
            None => return false,
        };
        let now = self.clock.now_millis();
        if self.expired(&session, now) {
            let _ = self.store.remove(keys::SESSION).await;
            return false;
        }
        session.last_activity = now;
        if let Err(e) = save(self.store, keys::SESSION, &session).await {
            warn!(error = %e, "failed to refresh session activity");
        }
        true
    }

    /// Current session without refreshing activity.
    pub async fn session(&self) -> Option<Session> {
        self.read().await
    }

    /// Removes the session blob if it has expired, without refreshing
    /// activity. Used by the periodic sweep so polling does not count as
    /// user activity. Returns true when a stale session was cleared.
    pub async fn sweep(&self) -> bool {
        let session = match self.read().await {
            Some(session) => session,
            None => return false,
        };
        if self.expired(&session, self.clock.now_millis()) {
            let _ = self.store.remove(keys::SESSION).await;
            return true;
        }
        false
    }

    pub async fn log_in(&self, display_name: &str, role: &str) -> anyhow::Result<Session> {
        let now = self.clock.now_millis();
        let session = Session {
            login_time: now,
            last_activity: now,
            display_name: display_name.to_string(),
            role: role.to_string(),
        };
        save(self.store, keys::SESSION, &session).await?;
        Ok(session)
    }

    pub async fn log_out(&self) -> anyhow::Result<()> {
        self.store.remove(keys::SESSION).await
    }

    /// Absolute lifetime is checked before the inactivity window; an old
    /// session stays dead no matter how recently it was touched.
    fn expired(&self, session: &Session, now: i64) -> bool {
        if now - session.login_time > self.config.max_age_hours * 3_600_000 {
            return true;
        }
        now - session.last_activity > self.config.idle_minutes * 60_000
    }

    async fn read(&self) -> Option<Session> {
        let raw = match self.store.get(keys::SESSION).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "session read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "corrupt session blob, discarding");
                let _ = self.store.remove(keys::SESSION).await;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use time::macros::datetime;
    use time::Duration;

    fn config() -> SessionConfig {
        SessionConfig {
            max_age_hours: 24,
            idle_minutes: 30,
        }
    }

    fn clock() -> ManualClock {
        ManualClock::new(datetime!(2025-06-01 12:00 UTC))
    }

    #[tokio::test]
    async fn no_session_is_invalid() {
        let store = MemoryStore::new();
        let clock = clock();
        let config = config();
        let guard = SessionGuard::new(&store, &clock, &config);
        assert!(!guard.validate_session().await);
    }

    #[tokio::test]
    async fn fresh_session_validates_and_refreshes_activity() {
        let store = MemoryStore::new();
        let clock = clock();
        let config = config();
        let guard = SessionGuard::new(&store, &clock, &config);

        guard.log_in("admin", "admin").await.unwrap();
        clock.advance(Duration::minutes(10));
        assert!(guard.validate_session().await);

        let session = guard.session().await.unwrap();
        assert_eq!(session.last_activity, clock.now_millis());
        assert!(session.login_time < session.last_activity);
    }

    #[tokio::test]
    async fn idle_timeout_expires_session() {
        let store = MemoryStore::new();
        let clock = clock();
        let config = config();
        let guard = SessionGuard::new(&store, &clock, &config);

        guard.log_in("admin", "admin").await.unwrap();
        clock.advance(Duration::minutes(31));
        assert!(!guard.validate_session().await);
        // blob removed, a second check stays false
        assert!(guard.session().await.is_none());
    }

    #[tokio::test]
    async fn absolute_timeout_wins_over_activity() {
        let store = MemoryStore::new();
        let clock = clock();
        let config = config();
        let guard = SessionGuard::new(&store, &clock, &config);

        guard.log_in("admin", "admin").await.unwrap();
        // keep the session active in 20 minute steps for just over 24 hours
        for _ in 0..72 {
            clock.advance(Duration::minutes(20));
            guard.validate_session().await;
        }
        clock.advance(Duration::minutes(20));
        assert!(!guard.validate_session().await);
    }

    #[tokio::test]
    async fn corrupt_blob_counts_as_absent() {
        let store = MemoryStore::new();
        let clock = clock();
        let config = config();
        store
            .put(keys::SESSION, "{definitely not json".into())
            .await
            .unwrap();

        let guard = SessionGuard::new(&store, &clock, &config);
        assert!(!guard.validate_session().await);
        assert!(store.get(keys::SESSION).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sweep_clears_stale_session_without_refreshing() {
        let store = MemoryStore::new();
        let clock = clock();
        let config = config();
        let guard = SessionGuard::new(&store, &clock, &config);

        guard.log_in("admin", "admin").await.unwrap();
        assert!(!guard.sweep().await);

        clock.advance(Duration::minutes(31));
        assert!(guard.sweep().await);
        assert!(guard.session().await.is_none());
    }

    #[tokio::test]
    async fn logout_destroys_session() {
        let store = MemoryStore::new();
        let clock = clock();
        let config = config();
        let guard = SessionGuard::new(&store, &clock, &config);

        guard.log_in("admin", "admin").await.unwrap();
        guard.log_out().await.unwrap();
        assert!(!guard.validate_session().await);
    }
}
