use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::store::{FileStore, KvStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store: Arc<dyn KvStore> = match &config.data_file {
            Some(path) => Arc::new(FileStore::open(path.clone())),
            None => Arc::new(MemoryStore::new()),
        };
        Ok(Self {
            store,
            clock: Arc::new(SystemClock),
            config,
        })
    }

    pub fn from_parts(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// In-memory state with a manual clock, for tests.
    pub fn fake() -> Self {
        use crate::clock::ManualClock;
        use crate::config::{AdminCredentials, LockoutConfig, SessionConfig};
        use time::macros::datetime;

        let config = Arc::new(AppConfig {
            admin: AdminCredentials {
                username: "admin".into(),
                password: "123456".into(),
            },
            session: SessionConfig {
                max_age_hours: 24,
                idle_minutes: 30,
            },
            lockout: LockoutConfig {
                max_attempts: 5,
                lock_minutes: 15,
            },
            login_delay_ms: 0,
            data_file: None,
        });

        Self {
            store: Arc::new(MemoryStore::new()),
            clock: Arc::new(ManualClock::new(datetime!(2025-06-01 12:00 UTC))),
            config,
        }
    }
}
