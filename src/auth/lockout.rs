use tracing::warn;

use crate::clock::Clock;
use crate::config::LockoutConfig;
use crate::store::{keys, load, save, KvStore};

/// Failed-attempt throttling. The counter and the lock-until timestamp live
/// under their own keys; both clear on a successful login or once the lock
/// window has passed.
pub struct LockoutGuard<'a> {
    store: &'a dyn KvStore,
    clock: &'a dyn Clock,
    config: &'a LockoutConfig,
}

impl<'a> LockoutGuard<'a> {
    pub fn new(store: &'a dyn KvStore, clock: &'a dyn Clock, config: &'a LockoutConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// True while the lock window is open. Self-clears once it has passed.
    pub async fn is_locked(&self) -> bool {
        let lock_until: Option<i64> = load(self.store, keys::LOCK_UNTIL).await;
        let lock_until = match lock_until {
            Some(until) => until,
            None => return false,
        };
        if self.clock.now_millis() < lock_until {
            return true;
        }
        if let Err(e) = self.clear().await {
            warn!(error = %e, "failed to clear expired lockout");
        }
        false
    }

    /// Seconds left in the lock window, 0 when not locked.
    pub async fn remaining_seconds(&self) -> i64 {
        let lock_until: Option<i64> = load(self.store, keys::LOCK_UNTIL).await;
        match lock_until {
            Some(until) => ((until - self.clock.now_millis()).max(0) + 999) / 1000,
            None => 0,
        }
    }

    /// Bumps the failure counter and opens the lock window once the
    /// threshold is reached. Returns the cumulative attempt count.
    pub async fn record_failure(&self) -> anyhow::Result<u32> {
        let attempts: u32 = load::<Option<u32>>(self.store, keys::FAILED_ATTEMPTS)
            .await
            .unwrap_or(0)
            + 1;
        save(self.store, keys::FAILED_ATTEMPTS, &attempts).await?;
        if attempts >= self.config.max_attempts {
            let until = self.clock.now_millis() + self.config.lock_minutes * 60_000;
            save(self.store, keys::LOCK_UNTIL, &until).await?;
            warn!(attempts, lock_minutes = self.config.lock_minutes, "account locked");
        }
        Ok(attempts)
    }

    /// Clears both counter and lock window, for successful logins.
    pub async fn reset(&self) -> anyhow::Result<()> {
        self.clear().await
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.store.remove(keys::FAILED_ATTEMPTS).await?;
        self.store.remove(keys::LOCK_UNTIL).await
    }
}
