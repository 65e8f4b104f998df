use std::time::Duration;

use crate::domain::Error;

pub const LOCK_TIMEOUT_ENV: &str = "LEDGER_LOCK_TIMEOUT_MS";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Upper bound on waiting for an account lock. `None` waits forever.
    pub lock_timeout: Option<Duration>,
}

impl LedgerConfig {
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(LOCK_TIMEOUT_ENV) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be milliseconds, got {:?}", LOCK_TIMEOUT_ENV, raw))
            })?;
            if millis == 0 {
                return Err(Error::Config(format!("{} must be positive", LOCK_TIMEOUT_ENV)));
            }
            config.lock_timeout = Some(Duration::from_millis(millis));
        }

        Ok(config)
    }
}
