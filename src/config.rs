use std::time::Duration;

/// Process configuration, read once at launch from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Upper bound on any single store lock acquisition. Past it the
    /// operation fails with `StoreUnavailable` and the client may retry.
    pub store_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let store_timeout_ms = std::env::var("STORE_TIMEOUT_MS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(2000);

        AppConfig {
            store_timeout: Duration::from_millis(store_timeout_ms),
        }
    }
}
