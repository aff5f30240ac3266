//! Central configuration for the boathub-client crate

use std::sync::LazyLock;
use std::time::Duration;

/// Base URL of the BoatHub API server.
///
/// Default: "http://localhost:8080"
pub static BOATHUB_API_BASE_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("BOATHUB_API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
});

/// Per-request timeout in milliseconds.
///
/// Default: 10000 (10 seconds)
pub static BOATHUB_REQUEST_TIMEOUT_MS: LazyLock<u64> = LazyLock::new(|| {
    std::env::var("BOATHUB_REQUEST_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10_000)
});

/// Path the client is sent to when the server reports the session as gone.
///
/// Default: "/"
pub static BOATHUB_ENTRY_PATH: LazyLock<String> = LazyLock::new(|| {
    std::env::var("BOATHUB_ENTRY_PATH").unwrap_or_else(|_| "/".to_string())
});

/// Settings used to build a [`crate::BoatHubClient`].
///
/// `ClientConfig::from_env()` reads the `BOATHUB_*` variables above; tests and
/// embedders can construct the struct directly to point at another server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub entry_path: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::from_env()
        }
    }

    pub fn from_env() -> Self {
        Self {
            base_url: BOATHUB_API_BASE_URL.clone(),
            timeout: Duration::from_millis(*BOATHUB_REQUEST_TIMEOUT_MS),
            entry_path: BOATHUB_ENTRY_PATH.clone(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_entry_path(mut self, entry_path: impl Into<String>) -> Self {
        self.entry_path = entry_path.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
