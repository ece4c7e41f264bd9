use std::env;
use std::time::Duration;

/// Default request deadline. The backend should answer well within this;
/// anything slower is treated as a transport failure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Client configuration for the HTTP adapter.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base origin of the REST API, including the `/api` prefix.
    pub base_url: String,
    /// Per-request deadline enforced by the adapter.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Build a config for a fixed base URL with the default deadline.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the request deadline (mainly useful in tests).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from the environment.
    ///
    /// Reads `ORGDESK_API_URL` and `ORGDESK_TIMEOUT_MS`, falling back to a
    /// local development backend and the default 10-second deadline.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let timeout_ms: u64 = env::var("ORGDESK_TIMEOUT_MS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT.as_millis().to_string())
            .parse()?;

        Ok(ClientConfig {
            base_url: env::var("ORGDESK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}
