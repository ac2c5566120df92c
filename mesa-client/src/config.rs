//! Client configuration
//!
//! Environment variables read by [`ClientConfig::from_env`]:
//!
//! | Variable           | Default                 | Meaning                          |
//! |--------------------|-------------------------|----------------------------------|
//! | `MESA_BASE_URL`    | `http://localhost:8080` | REST API base URL                |
//! | `MESA_EVENT_ADDR`  | unset                   | TCP address of the event stream  |
//! | `MESA_TIMEOUT`     | `30`                    | Request timeout in seconds       |
//! | `MESA_SESSION_DIR` | system temp dir         | Directory for the session file   |

use std::path::PathBuf;
use std::time::Duration;

/// Default interval for waiter task and customer order polling.
pub const DEFAULT_TASK_POLL: Duration = Duration::from_secs(5);

/// Default interval for kitchen queue polling.
pub const DEFAULT_QUEUE_POLL: Duration = Duration::from_secs(10);

/// Default interval for table list polling.
pub const DEFAULT_TABLE_POLL: Duration = Duration::from_secs(15);

/// Client configuration for connecting to a Mesa server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// TCP address of the push event stream (e.g., "127.0.0.1:9100").
    /// When unset the client runs on polling alone.
    pub event_addr: Option<String>,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Poll interval for pending orders and call requests
    pub task_poll: Duration,

    /// Poll interval for the kitchen queue (confirmed/preparing orders)
    pub queue_poll: Duration,

    /// Poll interval for the table list
    pub table_poll: Duration,

    /// Directory holding the persisted session file
    pub session_dir: PathBuf,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            event_addr: None,
            token: None,
            timeout: 30,
            task_poll: DEFAULT_TASK_POLL,
            queue_poll: DEFAULT_QUEUE_POLL,
            table_poll: DEFAULT_TABLE_POLL,
            session_dir: std::env::temp_dir().join("mesa-client"),
        }
    }

    /// Build a configuration from `MESA_*` environment variables
    pub fn from_env() -> Self {
        let base_url = std::env::var("MESA_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let mut config = Self::new(base_url);
        if let Ok(addr) = std::env::var("MESA_EVENT_ADDR") {
            config.event_addr = Some(addr);
        }
        if let Some(timeout) = std::env::var("MESA_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout = timeout;
        }
        if let Ok(dir) = std::env::var("MESA_SESSION_DIR") {
            config.session_dir = PathBuf::from(dir);
        }
        config
    }

    /// Set the event stream address
    pub fn with_event_addr(mut self, addr: impl Into<String>) -> Self {
        self.event_addr = Some(addr.into());
        self
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the poll interval for pending orders and call requests
    pub fn with_task_poll(mut self, every: Duration) -> Self {
        self.task_poll = every;
        self
    }

    /// Set the poll interval for the kitchen queue
    pub fn with_queue_poll(mut self, every: Duration) -> Self {
        self.queue_poll = every;
        self
    }

    /// Set the poll interval for the table list
    pub fn with_table_poll(mut self, every: Duration) -> Self {
        self.table_poll = every;
        self
    }

    /// Set the session directory
    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = dir.into();
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::HttpClient {
        crate::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = ClientConfig::new("http://mesa.local")
            .with_event_addr("127.0.0.1:9100")
            .with_timeout(5)
            .with_task_poll(Duration::from_secs(7));

        assert_eq!(config.base_url, "http://mesa.local");
        assert_eq!(config.event_addr.as_deref(), Some("127.0.0.1:9100"));
        assert_eq!(config.timeout, 5);
        assert_eq!(config.task_poll, Duration::from_secs(7));
        assert_eq!(config.table_poll, DEFAULT_TABLE_POLL);
    }
}
