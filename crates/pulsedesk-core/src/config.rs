//! Client configuration

/// Configuration for the Pulsedesk client
///
/// Covers both surfaces of the dashboard backend: the `/events` push channel
/// and the on-demand summary pull endpoint.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the dashboard server
    pub base_url: String,
    /// Path of the server-push event stream
    pub events_path: String,
    /// Path of the on-demand summary endpoint
    pub summary_path: String,
    /// Request timeout in seconds for pull requests
    pub timeout_secs: u64,
    /// Delay between push-channel reconnect attempts, in seconds
    pub reconnect_delay_secs: u64,
    /// Reconnect attempts before the transport gives up
    pub reconnect_attempts: u32,
    /// Buffer capacity of the toast broadcast channel
    pub toast_capacity: usize,
    /// Buffer capacity of the connection-status broadcast channel
    pub status_capacity: usize,
}

impl ClientConfig {
    /// Create a new config for the given server base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            events_path: "/events".to_string(),
            summary_path: "/profile/summary/now".to_string(),
            timeout_secs: 30,
            reconnect_delay_secs: 3,
            reconnect_attempts: 3,
            toast_capacity: 64,
            status_capacity: 64,
        }
    }

    /// Set the push-channel path
    pub fn with_events_path(mut self, path: impl Into<String>) -> Self {
        self.events_path = path.into();
        self
    }

    /// Set the summary endpoint path
    pub fn with_summary_path(mut self, path: impl Into<String>) -> Self {
        self.summary_path = path.into();
        self
    }

    /// Set the pull request timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the reconnect policy of the push transport
    pub fn with_reconnect(mut self, attempts: u32, delay_secs: u64) -> Self {
        self.reconnect_attempts = attempts;
        self.reconnect_delay_secs = delay_secs;
        self
    }

    /// Full URL of the push-channel endpoint
    pub fn events_url(&self) -> String {
        join_url(&self.base_url, &self.events_path)
    }

    /// Full URL of the summary endpoint
    pub fn summary_url(&self) -> String {
        join_url(&self.base_url, &self.summary_path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
