use std::time::Duration;

/// Backend endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Connection settings for [`HttpKnowledgeBase`](crate::HttpKnowledgeBase).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    endpoint: String,
    timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig::new(DEFAULT_ENDPOINT)
    }
}

impl ClientConfig {
    /// Trailing slashes on `endpoint` are dropped.
    pub fn new(endpoint: &str) -> Self {
        ClientConfig {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout_secs: None,
        }
    }

    /// Bound every request to `secs` seconds. Without this a request waits
    /// until the backend answers.
    pub fn with_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }
}
