//! On-demand summary fetching
//!
//! A manual pull, not a push-channel event: one GET against the summary
//! endpoint, with the result displayed directly in a dedicated content area.
//! This path bypasses the toast policy entirely. Failures of any kind map to
//! fixed user-facing fallback text, so the caller always has something to
//! display.

use crate::config::ClientConfig;
use crate::error::{PulseError, PulseResult};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// Fixed user-facing fallback: shown whenever the summary cannot be
/// displayed, whether the request failed or the response carried neither
/// expected field.
pub const SUMMARY_FALLBACK: &str = "Failed to load summary.";

/// On-demand fetcher for the dashboard summary endpoint
pub struct SummaryFetcher {
    client: Client,
    url: String,
}

impl SummaryFetcher {
    /// Create a fetcher for the configured summary endpoint
    pub fn new(config: &ClientConfig) -> PulseResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(PulseError::config("base URL must not be empty"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PulseError::http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.summary_url(),
        })
    }

    /// Fetch the summary and return text ready for display
    ///
    /// Never fails from the caller's perspective: network, HTTP and decode
    /// errors, like a well-formed response without a usable field, collapse
    /// into [`SUMMARY_FALLBACK`] (failures are additionally logged). No
    /// automatic retry. Concurrent calls are allowed to race; the last
    /// resolution wins.
    pub async fn fetch_summary_now(&self) -> String {
        match self.try_fetch().await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "on-demand summary fetch failed");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }

    async fn try_fetch(&self) -> PulseResult<String> {
        debug!(url = %self.url, "requesting on-demand summary");
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        Ok(extract_display_text(&body).unwrap_or_else(|| SUMMARY_FALLBACK.to_string()))
    }
}

/// Pick the display text out of a summary response
///
/// The backend's shape varies: current deployments return `{"message": ...}`,
/// older ones `{"summary": ...}`. Both keys are equally valid; `message`
/// wins when both are present.
pub fn extract_display_text(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| body.get("summary").and_then(Value::as_str))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_extract_message_field() {
        assert_eq!(
            extract_display_text(&json!({"message": "X"})).as_deref(),
            Some("X")
        );
    }

    #[test]
    fn test_extract_legacy_summary_field() {
        assert_eq!(
            extract_display_text(&json!({"summary": "Y"})).as_deref(),
            Some("Y")
        );
    }

    #[test]
    fn test_message_wins_over_summary() {
        let body = json!({"message": "new", "summary": "old"});
        assert_eq!(extract_display_text(&body).as_deref(), Some("new"));
    }

    #[test]
    fn test_no_usable_field() {
        assert_eq!(extract_display_text(&json!({})), None);
        assert_eq!(extract_display_text(&json!({"message": 7})), None);
    }

    async fn serve_one_json_response(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_fetch_returns_message_text() {
        let base = serve_one_json_response(r#"{"message": "Daily summary for X"}"#).await;
        let fetcher = SummaryFetcher::new(&ClientConfig::new(base)).unwrap();
        let text = fetcher.fetch_summary_now().await;
        assert!(text.contains("X"));
    }

    #[tokio::test]
    async fn test_fetch_without_expected_field_falls_back() {
        let base = serve_one_json_response(r#"{"status": "ok"}"#).await;
        let fetcher = SummaryFetcher::new(&ClientConfig::new(base)).unwrap();
        assert_eq!(fetcher.fetch_summary_now().await, SUMMARY_FALLBACK);
    }

    #[tokio::test]
    async fn test_fetch_network_failure_falls_back() {
        // Bind then immediately drop a listener so the port refuses.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let fetcher = SummaryFetcher::new(&ClientConfig::new(base)).unwrap();
        assert_eq!(fetcher.fetch_summary_now().await, SUMMARY_FALLBACK);
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        let result = SummaryFetcher::new(&ClientConfig::new("  "));
        assert!(matches!(result, Err(PulseError::Config(_))));
    }

    #[tokio::test]
    async fn test_fetch_non_json_body_falls_back() {
        let base = serve_one_json_response("<html>oops</html>").await;
        let fetcher = SummaryFetcher::new(&ClientConfig::new(base)).unwrap();
        assert_eq!(fetcher.fetch_summary_now().await, SUMMARY_FALLBACK);
    }
}
