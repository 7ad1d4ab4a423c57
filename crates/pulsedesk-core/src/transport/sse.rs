//! Server-sent-events transport over reqwest
//!
//! Streams `GET {base}/events` and yields the `data:` body of each event as
//! one raw payload. Framing follows the SSE wire format: events are
//! separated by a blank line, multiple `data:` lines accumulate joined by
//! newlines, and comment/`event:`/`id:` lines are skipped. Reconnection is
//! handled here, with a fixed delay and a bounded attempt budget; callers
//! above never retry.

use super::{PushTransport, RawPayload};
use crate::config::ClientConfig;
use crate::error::{PulseError, PulseResult};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, warn};

type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, reqwest::Error>> + Send>>;

/// SSE push-channel transport
pub struct SseTransport {
    client: Client,
    url: String,
    reconnect_delay: Duration,
    reconnect_attempts: u32,
    stream: Option<ByteStream>,
    pending: Vec<u8>,
    buffer: String,
    closed: bool,
}

impl SseTransport {
    /// Create a transport for the configured events endpoint
    ///
    /// The client carries no request timeout: the push connection is meant
    /// to stay open indefinitely and idles between events.
    pub fn new(config: &ClientConfig) -> PulseResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(PulseError::config("base URL must not be empty"));
        }
        let client = Client::builder()
            .build()
            .map_err(|e| PulseError::http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.events_url(),
            reconnect_delay: Duration::from_secs(config.reconnect_delay_secs),
            reconnect_attempts: config.reconnect_attempts,
            stream: None,
            pending: Vec::new(),
            buffer: String::new(),
            closed: false,
        })
    }

    async fn open_stream(&mut self) -> PulseResult<ByteStream> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| PulseError::transport(format!("failed to open push channel: {e}")))?;

        if !response.status().is_success() {
            return Err(PulseError::transport(format!(
                "push channel returned status {}",
                response.status()
            )));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()));
        Ok(Box::pin(stream))
    }
}

#[async_trait]
impl PushTransport for SseTransport {
    async fn connect(&mut self) -> PulseResult<()> {
        self.closed = false;
        let mut attempt = 0;
        loop {
            match self.open_stream().await {
                Ok(stream) => {
                    // Partial data from a previous connection is stale.
                    self.pending.clear();
                    self.buffer.clear();
                    self.stream = Some(stream);
                    debug!(url = %self.url, "push channel connected");
                    return Ok(());
                }
                Err(e) if attempt < self.reconnect_attempts => {
                    attempt += 1;
                    warn!(error = %e, attempt, "push channel connect failed, retrying");
                    tokio::time::sleep(self.reconnect_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn recv(&mut self) -> PulseResult<Option<RawPayload>> {
        loop {
            if self.closed {
                return Ok(None);
            }

            while let Some(frame) = take_frame(&mut self.buffer) {
                if let Some(data) = extract_data(&frame) {
                    return Ok(Some(data));
                }
            }

            let Some(stream) = self.stream.as_mut() else {
                self.connect().await?;
                continue;
            };

            match stream.next().await {
                Some(Ok(chunk)) => {
                    self.pending.extend_from_slice(&chunk);
                    drain_utf8_prefix(&mut self.pending, &mut self.buffer);
                }
                Some(Err(e)) => {
                    warn!(error = %e, "push channel stream error, reconnecting");
                    self.stream = None;
                    tokio::time::sleep(self.reconnect_delay).await;
                }
                None => {
                    debug!("push channel stream ended, reconnecting");
                    self.stream = None;
                    tokio::time::sleep(self.reconnect_delay).await;
                }
            }
        }
    }

    async fn close(&mut self) -> PulseResult<()> {
        self.closed = true;
        self.stream = None;
        self.pending.clear();
        debug!("push channel closed");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

/// Move the complete-UTF-8 prefix of `pending` into `buffer`
///
/// Network chunks can split a multi-byte character; its leading bytes stay
/// in `pending` until the rest arrives. Bytes that can never complete a
/// character are dropped.
fn drain_utf8_prefix(pending: &mut Vec<u8>, buffer: &mut String) {
    loop {
        match std::str::from_utf8(pending) {
            Ok(text) => {
                buffer.push_str(text);
                pending.clear();
                return;
            }
            Err(e) => {
                let valid = e.valid_up_to();
                if let Ok(text) = std::str::from_utf8(&pending[..valid]) {
                    buffer.push_str(text);
                }
                match e.error_len() {
                    // Incomplete trailing character; wait for more bytes.
                    None => {
                        pending.drain(..valid);
                        return;
                    }
                    Some(len) => {
                        warn!("dropping invalid UTF-8 bytes from push channel");
                        pending.drain(..valid + len);
                    }
                }
            }
        }
    }
}

/// Pop one complete event frame off the front of the buffer
fn take_frame(buffer: &mut String) -> Option<String> {
    let end = buffer.find("\n\n")?;
    let frame = buffer[..end].to_string();
    buffer.drain(..end + 2);
    Some(frame)
}

/// Extract the data body of one event frame
///
/// Returns `None` for frames without any `data:` line (comments,
/// keep-alives). Multiple `data:` lines are joined with newlines.
fn extract_data(frame: &str) -> Option<RawPayload> {
    let mut data: Option<String> = None;
    for line in frame.lines() {
        if line.starts_with(':') {
            continue;
        }
        if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            match data.as_mut() {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(value);
                }
                None => data = Some(value.to_string()),
            }
        }
        // `event:`, `id:` and `retry:` fields are not used by the dashboard.
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_take_frame_splits_on_blank_line() {
        let mut buffer = "data: one\n\ndata: two\n\npartial".to_string();
        assert_eq!(take_frame(&mut buffer).as_deref(), Some("data: one"));
        assert_eq!(take_frame(&mut buffer).as_deref(), Some("data: two"));
        assert_eq!(take_frame(&mut buffer), None);
        assert_eq!(buffer, "partial");
    }

    #[test]
    fn test_extract_data_single_line() {
        assert_eq!(
            extract_data("data: {\"event\":\"x\"}").as_deref(),
            Some("{\"event\":\"x\"}")
        );
    }

    #[test]
    fn test_extract_data_joins_multiple_lines() {
        let frame = "event: message\ndata: line1\ndata: line2";
        assert_eq!(extract_data(frame).as_deref(), Some("line1\nline2"));
    }

    #[test]
    fn test_extract_data_ignores_comments_and_metadata() {
        assert_eq!(extract_data(": keep-alive"), None);
        assert_eq!(extract_data("event: heartbeat\nid: 7"), None);
        assert_eq!(extract_data("data:"), Some(String::new()));
    }

    #[test]
    fn test_drain_utf8_prefix_holds_split_character() {
        let text = "Ticket \u{2713} closed".as_bytes();
        // Split inside the three-byte check mark.
        let split = 8;
        let mut pending = text[..split].to_vec();
        let mut buffer = String::new();

        drain_utf8_prefix(&mut pending, &mut buffer);
        assert_eq!(buffer, "Ticket ");
        assert_eq!(pending, &text[7..split]);

        pending.extend_from_slice(&text[split..]);
        drain_utf8_prefix(&mut pending, &mut buffer);
        assert_eq!(buffer, "Ticket \u{2713} closed");
        assert!(pending.is_empty());
    }

    #[test]
    fn test_drain_utf8_prefix_drops_invalid_bytes() {
        let mut pending = b"ok\xFF\xFEmore".to_vec();
        let mut buffer = String::new();
        drain_utf8_prefix(&mut pending, &mut buffer);
        assert_eq!(buffer, "okmore");
        assert!(pending.is_empty());
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        let result = SseTransport::new(&ClientConfig::new(""));
        assert!(matches!(result, Err(PulseError::Config(_))));
    }

    #[test]
    fn test_transport_futures_are_send() {
        fn require_send<T: Send>(_: &T) {}
        let config = ClientConfig::default().with_reconnect(0, 0);
        let mut transport = SseTransport::new(&config).unwrap();
        {
            let fut = transport.connect();
            require_send(&fut);
        }
        let fut = transport.recv();
        require_send(&fut);
    }

    async fn serve_one_sse_response(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n{body}"
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_recv_yields_payloads_then_errors_when_server_is_gone() {
        let base = serve_one_sse_response(
            "data: \"Ticket closed (success)\"\n\ndata: line1\ndata: line2\n\n",
        )
        .await;
        let config = ClientConfig::new(base).with_reconnect(0, 0);
        let mut transport = SseTransport::new(&config).unwrap();

        transport.connect().await.unwrap();
        assert!(transport.is_connected());
        assert_eq!(
            transport.recv().await.unwrap().as_deref(),
            Some("\"Ticket closed (success)\"")
        );
        assert_eq!(transport.recv().await.unwrap().as_deref(), Some("line1\nline2"));

        // The one-shot server is gone; the retry budget is zero, so the
        // stream end surfaces as a transport error.
        assert!(transport.recv().await.is_err());
    }

    #[tokio::test]
    async fn test_recv_reassembles_character_split_across_chunks() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n",
                )
                .await
                .unwrap();
            // Break the write inside the three-byte check mark.
            let event = "data: \"Ticket \u{2713} closed (success)\"\n\n".as_bytes();
            socket.write_all(&event[..15]).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            socket.write_all(&event[15..]).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let config = ClientConfig::new(format!("http://{addr}")).with_reconnect(0, 0);
        let mut transport = SseTransport::new(&config).unwrap();
        transport.connect().await.unwrap();
        assert_eq!(
            transport.recv().await.unwrap().as_deref(),
            Some("\"Ticket \u{2713} closed (success)\"")
        );
    }

    #[tokio::test]
    async fn test_closed_transport_reports_clean_shutdown() {
        let config = ClientConfig::default().with_reconnect(0, 0);
        let mut transport = SseTransport::new(&config).unwrap();
        transport.close().await.unwrap();
        assert!(!transport.is_connected());
        assert_eq!(transport.recv().await.unwrap(), None);
    }
}
