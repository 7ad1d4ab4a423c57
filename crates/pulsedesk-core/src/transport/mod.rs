//! Push-channel transport layer
//!
//! The notification channel consumes raw payloads from a [`PushTransport`]
//! and never reconnects on its own; retry policy lives entirely inside the
//! transport, the way a browser `EventSource` retries under the covers.
//! [`SseTransport`] is the reqwest-backed server-sent-events implementation;
//! tests substitute queue-backed fakes.

pub mod sse;

pub use sse::SseTransport;

use crate::error::PulseResult;
use async_trait::async_trait;

/// One opaque payload delivered by the push channel
///
/// No schema guarantee; decoding is the message parser's job.
pub type RawPayload = String;

/// Transport trait for the server-push channel
#[async_trait]
pub trait PushTransport: Send {
    /// Establish the connection
    async fn connect(&mut self) -> PulseResult<()>;

    /// Receive the next payload
    ///
    /// `Ok(None)` means the transport shut down cleanly (e.g. after
    /// [`PushTransport::close`]); an `Err` means the connection dropped and
    /// the transport's own retry budget is exhausted.
    async fn recv(&mut self) -> PulseResult<Option<RawPayload>>;

    /// Close the transport
    async fn close(&mut self) -> PulseResult<()>;

    /// Whether the transport currently holds an open connection
    fn is_connected(&self) -> bool;
}
