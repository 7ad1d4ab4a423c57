//! The notification channel: push-channel lifecycle and dispatch
//!
//! Owns the transport and routes every delivered payload: plain text goes
//! through the toast policy onto the toast broadcast, `connection-status`
//! events go into the connection state store. The channel is the store's
//! single writer.
//!
//! Per-message failures cannot terminate the dispatch loop: decoding and
//! classification are total, and partially-formed status events degrade
//! field by field. Only transport-level failures change channel state.

use crate::error::PulseResult;
use crate::notice::Notice;
use crate::status::{ConnectionState, ConnectionStateStore, ConnectionStatus, ServiceId};
use crate::toast::{ToastDescriptor, ToastPolicy};
use crate::transport::PushTransport;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

/// Structured event kind consumed by the connection state store
pub const CONNECTION_STATUS_EVENT: &str = "connection-status";

/// Lifecycle state of the push channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Connection not yet established
    Connecting,
    /// Connected; payloads are being dispatched
    Open,
    /// Transport dropped; stays here until the transport re-opens
    ClosedWithError,
}

/// Push-channel owner and dispatcher
///
/// Messages are dispatched in transport delivery order; no cross-event
/// causal ordering is attempted. The store's last-write-wins semantics make
/// reordering within a service tolerable.
pub struct NotificationChannel<T: PushTransport> {
    transport: T,
    store: Arc<ConnectionStateStore>,
    toasts: broadcast::Sender<ToastDescriptor>,
    state: ChannelState,
}

impl<T: PushTransport> NotificationChannel<T> {
    /// Create a channel dispatching into the given store
    pub fn new(transport: T, store: Arc<ConnectionStateStore>, toast_capacity: usize) -> Self {
        let (toasts, _) = broadcast::channel(toast_capacity);
        Self {
            transport,
            store,
            toasts,
            state: ChannelState::Connecting,
        }
    }

    /// Subscribe to derived toasts
    pub fn subscribe_toasts(&self) -> broadcast::Receiver<ToastDescriptor> {
        self.toasts.subscribe()
    }

    /// Handle of the connection state store this channel writes to
    pub fn store(&self) -> Arc<ConnectionStateStore> {
        Arc::clone(&self.store)
    }

    /// Current lifecycle state
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Connect and dispatch payloads until the transport gives up
    ///
    /// Returns `Ok(())` on a clean transport shutdown. On a transport error
    /// the channel logs the diagnostic, parks in
    /// [`ChannelState::ClosedWithError`] and returns the error; reconnection
    /// policy belongs to the transport, not to this loop.
    pub async fn run(&mut self) -> PulseResult<()> {
        self.state = ChannelState::Connecting;
        if let Err(e) = self.transport.connect().await {
            error!(error = %e, "push channel failed to open");
            self.state = ChannelState::ClosedWithError;
            return Err(e);
        }
        self.state = ChannelState::Open;

        loop {
            match self.transport.recv().await {
                Ok(Some(raw)) => self.dispatch(&raw),
                Ok(None) => {
                    debug!("push channel shut down cleanly");
                    self.state = ChannelState::Connecting;
                    return Ok(());
                }
                Err(e) => {
                    error!(error = %e, "push channel transport failed");
                    self.state = ChannelState::ClosedWithError;
                    return Err(e);
                }
            }
        }
    }

    /// Route one raw payload
    fn dispatch(&self, raw: &str) {
        let notice = Notice::parse(raw);
        match &notice {
            Notice::PlainText { .. } => {
                if let Some(toast) = ToastPolicy::derive(&notice) {
                    // No subscribers is fine; toasts are fire-and-forget.
                    let _ = self.toasts.send(toast);
                }
            }
            Notice::Structured { kind, data } => match kind.as_str() {
                CONNECTION_STATUS_EVENT => self.apply_connection_status(data),
                other => debug!(kind = other, "ignoring unhandled structured event"),
            },
        }
    }

    /// Apply a `connection-status` payload to the store
    ///
    /// Degrades field by field: a payload without a service is dropped with
    /// a warning; a missing status is stored verbatim as an empty token; a
    /// missing error detail defaults to the empty string.
    fn apply_connection_status(&self, data: &Value) {
        let Some(service) = data.get("service").and_then(Value::as_str) else {
            warn!(%data, "connection-status event without a service field");
            return;
        };
        let state = data
            .get("status")
            .and_then(Value::as_str)
            .map(ConnectionState::parse)
            .unwrap_or_else(|| ConnectionState::Other(String::new()));
        let detail = data.get("error").and_then(Value::as_str).unwrap_or("");

        self.store.apply(
            ConnectionStatus::new(ServiceId::new(service), state).with_detail(detail),
        );
    }
}
