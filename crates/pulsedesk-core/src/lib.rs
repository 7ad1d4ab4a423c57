//! Pulsedesk core library
//!
//! Event classification and notification-state reconciliation for the
//! TicketPulse-style dashboard feed: an SSE push channel delivers untyped
//! payloads, and this crate deterministically derives transient toast
//! notifications and durable per-service connection status from them.
//!
//! Rendering is an external collaborator: the core exposes only
//! [`ToastDescriptor`] and [`ConnectionStatus`] values through broadcast
//! subscriptions, so any front-end (the bundled console binary, a GUI, a
//! test harness) consumes the same contract.

pub mod channel;
pub mod config;
pub mod error;
pub mod notice;
pub mod status;
pub mod summary;
pub mod toast;
pub mod transport;

// Re-export commonly used types
pub use channel::{CONNECTION_STATUS_EVENT, ChannelState, NotificationChannel};
pub use config::ClientConfig;
pub use error::{PulseError, PulseResult};
pub use notice::Notice;
pub use status::{ConnectionState, ConnectionStateStore, ConnectionStatus, ServiceId};
pub use summary::{SUMMARY_FALLBACK, SummaryFetcher};
pub use toast::{Severity, ToastDescriptor, ToastPolicy};
pub use transport::{PushTransport, RawPayload, SseTransport};
