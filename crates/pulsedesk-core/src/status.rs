//! Per-service connection status and its process-wide store
//!
//! The dashboard shows one durable badge per backing integration (Zendesk,
//! Slack, ...). The store keeps the latest status per service,
//! last-write-wins, and broadcasts every applied status to subscribers so
//! the rendering layer stays decoupled from the push channel.
//!
//! Single-writer discipline: only the notification channel calls
//! [`ConnectionStateStore::apply`]. That is an API convention, not an
//! enforced lock hierarchy. Readers take snapshots or subscribe.

use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::warn;

/// Identifier of a backing integration
///
/// Open string set; [`ServiceId::ZENDESK`] and [`ServiceId::SLACK`] are the
/// members the dashboard currently maps to badge anchors. Unrecognized
/// services are stored and broadcast anyway; the renderer ignores what it
/// doesn't know.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceId(String);

impl ServiceId {
    /// Zendesk ticket integration
    pub const ZENDESK: &'static str = "zendesk";
    /// Slack messaging integration
    pub const SLACK: &'static str = "slack";

    /// Create a service id from a free-form identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the dashboard maps this service to a badge
    pub fn is_known(&self) -> bool {
        matches!(self.0.as_str(), Self::ZENDESK | Self::SLACK)
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Connection state of one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection established
    Disconnected,
    /// Connection being established or degraded to polling
    Polling,
    /// Fully connected
    Connected,
    /// Connection failed; detail travels in [`ConnectionStatus::error_detail`]
    Error,
    /// Unrecognized status string, stored verbatim; render mapping is the
    /// renderer's choice (the console adapter shows a neutral badge)
    Other(String),
}

impl ConnectionState {
    /// Parse a wire status string
    ///
    /// Recognizes exactly `connected`, `polling`, `error` and `disconnected`;
    /// anything else is kept verbatim. Total: never errors.
    pub fn parse(status: &str) -> Self {
        match status {
            "connected" => Self::Connected,
            "polling" => Self::Polling,
            "error" => Self::Error,
            "disconnected" => Self::Disconnected,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire representation of this state
    pub fn as_str(&self) -> &str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Polling => "polling",
            Self::Connected => "connected",
            Self::Error => "error",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable status of one service, as shown by its badge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// Which integration this status belongs to
    pub service: ServiceId,
    /// Current connection state
    pub state: ConnectionState,
    /// Human-readable detail for `error` states, empty when absent
    pub error_detail: String,
}

impl ConnectionStatus {
    /// Create a status with no error detail
    pub fn new(service: ServiceId, state: ConnectionState) -> Self {
        Self {
            service,
            state,
            error_detail: String::new(),
        }
    }

    /// Attach an error detail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.error_detail = detail.into();
        self
    }
}

/// Process-wide map of service → latest connection status
///
/// Entries persist for the store's lifetime (no expiry); applying a status
/// for a service replaces the previous one. Every `apply` is broadcast,
/// including idempotent re-applications, and a reconnect replay simply
/// repaints the badges.
#[derive(Debug)]
pub struct ConnectionStateStore {
    statuses: RwLock<HashMap<ServiceId, ConnectionStatus>>,
    changes: broadcast::Sender<ConnectionStatus>,
}

impl ConnectionStateStore {
    /// Create a store whose change feed buffers up to `capacity` statuses
    pub fn new(capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity);
        Self {
            statuses: RwLock::new(HashMap::new()),
            changes,
        }
    }

    /// Store a status and notify all subscribers
    ///
    /// Last write wins. Unknown services are stored too; they draw a
    /// warning in the log but never block processing.
    pub fn apply(&self, status: ConnectionStatus) {
        if !status.service.is_known() {
            warn!(service = %status.service, "storing status for unrecognized service");
        }
        self.statuses
            .write()
            .insert(status.service.clone(), status.clone());
        // No active subscribers is fine; the map is still current.
        let _ = self.changes.send(status);
    }

    /// Latest status for a service, if any was ever applied
    pub fn get(&self, service: &ServiceId) -> Option<ConnectionStatus> {
        self.statuses.read().get(service).cloned()
    }

    /// Latest status of every known-or-not service, unordered
    pub fn snapshot(&self) -> Vec<ConnectionStatus> {
        self.statuses.read().values().cloned().collect()
    }

    /// Subscribe to the change feed
    ///
    /// Receives every future `apply`, including repeats of an unchanged
    /// status. Statuses applied before subscribing are only visible through
    /// [`ConnectionStateStore::snapshot`].
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionStatus> {
        self.changes.subscribe()
    }
}

impl Default for ConnectionStateStore {
    fn default() -> Self {
        Self::new(64)
    }
}
