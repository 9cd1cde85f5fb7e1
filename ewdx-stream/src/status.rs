//! Host-visible connection status

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

/// Connectivity of the adapter as presented to the host
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// A session is being established
    #[default]
    Connecting,
    /// The device is answering
    Ok,
    /// The device stopped answering; recovery is automatic
    Disconnected(String),
    /// Recovery gave up; reconfiguration or restart is required
    ConnectionFailure(String),
    /// The configuration was rejected before any session started
    BadConfig(String),
}

impl ConnectionStatus {
    /// Reason text attached to the status, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            ConnectionStatus::Connecting | ConnectionStatus::Ok => None,
            ConnectionStatus::Disconnected(reason)
            | ConnectionStatus::ConnectionFailure(reason)
            | ConnectionStatus::BadConfig(reason) => Some(reason),
        }
    }

    /// Whether no automatic recovery will happen from this status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConnectionStatus::ConnectionFailure(_) | ConnectionStatus::BadConfig(_)
        )
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Ok => write!(f, "ok"),
            ConnectionStatus::Disconnected(reason) => write!(f, "disconnected: {}", reason),
            ConnectionStatus::ConnectionFailure(reason) => write!(f, "connection failure: {}", reason),
            ConnectionStatus::BadConfig(reason) => write!(f, "bad config: {}", reason),
        }
    }
}

/// Shared writer side of the status channel
///
/// Sessions come and go; the publisher outlives them so host subscribers
/// keep one receiver for the life of the adapter.
#[derive(Debug, Clone)]
pub struct StatusPublisher {
    sender: Arc<watch::Sender<ConnectionStatus>>,
}

impl StatusPublisher {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(ConnectionStatus::default());
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish a status; repeating the current one is not a change
    pub fn set(&self, status: ConnectionStatus) {
        self.sender.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            info!(from = %current, to = %status, "Connection status changed");
            *current = status;
            true
        });
    }

    pub fn current(&self) -> ConnectionStatus {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.sender.subscribe()
    }
}

impl Default for StatusPublisher {
    fn default() -> Self {
        Self::new()
    }
}
