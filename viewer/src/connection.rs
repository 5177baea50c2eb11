//! Connection indicator state.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::ClientError;

/// Checks whether the daemon is reachable.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Succeeds if the daemon answered its health check.
    async fn check(&self) -> Result<(), ClientError>;
}

/// What the indicator shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Initial state and while a retry is in flight.
    Connecting,
    /// The event stream is open or the last probe succeeded.
    Connected,
    /// The stream dropped or the last probe failed.
    Disconnected,
}

impl ConnectionState {
    /// Indicator text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "● Connecting...",
            ConnectionState::Connected => "● Connected",
            ConnectionState::Disconnected => "● Disconnected",
        }
    }
}

/// Tracks the connection to the daemon.
#[derive(Debug)]
pub struct ConnectionStatus {
    state: ConnectionState,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStatus {
    /// Starts in [`ConnectionState::Connecting`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Connecting,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Only a disconnected indicator accepts a retry click.
    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.state == ConnectionState::Disconnected
    }

    /// The event stream opened.
    pub fn mark_connected(&mut self) {
        self.state = ConnectionState::Connected;
    }

    /// The event stream failed or closed.
    pub fn mark_disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    /// Probes the daemon and updates the state. Ignored while connected.
    pub async fn retry(&mut self, probe: &dyn HealthProbe) -> ConnectionState {
        if self.state == ConnectionState::Connected {
            return self.state;
        }

        self.state = ConnectionState::Connecting;
        self.state = match probe.check().await {
            Ok(()) => {
                info!("Connected to daemon");
                ConnectionState::Connected
            }
            Err(e) => {
                warn!(error = %e, "Connection failed");
                ConnectionState::Disconnected
            }
        };
        self.state
    }
}
