//! Fan-out of server events to every subscriber.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::events::types::{EventError, ServerEvent};

const DEFAULT_CAPACITY: usize = 256;

/// Broadcasts events to all connected subscribers.
///
/// Each subscriber observes events in publish order. A subscriber that falls
/// more than the channel capacity behind is disconnected instead of silently
/// skipping events.
#[derive(Clone)]
pub struct Broadcaster {
    sender: broadcast::Sender<ServerEvent>,
    client_count: Arc<AtomicUsize>,
}

impl Broadcaster {
    /// Creates a broadcaster with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a broadcaster buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            client_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Subscribes a new client to receive events published from now on.
    pub fn subscribe(&self) -> BroadcastReceiver {
        self.client_count.fetch_add(1, Ordering::SeqCst);
        debug!(client_count = self.client_count(), "Client subscribed");
        BroadcastReceiver {
            inner: self.sender.subscribe(),
            client_count: Arc::clone(&self.client_count),
        }
    }

    /// Publishes an event to all connected clients.
    ///
    /// Returns the number of subscribers the event was queued for. Having no
    /// subscribers is not an error.
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        let kind = event.kind();
        metrics::counter!("meld_events_broadcast_total", "kind" => kind).increment(1);
        if let Ok(receiver_count) = self.sender.send(event) {
            debug!(receiver_count, kind, "Event broadcast");
            receiver_count
        } else {
            debug!(kind, "Event dropped, no subscribers connected");
            0
        }
    }

    /// Returns the number of connected clients.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.client_count.load(Ordering::SeqCst)
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end held by one subscriber. Dropping it deregisters the
/// subscriber.
pub struct BroadcastReceiver {
    inner: broadcast::Receiver<ServerEvent>,
    client_count: Arc<AtomicUsize>,
}

impl BroadcastReceiver {
    /// Receives the next event.
    ///
    /// # Errors
    /// Returns `EventError::ChannelClosed` if the broadcaster is gone and
    /// `EventError::Lagged` if this subscriber fell behind.
    pub async fn recv(&mut self) -> Result<ServerEvent, EventError> {
        self.inner.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => EventError::ChannelClosed,
            broadcast::error::RecvError::Lagged(count) => {
                warn!(skipped = count, "Receiver lagged");
                EventError::Lagged(count)
            }
        })
    }
}

impl Drop for BroadcastReceiver {
    fn drop(&mut self) {
        self.client_count.fetch_sub(1, Ordering::SeqCst);
        debug!(
            client_count = self.client_count.load(Ordering::SeqCst),
            "Client unsubscribed"
        );
    }
}
