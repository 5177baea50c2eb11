//! WebSocket subscriber lifecycle.

use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures_util::StreamExt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::events::broadcaster::BroadcastReceiver;
use crate::events::types::{ClientId, EventError, ServerEvent};

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// A WebSocket subscriber with a unique client ID.
pub struct Connection {
    client_id: ClientId,
    stream: WebSocket,
    replay: Vec<ServerEvent>,
    receiver: BroadcastReceiver,
    closed: Pin<Box<dyn Future<Output = ()> + Send>>,
}

impl Connection {
    /// Creates a connection that will first send `replay`, then everything
    /// arriving on `receiver`, until `closed` resolves.
    pub fn new(
        stream: WebSocket,
        replay: Vec<ServerEvent>,
        receiver: BroadcastReceiver,
        closed: impl Future<Output = ()> + Send + 'static,
    ) -> Self {
        let client_id = ClientId::generate();
        info!(client_id = %client_id, replayed = replay.len(), "WebSocket subscriber connected");
        Self {
            client_id,
            stream,
            replay,
            receiver,
            closed: Box::pin(closed),
        }
    }

    /// Returns the client ID for this connection.
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Runs the connection until the client closes it, the broadcaster
    /// drops it, or the daemon shuts down.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - WebSocket communication fails
    /// - An event cannot be serialized
    pub async fn run(mut self) -> Result<(), EventError> {
        for event in std::mem::take(&mut self.replay) {
            self.send_event(&event).await?;
        }

        let mut ping_interval = interval(PING_INTERVAL);

        loop {
            tokio::select! {
                incoming = self.stream.next() => {
                    match incoming {
                        Some(Ok(msg)) => {
                            if self.handle_incoming_message(msg).await? {
                                break;
                            }
                        }
                        Some(Err(e)) => {
                            error!(client_id = %self.client_id, error = %e, "WebSocket error");
                            return Err(EventError::AxumWs(e));
                        }
                        None => {
                            debug!(client_id = %self.client_id, "Stream ended");
                            return Ok(());
                        }
                    }
                }

                received = self.receiver.recv() => {
                    match received {
                        Ok(event) => self.send_event(&event).await?,
                        Err(e) => {
                            warn!(client_id = %self.client_id, reason = %e, "Dropping subscriber");
                            break;
                        }
                    }
                }

                _ = ping_interval.tick() => {
                    self.send_ping().await?;
                }

                () = &mut self.closed => {
                    info!(client_id = %self.client_id, "Daemon shutting down");
                    break;
                }
            }
        }

        self.graceful_close().await
    }

    async fn handle_incoming_message(&mut self, message: Message) -> Result<bool, EventError> {
        match message {
            Message::Text(_) | Message::Binary(_) => {
                warn!(client_id = %self.client_id, "Ignoring message from subscriber");
                Ok(false)
            }
            Message::Ping(data) => {
                self.stream
                    .send(Message::Pong(data))
                    .await
                    .map_err(EventError::AxumWs)?;
                Ok(false)
            }
            Message::Pong(_) => {
                debug!(client_id = %self.client_id, "Pong received");
                Ok(false)
            }
            Message::Close(_) => {
                info!(client_id = %self.client_id, "Client initiated close");
                Ok(true)
            }
        }
    }

    async fn send_event(&mut self, event: &ServerEvent) -> Result<(), EventError> {
        let payload = event.to_frame_payload()?;
        self.stream
            .send(Message::Text(payload.into()))
            .await
            .map_err(EventError::AxumWs)
    }

    async fn send_ping(&mut self) -> Result<(), EventError> {
        self.stream
            .send(Message::Ping(Bytes::new()))
            .await
            .map_err(EventError::AxumWs)
    }

    async fn graceful_close(mut self) -> Result<(), EventError> {
        debug!(client_id = %self.client_id, "Closing gracefully");
        // The peer may already be gone after a close frame.
        let _ = self.stream.send(Message::Close(None)).await;
        info!(client_id = %self.client_id, "Connection closed");
        Ok(())
    }
}
