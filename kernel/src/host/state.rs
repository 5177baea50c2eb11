//! Daemon state shared by every request handler.
//!
//! `MeldState` owns the session registry, the broadcaster and the file watch
//! manager. Handlers receive it through axum's `State` extractor; it is cheap
//! to clone. Registry mutations that must be observed in order by
//! subscribers (create, close, reopen, file change) publish their event while
//! still holding the registry lock, and subscribing snapshots the registry
//! under that same lock, so a late joiner neither misses nor duplicates a
//! session.

use parking_lot::Mutex;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::events::{BroadcastReceiver, Broadcaster, ServerEvent};
use crate::infrastructure::audit::{log_audit, AuditEvent};
use crate::infrastructure::config::Settings;
use crate::session::{ClosedSession, DiffSession, DiffSource, SessionId, SessionRegistry};
use crate::watch::{FileChanged, FileWatchManager};

use super::attention::{AttentionSink, LogAttention};

pub(crate) struct MeldStateInner {
    pub(crate) registry: Arc<Mutex<SessionRegistry>>,
    pub(crate) broadcaster: Broadcaster,
    pub(crate) watches: FileWatchManager,
    pub(crate) attention: Arc<dyn AttentionSink>,
    pub(crate) keep_alive: Duration,
    pub(crate) closing: watch::Sender<bool>,
}

/// The shared state of a running daemon.
#[derive(Clone)]
pub struct MeldState {
    pub(crate) inner: Arc<MeldStateInner>,
}

impl std::fmt::Debug for MeldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeldState")
            .field("sessions", &self.inner.registry.lock().len())
            .field("subscribers", &self.inner.broadcaster.client_count())
            .field("watches", &self.inner.watches.watch_count())
            .finish_non_exhaustive()
    }
}

impl MeldState {
    /// Creates the state with the default attention sink.
    ///
    /// Must be called from within a Tokio runtime: it spawns the task that
    /// applies file changes to the registry.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self::with_attention(settings, Arc::new(LogAttention))
    }

    /// Creates the state with a host-provided attention sink.
    #[must_use]
    pub fn with_attention(settings: &Settings, attention: Arc<dyn AttentionSink>) -> Self {
        let registry = Arc::new(Mutex::new(SessionRegistry::new(
            settings.history.capacity,
        )));
        let broadcaster = Broadcaster::with_capacity(settings.events.capacity);
        let (watches, changes) =
            FileWatchManager::new(Duration::from_millis(settings.watch.debounce_ms));

        tokio::spawn(apply_file_changes(
            changes,
            Arc::clone(&registry),
            broadcaster.clone(),
        ));

        Self {
            inner: Arc::new(MeldStateInner {
                registry,
                broadcaster,
                watches,
                attention,
                keep_alive: Duration::from_secs(settings.server.keep_alive_secs.max(1)),
                closing: watch::Sender::new(false),
            }),
        }
    }

    /// Returns a reference to the broadcaster.
    #[must_use]
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.inner.broadcaster
    }

    /// Returns a reference to the file watch manager.
    #[must_use]
    pub fn watches(&self) -> &FileWatchManager {
        &self.inner.watches
    }

    /// Interval between keep-alive frames on idle event streams.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        self.inner.keep_alive
    }

    /// Registers a session, watches its files and announces it.
    pub fn create_diff(&self, source: DiffSource) -> DiffSession {
        for path in source.left_path.iter().chain(source.right_path.iter()) {
            self.watch(path);
        }

        let session = {
            let mut registry = self.inner.registry.lock();
            let session = registry.create(source);
            self.inner
                .broadcaster
                .broadcast(ServerEvent::Diff(session.clone()));
            session
        };

        metrics::counter!("meld_sessions_created_total").increment(1);
        log_audit(&AuditEvent::DiffOpened {
            id: session.id.to_string(),
            left_path: session.left_path.as_ref().map(|p| p.display().to_string()),
            right_path: session.right_path.as_ref().map(|p| p.display().to_string()),
        });
        self.inner.attention.request_attention(&session);
        session
    }

    /// Closes a session. Returns `None` if the id is unknown.
    pub fn delete_diff(&self, id: SessionId) -> Option<DiffSession> {
        let session = {
            let mut registry = self.inner.registry.lock();
            let session = registry.delete(id)?;
            self.inner
                .broadcaster
                .broadcast(ServerEvent::DiffClosed { id });
            session
        };

        metrics::counter!("meld_sessions_deleted_total").increment(1);
        log_audit(&AuditEvent::DiffClosed { id: id.to_string() });
        Some(session)
    }

    /// Reopens a closed session under its original id and announces it.
    pub fn reopen_diff(&self, id: SessionId) -> Option<DiffSession> {
        let session = {
            let mut registry = self.inner.registry.lock();
            let session = registry.reopen(id)?;
            self.inner
                .broadcaster
                .broadcast(ServerEvent::Diff(session.clone()));
            session
        };

        for path in session.paths() {
            self.watch(path);
        }
        self.inner.attention.request_attention(&session);
        Some(session)
    }

    /// Returns the session with `id`, if open.
    #[must_use]
    pub fn session(&self, id: SessionId) -> Option<DiffSession> {
        self.inner.registry.lock().get(id).cloned()
    }

    /// Returns every open session in creation order.
    #[must_use]
    pub fn sessions(&self) -> Vec<DiffSession> {
        self.inner.registry.lock().list()
    }

    /// Returns the most recently created open session.
    #[must_use]
    pub fn latest_session(&self) -> Option<DiffSession> {
        self.inner.registry.lock().latest().cloned()
    }

    /// Closed sessions, most recently closed first.
    #[must_use]
    pub fn closed_sessions(&self) -> Vec<ClosedSession> {
        self.inner.registry.lock().closed()
    }

    /// Forgets every closed session.
    pub fn clear_history(&self) {
        self.inner.registry.lock().clear_history();
    }

    /// Subscribes to live events.
    ///
    /// Returns one `Diff` event per open session, in creation order, followed
    /// by a receiver for everything published afterwards.
    pub fn subscribe(&self) -> (Vec<ServerEvent>, BroadcastReceiver) {
        let registry = self.inner.registry.lock();
        let receiver = self.inner.broadcaster.subscribe();
        let replay = registry.list().into_iter().map(ServerEvent::Diff).collect();
        (replay, receiver)
    }

    /// Ends every open event stream, current and future.
    ///
    /// Graceful shutdown waits for open connections, and subscriber streams
    /// never finish on their own.
    pub fn close_streams(&self) {
        self.inner.closing.send_replace(true);
    }

    /// Resolves once [`close_streams`](Self::close_streams) has been called.
    pub fn streams_closed(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut closing = self.inner.closing.subscribe();
        async move {
            let _ = closing.wait_for(|closed| *closed).await;
        }
    }

    /// Closes every file watch and event stream.
    pub fn shutdown(&self) {
        self.close_streams();
        self.inner.watches.shutdown();
    }

    fn watch(&self, path: &Path) {
        if let Err(e) = self.inner.watches.ensure_watch(path) {
            warn!(path = %path.display(), error = %e, "Could not watch file, external edits will not be synced");
        }
    }
}

/// Stores watched-file changes in the registry and announces each one once.
async fn apply_file_changes(
    mut changes: mpsc::Receiver<FileChanged>,
    registry: Arc<Mutex<SessionRegistry>>,
    broadcaster: Broadcaster,
) {
    while let Some(FileChanged { path, content }) = changes.recv().await {
        metrics::counter!("meld_file_changes_total").increment(1);
        let mut registry = registry.lock();
        let touched = registry.apply_file_change(&path, &content);
        debug!(path = %path.display(), touched, "File change received");
        broadcaster.broadcast(ServerEvent::FileChange { path, content });
        drop(registry);
    }
}
