//! Watch registry and notification relay.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

use super::types::{FileChanged, WatchError};

/// An active native watch for one file.
pub struct WatchedFile {
    path: PathBuf,
    _watcher: RecommendedWatcher,
}

impl WatchedFile {
    /// The watched file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for WatchedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchedFile")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Keeps exactly one watch per distinct path.
///
/// Watches are never pruned when the last session referencing a path
/// closes; they live until [`FileWatchManager::shutdown`] or drop.
pub struct FileWatchManager {
    watches: Mutex<HashMap<PathBuf, WatchedFile>>,
    raw_tx: mpsc::UnboundedSender<PathBuf>,
    relay: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for FileWatchManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatchManager")
            .field("watch_count", &self.watch_count())
            .finish_non_exhaustive()
    }
}

impl FileWatchManager {
    /// Creates the manager and spawns its relay task on the current Tokio
    /// runtime. Changes are delivered on the returned receiver.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(debounce: Duration) -> (Self, mpsc::Receiver<FileChanged>) {
        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::channel(64);
        let relay = tokio::spawn(relay_changes(raw_rx, out_tx, debounce));

        let manager = Self {
            watches: Mutex::new(HashMap::new()),
            raw_tx,
            relay: Mutex::new(Some(relay)),
        };
        (manager, out_rx)
    }

    /// Starts watching `path` unless it is already watched.
    ///
    /// Returns `true` if a new watch was created and `false` if the path
    /// was already watched.
    ///
    /// # Errors
    ///
    /// Returns an error if the native watcher cannot be attached.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn ensure_watch(&self, path: &Path) -> Result<bool, WatchError> {
        let mut watches = self.watches.lock();
        if watches.contains_key(path) {
            trace!("Path already watched");
            return Ok(false);
        }

        let watcher = self.attach(path)?;
        watches.insert(
            path.to_path_buf(),
            WatchedFile {
                path: path.to_path_buf(),
                _watcher: watcher,
            },
        );
        info!(watch_count = watches.len(), "Watching file");
        Ok(true)
    }

    /// Watches the parent directory and filters to the file itself, so a
    /// save that replaces the file by rename is still observed.
    fn attach(&self, path: &Path) -> Result<RecommendedWatcher, WatchError> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| WatchError::NoParent(path.to_path_buf()))?;

        let target = path.to_path_buf();
        let tx = self.raw_tx.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if is_content_change(&event.kind) && event.paths.iter().any(|p| p == &target)
                    {
                        trace!(kind = ?event.kind, path = %target.display(), "Change notification");
                        let _ = tx.send(target.clone());
                    }
                }
                Err(e) => warn!(path = %target.display(), error = %e, "Watcher error"),
            },
            Config::default(),
        )
        .map_err(|source| WatchError::Notify {
            path: path.to_path_buf(),
            source,
        })?;

        watcher
            .watch(parent, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Notify {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(watcher)
    }

    /// Returns true if `path` has an active watch.
    #[must_use]
    pub fn is_watched(&self, path: &Path) -> bool {
        self.watches.lock().contains_key(path)
    }

    /// Number of active watches.
    #[must_use]
    pub fn watch_count(&self) -> usize {
        self.watches.lock().len()
    }

    /// Paths with an active watch, sorted.
    #[must_use]
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.watches.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Closes every watch and stops the relay task.
    pub fn shutdown(&self) {
        let closed = {
            let mut watches = self.watches.lock();
            let count = watches.len();
            watches.clear();
            count
        };
        if let Some(relay) = self.relay.lock().take() {
            relay.abort();
        }
        info!(closed, "File watches closed");
    }
}

impl Drop for FileWatchManager {
    fn drop(&mut self) {
        if let Some(relay) = self.relay.get_mut().take() {
            relay.abort();
        }
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

/// Collapses bursts of notifications and re-reads each changed file once.
async fn relay_changes(
    mut raw_rx: mpsc::UnboundedReceiver<PathBuf>,
    out_tx: mpsc::Sender<FileChanged>,
    debounce: Duration,
) {
    while let Some(first) = raw_rx.recv().await {
        let mut pending = BTreeSet::from([first]);
        tokio::time::sleep(debounce).await;
        while let Ok(path) = raw_rx.try_recv() {
            pending.insert(path);
        }

        for path in pending {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    debug!(path = %path.display(), bytes = content.len(), "Watched file re-read");
                    if out_tx.send(FileChanged { path, content }).await.is_err() {
                        debug!("Change receiver dropped, stopping relay");
                        return;
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to re-read watched file, skipping");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokio::time::timeout;

    const DEBOUNCE: Duration = Duration::from_millis(50);

    fn canonical_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let file = dir.join(name);
        fs::write(&file, content).unwrap();
        dunce::canonicalize(file).unwrap()
    }

    #[tokio::test]
    async fn ensure_watch_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = canonical_file(dir.path(), "a.txt", "a");
        let (manager, _rx) = FileWatchManager::new(DEBOUNCE);

        assert!(manager.ensure_watch(&file).unwrap());
        assert!(!manager.ensure_watch(&file).unwrap());
        assert_eq!(manager.watch_count(), 1);
        assert!(manager.is_watched(&file));
    }

    #[tokio::test]
    async fn distinct_paths_in_one_directory_get_their_own_watch() {
        let dir = tempfile::tempdir().unwrap();
        let a = canonical_file(dir.path(), "a.txt", "a");
        let b = canonical_file(dir.path(), "b.txt", "b");
        let (manager, _rx) = FileWatchManager::new(DEBOUNCE);

        manager.ensure_watch(&a).unwrap();
        manager.ensure_watch(&b).unwrap();
        assert_eq!(manager.watched_paths(), {
            let mut v = vec![a, b];
            v.sort();
            v
        });
    }

    #[tokio::test]
    async fn write_emits_one_change_with_new_content() {
        let dir = tempfile::tempdir().unwrap();
        let file = canonical_file(dir.path(), "watched.txt", "before");
        let (manager, mut rx) = FileWatchManager::new(DEBOUNCE);
        manager.ensure_watch(&file).unwrap();

        fs::write(&file, "after").unwrap();

        let change = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no change observed")
            .expect("relay stopped");
        assert_eq!(change.path, file);
        assert_eq!(change.content, "after");

        assert!(
            timeout(Duration::from_millis(300), rx.recv()).await.is_err(),
            "a single write must produce a single change"
        );
    }

    #[tokio::test]
    async fn sibling_changes_are_filtered_out() {
        let dir = tempfile::tempdir().unwrap();
        let watched = canonical_file(dir.path(), "watched.txt", "x");
        let sibling = canonical_file(dir.path(), "sibling.txt", "y");
        let (manager, mut rx) = FileWatchManager::new(DEBOUNCE);
        manager.ensure_watch(&watched).unwrap();

        fs::write(&sibling, "changed").unwrap();

        assert!(timeout(Duration::from_millis(300), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn shutdown_closes_all_watches() {
        let dir = tempfile::tempdir().unwrap();
        let file = canonical_file(dir.path(), "a.txt", "a");
        let (manager, _rx) = FileWatchManager::new(DEBOUNCE);
        manager.ensure_watch(&file).unwrap();

        manager.shutdown();
        assert_eq!(manager.watch_count(), 0);
    }
}
