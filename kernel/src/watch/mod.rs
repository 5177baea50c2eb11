//! File watches for the paths behind open sessions.
//!
//! One native watch exists per distinct path. Change notifications are
//! debounced, the file is re-read, and a [`FileChanged`] is emitted for the
//! server to apply and broadcast.

pub mod manager;
pub mod types;

pub use manager::FileWatchManager;
pub use types::{FileChanged, WatchError};
