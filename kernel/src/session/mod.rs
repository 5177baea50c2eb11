//! Registry of open diff sessions.
//!
//! A session pairs a left (save target) and right (proposed) text, each
//! optionally backed by a file on disk. Sessions live only in memory and
//! disappear with the process.

pub mod history;
pub mod paths;
pub mod registry;
pub mod types;

pub use history::{ClosedSession, SessionHistory};
pub use registry::SessionRegistry;
pub use types::{DiffSession, DiffSource, ParseSessionIdError, SessionId, SideInput};
