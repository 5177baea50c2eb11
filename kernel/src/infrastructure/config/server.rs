//! Server configuration for the Meld daemon.
//!
//! This module defines HTTP server binding and runtime settings.

use serde::Deserialize;
use std::path::PathBuf;

/// Server binding settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding the viewer bundle, served for unmatched routes.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    /// Interval between keep-alive comments on the event stream.
    pub keep_alive_secs: u64,
    /// Largest accepted request body. Diffs and saves carry whole files.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_body_bytes() -> usize {
    256 * 1024 * 1024
}
