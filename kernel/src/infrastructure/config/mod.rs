//! Configuration management for the Meld daemon.
//!
//! Settings are layered: built-in defaults first, then environment
//! variables prefixed with `MELD` and separated by `__`
//! (`MELD__SERVER__PORT=4000`).
//!
//! # Example
//!
//! ```
//! use meld_kernel::infrastructure::config::Settings;
//!
//! let settings = Settings::new().expect("Failed to load configuration");
//! assert!(settings.watch.debounce_ms > 0);
//! ```

pub mod events;
pub mod server;
pub mod telemetry;
pub mod watch;

pub use events::{EventSettings, HistorySettings};
pub use server::ServerSettings;
pub use telemetry::TelemetrySettings;
pub use watch::WatchSettings;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment};
use serde::Deserialize;

/// Top-level configuration for the Meld daemon.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Telemetry settings.
    pub telemetry: TelemetrySettings,
    /// File watch settings.
    #[serde(default)]
    pub watch: WatchSettings,
    /// Broadcast channel settings.
    #[serde(default)]
    pub events: EventSettings,
    /// Closed-diff history settings.
    #[serde(default)]
    pub history: HistorySettings,
}

impl Settings {
    /// Creates a new settings instance from environment variables and defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be built or deserialized.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_defaults()?
            // Merge in Environment variables
            .add_source(Environment::with_prefix("MELD").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Settings made of the built-in defaults only, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the defaults cannot be deserialized.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::with_defaults()?.build()?.try_deserialize()
    }

    fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.keep_alive_secs", 15)?
            .set_default("telemetry.service_name", "meld-kernel")?
            .set_default("telemetry.log_level", "info")?
            .set_default("telemetry.sampling_ratio", 1.0)
    }

    /// Returns the configured bind address.
    #[must_use]
    pub fn bind_address(&self) -> BindAddress {
        BindAddress(self.server.host.clone(), self.server.port)
    }
}

/// Helper for strong typing addresses
pub struct BindAddress(pub String, pub u16);

impl BindAddress {
    /// Converts the bind address to a `SocketAddr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the IP address string cannot be parsed.
    pub fn to_socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        let ip = self
            .0
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid IP address '{}': {e}", self.0))?;
        Ok(std::net::SocketAddr::new(ip, self.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_every_section() {
        let settings = Settings::defaults().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.keep_alive_secs, 15);
        assert!(settings.server.static_dir.is_none());
        assert_eq!(settings.server.max_body_bytes, 256 * 1024 * 1024);
        assert_eq!(settings.telemetry.service_name, "meld-kernel");
        assert_eq!(settings.watch.debounce_ms, 75);
        assert_eq!(settings.events.capacity, 256);
        assert_eq!(settings.history.capacity, 50);
    }

    #[test]
    fn bind_address_parses_ip() {
        let addr = BindAddress("127.0.0.1".into(), 3000).to_socket_addr().unwrap();
        assert_eq!(addr.port(), 3000);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn bind_address_rejects_hostname() {
        assert!(BindAddress("localhost".into(), 3000).to_socket_addr().is_err());
    }
}
