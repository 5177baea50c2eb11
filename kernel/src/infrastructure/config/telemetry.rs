//! Telemetry configuration for the Meld daemon.
//!
//! This module defines logging and OpenTelemetry settings.

use serde::Deserialize;

/// Telemetry configuration settings.
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    /// Service name for telemetry.
    pub service_name: String,
    /// Log level used when `RUST_LOG` is not set.
    pub log_level: String,
    /// OTLP endpoint for traces.
    pub otlp_endpoint: Option<String>,
    /// Sampling ratio for traces.
    #[serde(default = "default_sampling")]
    pub sampling_ratio: f64,
}

pub(super) fn default_sampling() -> f64 {
    1.0
}
