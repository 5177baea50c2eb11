/// Audit logging for lifecycle events.
pub mod audit;
/// Configuration management for the daemon.
pub mod config;
/// HTTP server bootstrap.
pub mod server;
/// Telemetry setup for logging and tracing.
pub mod telemetry;
