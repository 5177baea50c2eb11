//! Logging and trace export setup.

use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace::Sampler, Resource};
use opentelemetry_semantic_conventions::resource;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::infrastructure::config::TelemetrySettings;

/// Builder for the daemon's tracing subscriber.
///
/// Logs are always written as JSON lines to stdout. When an OTLP endpoint
/// is configured, spans are additionally exported over gRPC.
pub struct TelemetryBuilder {
    service_name: String,
    service_version: String,
    otlp_endpoint: Option<String>,
    log_level: String,
    sampling_ratio: f64,
}

impl TelemetryBuilder {
    /// Creates a builder for the given service with `info` logging and no
    /// span export.
    pub fn new(service_name: impl Into<String>, service_version: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: service_version.into(),
            otlp_endpoint: None,
            log_level: "info".to_string(),
            sampling_ratio: 1.0,
        }
    }

    /// Creates a builder from the telemetry section of the settings.
    #[must_use]
    pub fn from_settings(settings: &TelemetrySettings, service_version: &str) -> Self {
        let builder = Self::new(settings.service_name.clone(), service_version)
            .with_log_level(settings.log_level.clone())
            .with_sampling_ratio(settings.sampling_ratio);
        match settings.otlp_endpoint {
            Some(ref endpoint) => builder.with_otlp(endpoint.clone()),
            None => builder,
        }
    }

    #[must_use]
    pub fn with_otlp(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    #[must_use]
    pub fn with_sampling_ratio(mut self, ratio: f64) -> Self {
        self.sampling_ratio = ratio;
        self
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The OTLP span exporter cannot be built
    /// - A global subscriber is already installed
    pub fn init(self) -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        let fmt_layer = fmt::layer().json().with_span_events(FmtSpan::CLOSE).boxed();

        let registry = Registry::default().with(env_filter).with(fmt_layer);

        let Some(endpoint) = self.otlp_endpoint else {
            return registry.try_init().context("Failed to init subscriber");
        };

        opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

        let resource = Resource::builder()
            .with_attributes(vec![
                opentelemetry::KeyValue::new(resource::SERVICE_NAME, self.service_name.clone()),
                opentelemetry::KeyValue::new(
                    resource::SERVICE_VERSION,
                    self.service_version.clone(),
                ),
            ])
            .build();

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()
            .context("Failed to build OTLP span exporter")?;

        let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(resource)
            .with_sampler(Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
                self.sampling_ratio,
            ))))
            .build();

        opentelemetry::global::set_tracer_provider(provider.clone());
        let tracer = provider.tracer(self.service_name);

        registry
            .with(tracing_opentelemetry::layer().with_tracer(tracer))
            .try_init()
            .context("Failed to init subscriber")
    }
}
