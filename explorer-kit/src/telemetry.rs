//! Logging and `OpenTelemetry` export.
//!
//! [`Telemetry::register`] always installs a `tracing` fmt subscriber filtered
//! by `RUST_LOG`. With the `telemetry` feature, and when any
//! `OTEL_EXPORTER_OTLP_*` variable is set, spans and metrics (including the
//! `experiment.exposures` counter) are also exported over OTLP.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "telemetry")]
use std::{env, time::Duration};

#[cfg(feature = "telemetry")]
use opentelemetry::{KeyValue, global, trace::TracerProvider};
#[cfg(feature = "telemetry")]
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
    trace::SdkTracerProvider,
};
#[cfg(feature = "telemetry")]
use opentelemetry_semantic_conventions::{SCHEMA_URL, attribute::SERVICE_VERSION};
#[cfg(feature = "telemetry")]
use tracing_opentelemetry::{MetricsLayer, OpenTelemetryLayer};

/// OTLP transport, chosen from `OTEL_EXPORTER_OTLP_PROTOCOL`.
#[cfg(feature = "telemetry")]
#[derive(Debug, Clone, Copy)]
enum OtlpProtocol {
    Http,
    Grpc,
}

/// `None` unless OTLP export has been configured through the environment.
#[cfg(feature = "telemetry")]
fn otlp_protocol() -> Option<OtlpProtocol> {
    let configured = [
        "OTEL_EXPORTER_OTLP_ENDPOINT",
        "OTEL_EXPORTER_OTLP_HEADERS",
        "OTEL_EXPORTER_OTLP_PROTOCOL",
    ]
    .iter()
    .any(|key| env::var(key).is_ok());
    configured.then(|| match env::var("OTEL_EXPORTER_OTLP_PROTOCOL").as_deref() {
        Ok("grpc") => OtlpProtocol::Grpc,
        _ => OtlpProtocol::Http,
    })
}

/// Logging and export setup for one process.
#[derive(Debug, Default)]
pub struct Telemetry {
    service_name: Option<String>,
    service_version: Option<String>,
    log_level: Option<String>,
}

impl Telemetry {
    /// Creates an empty [`Telemetry`] configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service name (overridden by `OTEL_SERVICE_NAME`).
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Sets the service version (overridden by `OTEL_SERVICE_VERSION`).
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    /// Filter directive used when `RUST_LOG` is not set (default `"info"`).
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    #[cfg(feature = "telemetry")]
    fn resource(&self) -> Resource {
        let from_env = |key: &str| env::var(key).ok().filter(|v| !v.trim().is_empty());
        let name = from_env("OTEL_SERVICE_NAME").or_else(|| self.service_name.clone());
        let version = from_env("OTEL_SERVICE_VERSION").or_else(|| self.service_version.clone());

        let mut builder = Resource::builder();
        if let Some(name) = name {
            builder = builder.with_service_name(name);
        }
        if let Some(version) = version {
            builder = builder.with_schema_url([KeyValue::new(SERVICE_VERSION, version)], SCHEMA_URL);
        }
        builder.build()
    }

    #[cfg(feature = "telemetry")]
    fn tracer_provider(&self, protocol: OtlpProtocol) -> Option<SdkTracerProvider> {
        let builder = opentelemetry_otlp::SpanExporter::builder();
        let exporter = match protocol {
            OtlpProtocol::Http => builder.with_http().build(),
            OtlpProtocol::Grpc => builder.with_tonic().build(),
        }
        .inspect_err(|e| report_exporter_error(&format!("OTLP span exporter unavailable: {e}")))
        .ok()?;
        Some(
            SdkTracerProvider::builder()
                .with_resource(self.resource())
                .with_batch_exporter(exporter)
                .build(),
        )
    }

    #[cfg(feature = "telemetry")]
    fn meter_provider(&self, protocol: OtlpProtocol) -> Option<SdkMeterProvider> {
        let builder = opentelemetry_otlp::MetricExporter::builder();
        let exporter = match protocol {
            OtlpProtocol::Http => builder.with_http().build(),
            OtlpProtocol::Grpc => builder.with_tonic().build(),
        }
        .inspect_err(|e| report_exporter_error(&format!("OTLP metric exporter unavailable: {e}")))
        .ok()?;
        let reader = PeriodicReader::builder(exporter)
            .with_interval(Duration::from_secs(30))
            .build();
        let debug_reader =
            PeriodicReader::builder(opentelemetry_stdout::MetricExporter::default()).build();
        let provider = SdkMeterProvider::builder()
            .with_resource(self.resource())
            .with_reader(reader)
            .with_reader(debug_reader)
            .build();
        global::set_meter_provider(provider.clone());
        Some(provider)
    }

    /// Install the global subscriber (and exporters, when configured).
    ///
    /// Keep the returned guard alive for the life of the process; dropping it
    /// flushes pending exports.
    pub fn register(self) -> TelemetryGuard {
        let fallback = self.log_level.as_deref().unwrap_or("info");
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into());
        let registry = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

        #[cfg(feature = "telemetry")]
        {
            let protocol = otlp_protocol();
            let tracer_provider = protocol.and_then(|p| self.tracer_provider(p));
            let meter_provider = protocol.and_then(|p| self.meter_provider(p));
            let otel_layer = tracer_provider
                .as_ref()
                .map(|tp| OpenTelemetryLayer::new(tp.tracer(env!("CARGO_PKG_NAME"))));
            let metrics_layer = meter_provider.as_ref().map(|mp| MetricsLayer::new(mp.clone()));
            registry.with(metrics_layer).with(otel_layer).init();

            if protocol.is_some() {
                tracing::debug!("OpenTelemetry exporters registered");
            }
            TelemetryGuard {
                tracer_provider,
                meter_provider,
            }
        }

        #[cfg(not(feature = "telemetry"))]
        {
            registry.init();
            TelemetryGuard {}
        }
    }
}

#[cfg(feature = "telemetry")]
#[allow(clippy::print_stderr)]
fn report_exporter_error(message: &str) {
    // The subscriber is not installed yet when exporters are built.
    eprintln!("{message}");
}

/// Flushes and shuts down exporters on drop.
#[derive(Debug)]
pub struct TelemetryGuard {
    #[cfg(feature = "telemetry")]
    tracer_provider: Option<SdkTracerProvider>,
    #[cfg(feature = "telemetry")]
    meter_provider: Option<SdkMeterProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        #[cfg(feature = "telemetry")]
        {
            if let Some(ref tp) = self.tracer_provider
                && let Err(err) = tp.shutdown()
            {
                tracing::error!(?err, "tracer provider shutdown error");
            }
            if let Some(ref mp) = self.meter_provider
                && let Err(err) = mp.shutdown()
            {
                tracing::error!(?err, "meter provider shutdown error");
            }
        }
    }
}
