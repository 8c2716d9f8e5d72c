// SPDX-License-Identifier: MIT
//! Telemetry provider bundle: traces, metrics and logs exported over OTLP/HTTP.
//!
//! The public API is small:
//!
//! * [`TelemetryConfig`] – endpoint, resource metadata and export tuning.
//! * [`build_pipelines`] – builds the three providers without touching process state.
//! * [`init_telemetry`] – builds providers, registers globals and installs the subscriber.
//! * [`TelemetryHandle`] – owns the providers, hands out meters/tracers, flushes on shutdown.
//!
//! Every signal shares one [`Resource`] (service name, version, environment) and is
//! exported to its own sub-path of the collector endpoint:
//!
//! * traces  – `SpanExporter` → `BatchSpanProcessor` → `SdkTracerProvider`
//! * metrics – `MetricExporter` → `PeriodicReader` → `SdkMeterProvider`
//! * logs    – `LogExporter` → `BatchLogProcessor` → `SdkLoggerProvider`, fed by
//!   [`OpenTelemetryTracingBridge`] so ordinary `tracing` events become log records.
//!
//! # Example
//! ```no_run
//! use flight_app::telemetry::{init_telemetry, TelemetryConfig};
//! fn main() -> anyhow::Result<()> {
//!     let handle = init_telemetry(TelemetryConfig::default())?;
//!     // ... application logic ...
//!     handle.shutdown()?; // ensure final batches exported
//!     Ok(())
//! }
//! ```
//!
//! # Failure policy
//! Building the pipelines never contacts the collector, so an unreachable endpoint
//! cannot fail startup. Export is best effort: batch queues are bounded by
//! [`TelemetryConfig::max_queue_size`] and overflowing records are dropped, and each
//! export request is bounded by [`TelemetryConfig::export_timeout`].
//!
//! # Threading Model
//! Batch processors and the periodic metric reader run on their own worker threads
//! (using the blocking HTTP client), so request handlers never wait on network I/O.
use std::time::Duration;

use anyhow::Result;
use opentelemetry::metrics::{Meter, MeterProvider as _};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, MetricExporter, Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::logs::{self, BatchLogProcessor, SdkLoggerProvider};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{self, BatchSpanProcessor, SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tracing::Subscriber;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

/// Instrumentation scope name used for the service's own tracer and meter.
pub const INSTRUMENTATION_SCOPE: &str = "flight-app";

/// Export-path crates; their events never reach the log exporter.
const EXPORT_STACK_TARGETS: [&str; 5] = ["hyper", "h2", "reqwest", "tonic", "opentelemetry"];

/// Configuration used when initializing telemetry.
///
/// Values are sourced from environment variables if available:
/// * `OTEL_EXPORTER_OTLP_ENDPOINT` – base endpoint (e.g. `http://localhost:4318`).
/// * `OTEL_SERVICE_NAME` – service name resource attribute.
/// * `RUST_ENV` – deployment environment (added as `deployment.environment`).
/// * `RUST_LOG` – log level used when no filter directive is set.
///
/// Defaults are used when variables are absent.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Base OTLP endpoint (without per-signal suffix). Example: `http://localhost:4318`.
    pub endpoint: String,
    /// Service name reported in resource attributes (`service.name`).
    pub service_name: String,
    /// Service version reported in resource attributes (`service.version`).
    pub service_version: String,
    /// Deployment environment reported as `deployment.environment`.
    pub environment: String,
    /// Fallback filter for console and exported logs.
    pub log_level: String,
    /// Write a compact human-readable log line to stdout as well.
    pub console_log: bool,
    /// How often accumulated metrics are pushed to the collector.
    pub metric_interval: Duration,
    /// Upper bound for a single export request.
    pub export_timeout: Duration,
    /// Capacity of the span and log batch queues; records beyond it are dropped.
    pub max_queue_size: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4318".to_string()),
            service_name: std::env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "flight-app".to_string()),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: std::env::var("RUST_ENV").unwrap_or_else(|_| "dev".into()),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            console_log: true,
            metric_interval: Duration::from_secs(60),
            export_timeout: Duration::from_secs(10),
            max_queue_size: 2048,
        }
    }
}

impl TelemetryConfig {
    fn signal_endpoint(&self, signal: &str) -> String {
        format!("{}/v1/{signal}", self.endpoint.trim_end_matches('/'))
    }
}

/// Owns the three providers for the lifetime of the process.
///
/// Dropping the handle without calling [`TelemetryHandle::shutdown`] may lose the
/// final batches. Call `shutdown()` at a controlled point (typically just before
/// process exit) to flush.
#[derive(Clone, Debug)]
pub struct TelemetryHandle {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
    logger_provider: SdkLoggerProvider,
}

impl TelemetryHandle {
    /// Wrap already-built providers.
    pub fn new(
        tracer_provider: SdkTracerProvider,
        meter_provider: SdkMeterProvider,
        logger_provider: SdkLoggerProvider,
    ) -> Self {
        Self {
            tracer_provider,
            meter_provider,
            logger_provider,
        }
    }

    /// Meter for the service's own instruments.
    pub fn meter(&self) -> Meter {
        self.meter_provider.meter(INSTRUMENTATION_SCOPE)
    }

    /// Tracer for the service's own spans.
    pub fn tracer(&self) -> SdkTracer {
        self.tracer_provider.tracer(INSTRUMENTATION_SCOPE)
    }

    /// The metric provider, for flushing or reading collected metrics.
    pub fn meter_provider(&self) -> &SdkMeterProvider {
        &self.meter_provider
    }

    /// Make the providers reachable through `opentelemetry::global` and install
    /// the W3C trace-context propagator.
    pub fn register_global(&self) {
        global::set_text_map_propagator(TraceContextPropagator::new());
        global::set_tracer_provider(self.tracer_provider.clone());
        global::set_meter_provider(self.meter_provider.clone());
    }

    /// Build the `tracing` subscriber that feeds this bundle.
    ///
    /// Layers, outermost first:
    /// * `EnvFilter` from `RUST_LOG`, falling back to [`TelemetryConfig::log_level`];
    /// * compact console output when [`TelemetryConfig::console_log`] is set;
    /// * the OTLP log bridge, with the export stack's own crates filtered out;
    /// * the OpenTelemetry span layer. ERROR events mark their span as failed and
    ///   are recorded as exception events.
    ///
    /// # Errors
    /// Returns an error if a bridge filter directive fails to parse.
    pub fn subscriber(
        &self,
        cfg: &TelemetryConfig,
    ) -> Result<impl Subscriber + Send + Sync + 'static> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

        let console = cfg.console_log.then(|| {
            fmt::layer()
                .with_target(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact()
        });

        let mut bridge_filter = EnvFilter::new(&cfg.log_level);
        for target in EXPORT_STACK_TARGETS {
            bridge_filter = bridge_filter.add_directive(format!("{target}=off").parse()?);
        }
        let bridge_layer =
            OpenTelemetryTracingBridge::new(&self.logger_provider).with_filter(bridge_filter);

        let otel_trace_layer = OpenTelemetryLayer::new(self.tracer())
            .with_error_events_to_status(true)
            .with_error_events_to_exceptions(true);

        Ok(Registry::default()
            .with(filter)
            .with(console)
            .with(bridge_layer)
            .with(otel_trace_layer))
    }

    /// Flush and shutdown all three providers.
    ///
    /// Returns `Ok(())` if every provider shut down cleanly. Otherwise each failure
    /// is logged at ERROR and a combined `anyhow::Error` names each failing component.
    pub fn shutdown(self) -> Result<()> {
        let results = [
            ("tracer", self.tracer_provider.shutdown()),
            ("meter", self.meter_provider.shutdown()),
            ("logger", self.logger_provider.shutdown()),
        ];
        let mut errs = Vec::new();
        for (component, result) in results {
            if let Err(e) = result {
                tracing::error!(component, error = %e, "telemetry provider shutdown failed");
                errs.push(format!("{component}: {e}"));
            }
        }
        if errs.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(errs.join(", "))
        }
    }
}

/// Build the trace, metric and log pipelines for `cfg`.
///
/// Nothing global is touched, and no connection is attempted: exporters only
/// talk to the collector when a batch is flushed.
///
/// # Errors
/// Returns an error if any exporter builder fails (e.g. invalid endpoint URL).
pub fn build_pipelines(cfg: &TelemetryConfig) -> Result<TelemetryHandle> {
    let resource = Resource::builder()
        .with_service_name(cfg.service_name.clone())
        .with_attributes([
            KeyValue::new("service.version", cfg.service_version.clone()),
            KeyValue::new("deployment.environment", cfg.environment.clone()),
        ])
        .build();

    let span_exporter = SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(cfg.signal_endpoint("traces"))
        .with_timeout(cfg.export_timeout)
        .build()?;
    let span_processor = BatchSpanProcessor::builder(span_exporter)
        .with_batch_config(
            trace::BatchConfigBuilder::default()
                .with_max_queue_size(cfg.max_queue_size)
                .build(),
        )
        .build();
    let tracer_provider = SdkTracerProvider::builder()
        .with_span_processor(span_processor)
        .with_resource(resource.clone())
        .build();

    let metric_exporter = MetricExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(cfg.signal_endpoint("metrics"))
        .with_timeout(cfg.export_timeout)
        .build()?;
    let reader = PeriodicReader::builder(metric_exporter)
        .with_interval(cfg.metric_interval)
        .build();
    let meter_provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource.clone())
        .build();

    let log_exporter = LogExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(cfg.signal_endpoint("logs"))
        .with_timeout(cfg.export_timeout)
        .build()?;
    let log_processor = BatchLogProcessor::builder(log_exporter)
        .with_batch_config(
            logs::BatchConfigBuilder::default()
                .with_max_queue_size(cfg.max_queue_size)
                .build(),
        )
        .build();
    let logger_provider = SdkLoggerProvider::builder()
        .with_log_processor(log_processor)
        .with_resource(resource)
        .build();

    Ok(TelemetryHandle::new(
        tracer_provider,
        meter_provider,
        logger_provider,
    ))
}

/// Initialize traces, metrics and logs for the process.
///
/// Builds the pipelines, registers them as the global providers and installs the
/// subscriber from [`TelemetryHandle::subscriber`] as the global default.
///
/// # Errors
/// Returns an error if an exporter cannot be built or a global subscriber is
/// already installed.
///
/// # Examples
/// ```no_run
/// use flight_app::telemetry::{init_telemetry, TelemetryConfig};
/// let handle = init_telemetry(TelemetryConfig::default()).expect("init");
/// // ... run logic ...
/// handle.shutdown().expect("shutdown");
/// ```
pub fn init_telemetry(cfg: TelemetryConfig) -> Result<TelemetryHandle> {
    let handle = build_pipelines(&cfg)?;
    handle.register_global();
    handle.subscriber(&cfg)?.try_init()?;

    tracing::info!(
        service.name = %cfg.service_name,
        otel.endpoint = %cfg.endpoint,
        "Telemetry initialized"
    );
    Ok(handle)
}
