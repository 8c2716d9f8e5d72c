// SPDX-License-Identifier: MIT
//! Command-line and environment configuration.

use std::time::Duration;

use clap::Parser;

use crate::telemetry::TelemetryConfig;

/// Flight lookup demo service instrumented with OpenTelemetry.
#[derive(Parser, Debug, Clone)]
#[command(name = "flight-app")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "FLIGHT_APP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "FLIGHT_APP_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Base OTLP/HTTP collector endpoint; `/v1/<signal>` is appended per signal
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT", default_value = "http://otel-collector:4318")]
    pub otel_endpoint: String,

    /// Service name attached to all telemetry
    #[arg(long, env = "OTEL_SERVICE_NAME", default_value = "flight-app")]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Seconds between metric exports
    #[arg(long, env = "OTEL_METRIC_EXPORT_INTERVAL_SECS", default_value_t = 60)]
    pub metric_interval_secs: u64,

    /// Timeout in seconds for a single export request
    #[arg(long, env = "OTEL_EXPORTER_OTLP_TIMEOUT_SECS", default_value_t = 10)]
    pub export_timeout_secs: u64,

    /// Span and log batch queue capacity
    #[arg(long, env = "OTEL_BSP_MAX_QUEUE_SIZE", default_value_t = 2048)]
    pub max_queue_size: usize,

    /// Disable console log output
    #[arg(long)]
    pub no_console_log: bool,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            endpoint: self.otel_endpoint.clone(),
            service_name: self.service_name.clone(),
            log_level: self.log_level.clone(),
            console_log: !self.no_console_log,
            metric_interval: Duration::from_secs(self.metric_interval_secs),
            export_timeout: Duration::from_secs(self.export_timeout_secs),
            max_queue_size: self.max_queue_size,
            ..TelemetryConfig::default()
        }
    }
}
