//! Shared harness: the real router and subscriber wired to in-memory exporters.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use flight_app::http::{router, AppState};
use flight_app::instruments::Instruments;
use flight_app::telemetry::{TelemetryConfig, TelemetryHandle};
use opentelemetry::logs::AnyValue;
use opentelemetry::KeyValue;
use opentelemetry_sdk::logs::{InMemoryLogExporter, SdkLoggerProvider};
use opentelemetry_sdk::metrics::data::{AggregatedMetrics, MetricData};
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use tower::ServiceExt;

pub struct TestTelemetry {
    pub handle: TelemetryHandle,
    spans: InMemorySpanExporter,
    metrics: InMemoryMetricExporter,
    logs: InMemoryLogExporter,
    tracer_provider: SdkTracerProvider,
    logger_provider: SdkLoggerProvider,
}

/// An exported log record with the ids of the span it was emitted in.
#[derive(Debug)]
pub struct ExportedLog {
    pub body: String,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
}

/// One histogram series: its attributes, sample count and sum.
#[derive(Debug)]
pub struct HistogramPoint {
    pub attributes: Vec<KeyValue>,
    pub count: u64,
    pub sum: u64,
}

impl TestTelemetry {
    pub fn new() -> Self {
        let spans = InMemorySpanExporter::default();
        let metrics = InMemoryMetricExporter::default();
        let logs = InMemoryLogExporter::default();

        let tracer_provider = SdkTracerProvider::builder()
            .with_simple_exporter(spans.clone())
            .build();
        let meter_provider = SdkMeterProvider::builder()
            .with_reader(PeriodicReader::builder(metrics.clone()).build())
            .build();
        let logger_provider = SdkLoggerProvider::builder()
            .with_simple_exporter(logs.clone())
            .build();

        let handle = TelemetryHandle::new(
            tracer_provider.clone(),
            meter_provider,
            logger_provider.clone(),
        );
        Self {
            handle,
            spans,
            metrics,
            logs,
            tracer_provider,
            logger_provider,
        }
    }

    /// Subscriber built exactly as in production, minus console output.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        let cfg = TelemetryConfig {
            log_level: "debug".to_string(),
            console_log: false,
            ..TelemetryConfig::default()
        };
        self.handle.subscriber(&cfg).expect("subscriber")
    }

    pub fn app(&self) -> Router {
        router(AppState::new(Instruments::new(&self.handle.meter())))
    }

    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.tracer_provider.force_flush().expect("flush spans");
        self.spans.get_finished_spans().expect("finished spans")
    }

    pub fn exported_logs(&self) -> Vec<ExportedLog> {
        self.logger_provider.force_flush().expect("flush logs");
        self.logs
            .get_emitted_logs()
            .expect("emitted logs")
            .iter()
            .filter_map(|log| {
                let body = match log.record.body() {
                    Some(AnyValue::String(body)) => body.as_str().to_string(),
                    _ => return None,
                };
                let context = log.record.trace_context();
                Some(ExportedLog {
                    body,
                    trace_id: context.map(|cx| cx.trace_id.to_string()),
                    span_id: context.map(|cx| cx.span_id.to_string()),
                })
            })
            .collect()
    }

    pub fn log_bodies(&self) -> Vec<String> {
        self.exported_logs().into_iter().map(|log| log.body).collect()
    }

    fn collect(&self) -> Vec<opentelemetry_sdk::metrics::data::ResourceMetrics> {
        self.handle
            .meter_provider()
            .force_flush()
            .expect("flush metrics");
        self.metrics
            .get_finished_metrics()
            .expect("finished metrics")
    }

    /// Cumulative total of a `u64` counter, summed over all attribute sets.
    pub fn counter_total(&self, name: &str) -> u64 {
        let exported = self.collect();
        let Some(latest) = exported.last() else {
            return 0;
        };
        let mut total = 0;
        for scope in latest.scope_metrics() {
            for metric in scope.metrics().filter(|m| m.name() == name) {
                if let AggregatedMetrics::U64(MetricData::Sum(sum)) = metric.data() {
                    total += sum.data_points().map(|dp| dp.value()).sum::<u64>();
                }
            }
        }
        total
    }

    /// Number of exported streams and data points carrying `name`.
    pub fn series_count(&self, name: &str) -> usize {
        let exported = self.collect();
        let Some(latest) = exported.last() else {
            return 0;
        };
        let mut count = 0;
        for scope in latest.scope_metrics() {
            for metric in scope.metrics().filter(|m| m.name() == name) {
                count += match metric.data() {
                    AggregatedMetrics::U64(MetricData::Sum(sum)) => sum.data_points().count(),
                    AggregatedMetrics::U64(MetricData::Histogram(h)) => h.data_points().count(),
                    _ => 1,
                };
            }
        }
        count
    }

    pub fn histogram_points(&self, name: &str) -> Vec<HistogramPoint> {
        let exported = self.collect();
        let Some(latest) = exported.last() else {
            return Vec::new();
        };
        let mut points = Vec::new();
        for scope in latest.scope_metrics() {
            for metric in scope.metrics().filter(|m| m.name() == name) {
                if let AggregatedMetrics::U64(MetricData::Histogram(histogram)) = metric.data() {
                    for dp in histogram.data_points() {
                        points.push(HistogramPoint {
                            attributes: dp.attributes().cloned().collect(),
                            count: dp.count() as u64,
                            sum: dp.sum(),
                        });
                    }
                }
            }
        }
        points
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Drive one request through the router and return status and body.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub fn attribute(span: &SpanData, key: &str) -> Option<opentelemetry::Value> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| kv.value.clone())
}

pub fn attribute_str(span: &SpanData, key: &str) -> Option<String> {
    attribute(span, key).map(|v| v.as_str().into_owned())
}

pub fn attribute_i64(span: &SpanData, key: &str) -> Option<i64> {
    match attribute(span, key)? {
        opentelemetry::Value::I64(v) => Some(v),
        _ => None,
    }
}

pub fn span_named<'a>(spans: &'a [SpanData], name: &str) -> &'a SpanData {
    spans
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("no span named {name}"))
}

pub fn event_names(span: &SpanData) -> Vec<String> {
    span.events
        .events
        .iter()
        .map(|event| event.name.to_string())
        .collect()
}

/// String attribute `key` of the first event called `event` on `span`.
pub fn event_attribute_str(span: &SpanData, event: &str, key: &str) -> Option<String> {
    span.events
        .events
        .iter()
        .find(|e| e.name == event)?
        .attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| kv.value.as_str().into_owned())
}
