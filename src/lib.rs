// SPDX-License-Identifier: MIT
//! Flight lookup demo service instrumented with OpenTelemetry.
//!
//! Three routes (`/`, `/airlines/`, `/flights/{airline}/{err}`) backed by trivial
//! logic, wired for all three telemetry signals:
//! * Traces – one server span per request plus manual child spans, via `tracing` +
//!   `tracing-opentelemetry`.
//! * Metrics – a root request counter and a per-airline histogram.
//! * Logs – `tracing` events bridged into OTLP log records, correlated with the
//!   active span.
//!
//! The entry points are [`telemetry::init_telemetry`], which returns the
//! [`telemetry::TelemetryHandle`] owning the providers, and [`http::router`],
//! which takes the [`instruments::Instruments`] built from that handle.
//!
//! # Quick Start
//! ```no_run
//! use flight_app::http::{router, AppState};
//! use flight_app::instruments::Instruments;
//! use flight_app::telemetry::{init_telemetry, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let handle = init_telemetry(TelemetryConfig::default())?;
//!     let app = router(AppState::new(Instruments::new(&handle.meter())));
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, app).await?;
//!     handle.shutdown()?;
//!     Ok(())
//! }
//! ```
pub mod config;
pub mod error;
pub mod http;
pub mod instruments;
pub mod random;
pub mod telemetry;
