// SPDX-License-Identifier: MIT
//! W3C Trace Context extraction from inbound HTTP headers.

use axum::http::HeaderMap;
use opentelemetry::propagation::Extractor;
use opentelemetry::{global, Context};

/// Extract the caller's trace context (`traceparent`, `tracestate`) from `headers`.
///
/// Uses the globally installed propagator. Returns the current context when the
/// headers carry none or no propagator has been installed.
pub fn extract_context(headers: &HeaderMap) -> Context {
    global::get_text_map_propagator(|propagator| propagator.extract(&HeaderExtractor(headers)))
}

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}
