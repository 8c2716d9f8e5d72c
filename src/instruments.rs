// SPDX-License-Identifier: MIT
//! Named metric instruments.
//!
//! Instruments are created once from a [`Meter`] and cloned into handler state;
//! clones share the same underlying aggregation, so concurrent `add`/`record`
//! calls from any request accumulate into one series per attribute set.

use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::KeyValue;

pub const ROOT_REQUEST_COUNTER: &str = "root_request_counter";
pub const RANDOM_INT_HISTOGRAM: &str = "random_int_histogram";

/// Create a monotonic `u64` counter.
pub fn create_counter(
    meter: &Meter,
    name: &'static str,
    description: &'static str,
    unit: &'static str,
) -> Counter<u64> {
    meter
        .u64_counter(name)
        .with_description(description)
        .with_unit(unit)
        .build()
}

/// Create a `u64` histogram.
pub fn create_histogram(
    meter: &Meter,
    name: &'static str,
    description: &'static str,
    unit: &'static str,
) -> Histogram<u64> {
    meter
        .u64_histogram(name)
        .with_description(description)
        .with_unit(unit)
        .build()
}

/// The service's custom instruments.
#[derive(Clone, Debug)]
pub struct Instruments {
    /// Requests served by the root endpoint.
    pub root_requests: Counter<u64>,
    /// Random values handed out by the flights endpoint, tagged by airline.
    pub random_ints: Histogram<u64>,
}

impl Instruments {
    pub fn new(meter: &Meter) -> Self {
        Self {
            root_requests: create_counter(
                meter,
                ROOT_REQUEST_COUNTER,
                "Counts the number of requests to the root endpoint",
                "1",
            ),
            random_ints: create_histogram(
                meter,
                RANDOM_INT_HISTOGRAM,
                "Records the random int generated in the /flights endpoint",
                "1",
            ),
        }
    }

    pub fn record_root_request(&self) {
        self.root_requests.add(1, &[]);
    }

    pub fn record_random_int(&self, value: u64, airline: &str) {
        self.random_ints
            .record(value, &[KeyValue::new("airline", airline.to_string())]);
    }
}
