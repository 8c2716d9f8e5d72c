// SPDX-License-Identifier: MIT
//! Request handlers.
//!
//! Each async handler only extracts its inputs; the work (and its manual spans,
//! metrics and log lines) happens in the synchronous function it delegates to.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::{field, info, info_span};

use crate::error::AppError;
use crate::http::AppState;
use crate::random::generate_random_int;

pub const AIRLINES: [&str; 3] = ["AA", "UA", "DL"];

/// Path segment that makes a handler fail on purpose.
const RAISE: &str = "raise";

const FLIGHT_NUMBER_MIN: u64 = 100;
const FLIGHT_NUMBER_MAX: u64 = 999;

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Airlines {
    pub airlines: [&'static str; 3],
}

/// `{"<airline>": [N]}`
pub type Flights = BTreeMap<String, Vec<u64>>;

fn simulate_failure(err: Option<&str>) -> Result<(), AppError> {
    match err {
        Some(RAISE) => Err(AppError::SimulatedFailure),
        _ => Ok(()),
    }
}

/// `GET /`
pub async fn root(State(state): State<AppState>) -> Json<Message> {
    state.instruments.record_root_request();
    info!("Root endpoint accessed.");
    Json(Message { message: "ok" })
}

/// `GET /airlines/`
pub async fn airlines() -> Result<Json<Airlines>, AppError> {
    list_airlines(None)
}

/// `GET /airlines/{err}`
pub async fn airlines_with_err(Path(err): Path<String>) -> Result<Json<Airlines>, AppError> {
    list_airlines(Some(&err))
}

fn list_airlines(err: Option<&str>) -> Result<Json<Airlines>, AppError> {
    simulate_failure(err)?;
    info!("Airlines endpoint accessed.");
    Ok(Json(Airlines { airlines: AIRLINES }))
}

/// `GET /flights/{airline}`
pub async fn flights(
    State(state): State<AppState>,
    Path(airline): Path<String>,
) -> Result<Json<Flights>, AppError> {
    lookup_flights(&state, airline, None)
}

/// `GET /flights/{airline}/{err}`
pub async fn flights_with_err(
    State(state): State<AppState>,
    Path((airline, err)): Path<(String, String)>,
) -> Result<Json<Flights>, AppError> {
    lookup_flights(&state, airline, Some(&err))
}

/// Airline codes are not validated: any code gets a flight number.
fn lookup_flights(
    state: &AppState,
    airline: String,
    err: Option<&str>,
) -> Result<Json<Flights>, AppError> {
    simulate_failure(err)?;

    let random_int = {
        let span = info_span!(
            "generate_random_int",
            airline = %airline,
            random_int = field::Empty,
        );
        span.in_scope(|| {
            let value = generate_random_int(FLIGHT_NUMBER_MIN, FLIGHT_NUMBER_MAX)?;
            span.record("random_int", value);
            Ok::<_, AppError>(value)
        })?
    };

    state.instruments.record_random_int(random_int, &airline);
    info!(
        airline = %airline,
        random_int,
        "Flights endpoint accessed for airline {airline} with random int {random_int}."
    );

    Ok(Json(BTreeMap::from([(airline, vec![random_int])])))
}
