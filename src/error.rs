// SPDX-License-Identifier: MIT
//! Handler error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Errors a request handler can return.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Deliberate failure requested through the `err=raise` path segment.
    #[error("Raise test exception")]
    SimulatedFailure,

    #[error("invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: u64, max: u64 },
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::SimulatedFailure => "simulated_failure",
            AppError::InvalidRange { .. } => "invalid_range",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Runs inside the request span; the ERROR event marks that span as failed.
        tracing::error!(
            error = &self as &(dyn std::error::Error + 'static),
            error.kind = self.kind(),
            "request failed"
        );
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "Internal Server Error",
            }),
        )
            .into_response()
    }
}
