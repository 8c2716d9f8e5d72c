// SPDX-License-Identifier: MIT
//! Bounded random integers, each draw traced as its own span.

use rand::Rng;
use tracing::{field, instrument, Span};

use crate::error::AppError;

/// Return a uniformly distributed integer in `[min, max]`, inclusive.
///
/// Runs inside a `get_random_int` span tagged with the drawn `result`. Uses the
/// thread-local generator; not suitable for anything security related.
///
/// # Errors
/// [`AppError::InvalidRange`] when `min > max`.
#[instrument(name = "get_random_int", fields(result = field::Empty))]
pub fn generate_random_int(min: u64, max: u64) -> Result<u64, AppError> {
    if min > max {
        return Err(AppError::InvalidRange { min, max });
    }
    let result = rand::thread_rng().gen_range(min..=max);
    Span::current().record("result", result);
    Ok(result)
}
