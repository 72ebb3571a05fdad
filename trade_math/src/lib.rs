//! # Trade Math
//!
//! Rolling-window primitives shared by the ICHI-VSA indicator engines.
//! Each primitive comes in two forms: a streaming accumulator with
//! `update`/`value`, and a column helper that maps a whole slice to a
//! `Vec<Option<f64>>` where `None` marks a window that is not yet full.

use thiserror::Error;

pub mod extrema;
pub mod moving_averages;

pub use extrema::{rolling_max, rolling_midpoint, rolling_min, RollingExtremum};
pub use moving_averages::{rolling_mean, ratio_to_baseline, SimpleMovingAverage};

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;

pub(crate) fn validate_period(period: usize) -> Result<()> {
    if period == 0 {
        return Err(MathError::InvalidInput(
            "Period must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
