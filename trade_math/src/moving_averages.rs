//! Moving average calculation implementations
//!
//! Contains the simple moving average used for the volume and spread
//! baselines, both as a streaming accumulator and as a column helper.

use crate::{validate_period, MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
///
/// The running sum is Neumaier-compensated. A window holding only zeros
/// averages to exactly 0.0.
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
    compensation: f64,
    non_zero: usize,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        validate_period(period)?;

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period + 1),
            sum: 0.0,
            compensation: 0.0,
            non_zero: 0,
        })
    }

    fn accumulate(&mut self, value: f64) {
        let total = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - total) + value;
        } else {
            self.compensation += (value - total) + self.sum;
        }
        self.sum = total;
    }

    /// Update the SMA with a new value
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "SMA input must be finite, got {}",
                value
            )));
        }

        self.values.push_back(value);
        self.accumulate(value);
        if value != 0.0 {
            self.non_zero += 1;
        }

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.accumulate(-old_value);
                if old_value != 0.0 {
                    self.non_zero -= 1;
                }
            }
        }

        if self.non_zero == 0 {
            self.sum = 0.0;
            self.compensation = 0.0;
        }

        Ok(())
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if self.values.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        if self.non_zero == 0 {
            return Ok(0.0);
        }
        Ok((self.sum + self.compensation) / self.period as f64)
    }

    /// Whether the window holds a full period of values
    pub fn is_ready(&self) -> bool {
        self.values.len() >= self.period
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the SMA, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
        self.sum = 0.0;
        self.compensation = 0.0;
        self.non_zero = 0;
    }
}

/// Rolling mean over `period` values ending at each index.
///
/// The output has the same length as `values`; the first `period - 1`
/// entries are `None`.
pub fn rolling_mean(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SimpleMovingAverage::new(period)?;
    let mut result = Vec::with_capacity(values.len());

    for &value in values {
        sma.update(value)?;
        result.push(sma.value().ok());
    }

    Ok(result)
}

/// Ratio of each value to its baseline, `None` where the baseline is
/// missing or zero.
pub fn ratio_to_baseline(values: &[f64], baseline: &[Option<f64>]) -> Result<Vec<Option<f64>>> {
    if values.len() != baseline.len() {
        return Err(MathError::InvalidInput(format!(
            "Values and baseline must be the same length ({} vs {})",
            values.len(),
            baseline.len()
        )));
    }

    Ok(values
        .iter()
        .zip(baseline)
        .map(|(&value, base)| match base {
            Some(base) if *base != 0.0 => Some(value / base),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_calculation() {
        let mut sma = SimpleMovingAverage::new(3).unwrap();

        assert!(sma.value().is_err());

        sma.update(2.0).unwrap();
        sma.update(4.0).unwrap();
        assert!(sma.value().is_err());
        assert!(!sma.is_ready());

        sma.update(6.0).unwrap();
        assert_eq!(sma.value().unwrap(), 4.0);

        // The window slides, dropping the oldest value
        sma.update(8.0).unwrap();
        assert_eq!(sma.value().unwrap(), 6.0);
    }

    #[test]
    fn test_sma_rejects_non_finite() {
        let mut sma = SimpleMovingAverage::new(2).unwrap();
        assert!(sma.update(f64::NAN).is_err());
        assert!(sma.update(f64::INFINITY).is_err());
    }

    #[test]
    fn test_sma_reset() {
        let mut sma = SimpleMovingAverage::new(1).unwrap();
        sma.update(5.0).unwrap();
        assert_eq!(sma.value().unwrap(), 5.0);
        sma.reset();
        assert!(sma.value().is_err());
    }

    #[test]
    fn test_rolling_mean_marks_warm_up_missing() {
        let means = rolling_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_eq!(means, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_rolling_mean_short_input() {
        let means = rolling_mean(&[1.0, 2.0], 5).unwrap();
        assert_eq!(means, vec![None, None]);
        assert!(rolling_mean(&[], 5).unwrap().is_empty());
    }

    #[test]
    fn test_zero_window_after_large_values_is_exact() {
        let values = [0.1, 0.2, 0.3, 0.7, 1e7, 3.3, 0.0, 0.0, 0.0, 0.0];
        let means = rolling_mean(&values, 4).unwrap();
        assert_eq!(means[9], Some(0.0));

        let ratios = ratio_to_baseline(&values, &means).unwrap();
        assert_eq!(ratios[9], None);
    }

    #[test]
    fn test_sliding_out_large_value_leaves_no_residue() {
        let mut sma = SimpleMovingAverage::new(2).unwrap();
        for value in [0.1, 1e16, 0.2, 0.3] {
            sma.update(value).unwrap();
        }
        // An uncompensated sum loses 0.2 and 0.3 against 1e16 and reports 0.0
        assert!((sma.value().unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_to_baseline_handles_zero() {
        let ratios = ratio_to_baseline(&[2.0, 3.0, 4.0], &[None, Some(0.0), Some(2.0)]).unwrap();
        assert_eq!(ratios, vec![None, None, Some(2.0)]);
    }

    #[test]
    fn test_ratio_to_baseline_length_mismatch() {
        assert!(ratio_to_baseline(&[1.0], &[]).is_err());
    }
}
