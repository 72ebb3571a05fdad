//! Rolling extrema implementations
//!
//! Sliding-window maximum and minimum backed by a monotonic deque, so each
//! update is amortized O(1). The donchian midpoint built on top of them is
//! the basis of every Ichimoku line.

use crate::{validate_period, MathError, Result};
use std::collections::VecDeque;

/// Which extreme a [`RollingExtremum`] tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Max,
    Min,
}

/// Rolling maximum or minimum over a fixed window
#[derive(Debug, Clone)]
pub struct RollingExtremum {
    period: usize,
    kind: Extreme,
    /// (position, value) pairs, values monotonic from front to back
    candidates: VecDeque<(usize, f64)>,
    seen: usize,
}

impl RollingExtremum {
    /// Create a rolling maximum over the specified period
    pub fn max(period: usize) -> Result<Self> {
        Self::new(period, Extreme::Max)
    }

    /// Create a rolling minimum over the specified period
    pub fn min(period: usize) -> Result<Self> {
        Self::new(period, Extreme::Min)
    }

    fn new(period: usize, kind: Extreme) -> Result<Self> {
        validate_period(period)?;

        Ok(Self {
            period,
            kind,
            candidates: VecDeque::with_capacity(period),
            seen: 0,
        })
    }

    /// Update the window with a new value
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "Extremum input must be finite, got {}",
                value
            )));
        }

        let position = self.seen;
        self.seen += 1;

        // Drop candidates the new value dominates; ties keep the newer one
        while let Some(&(_, back)) = self.candidates.back() {
            let dominated = match self.kind {
                Extreme::Max => back <= value,
                Extreme::Min => back >= value,
            };
            if !dominated {
                break;
            }
            self.candidates.pop_back();
        }
        self.candidates.push_back((position, value));

        while let Some(&(front_position, _)) = self.candidates.front() {
            if front_position + self.period > position {
                break;
            }
            self.candidates.pop_front();
        }

        Ok(())
    }

    /// Get the extreme of the current window
    pub fn value(&self) -> Result<f64> {
        if self.seen < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for rolling {:?}. Need {} values, have {}.",
                self.kind, self.period, self.seen
            )));
        }

        self.candidates
            .front()
            .map(|&(_, value)| value)
            .ok_or_else(|| MathError::CalculationError("Extremum window is empty".to_string()))
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the window, clearing all values
    pub fn reset(&mut self) {
        self.candidates.clear();
        self.seen = 0;
    }
}

fn rolling_extreme(values: &[f64], period: usize, kind: Extreme) -> Result<Vec<Option<f64>>> {
    let mut window = RollingExtremum::new(period, kind)?;
    let mut result = Vec::with_capacity(values.len());

    for &value in values {
        window.update(value)?;
        result.push(window.value().ok());
    }

    Ok(result)
}

/// Rolling maximum over `period` values ending at each index
pub fn rolling_max(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    rolling_extreme(values, period, Extreme::Max)
}

/// Rolling minimum over `period` values ending at each index
pub fn rolling_min(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    rolling_extreme(values, period, Extreme::Min)
}

/// Donchian midpoint: (highest high + lowest low) / 2 over each window
pub fn rolling_midpoint(high: &[f64], low: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    if high.len() != low.len() {
        return Err(MathError::InvalidInput(format!(
            "High and low must be the same length ({} vs {})",
            high.len(),
            low.len()
        )));
    }

    let highest = rolling_max(high, period)?;
    let lowest = rolling_min(low, period)?;

    Ok(highest
        .into_iter()
        .zip(lowest)
        .map(|(hh, ll)| Some((hh? + ll?) / 2.0))
        .collect())
}
