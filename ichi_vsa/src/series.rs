//! Validated OHLCV series
//!
//! A [`Series`] can only be built from bars that pass the input contract, so
//! the engines never have to re-check shape or price sanity.

use crate::{IchiVsaError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents OHLCV (Open, High, Low, Close, Volume) data for one bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcvData {
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: f64,
}

impl OhlcvData {
    /// High minus low
    pub fn spread(&self) -> f64 {
        self.high - self.low
    }
}

/// One OHLCV bar with its timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Timestamp of the bar
    pub timestamp: DateTime<Utc>,
    /// OHLCV data
    pub data: OhlcvData,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            data: OhlcvData {
                open,
                high,
                low,
                close,
                volume,
            },
        }
    }

    fn validate(&self, row: usize) -> Result<()> {
        let d = &self.data;

        for (name, price) in [
            ("open", d.open),
            ("high", d.high),
            ("low", d.low),
            ("close", d.close),
        ] {
            if !price.is_finite() || price <= 0.0 {
                return Err(IchiVsaError::InputShape(format!(
                    "Row {}: {} price must be positive and finite, got {}",
                    row, name, price
                )));
            }
        }

        if !d.volume.is_finite() || d.volume < 0.0 {
            return Err(IchiVsaError::InputShape(format!(
                "Row {}: volume must be non-negative and finite, got {}",
                row, d.volume
            )));
        }

        if d.high < d.open.max(d.close).max(d.low) {
            return Err(IchiVsaError::InputShape(format!(
                "Row {}: high {} is below open/close/low",
                row, d.high
            )));
        }

        if d.low > d.open.min(d.close).min(d.high) {
            return Err(IchiVsaError::InputShape(format!(
                "Row {}: low {} is above open/close/high",
                row, d.low
            )));
        }

        Ok(())
    }
}

/// An immutable, time-ordered sequence of validated bars
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    /// Build a series, failing fast on malformed bars or a non-monotonic index
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        for (row, bar) in bars.iter().enumerate() {
            bar.validate(row)?;
        }

        for (row, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(IchiVsaError::InputShape(format!(
                    "Row {}: timestamp {} does not strictly follow {}",
                    row + 1,
                    pair[1].timestamp,
                    pair[0].timestamp
                )));
            }
        }

        Ok(Self { bars })
    }

    /// A series with no bars
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.column(|d| d.high)
    }

    pub fn lows(&self) -> Vec<f64> {
        self.column(|d| d.low)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.column(|d| d.close)
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.column(|d| d.volume)
    }

    fn column(&self, field: impl Fn(&OhlcvData) -> f64) -> Vec<f64> {
        self.bars.iter().map(|b| field(&b.data)).collect()
    }
}

impl TryFrom<Vec<Bar>> for Series {
    type Error = IchiVsaError;

    fn try_from(bars: Vec<Bar>) -> Result<Self> {
        Series::new(bars)
    }
}
