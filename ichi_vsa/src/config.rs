//! Engine configuration
//!
//! Every engine takes its configuration explicitly; defaults follow the
//! classic Ichimoku (9, 26, 52, 26) and VSA (20, 1.5, 0.7) settings. All
//! structs deserialize with `#[serde(default)]`, so a JSON document only
//! needs the fields it overrides.

use crate::{IchiVsaError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Ichimoku periods and displacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IchimokuConfig {
    /// Tenkan-sen (conversion line) window
    pub tenkan_period: usize,
    /// Kijun-sen (base line) window
    pub kijun_period: usize,
    /// Senkou Span B window
    pub senkou_b_period: usize,
    /// Bars the leading spans are shifted forward and the lagging span back
    pub displacement: usize,
}

impl Default for IchimokuConfig {
    fn default() -> Self {
        Self {
            tenkan_period: 9,
            kijun_period: 26,
            senkou_b_period: 52,
            displacement: 26,
        }
    }
}

impl IchimokuConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("tenkan_period", self.tenkan_period),
            ("kijun_period", self.kijun_period),
            ("senkou_b_period", self.senkou_b_period),
            ("displacement", self.displacement),
        ] {
            if value == 0 {
                return Err(IchiVsaError::InvalidParameter(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Longest rolling window of the three lines
    pub fn max_period(&self) -> usize {
        self.tenkan_period
            .max(self.kijun_period)
            .max(self.senkou_b_period)
    }

    /// Bars needed before every Ichimoku sub-signal is defined on the last bar
    pub fn min_bars(&self) -> usize {
        self.max_period() + self.displacement
    }
}

/// Volume Spread Analysis thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VsaConfig {
    /// Window of the volume and spread baselines
    pub volume_ma_period: usize,
    /// Relative volume at or above this is high volume
    pub high_volume_factor: f64,
    /// Relative volume at or below this is low volume
    pub low_volume_factor: f64,
}

impl Default for VsaConfig {
    fn default() -> Self {
        Self {
            volume_ma_period: 20,
            high_volume_factor: 1.5,
            low_volume_factor: 0.7,
        }
    }
}

impl VsaConfig {
    pub fn validate(&self) -> Result<()> {
        if self.volume_ma_period == 0 {
            return Err(IchiVsaError::InvalidParameter(
                "volume_ma_period must be greater than zero".to_string(),
            ));
        }

        if !self.low_volume_factor.is_finite() || self.low_volume_factor <= 0.0 {
            return Err(IchiVsaError::InvalidParameter(
                "low_volume_factor must be positive".to_string(),
            ));
        }

        if !self.high_volume_factor.is_finite()
            || self.high_volume_factor <= self.low_volume_factor
        {
            return Err(IchiVsaError::InvalidParameter(format!(
                "high_volume_factor ({}) must exceed low_volume_factor ({})",
                self.high_volume_factor, self.low_volume_factor
            )));
        }

        Ok(())
    }
}

/// Weight each confirming sub-signal contributes to the fused count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationWeights {
    pub tk_cross: u32,
    pub price_vs_cloud: u32,
    pub cloud_color: u32,
    pub vsa: u32,
}

impl Default for ConfirmationWeights {
    fn default() -> Self {
        Self {
            tk_cross: 1,
            price_vs_cloud: 1,
            cloud_color: 1,
            vsa: 1,
        }
    }
}

impl ConfirmationWeights {
    pub fn total(&self) -> u64 {
        [self.tk_cross, self.price_vs_cloud, self.cloud_color, self.vsa]
            .iter()
            .map(|&w| u64::from(w))
            .sum()
    }

    pub fn validate(&self) -> Result<()> {
        if self.total() == 0 {
            return Err(IchiVsaError::InvalidParameter(
                "At least one confirmation weight must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete configuration of the fused engine
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IchiVsaConfig {
    pub ichimoku: IchimokuConfig,
    pub vsa: VsaConfig,
    pub weights: ConfirmationWeights,
}

impl IchiVsaConfig {
    pub fn validate(&self) -> Result<()> {
        self.ichimoku.validate()?;
        self.vsa.validate()?;
        self.weights.validate()
    }

    /// Bars needed before the last bar of a series leaves the warm-up window
    pub fn min_bars(&self) -> usize {
        self.ichimoku.min_bars().max(self.vsa.volume_ma_period)
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
