//! Volume Spread Analysis (VSA) engine
//!
//! VSA reads professional activity from how a bar's volume and range
//! compare with recent bars:
//! - High volume on a down bar: selling climax (wide range) or stopping
//!   volume (narrow range), both absorbing supply
//! - High volume on an up bar that closes off its high, or on a narrow
//!   range: buying climax or weakness
//! - Low volume on a narrow range: no demand / no supply
//!
//! Relative values are ratios to a rolling mean over `volume_ma_period` bars.

use crate::config::VsaConfig;
use crate::series::Series;
use crate::{Polarity, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use trade_math::{ratio_to_baseline, rolling_mean};

/// Whether a bar closed at or above its open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarDirection {
    Up,
    Down,
}

impl BarDirection {
    pub fn of(open: f64, close: f64) -> Self {
        if close >= open {
            BarDirection::Up
        } else {
            BarDirection::Down
        }
    }
}

/// The values a bar is classified by
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarFeatures {
    pub direction: BarDirection,
    /// High minus low
    pub spread: f64,
    /// Volume over the rolling mean volume
    pub relative_volume: Option<f64>,
    /// Spread over the rolling mean spread; `None` for a zero-range bar
    pub relative_spread: Option<f64>,
    /// 0 at the low, 1 at the high; `None` for a zero-range bar
    pub close_location: Option<f64>,
}

/// VSA bar patterns, listed in classification priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VsaPattern {
    SellingClimax,
    StoppingVolume,
    BuyingClimax,
    Weakness,
    NoDemand,
    NoSupply,
    /// No pattern matched
    NoPattern,
}

impl VsaPattern {
    /// Candidate patterns in the order they are tried; the first match wins
    pub const PRIORITY: [VsaPattern; 6] = [
        VsaPattern::SellingClimax,
        VsaPattern::StoppingVolume,
        VsaPattern::BuyingClimax,
        VsaPattern::Weakness,
        VsaPattern::NoDemand,
        VsaPattern::NoSupply,
    ];

    /// Classify a bar, `NoPattern` when nothing matches
    pub fn classify(features: &BarFeatures, config: &VsaConfig) -> Self {
        Self::PRIORITY
            .into_iter()
            .find(|pattern| pattern.matches(features, config))
            .unwrap_or(VsaPattern::NoPattern)
    }

    /// Whether this pattern's conditions hold; a missing input never matches
    pub fn matches(&self, features: &BarFeatures, config: &VsaConfig) -> bool {
        let Some(relative_volume) = features.relative_volume else {
            return false;
        };
        let high_volume = relative_volume >= config.high_volume_factor;
        let low_volume = relative_volume <= config.low_volume_factor;
        let wide = features.relative_spread.map_or(false, |rs| rs >= 1.0);
        let narrow = features.relative_spread.map_or(false, |rs| rs < 1.0);
        let closes_off_high = features.close_location.map_or(false, |cl| cl < 0.5);
        let up = features.direction == BarDirection::Up;
        let down = features.direction == BarDirection::Down;

        match self {
            VsaPattern::SellingClimax => down && high_volume && wide,
            VsaPattern::StoppingVolume => down && high_volume && narrow,
            VsaPattern::BuyingClimax => up && high_volume && closes_off_high,
            VsaPattern::Weakness => up && high_volume && narrow,
            VsaPattern::NoDemand => down && low_volume && narrow,
            VsaPattern::NoSupply => up && low_volume && narrow,
            VsaPattern::NoPattern => false,
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            VsaPattern::SellingClimax
            | VsaPattern::StoppingVolume
            | VsaPattern::NoDemand
            | VsaPattern::NoSupply => Polarity::Bullish,
            VsaPattern::BuyingClimax | VsaPattern::Weakness => Polarity::Bearish,
            VsaPattern::NoPattern => Polarity::Neutral,
        }
    }
}

impl fmt::Display for VsaPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VsaPattern::SellingClimax => "Selling Climax",
            VsaPattern::StoppingVolume => "Stopping Volume",
            VsaPattern::BuyingClimax => "Buying Climax",
            VsaPattern::Weakness => "Weakness",
            VsaPattern::NoDemand => "No Demand",
            VsaPattern::NoSupply => "No Supply",
            VsaPattern::NoPattern => "None",
        };
        write!(f, "{}", label)
    }
}

/// Classified pattern for one bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VsaSignal {
    pub pattern: VsaPattern,
    pub polarity: Polarity,
    /// Whether the volume and spread baselines were full for this bar
    pub baseline_ready: bool,
}

/// VSA measurements for a whole series
#[derive(Debug, Clone)]
pub struct VsaOutput {
    spread: Vec<f64>,
    avg_volume: Vec<Option<f64>>,
    avg_spread: Vec<Option<f64>>,
    relative_volume: Vec<Option<f64>>,
    relative_spread: Vec<Option<f64>>,
    close_location: Vec<Option<f64>>,
    direction: Vec<BarDirection>,
}

impl VsaOutput {
    pub fn len(&self) -> usize {
        self.spread.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spread.is_empty()
    }

    pub fn spread(&self) -> &[f64] {
        &self.spread
    }

    pub fn avg_volume(&self) -> &[Option<f64>] {
        &self.avg_volume
    }

    pub fn avg_spread(&self) -> &[Option<f64>] {
        &self.avg_spread
    }

    pub fn relative_volume(&self) -> &[Option<f64>] {
        &self.relative_volume
    }

    pub fn relative_spread(&self) -> &[Option<f64>] {
        &self.relative_spread
    }

    pub fn close_location(&self) -> &[Option<f64>] {
        &self.close_location
    }

    pub fn direction(&self) -> &[BarDirection] {
        &self.direction
    }

    /// Whether both rolling baselines are populated at `row`
    pub fn baseline_ready(&self, row: usize) -> bool {
        matches!(
            (self.avg_volume.get(row), self.avg_spread.get(row)),
            (Some(Some(_)), Some(Some(_)))
        )
    }

    pub fn features(&self, row: usize) -> Option<BarFeatures> {
        Some(BarFeatures {
            direction: *self.direction.get(row)?,
            spread: self.spread[row],
            relative_volume: self.relative_volume[row],
            relative_spread: self.relative_spread[row],
            close_location: self.close_location[row],
        })
    }
}

/// Volume Spread Analysis calculator
#[derive(Debug, Clone, Default)]
pub struct Vsa {
    config: VsaConfig,
}

impl Vsa {
    pub fn new(config: VsaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &VsaConfig {
        &self.config
    }

    /// Calculate spread, baselines and relative measures for every bar
    pub fn calculate(&self, series: &Series) -> Result<VsaOutput> {
        debug!(bars = series.len(), config = ?self.config, "calculating vsa measures");

        let period = self.config.volume_ma_period;
        let volume = series.volumes();
        let spread: Vec<f64> = series.bars().iter().map(|b| b.data.spread()).collect();

        let avg_volume = rolling_mean(&volume, period)?;
        let avg_spread = rolling_mean(&spread, period)?;
        let relative_volume = ratio_to_baseline(&volume, &avg_volume)?;

        // A zero-range bar has no meaningful relative spread or close location
        let relative_spread = ratio_to_baseline(&spread, &avg_spread)?
            .into_iter()
            .zip(&spread)
            .map(|(ratio, &s)| if s > 0.0 { ratio } else { None })
            .collect();

        let close_location = series
            .bars()
            .iter()
            .map(|b| {
                let spread = b.data.spread();
                (spread > 0.0).then(|| (b.data.close - b.data.low) / spread)
            })
            .collect();

        let direction = series
            .bars()
            .iter()
            .map(|b| BarDirection::of(b.data.open, b.data.close))
            .collect();

        Ok(VsaOutput {
            spread,
            avg_volume,
            avg_spread,
            relative_volume,
            relative_spread,
            close_location,
            direction,
        })
    }

    /// Classify every bar into a pattern and polarity
    pub fn get_signals(&self, output: &VsaOutput) -> Vec<VsaSignal> {
        (0..output.len())
            .filter_map(|row| {
                let features = output.features(row)?;
                let pattern = VsaPattern::classify(&features, &self.config);
                Some(VsaSignal {
                    pattern,
                    polarity: pattern.polarity(),
                    baseline_ready: output.baseline_ready(row),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(
        direction: BarDirection,
        relative_volume: f64,
        relative_spread: f64,
        close_location: f64,
    ) -> BarFeatures {
        BarFeatures {
            direction,
            spread: 1.0,
            relative_volume: Some(relative_volume),
            relative_spread: Some(relative_spread),
            close_location: Some(close_location),
        }
    }

    fn classify(f: BarFeatures) -> VsaPattern {
        VsaPattern::classify(&f, &VsaConfig::default())
    }

    #[test]
    fn test_stopping_volume() {
        let pattern = classify(features(BarDirection::Down, 2.0, 0.6, 0.5));
        assert_eq!(pattern, VsaPattern::StoppingVolume);
        assert_eq!(pattern.polarity(), Polarity::Bullish);
    }

    #[test]
    fn test_selling_climax_outranks_stopping_volume() {
        assert_eq!(
            classify(features(BarDirection::Down, 1.5, 1.0, 0.1)),
            VsaPattern::SellingClimax
        );
    }

    #[test]
    fn test_buying_climax_regardless_of_spread() {
        for spread in [0.3, 1.0, 2.5] {
            let pattern = classify(features(BarDirection::Up, 2.0, spread, 0.2));
            assert_eq!(pattern, VsaPattern::BuyingClimax);
            assert_eq!(pattern.polarity(), Polarity::Bearish);
        }
    }

    #[test]
    fn test_weakness_when_close_near_high() {
        assert_eq!(
            classify(features(BarDirection::Up, 2.0, 0.5, 0.8)),
            VsaPattern::Weakness
        );
        // Wide up bar closing high on big volume matches nothing
        assert_eq!(
            classify(features(BarDirection::Up, 2.0, 1.4, 0.8)),
            VsaPattern::NoPattern
        );
    }

    #[test]
    fn test_low_volume_patterns() {
        assert_eq!(
            classify(features(BarDirection::Down, 0.7, 0.5, 0.5)),
            VsaPattern::NoDemand
        );
        assert_eq!(
            classify(features(BarDirection::Up, 0.5, 0.5, 0.5)),
            VsaPattern::NoSupply
        );
        assert_eq!(
            classify(features(BarDirection::Up, 0.5, 1.2, 0.5)),
            VsaPattern::NoPattern
        );
    }

    #[test]
    fn test_average_volume_matches_nothing() {
        for direction in [BarDirection::Up, BarDirection::Down] {
            assert_eq!(
                classify(features(direction, 1.0, 0.5, 0.1)),
                VsaPattern::NoPattern
            );
        }
    }

    #[test]
    fn test_missing_inputs_never_match() {
        let f = BarFeatures {
            direction: BarDirection::Down,
            spread: 0.0,
            relative_volume: None,
            relative_spread: Some(0.5),
            close_location: Some(0.5),
        };
        assert_eq!(classify(f), VsaPattern::NoPattern);

        let f = BarFeatures {
            relative_volume: Some(3.0),
            relative_spread: None,
            close_location: None,
            direction: BarDirection::Up,
            ..f
        };
        assert_eq!(classify(f), VsaPattern::NoPattern);
    }

    #[test]
    fn test_labels() {
        assert_eq!(VsaPattern::NoDemand.to_string(), "No Demand");
        assert_eq!(VsaPattern::NoPattern.to_string(), "None");
        assert_eq!(VsaPattern::NoPattern.polarity(), Polarity::Neutral);
    }

    #[test]
    fn test_direction_ties_are_up() {
        assert_eq!(BarDirection::of(10.0, 10.0), BarDirection::Up);
        assert_eq!(BarDirection::of(10.0, 9.9), BarDirection::Down);
    }
}
