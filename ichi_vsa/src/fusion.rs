//! Fusion of Ichimoku and VSA into a single signal
//!
//! Each bar collects up to four confirmations: tk_cross, price_vs_cloud,
//! cloud_color and the VSA pattern polarity. Bullish and bearish
//! confirmations are summed with their weights and the net decides the
//! level:
//!
//! | net confirmations              | signal                             |
//! |--------------------------------|------------------------------------|
//! | 0                              | Neutral                            |
//! | > 0, below 3/4 of total weight | Buy                                |
//! | >= 3/4 of total weight         | Strong Buy (unless VSA is bearish) |
//!
//! and symmetrically for sells. With the default unit weights that is
//! 1-2 net confirmations for Buy/Sell and 3-4 for Strong Buy/Strong Sell.

use crate::config::IchiVsaConfig;
use crate::ichimoku::{Ichimoku, IchimokuRow, IchimokuSignals, ProjectedCloud};
use crate::series::Series;
use crate::vsa::{BarFeatures, Vsa, VsaPattern, VsaSignal};
use crate::{CloudPosition, IchiVsaError, Polarity, Result, Signal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Weighted confirmation counts for one bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Confirmations {
    pub bullish: u64,
    pub bearish: u64,
}

impl Confirmations {
    pub fn net(&self) -> i128 {
        i128::from(self.bullish) - i128::from(self.bearish)
    }

    /// |bullish - bearish|
    pub fn strength(&self) -> u64 {
        self.bullish.abs_diff(self.bearish)
    }

    fn add(&mut self, polarity: Polarity, weight: u32) {
        match polarity {
            Polarity::Bullish => self.bullish += u64::from(weight),
            Polarity::Bearish => self.bearish += u64::from(weight),
            Polarity::Neutral => {}
        }
    }
}

/// Fused result for one bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionRow {
    pub timestamp: DateTime<Utc>,
    pub ichimoku: IchimokuRow,
    pub ichimoku_signals: IchimokuSignals,
    pub vsa: BarFeatures,
    pub vsa_signal: VsaSignal,
    /// `None` while the bar is inside the warm-up window
    pub confirmations: Option<Confirmations>,
    pub signal: Signal,
    pub signal_strength: u64,
}

/// Number of bars at each signal level
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SignalDistribution {
    pub counts: BTreeMap<Signal, usize>,
    /// Bars without confirmations
    pub warm_up: usize,
}

impl SignalDistribution {
    pub fn count(&self, signal: Signal) -> usize {
        self.counts.get(&signal).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Fused table for a whole series
#[derive(Debug, Clone)]
pub struct FusionOutput {
    rows: Vec<FusionRow>,
    projected_cloud: Vec<ProjectedCloud>,
}

impl FusionOutput {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[FusionRow] {
        &self.rows
    }

    pub fn last(&self) -> Option<&FusionRow> {
        self.rows.last()
    }

    /// Ichimoku cloud plotted beyond the last bar
    pub fn projected_cloud(&self) -> &[ProjectedCloud] {
        &self.projected_cloud
    }

    pub fn distribution(&self) -> SignalDistribution {
        let mut distribution = SignalDistribution {
            counts: Signal::ALL.iter().map(|&s| (s, 0)).collect(),
            warm_up: 0,
        };

        for row in &self.rows {
            *distribution.counts.entry(row.signal).or_insert(0) += 1;
            if row.confirmations.is_none() {
                distribution.warm_up += 1;
            }
        }

        distribution
    }
}

/// Ichimoku part of a latest-signal report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestIchimoku {
    pub tenkan: Option<f64>,
    pub kijun: Option<f64>,
    pub senkou_span_a: Option<f64>,
    pub senkou_span_b: Option<f64>,
    pub tk_cross: Option<Polarity>,
    pub tk_crossover: Option<Polarity>,
    pub price_vs_cloud: Option<CloudPosition>,
    pub cloud_color: Option<Polarity>,
    pub price_vs_kijun: Option<Polarity>,
}

/// VSA part of a latest-signal report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestVsa {
    pub pattern: VsaPattern,
    pub polarity: Polarity,
    pub relative_volume: Option<f64>,
    pub relative_spread: Option<f64>,
    pub close_location: Option<f64>,
}

/// Report for the most recent bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestSignal {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub signal: Signal,
    pub signal_strength: u64,
    pub confirmations: Option<Confirmations>,
    pub ichimoku: LatestIchimoku,
    pub vsa: LatestVsa,
}

impl From<&FusionRow> for LatestSignal {
    fn from(row: &FusionRow) -> Self {
        Self {
            timestamp: row.timestamp,
            close: row.ichimoku.close,
            signal: row.signal,
            signal_strength: row.signal_strength,
            confirmations: row.confirmations,
            ichimoku: LatestIchimoku {
                tenkan: row.ichimoku.tenkan,
                kijun: row.ichimoku.kijun,
                senkou_span_a: row.ichimoku.senkou_span_a,
                senkou_span_b: row.ichimoku.senkou_span_b,
                tk_cross: row.ichimoku_signals.tk_cross,
                tk_crossover: row.ichimoku_signals.tk_crossover,
                price_vs_cloud: row.ichimoku_signals.price_vs_cloud,
                cloud_color: row.ichimoku_signals.cloud_color,
                price_vs_kijun: row.ichimoku_signals.price_vs_kijun,
            },
            vsa: LatestVsa {
                pattern: row.vsa_signal.pattern,
                polarity: row.vsa_signal.polarity,
                relative_volume: row.vsa.relative_volume,
                relative_spread: row.vsa.relative_spread,
                close_location: row.vsa.close_location,
            },
        }
    }
}

/// Combined Ichimoku and VSA indicator
#[derive(Debug, Clone, Default)]
pub struct IchiVsa {
    config: IchiVsaConfig,
    ichimoku: Ichimoku,
    vsa: Vsa,
}

impl IchiVsa {
    pub fn new(config: IchiVsaConfig) -> Result<Self> {
        config.weights.validate()?;

        Ok(Self {
            config,
            ichimoku: Ichimoku::new(config.ichimoku)?,
            vsa: Vsa::new(config.vsa)?,
        })
    }

    pub fn ichimoku(&self) -> &Ichimoku {
        &self.ichimoku
    }

    pub fn vsa(&self) -> &Vsa {
        &self.vsa
    }

    pub fn config(&self) -> &IchiVsaConfig {
        &self.config
    }

    /// Run both engines and fuse their outputs bar by bar
    pub fn analyze(&self, series: &Series) -> Result<FusionOutput> {
        let min_bars = self.config.min_bars();
        if !series.is_empty() && series.len() < min_bars {
            warn!(
                bars = series.len(),
                min_bars,
                "series is shorter than the warm-up window; latest bars have no confirmations"
            );
        }

        let ichimoku = self.ichimoku.calculate(series)?;
        let ichimoku_signals = self.ichimoku.get_signals(&ichimoku);
        let vsa = self.vsa.calculate(series)?;
        let vsa_signals = self.vsa.get_signals(&vsa);

        // Every engine column is indexed like the series; a missing row is an error
        let rows = series
            .bars()
            .iter()
            .enumerate()
            .map(|(index, bar)| {
                let misaligned = || {
                    IchiVsaError::InputShape(format!(
                        "engine outputs do not cover row {} of {}",
                        index,
                        series.len()
                    ))
                };
                let ichimoku_row = ichimoku.row(index).ok_or_else(misaligned)?;
                let signals = *ichimoku_signals.get(index).ok_or_else(misaligned)?;
                let features = vsa.features(index).ok_or_else(misaligned)?;
                let vsa_signal = *vsa_signals.get(index).ok_or_else(misaligned)?;

                let (confirmations, signal) = self.fuse(&signals, &vsa_signal);
                Ok(FusionRow {
                    timestamp: bar.timestamp,
                    ichimoku: ichimoku_row,
                    ichimoku_signals: signals,
                    vsa: features,
                    vsa_signal,
                    confirmations,
                    signal,
                    signal_strength: confirmations.map_or(0, |c| c.strength()),
                })
            })
            .collect::<Result<Vec<FusionRow>>>()?;

        debug!(
            bars = rows.len(),
            confirmed = rows.iter().filter(|r| r.confirmations.is_some()).count(),
            "fused ichimoku and vsa signals"
        );

        Ok(FusionOutput {
            rows,
            projected_cloud: ichimoku.projected_cloud(),
        })
    }

    /// Count confirmations for one bar and map them to a signal level
    ///
    /// Returns `None` confirmations and `Neutral` while any input is still
    /// warming up.
    pub fn fuse(
        &self,
        ichimoku: &IchimokuSignals,
        vsa: &VsaSignal,
    ) -> (Option<Confirmations>, Signal) {
        let (Some(tk_cross), Some(price_vs_cloud), Some(cloud_color)) =
            (ichimoku.tk_cross, ichimoku.price_vs_cloud, ichimoku.cloud_color)
        else {
            return (None, Signal::Neutral);
        };
        if !vsa.baseline_ready {
            return (None, Signal::Neutral);
        }

        let mut confirmations = Confirmations::default();
        confirmations.add(tk_cross, self.config.weights.tk_cross);
        confirmations.add(price_vs_cloud.polarity(), self.config.weights.price_vs_cloud);
        confirmations.add(cloud_color, self.config.weights.cloud_color);
        confirmations.add(vsa.polarity, self.config.weights.vsa);

        let signal = self.level(&confirmations, vsa.polarity);
        (Some(confirmations), signal)
    }

    fn level(&self, confirmations: &Confirmations, vsa: Polarity) -> Signal {
        let strength = u128::from(confirmations.strength());
        let strong = 4 * strength >= 3 * u128::from(self.config.weights.total());

        match confirmations.net().signum() {
            1 if strong && vsa != Polarity::Bearish => Signal::StrongBuy,
            1 => Signal::Buy,
            -1 if strong && vsa != Polarity::Bullish => Signal::StrongSell,
            -1 => Signal::Sell,
            _ => Signal::Neutral,
        }
    }

    /// Fused result for the last bar of the series
    pub fn get_latest_signal(&self, series: &Series) -> Result<LatestSignal> {
        if series.is_empty() {
            return Err(IchiVsaError::EmptySeries);
        }

        let output = self.analyze(series)?;
        output
            .last()
            .map(LatestSignal::from)
            .ok_or(IchiVsaError::EmptySeries)
    }
}
