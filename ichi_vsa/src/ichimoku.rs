//! Ichimoku Kinko Hyo engine
//!
//! The five Ichimoku components:
//! 1. Tenkan-sen (conversion line): midpoint of the `tenkan_period` high/low range
//! 2. Kijun-sen (base line): midpoint of the `kijun_period` high/low range
//! 3. Senkou Span A: (tenkan + kijun) / 2, plotted `displacement` bars ahead
//! 4. Senkou Span B: midpoint of the `senkou_b_period` range, plotted `displacement` bars ahead
//! 5. Chikou Span: close, plotted `displacement` bars back
//!
//! The leading spans and the close are stored undisplaced; [`Displaced`]
//! views relabel indices on read, so no column is ever shifted in place.

use crate::config::IchimokuConfig;
use crate::series::Series;
use crate::{CloudPosition, Polarity, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use trade_math::rolling_midpoint;

/// Direction of a displaced view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shift {
    /// Row `i` shows source value `i - n`
    Forward(usize),
    /// Row `i` shows source value `i + n`
    Backward(usize),
}

/// Read-only view of a column relabeled by a fixed offset
///
/// The view always has the length of the series. Rows whose source index
/// falls outside the column are missing.
#[derive(Debug, Clone, Copy)]
pub struct Displaced<'a, T> {
    source: &'a [T],
    shift: Shift,
    len: usize,
}

impl<'a, T> Displaced<'a, T>
where
    T: Copy + Into<Option<f64>>,
{
    fn new(source: &'a [T], shift: Shift) -> Self {
        Self {
            source,
            shift,
            len: source.len(),
        }
    }

    /// Value plotted at `row`
    pub fn get(&self, row: usize) -> Option<f64> {
        if row >= self.len {
            return None;
        }

        let index = match self.shift {
            Shift::Forward(n) => row.checked_sub(n)?,
            Shift::Backward(n) => row.checked_add(n)?,
        };

        self.source.get(index).and_then(|&value| value.into())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        (0..self.len).map(move |row| self.get(row))
    }

    pub fn to_vec(&self) -> Vec<Option<f64>> {
        self.iter().collect()
    }
}

/// Leading span values projected past the last bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedCloud {
    /// 1 for the bar right after the last one
    pub bars_ahead: usize,
    pub senkou_span_a: Option<f64>,
    pub senkou_span_b: Option<f64>,
}

/// All Ichimoku values plotted at one bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IchimokuRow {
    pub close: f64,
    pub tenkan: Option<f64>,
    pub kijun: Option<f64>,
    pub senkou_span_a: Option<f64>,
    pub senkou_span_b: Option<f64>,
    pub chikou: Option<f64>,
}

impl IchimokuRow {
    pub fn cloud_top(&self) -> Option<f64> {
        Some(self.senkou_span_a?.max(self.senkou_span_b?))
    }

    pub fn cloud_bottom(&self) -> Option<f64> {
        Some(self.senkou_span_a?.min(self.senkou_span_b?))
    }
}

/// Ichimoku lines for a whole series
#[derive(Debug, Clone)]
pub struct IchimokuOutput {
    close: Vec<f64>,
    tenkan: Vec<Option<f64>>,
    kijun: Vec<Option<f64>>,
    leading_a: Vec<Option<f64>>,
    leading_b: Vec<Option<f64>>,
    displacement: usize,
}

impl IchimokuOutput {
    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn displacement(&self) -> usize {
        self.displacement
    }

    pub fn tenkan(&self) -> &[Option<f64>] {
        &self.tenkan
    }

    pub fn kijun(&self) -> &[Option<f64>] {
        &self.kijun
    }

    /// Senkou Span A as computed at each bar, before displacement
    pub fn leading_span_a(&self) -> &[Option<f64>] {
        &self.leading_a
    }

    /// Senkou Span B as computed at each bar, before displacement
    pub fn leading_span_b(&self) -> &[Option<f64>] {
        &self.leading_b
    }

    pub fn senkou_span_a(&self) -> Displaced<'_, Option<f64>> {
        Displaced::new(&self.leading_a, Shift::Forward(self.displacement))
    }

    pub fn senkou_span_b(&self) -> Displaced<'_, Option<f64>> {
        Displaced::new(&self.leading_b, Shift::Forward(self.displacement))
    }

    pub fn chikou(&self) -> Displaced<'_, f64> {
        Displaced::new(&self.close, Shift::Backward(self.displacement))
    }

    /// Values plotted at `row`, `None` past the end of the series
    pub fn row(&self, row: usize) -> Option<IchimokuRow> {
        let close = *self.close.get(row)?;

        Some(IchimokuRow {
            close,
            tenkan: self.tenkan[row],
            kijun: self.kijun[row],
            senkou_span_a: self.senkou_span_a().get(row),
            senkou_span_b: self.senkou_span_b().get(row),
            chikou: self.chikou().get(row),
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = IchimokuRow> + '_ {
        (0..self.len()).filter_map(move |row| self.row(row))
    }

    /// The cloud computed from the last `displacement` bars, which plots
    /// beyond the end of the series
    pub fn projected_cloud(&self) -> Vec<ProjectedCloud> {
        let start = self.len().saturating_sub(self.displacement);

        (start..self.len())
            .map(|source| ProjectedCloud {
                bars_ahead: source + self.displacement + 1 - self.len(),
                senkou_span_a: self.leading_a[source],
                senkou_span_b: self.leading_b[source],
            })
            .collect()
    }
}

/// Rule-based sub-signals for one bar; `None` while inputs are missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IchimokuSignals {
    /// Tenkan relative to kijun
    pub tk_cross: Option<Polarity>,
    /// Bullish/bearish only on the bar where tenkan crosses kijun
    pub tk_crossover: Option<Polarity>,
    pub price_vs_cloud: Option<CloudPosition>,
    /// Senkou Span A relative to Senkou Span B
    pub cloud_color: Option<Polarity>,
    /// Close relative to kijun
    pub price_vs_kijun: Option<Polarity>,
}

impl IchimokuSignals {
    /// Whether the sub-signals used for confirmation are all available
    pub fn is_complete(&self) -> bool {
        self.tk_cross.is_some() && self.price_vs_cloud.is_some() && self.cloud_color.is_some()
    }
}

/// Ichimoku Kinko Hyo indicator calculator
#[derive(Debug, Clone, Default)]
pub struct Ichimoku {
    config: IchimokuConfig,
}

impl Ichimoku {
    pub fn new(config: IchimokuConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IchimokuConfig {
        &self.config
    }

    /// Calculate all five lines for the series
    pub fn calculate(&self, series: &Series) -> Result<IchimokuOutput> {
        debug!(bars = series.len(), config = ?self.config, "calculating ichimoku lines");

        let high = series.highs();
        let low = series.lows();

        let tenkan = rolling_midpoint(&high, &low, self.config.tenkan_period)?;
        let kijun = rolling_midpoint(&high, &low, self.config.kijun_period)?;
        let leading_b = rolling_midpoint(&high, &low, self.config.senkou_b_period)?;

        let leading_a = tenkan
            .iter()
            .zip(&kijun)
            .map(|(t, k)| Some((t.as_ref()? + k.as_ref()?) / 2.0))
            .collect();

        Ok(IchimokuOutput {
            close: series.closes(),
            tenkan,
            kijun,
            leading_a,
            leading_b,
            displacement: self.config.displacement,
        })
    }

    /// Derive the per-bar sub-signals from calculated lines
    pub fn get_signals(&self, output: &IchimokuOutput) -> Vec<IchimokuSignals> {
        let mut signals = Vec::with_capacity(output.len());
        let mut previous: Option<IchimokuRow> = None;

        for row in output.rows() {
            let tk_cross = match (row.tenkan, row.kijun) {
                (Some(t), Some(k)) => Some(Polarity::compare(t, k)),
                _ => None,
            };

            let tk_crossover = match (row.tenkan, row.kijun, previous) {
                (Some(t), Some(k), Some(prev)) => match (prev.tenkan, prev.kijun) {
                    (Some(pt), Some(pk)) => Some(if t > k && pt <= pk {
                        Polarity::Bullish
                    } else if t < k && pt >= pk {
                        Polarity::Bearish
                    } else {
                        Polarity::Neutral
                    }),
                    _ => None,
                },
                _ => None,
            };

            let price_vs_cloud = match (row.cloud_bottom(), row.cloud_top()) {
                (Some(bottom), Some(top)) => Some(CloudPosition::locate(row.close, bottom, top)),
                _ => None,
            };

            let cloud_color = match (row.senkou_span_a, row.senkou_span_b) {
                (Some(a), Some(b)) => Some(Polarity::compare(a, b)),
                _ => None,
            };

            let price_vs_kijun = row.kijun.map(|k| Polarity::compare(row.close, k));

            signals.push(IchimokuSignals {
                tk_cross,
                tk_crossover,
                price_vs_cloud,
                cloud_color,
                price_vs_kijun,
            });
            previous = Some(row);
        }

        signals
    }
}
