//! # ICHI-VSA
//!
//! `ichi_vsa` combines two independent technical analyses of an OHLCV
//! (Open, High, Low, Close, Volume) series into one discrete trading signal:
//!
//! - **Ichimoku Kinko Hyo**: five lines derived from rolling highs and lows,
//!   giving trend, momentum and support/resistance (the "cloud").
//! - **Volume Spread Analysis (VSA)**: classifies each bar by how its volume
//!   and range compare to recent history.
//!
//! The fusion engine counts agreeing confirmations from both analyses and maps
//! them onto a five-level scale from Strong Sell to Strong Buy.
//!
//! ## Usage Example
//!
//! ```no_run
//! use ichi_vsa::{IchiVsa, IchiVsaConfig};
//! use ichi_vsa::utils::load_ohlcv_csv;
//!
//! let series = load_ohlcv_csv("AAPL_daily.csv")?;
//! let engine = IchiVsa::new(IchiVsaConfig::default())?;
//!
//! let latest = engine.get_latest_signal(&series)?;
//! println!("{} at {}: {}", latest.timestamp, latest.close, latest.signal);
//! # Ok::<(), ichi_vsa::IchiVsaError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

pub mod config;
pub mod fusion;
pub mod ichimoku;
pub mod series;
pub mod utils;
pub mod vsa;

pub use config::{ConfirmationWeights, IchiVsaConfig, IchimokuConfig, VsaConfig};
pub use fusion::{
    Confirmations, FusionOutput, FusionRow, IchiVsa, LatestIchimoku, LatestSignal, LatestVsa,
    SignalDistribution,
};
pub use ichimoku::{Displaced, Ichimoku, IchimokuOutput, IchimokuRow, IchimokuSignals, ProjectedCloud};
pub use series::{Bar, OhlcvData, Series};
pub use vsa::{BarDirection, BarFeatures, Vsa, VsaOutput, VsaPattern, VsaSignal};

/// Errors that can occur while validating input or computing signals
#[derive(Error, Debug)]
pub enum IchiVsaError {
    #[error("Input shape error: {0}")]
    InputShape(String),

    #[error("Empty series: no bars to report a signal for")]
    EmptySeries,

    #[error("Parameter validation error: {0}")]
    InvalidParameter(String),

    #[error("Data loading error: {0}")]
    DataLoad(String),

    #[error("Math error: {0}")]
    Math(#[from] trade_math::MathError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for ICHI-VSA operations
pub type Result<T> = std::result::Result<T, IchiVsaError>;

/// Direction a sub-signal leans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Bullish,
    Bearish,
    Neutral,
}

impl Polarity {
    /// Bullish when `lhs > rhs`, bearish when `lhs < rhs`, neutral on equality
    pub fn compare(lhs: f64, rhs: f64) -> Self {
        match lhs.partial_cmp(&rhs) {
            Some(Ordering::Greater) => Polarity::Bullish,
            Some(Ordering::Less) => Polarity::Bearish,
            _ => Polarity::Neutral,
        }
    }

    /// +1, -1 or 0
    pub fn sign(&self) -> i8 {
        match self {
            Polarity::Bullish => 1,
            Polarity::Bearish => -1,
            Polarity::Neutral => 0,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Bullish => write!(f, "Bullish"),
            Polarity::Bearish => write!(f, "Bearish"),
            Polarity::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Where the close sits relative to the Ichimoku cloud
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudPosition {
    Above,
    Inside,
    Below,
}

impl CloudPosition {
    /// Strictly above the top is `Above`, strictly below the bottom is `Below`
    pub fn locate(price: f64, cloud_bottom: f64, cloud_top: f64) -> Self {
        if price > cloud_top {
            CloudPosition::Above
        } else if price < cloud_bottom {
            CloudPosition::Below
        } else {
            CloudPosition::Inside
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            CloudPosition::Above => Polarity::Bullish,
            CloudPosition::Below => Polarity::Bearish,
            CloudPosition::Inside => Polarity::Neutral,
        }
    }
}

impl fmt::Display for CloudPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudPosition::Above => write!(f, "Above"),
            CloudPosition::Inside => write!(f, "Inside"),
            CloudPosition::Below => write!(f, "Below"),
        }
    }
}

/// Five-level fused trading signal
///
/// Serializes as its numeric level on the -2..=2 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Signal {
    /// Strong sell signal
    StrongSell = -2,
    /// Normal sell signal
    Sell = -1,
    /// Hold/neutral signal
    Neutral = 0,
    /// Normal buy signal
    Buy = 1,
    /// Strong buy signal
    StrongBuy = 2,
}

impl Signal {
    /// Numeric value on the -2..=2 scale
    pub fn value(&self) -> i8 {
        *self as i8
    }

    /// All levels from most bearish to most bullish
    pub const ALL: [Signal; 5] = [
        Signal::StrongSell,
        Signal::Sell,
        Signal::Neutral,
        Signal::Buy,
        Signal::StrongBuy,
    ];
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.value()
    }
}

impl TryFrom<i8> for Signal {
    type Error = IchiVsaError;

    fn try_from(value: i8) -> Result<Self> {
        Signal::ALL
            .into_iter()
            .find(|signal| signal.value() == value)
            .ok_or_else(|| {
                IchiVsaError::InvalidParameter(format!("signal level {} is outside -2..=2", value))
            })
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::StrongSell => write!(f, "Strong Sell"),
            Signal::Sell => write!(f, "Sell"),
            Signal::Neutral => write!(f, "Neutral"),
            Signal::Buy => write!(f, "Buy"),
            Signal::StrongBuy => write!(f, "Strong Buy"),
        }
    }
}
