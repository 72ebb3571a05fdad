//! Utility functions for feeding the engines
//!
//! Loading OHLCV data from CSV and generating synthetic series for
//! examples and tests. Neither is used by the engines themselves.

use crate::series::{Bar, Series};
use crate::{IchiVsaError, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const REQUIRED_COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

#[derive(Debug, Deserialize)]
struct CsvBar {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load an OHLCV series from a CSV file
///
/// The expected CSV format is:
/// timestamp,open,high,low,close,volume
/// 2023-01-03T00:00:00Z,100.5,101.2,100.4,100.8,5000
///
/// Extra columns are ignored. Rows must already be in timestamp order.
///
/// # Arguments
/// * `file_path` - Path to the CSV file
///
/// # Returns
/// * `Result<Series>` - Validated series or error
pub fn load_ohlcv_csv<P: AsRef<Path>>(file_path: P) -> Result<Series> {
    let path = file_path.as_ref();
    let file = File::open(path).map_err(|e| {
        IchiVsaError::DataLoad(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let series = read_ohlcv_csv(file)?;
    debug!(path = %path.display(), bars = series.len(), "loaded ohlcv csv");
    Ok(series)
}

/// Read an OHLCV series from any CSV source
pub fn read_ohlcv_csv<R: Read>(reader: R) -> Result<Series> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.eq_ignore_ascii_case(column)) {
            return Err(IchiVsaError::InputShape(format!(
                "Missing required column '{}'",
                column
            )));
        }
    }
    // Normalize header case so serde field names match
    reader.set_headers(headers.iter().map(|h| h.to_ascii_lowercase()).collect());

    let mut bars = Vec::new();
    for (i, record) in reader.deserialize::<CsvBar>().enumerate() {
        let record = record.map_err(|e| {
            IchiVsaError::DataLoad(format!("Invalid record at line {}: {}", i + 2, e))
        })?;
        bars.push(Bar::new(
            record.timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ));
    }

    Series::new(bars)
}

/// Generate a synthetic daily series
///
/// The same seed always produces the same series.
///
/// # Arguments
/// * `bars` - Number of bars to generate
/// * `base_price` - Starting price
/// * `volatility` - Relative size of random moves (0.0-0.2 for reasonable values)
/// * `trend` - Drift per bar as a fraction of price (-0.01 to 0.01 for reasonable values)
/// * `seed` - Random seed
pub fn generate_ohlcv(
    bars: usize,
    base_price: f64,
    volatility: f64,
    trend: f64,
    seed: u64,
) -> Result<Series> {
    if !base_price.is_finite() || base_price <= 0.0 {
        return Err(IchiVsaError::InvalidParameter(
            "base_price must be positive".to_string(),
        ));
    }
    if !(0.0..1.0).contains(&volatility) {
        return Err(IchiVsaError::InvalidParameter(
            "volatility must be in [0, 1)".to_string(),
        ));
    }

    let mut random = StdRng::seed_from_u64(seed);
    let start = Utc
        .with_ymd_and_hms(2023, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| IchiVsaError::InvalidParameter("invalid start date".to_string()))?;

    let mut data = Vec::with_capacity(bars);
    let mut price = base_price;

    for i in 0..bars {
        let open = price;
        let change = volatility * (random.gen::<f64>() - 0.5) + trend;
        // Never let a run of losses take the price to zero
        let close = (open * (1.0 + change)).max(base_price * 0.01);
        price = close;

        let high = open.max(close) * (1.0 + random.gen::<f64>() * volatility * 0.5);
        let low = open.min(close) * (1.0 - random.gen::<f64>() * volatility * 0.5);
        let volume = 1_000_000.0 * (0.5 + random.gen::<f64>() * 1.5);

        data.push(Bar::new(
            start + Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume,
        ));
    }

    Series::new(data)
}
