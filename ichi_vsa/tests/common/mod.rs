#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use ichi_vsa::{Bar, Series};

pub fn day(i: usize) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap() + Duration::days(i as i64)
}

/// Build a daily series from (open, high, low, close, volume) tuples
pub fn series_from(rows: &[(f64, f64, f64, f64, f64)]) -> Series {
    let bars = rows
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c, v))| Bar::new(day(i), o, h, l, c, v))
        .collect();
    Series::new(bars).unwrap()
}

/// Steady trend: each bar moves `step` from the previous one with a 2.0 range
/// and constant volume
pub fn linear_trend(bars: usize, start: f64, step: f64) -> Series {
    let rows: Vec<_> = (0..bars)
        .map(|i| {
            let mid = start + step * i as f64;
            let (open, close) = if step >= 0.0 {
                (mid - 0.5, mid + 0.5)
            } else {
                (mid + 0.5, mid - 0.5)
            };
            (open, mid + 1.0, mid - 1.0, close, 1000.0)
        })
        .collect();
    series_from(&rows)
}
