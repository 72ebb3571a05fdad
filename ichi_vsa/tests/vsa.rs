mod common;

use approx::assert_relative_eq;
use common::series_from;
use ichi_vsa::utils::generate_ohlcv;
use ichi_vsa::{BarDirection, Polarity, Vsa, VsaConfig, VsaPattern, VsaSignal};

const BASE: (f64, f64, f64, f64, f64) = (100.0, 101.0, 99.0, 100.5, 100.0);

fn short_window() -> Vsa {
    Vsa::new(VsaConfig {
        volume_ma_period: 4,
        ..Default::default()
    })
    .unwrap()
}

/// Three ordinary bars followed by `last`, classified with a 4-bar baseline
fn classify_last(last: (f64, f64, f64, f64, f64)) -> VsaSignal {
    let series = series_from(&[BASE, BASE, BASE, last]);
    let vsa = short_window();
    let output = vsa.calculate(&series).unwrap();
    vsa.get_signals(&output)[3]
}

#[test]
fn test_stopping_volume_on_narrow_down_bar() {
    let series = series_from(&[BASE, BASE, BASE, (100.25, 100.5, 99.5, 99.75, 300.0)]);
    let vsa = short_window();
    let output = vsa.calculate(&series).unwrap();

    assert_relative_eq!(output.relative_volume()[3].unwrap(), 2.0);
    assert!(output.relative_spread()[3].unwrap() < 1.0);
    assert_eq!(output.direction()[3], BarDirection::Down);

    let signal = vsa.get_signals(&output)[3];
    assert_eq!(signal.pattern, VsaPattern::StoppingVolume);
    assert_eq!(signal.polarity, Polarity::Bullish);
    assert!(signal.baseline_ready);
}

#[test]
fn test_selling_climax_on_wide_down_bar() {
    let signal = classify_last((103.0, 104.0, 98.0, 99.0, 300.0));
    assert_eq!(signal.pattern, VsaPattern::SellingClimax);
    assert_eq!(signal.polarity, Polarity::Bullish);
}

#[test]
fn test_buying_climax_regardless_of_spread() {
    // Wide bar closing at 20% of its range
    let signal = classify_last((99.5, 104.0, 99.0, 100.0, 300.0));
    assert_eq!(signal.pattern, VsaPattern::BuyingClimax);
    assert_eq!(signal.polarity, Polarity::Bearish);

    // Narrow bar closing low also qualifies for weakness, but climax wins
    let signal = classify_last((99.6, 100.5, 99.5, 99.7, 300.0));
    assert_eq!(signal.pattern, VsaPattern::BuyingClimax);
}

#[test]
fn test_weakness_on_narrow_up_bar_closing_high() {
    let signal = classify_last((99.6, 100.5, 99.5, 100.4, 300.0));
    assert_eq!(signal.pattern, VsaPattern::Weakness);
    assert_eq!(signal.polarity, Polarity::Bearish);
}

#[test]
fn test_low_volume_patterns() {
    let signal = classify_last((100.25, 100.5, 99.5, 99.75, 50.0));
    assert_eq!(signal.pattern, VsaPattern::NoDemand);
    assert_eq!(signal.polarity, Polarity::Bullish);

    let signal = classify_last((99.75, 100.5, 99.5, 100.25, 50.0));
    assert_eq!(signal.pattern, VsaPattern::NoSupply);
    assert_eq!(signal.polarity, Polarity::Bullish);
}

#[test]
fn test_warm_up_rows_are_missing_and_neutral() {
    let series = generate_ohlcv(40, 100.0, 0.05, 0.0, 17).unwrap();
    let vsa = Vsa::default();
    let output = vsa.calculate(&series).unwrap();
    let signals = vsa.get_signals(&output);

    assert_eq!(output.len(), 40);
    assert_eq!(signals.len(), 40);

    for row in 0..19 {
        assert_eq!(output.avg_volume()[row], None);
        assert_eq!(output.avg_spread()[row], None);
        assert_eq!(output.relative_volume()[row], None);
        assert_eq!(output.relative_spread()[row], None);
        assert_eq!(signals[row].pattern, VsaPattern::NoPattern);
        assert_eq!(signals[row].polarity, Polarity::Neutral);
        assert!(!signals[row].baseline_ready);
    }
    for row in 19..40 {
        assert!(output.relative_volume()[row].is_some());
        assert!(signals[row].baseline_ready);
    }
}

#[test]
fn test_relative_measures_against_manual_means() {
    let series = generate_ohlcv(60, 100.0, 0.05, 0.0, 31).unwrap();
    let vsa = Vsa::default();
    let output = vsa.calculate(&series).unwrap();
    let volume = series.volumes();

    for row in 19..60 {
        let mean_volume: f64 = volume[row - 19..=row].iter().sum::<f64>() / 20.0;
        let mean_spread: f64 = output.spread()[row - 19..=row].iter().sum::<f64>() / 20.0;
        assert_relative_eq!(
            output.avg_spread()[row].unwrap(),
            mean_spread,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            output.relative_volume()[row].unwrap(),
            volume[row] / mean_volume,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            output.relative_spread()[row].unwrap(),
            output.spread()[row] / mean_spread,
            max_relative = 1e-9
        );

        let bar = series.bars()[row].data;
        assert_relative_eq!(
            output.close_location()[row].unwrap(),
            (bar.close - bar.low) / (bar.high - bar.low)
        );
    }
}

#[test]
fn test_zero_spread_bar_does_not_divide() {
    let doji = (100.0, 100.0, 100.0, 100.0, 300.0);
    let series = series_from(&[BASE, BASE, BASE, doji]);
    let vsa = short_window();
    let output = vsa.calculate(&series).unwrap();

    assert_eq!(output.spread()[3], 0.0);
    assert_eq!(output.close_location()[3], None);
    assert_eq!(output.relative_spread()[3], None);
    assert!(output.relative_volume()[3].is_some());
    assert_eq!(vsa.get_signals(&output)[3].pattern, VsaPattern::NoPattern);
}

#[test]
fn test_zero_volume_baseline_is_missing() {
    let quiet = (100.0, 101.0, 99.0, 100.5, 0.0);
    let series = series_from(&[quiet; 5]);
    let vsa = short_window();
    let output = vsa.calculate(&series).unwrap();

    assert!(output.relative_volume().iter().all(Option::is_none));
    assert!(vsa
        .get_signals(&output)
        .iter()
        .all(|s| s.pattern == VsaPattern::NoPattern));
}

#[test]
fn test_quiet_window_after_busy_history_has_no_baseline() {
    let volumes = [0.1, 0.2, 0.3, 0.7, 1e7, 3.3, 0.0, 0.0, 0.0];
    let mut rows: Vec<_> = volumes
        .iter()
        .map(|&v| (BASE.0, BASE.1, BASE.2, BASE.3, v))
        .collect();
    // Narrow up bar that would read as no supply on any low baseline
    rows.push((99.75, 100.5, 99.5, 100.25, 0.0));
    let series = series_from(&rows);

    let vsa = short_window();
    let output = vsa.calculate(&series).unwrap();

    assert_eq!(output.avg_volume()[9], Some(0.0));
    assert_eq!(output.relative_volume()[9], None);
    assert_eq!(vsa.get_signals(&output)[9].pattern, VsaPattern::NoPattern);
}

#[test]
fn test_classification_is_first_match_in_priority() {
    let series = generate_ohlcv(400, 100.0, 0.1, 0.0, 99).unwrap();
    let config = VsaConfig {
        volume_ma_period: 10,
        ..Default::default()
    };
    let vsa = Vsa::new(config).unwrap();
    let output = vsa.calculate(&series).unwrap();
    let signals = vsa.get_signals(&output);

    for (row, signal) in signals.iter().enumerate() {
        let features = output.features(row).unwrap();
        let first = VsaPattern::PRIORITY
            .iter()
            .copied()
            .find(|p| p.matches(&features, &config))
            .unwrap_or(VsaPattern::NoPattern);
        assert_eq!(signal.pattern, first, "row {}", row);
        assert_eq!(signal.polarity, signal.pattern.polarity());
    }
}

#[test]
fn test_invalid_config_rejected() {
    assert!(Vsa::new(VsaConfig {
        volume_ma_period: 0,
        ..Default::default()
    })
    .is_err());
    assert!(Vsa::new(VsaConfig {
        high_volume_factor: 0.7,
        low_volume_factor: 0.7,
        ..Default::default()
    })
    .is_err());
}
