//! Print the latest ICHI-VSA signal for a CSV file of OHLCV bars.
//!
//! Usage: ichi_vsa_report <data.csv> [config.json]

use ichi_vsa::utils::load_ohlcv_csv;
use ichi_vsa::{IchiVsa, IchiVsaConfig, IchiVsaError, LatestSignal};
use std::env;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn run() -> Result<(), IchiVsaError> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        return Err(IchiVsaError::InvalidParameter(format!(
            "usage: {} <data.csv> [config.json]",
            args.first().map(String::as_str).unwrap_or("ichi_vsa_report")
        )));
    }

    let config = match args.get(2) {
        Some(path) => IchiVsaConfig::from_json_file(path)?,
        None => IchiVsaConfig::default(),
    };
    let engine = IchiVsa::new(config)?;

    let series = load_ohlcv_csv(&args[1])?;
    info!(bars = series.len(), path = %args[1], "analyzing series");

    let output = engine.analyze(&series)?;
    let latest = output
        .last()
        .map(LatestSignal::from)
        .ok_or(IchiVsaError::EmptySeries)?;

    println!("{}", serde_json::to_string_pretty(&latest)?);

    println!("\nLast 5 bars:");
    println!(
        "{:<28} {:>12} {:>12} {:>9} {:>16}",
        "timestamp", "close", "signal", "strength", "vsa pattern"
    );
    let skip = output.len().saturating_sub(5);
    for row in output.rows().iter().skip(skip) {
        println!(
            "{:<28} {:>12.4} {:>12} {:>9} {:>16}",
            row.timestamp.to_rfc3339(),
            row.ichimoku.close,
            row.signal.to_string(),
            row.signal_strength,
            row.vsa_signal.pattern.to_string()
        );
    }

    let distribution = output.distribution();
    println!("\nSignal distribution ({} warm-up bars):", distribution.warm_up);
    for (signal, count) in &distribution.counts {
        println!("  {:<12} {}", signal.to_string(), count);
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "ichi_vsa=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
