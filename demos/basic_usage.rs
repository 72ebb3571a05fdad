// Basic walk through the ICHI-VSA engine on synthetic data
use ichi_vsa::utils::generate_ohlcv;
use ichi_vsa::{IchiVsa, IchiVsaError, Signal};

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

fn fmt_label<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

fn main() -> Result<(), IchiVsaError> {
    println!("ICHI-VSA Basic Usage Example");
    println!("{}", "=".repeat(50));

    println!("\n1. Creating sample OHLCV data...");
    let series = generate_ohlcv(100, 100.0, 0.04, 0.002, 42)?;
    if let (Some(first), Some(last)) = (series.bars().first(), series.last()) {
        println!("   Generated {} bars of data", series.len());
        println!("   Date range: {} to {}", first.timestamp, last.timestamp);
    }

    println!("\n2. Initializing ICHI-VSA indicator...");
    let engine = IchiVsa::default();

    println!("\n3. Analyzing data...");
    let output = engine.analyze(&series)?;

    println!("\n4. Latest Signal:");
    println!("{}", "-".repeat(50));
    let latest = engine.get_latest_signal(&series)?;
    println!("   Date: {}", latest.timestamp);
    println!("   Close Price: ${:.2}", latest.close);
    println!("   Signal: {}", latest.signal);
    println!("   Signal Strength: {}", latest.signal_strength);

    println!("\n   Ichimoku Details:");
    println!("      Tenkan-sen: {}", fmt_opt(latest.ichimoku.tenkan));
    println!("      Kijun-sen: {}", fmt_opt(latest.ichimoku.kijun));
    println!("      TK Cross: {}", fmt_label(latest.ichimoku.tk_cross));
    println!("      Price vs Cloud: {}", fmt_label(latest.ichimoku.price_vs_cloud));
    println!("      Cloud Color: {}", fmt_label(latest.ichimoku.cloud_color));

    println!("\n   VSA Details:");
    println!("      VSA Pattern: {}", latest.vsa.pattern);
    println!("      VSA Polarity: {}", latest.vsa.polarity);

    println!("\n5. Last 5 Trading Signals:");
    println!("{}", "-".repeat(50));
    let skip = output.len().saturating_sub(5);
    for row in output.rows().iter().skip(skip) {
        println!(
            "   {}  close {:>8.2}  {:<12} strength {}",
            row.timestamp.date_naive(),
            row.ichimoku.close,
            row.signal.to_string(),
            row.signal_strength
        );
    }

    println!("\n6. Recent VSA Patterns (last 10 bars):");
    println!("{}", "-".repeat(50));
    let skip = output.len().saturating_sub(10);
    for row in output.rows().iter().skip(skip) {
        println!("   {}  {}", row.timestamp.date_naive(), row.vsa_signal.pattern);
    }

    println!("\n7. Signal Distribution:");
    println!("{}", "-".repeat(50));
    let distribution = output.distribution();
    for signal in Signal::ALL {
        println!("   {:<12} {}", signal.to_string(), distribution.count(signal));
    }
    println!("   ({} bars still warming up)", distribution.warm_up);

    println!("\n{}", "=".repeat(50));
    println!("Analysis complete!");
    Ok(())
}
