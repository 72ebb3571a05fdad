//! # ICHI-VSA workspace
//!
//! Re-exports the workspace crates under one name:
//!
//! - [`ichi_vsa`]: Ichimoku and VSA engines and their fused signal
//! - [`trade_math`]: rolling-window primitives the engines are built on
//!
//! ## Example
//!
//! ```
//! use ichi_vsa_workspace::ichi_vsa::{utils::generate_ohlcv, IchiVsa, Signal};
//!
//! let series = generate_ohlcv(120, 100.0, 0.04, 0.0, 42).unwrap();
//! let latest = IchiVsa::default().get_latest_signal(&series).unwrap();
//! assert!(Signal::ALL.contains(&latest.signal));
//! ```

pub use ichi_vsa;
pub use trade_math;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_reaches_both_crates() {
        let midpoints = trade_math::rolling_midpoint(&[3.0, 5.0], &[1.0, 2.0], 2).unwrap();
        assert_eq!(midpoints, vec![None, Some(3.0)]);

        let config = ichi_vsa::IchiVsaConfig::default();
        assert_eq!(config.min_bars(), 78);
    }
}
