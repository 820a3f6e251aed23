//! Synthetic daily price history.
//!
//! Each symbol gets a multi-year business-day series built by walking
//! backward from an anchor price on a fixed reference end date. The walk
//! divides by `1 + (r - bias) * daily_volatility` at every step, so read
//! forward the series drifts gently upward. Everything is derived from the
//! `"<symbol>:history"` seed: same symbol and anchor, same series, every
//! run.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::rng::SeededStream;

/// Reference end date for all generated histories. A Friday, so the series
/// always terminates on a business day regardless of wall clock.
pub const HISTORY_END: NaiveDate = match NaiveDate::from_ymd_opt(2024, 6, 28) {
    Some(d) => d,
    None => panic!("invalid history end date"),
};

/// One (date, price) sample of a symbol's generated history.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Parameters of the backward walk. Defaults mirror `EngineConfig`.
#[derive(Debug, Clone, Copy)]
pub struct WalkParams {
    pub years: i64,
    pub daily_volatility: f64,
    pub drift_bias: f64,
    pub price_floor: f64,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            years: 5,
            daily_volatility: 0.02,
            drift_bias: 0.48,
            price_floor: 0.01,
        }
    }
}

/// Build the chronological business-day series ending at `anchor_price` on
/// [`HISTORY_END`]. Pure: same inputs, identical output.
pub fn generate(symbol: &str, anchor_price: f64, params: WalkParams) -> Vec<PricePoint> {
    let mut rng = SeededStream::new(&format!("{}:history", symbol));
    let cutoff = HISTORY_END - Duration::days(params.years * 365);

    let mut points = Vec::new();
    let mut price = round2(anchor_price.max(params.price_floor));
    points.push(PricePoint { date: HISTORY_END, price });

    let mut date = HISTORY_END;
    while let Some(prev) = prev_business_day(date) {
        if prev < cutoff {
            break;
        }
        let r = rng.next_f64();
        price /= 1.0 + (r - params.drift_bias) * params.daily_volatility;
        price = round2(price.max(params.price_floor));
        points.push(PricePoint { date: prev, price });
        date = prev;
    }

    points.reverse();
    points
}

/// Stats derived from the trailing window of a history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedStats {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub change: f64,
    pub change_percent: f64,
}

/// Compute open/high/low/close over the last `window` points, and
/// change/change_percent of `current` against that close. With fewer than
/// two points everything collapses to the current price with zero change.
pub fn derive_stats(current: f64, history: &[PricePoint], window: usize) -> DerivedStats {
    if history.len() < 2 || window < 2 {
        return DerivedStats {
            open: current,
            high: current,
            low: current,
            close: current,
            change: 0.0,
            change_percent: 0.0,
        };
    }

    let tail = &history[history.len().saturating_sub(window)..];
    let open = tail[0].price;
    let close = tail[tail.len() - 2].price;
    let mut high = f64::MIN;
    let mut low = f64::MAX;
    for p in tail {
        high = high.max(p.price);
        low = low.min(p.price);
    }
    let change = current - close;
    let change_percent = (change / close) * 100.0;

    DerivedStats { open, high, low, close, change, change_percent }
}

fn prev_business_day(date: NaiveDate) -> Option<NaiveDate> {
    let mut d = date.pred_opt()?;
    while matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
        d = d.pred_opt()?;
    }
    Some(d)
}

/// Two-decimal rounding, the display precision of the simulated market.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate("RELIANCE", 2950.75, WalkParams::default());
        let b = generate("RELIANCE", 2950.75, WalkParams::default());
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_series_ends_at_anchor_on_end_date() {
        let series = generate("TCS", 3850.50, WalkParams::default());
        let last = series.last().unwrap();
        assert_eq!(last.date, HISTORY_END);
        assert_eq!(last.price, 3850.50);
    }

    #[test]
    fn test_series_is_chronological_business_days() {
        let series = generate("INFY", 1630.80, WalkParams::default());
        for pair in series.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        for p in &series {
            assert!(!matches!(p.date.weekday(), Weekday::Sat | Weekday::Sun));
        }
    }

    #[test]
    fn test_five_year_lookback_size() {
        let series = generate("SBIN", 830.60, WalkParams::default());
        // ~261 business days a year, minus a handful at the cutoff edge.
        assert!(series.len() > 5 * 250, "too short: {}", series.len());
        assert!(series.len() < 5 * 262, "too long: {}", series.len());
    }

    #[test]
    fn test_prices_respect_floor() {
        let params = WalkParams { daily_volatility: 0.09, ..Default::default() };
        let series = generate("TATASTEEL", 0.05, params);
        for p in &series {
            assert!(p.price >= params.price_floor);
        }
    }

    #[test]
    fn test_distinct_symbols_distinct_series() {
        let a = generate("RELIANCE", 1000.0, WalkParams::default());
        let b = generate("TCS", 1000.0, WalkParams::default());
        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_stats_window() {
        let history: Vec<PricePoint> = (0..100)
            .map(|i| PricePoint {
                date: HISTORY_END - Duration::days(100 - i),
                price: 100.0 + i as f64,
            })
            .collect();
        let stats = derive_stats(210.0, &history, 60);
        assert_eq!(stats.open, 140.0); // first of last 60
        assert_eq!(stats.close, 198.0); // second-to-last
        assert_eq!(stats.high, 199.0);
        assert_eq!(stats.low, 140.0);
        assert_eq!(stats.change, 12.0);
        assert!((stats.change_percent - 12.0 / 198.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_derive_stats_degenerate() {
        let one = [PricePoint { date: HISTORY_END, price: 50.0 }];
        let stats = derive_stats(42.0, &one, 60);
        assert_eq!(stats.open, 42.0);
        assert_eq!(stats.close, 42.0);
        assert_eq!(stats.change, 0.0);
        assert_eq!(stats.change_percent, 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(2950.754999), 2950.75);
        assert_eq!(round2(0.005), 0.01);
    }
}
