//! The live quote table.
//!
//! A [`QuoteBoard`] is built once per session from the listing catalog:
//! each symbol gets its generated history and derived stats. After that the
//! tick simulator is the only writer of the live fields (price, change,
//! change_percent); trades take a single read of the current price at
//! commit time and never write back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::market::catalog::Listing;
use crate::market::history::{self, PricePoint, WalkParams};

/// A symbol's full market view: static identity, live price, derived stats
/// and the generated daily history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub price: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    /// Reference previous close; live change is always computed against it.
    pub close: f64,
    pub change: f64,
    pub change_percent: f64,
    pub history: Vec<PricePoint>,
}

/// Read side of a quote source. The session depends on this seam only, so
/// the simulated board could be swapped for a real feed without touching
/// the reducer.
pub trait QuoteProvider: Send + Sync {
    /// Single atomic read of the current price for a symbol.
    fn current_price(&self, symbol: &str) -> Option<f64>;
    /// Snapshot of one quote.
    fn quote(&self, symbol: &str) -> Option<Quote>;
    /// Snapshot of the whole table, catalog order.
    fn quotes(&self) -> Vec<Quote>;
}

struct BoardInner {
    quotes: HashMap<String, Quote>,
    // Catalog order, for stable iteration.
    order: Vec<String>,
}

/// Shared, lock-guarded quote table. Cloning shares the underlying table.
#[derive(Clone)]
pub struct QuoteBoard {
    inner: Arc<Mutex<BoardInner>>,
}

impl QuoteBoard {
    /// Generate histories and stats for every listing.
    pub fn from_catalog(listings: &[Listing], cfg: &EngineConfig) -> Self {
        let params = WalkParams {
            years: cfg.history_years,
            daily_volatility: cfg.daily_volatility,
            drift_bias: cfg.drift_bias,
            price_floor: cfg.price_floor,
        };

        let mut quotes = HashMap::with_capacity(listings.len());
        let mut order = Vec::with_capacity(listings.len());
        for l in listings {
            let hist = history::generate(l.symbol, l.anchor_price, params);
            let stats = history::derive_stats(l.anchor_price, &hist, cfg.stats_window);
            order.push(l.symbol.to_string());
            quotes.insert(
                l.symbol.to_string(),
                Quote {
                    symbol: l.symbol.to_string(),
                    name: l.name.to_string(),
                    sector: l.sector.to_string(),
                    price: l.anchor_price,
                    open: stats.open,
                    high: stats.high,
                    low: stats.low,
                    close: stats.close,
                    change: stats.change,
                    change_percent: stats.change_percent,
                    history: hist,
                },
            );
        }

        Self {
            inner: Arc::new(Mutex::new(BoardInner { quotes, order })),
        }
    }

    /// Symbols tracked by this board, catalog order.
    pub fn symbols(&self) -> Vec<String> {
        match self.inner.lock() {
            Ok(inner) => inner.order.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Apply one live update to a symbol. Used by the tick simulator, and
    /// by tests that need a specific price without running timers.
    pub fn set_price(&self, symbol: &str, price: f64) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(q) = inner.quotes.get_mut(symbol) {
                q.price = price;
                q.change = price - q.close;
                q.change_percent = if q.close > 0.0 {
                    (price - q.close) / q.close * 100.0
                } else {
                    0.0
                };
            }
        }
    }

    /// Run `f` over every quote's live price, replacing it with the result.
    /// One lock acquisition for the whole sweep, so a tick is a consistent
    /// snapshot transition.
    pub fn update_all<F>(&self, mut f: F)
    where
        F: FnMut(&str, f64, f64) -> f64,
    {
        if let Ok(mut inner) = self.inner.lock() {
            let order = inner.order.clone();
            for sym in &order {
                if let Some(q) = inner.quotes.get_mut(sym) {
                    let next = f(sym.as_str(), q.price, q.close);
                    q.price = next;
                    q.change = next - q.close;
                    q.change_percent = if q.close > 0.0 {
                        (next - q.close) / q.close * 100.0
                    } else {
                        0.0
                    };
                }
            }
        }
    }
}

impl QuoteProvider for QuoteBoard {
    fn current_price(&self, symbol: &str) -> Option<f64> {
        self.inner.lock().ok()?.quotes.get(symbol).map(|q| q.price)
    }

    fn quote(&self, symbol: &str) -> Option<Quote> {
        self.inner.lock().ok()?.quotes.get(symbol).cloned()
    }

    fn quotes(&self) -> Vec<Quote> {
        match self.inner.lock() {
            Ok(inner) => inner
                .order
                .iter()
                .filter_map(|s| inner.quotes.get(s).cloned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::catalog::LISTINGS;

    fn board() -> QuoteBoard {
        QuoteBoard::from_catalog(LISTINGS, &EngineConfig::default())
    }

    #[test]
    fn test_board_covers_catalog() {
        let b = board();
        assert_eq!(b.quotes().len(), LISTINGS.len());
        assert_eq!(b.current_price("RELIANCE"), Some(2950.75));
        assert!(b.current_price("NOSUCH").is_none());
    }

    #[test]
    fn test_board_is_deterministic() {
        let a = board().quote("RELIANCE").unwrap();
        let b = board().quote("RELIANCE").unwrap();
        assert_eq!(a.history, b.history);
        assert_eq!(a.close, b.close);
    }

    #[test]
    fn test_set_price_updates_change() {
        let b = board();
        let q0 = b.quote("TCS").unwrap();
        b.set_price("TCS", q0.close + 10.0);
        let q1 = b.quote("TCS").unwrap();
        assert_eq!(q1.price, q0.close + 10.0);
        assert!((q1.change - 10.0).abs() < 1e-9);
        assert!(q1.change_percent > 0.0);
        // Reference close never moves.
        assert_eq!(q1.close, q0.close);
    }

    #[test]
    fn test_update_all_visits_every_symbol() {
        let b = board();
        let mut seen = 0;
        b.update_all(|_, price, _| {
            seen += 1;
            price
        });
        assert_eq!(seen, LISTINGS.len());
    }
}
