//! Portfolio state. The snapshot persisted to the store is this exact
//! struct, so hydration is a plain deserialize-and-replace.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

/// An owned position. Never stored with quantity 0; the reducer removes
/// the holding instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: u32,
    /// Quantity-weighted average purchase price. Sells never touch it.
    pub avg_price: f64,
}

/// A completed trade record. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: u32,
    /// Price the trade executed at.
    pub price: f64,
    pub ts_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    /// Invariant: never negative.
    pub cash: f64,
    /// Unique by symbol.
    pub holdings: Vec<Holding>,
    /// Newest first.
    pub orders: Vec<Order>,
    /// Insertion-ordered set of completed milestone ids.
    pub completed_modules: Vec<String>,
    pub course_completed: bool,
    pub next_order_id: u64,
}

impl PortfolioState {
    pub fn new(starting_cash: f64) -> Self {
        Self {
            cash: starting_cash,
            holdings: Vec::new(),
            orders: Vec::new(),
            completed_modules: Vec::new(),
            course_completed: false,
            next_order_id: 1,
        }
    }

    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.symbol == symbol)
    }

    /// Cash plus holdings valued at cost basis.
    pub fn book_value(&self) -> f64 {
        self.cash
            + self
                .holdings
                .iter()
                .map(|h| h.avg_price * h.quantity as f64)
                .sum::<f64>()
    }
}
