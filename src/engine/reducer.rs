//! Pure reducer: (State, Action) -> Result.
//!
//! Single writer of [`PortfolioState`]; every transition is a discrete,
//! fully-applied reduction. All validation happens before any mutation, so
//! a rejected action leaves the state untouched. Trade prices arrive
//! already resolved — the caller reads the quote table exactly once at
//! commit time.

use std::fmt;

use crate::engine::state::{Holding, Order, PortfolioState, TradeSide};

#[derive(Debug, Clone)]
pub enum Action {
    Buy {
        symbol: String,
        price: f64,
        quantity: u32,
    },
    Sell {
        symbol: String,
        price: f64,
        quantity: u32,
    },
    CompleteModule {
        id: String,
    },
    CompleteCourse {
        bonus: f64,
    },
    /// Infrastructure-only: replace the entire state (session hydration).
    /// Not subject to trade validation.
    Hydrate(Box<PortfolioState>),
}

/// Locally recoverable trade rejections. The caller prompts for corrected
/// input; nothing here is fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum TradeError {
    InvalidQuantity(u32),
    InsufficientFunds { needed: f64, available: f64 },
    NoHolding(String),
    InsufficientShares { requested: u32, held: u32 },
    UnknownSymbol(String),
}

impl fmt::Display for TradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeError::InvalidQuantity(q) => {
                write!(f, "quantity must be a positive integer, got {}", q)
            }
            TradeError::InsufficientFunds { needed, available } => {
                write!(f, "not enough cash: need {:.2}, have {:.2}", needed, available)
            }
            TradeError::NoHolding(sym) => write!(f, "no shares of {} held", sym),
            TradeError::InsufficientShares { requested, held } => {
                write!(f, "not enough shares: requested {}, held {}", requested, held)
            }
            TradeError::UnknownSymbol(sym) => write!(f, "unknown symbol {}", sym),
        }
    }
}

impl std::error::Error for TradeError {}

/// Apply one action. `now_ms` stamps any order record the action creates.
pub fn reduce(state: &mut PortfolioState, action: Action, now_ms: i64) -> Result<(), TradeError> {
    match action {
        Action::Buy { symbol, price, quantity } => {
            if quantity == 0 {
                return Err(TradeError::InvalidQuantity(quantity));
            }
            let cost = price * quantity as f64;
            if cost > state.cash {
                return Err(TradeError::InsufficientFunds {
                    needed: cost,
                    available: state.cash,
                });
            }

            state.cash -= cost;
            match state.holdings.iter_mut().find(|h| h.symbol == symbol) {
                Some(h) => {
                    let total = h.quantity + quantity;
                    h.avg_price = (h.avg_price * h.quantity as f64 + cost) / total as f64;
                    h.quantity = total;
                }
                None => state.holdings.push(Holding {
                    symbol: symbol.clone(),
                    quantity,
                    avg_price: price,
                }),
            }
            push_order(state, symbol, TradeSide::Buy, quantity, price, now_ms);
            Ok(())
        }

        Action::Sell { symbol, price, quantity } => {
            if quantity == 0 {
                return Err(TradeError::InvalidQuantity(quantity));
            }
            let held = match state.holdings.iter().position(|h| h.symbol == symbol) {
                Some(idx) => idx,
                None => return Err(TradeError::NoHolding(symbol)),
            };
            if state.holdings[held].quantity < quantity {
                return Err(TradeError::InsufficientShares {
                    requested: quantity,
                    held: state.holdings[held].quantity,
                });
            }

            state.cash += price * quantity as f64;
            if state.holdings[held].quantity == quantity {
                state.holdings.remove(held);
            } else {
                // avg_price untouched: sells never move the cost basis.
                state.holdings[held].quantity -= quantity;
            }
            push_order(state, symbol, TradeSide::Sell, quantity, price, now_ms);
            Ok(())
        }

        Action::CompleteModule { id } => {
            if !state.completed_modules.iter().any(|m| *m == id) {
                state.completed_modules.push(id);
            }
            Ok(())
        }

        Action::CompleteCourse { bonus } => {
            if !state.course_completed {
                state.course_completed = true;
                state.cash += bonus;
            }
            Ok(())
        }

        Action::Hydrate(snapshot) => {
            *state = *snapshot;
            Ok(())
        }
    }
}

fn push_order(
    state: &mut PortfolioState,
    symbol: String,
    side: TradeSide,
    quantity: u32,
    price: f64,
    ts_ms: i64,
) {
    let order = Order {
        id: state.next_order_id,
        symbol,
        side,
        quantity,
        price,
        ts_ms,
    };
    state.next_order_id += 1;
    // Newest first.
    state.orders.insert(0, order);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy(symbol: &str, price: f64, quantity: u32) -> Action {
        Action::Buy { symbol: symbol.to_string(), price, quantity }
    }

    fn sell(symbol: &str, price: f64, quantity: u32) -> Action {
        Action::Sell { symbol: symbol.to_string(), price, quantity }
    }

    #[test]
    fn test_buy_creates_holding_and_order() {
        let mut s = PortfolioState::new(100_000.0);
        reduce(&mut s, buy("RELIANCE", 2950.75, 10), 1).unwrap();

        assert!((s.cash - 70_492.50).abs() < 1e-9);
        let h = s.holding("RELIANCE").unwrap();
        assert_eq!(h.quantity, 10);
        assert_eq!(h.avg_price, 2950.75);
        assert_eq!(s.orders.len(), 1);
        assert_eq!(s.orders[0].side, TradeSide::Buy);
    }

    #[test]
    fn test_cost_basis_law() {
        let mut s = PortfolioState::new(100_000.0);
        reduce(&mut s, buy("TCS", 100.0, 10), 1).unwrap();
        reduce(&mut s, buy("TCS", 200.0, 10), 2).unwrap();

        let h = s.holding("TCS").unwrap();
        assert_eq!(h.quantity, 20);
        assert!((h.avg_price - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_sell_preserves_basis() {
        let mut s = PortfolioState::new(100_000.0);
        reduce(&mut s, buy("TCS", 100.0, 10), 1).unwrap();
        reduce(&mut s, buy("TCS", 200.0, 10), 2).unwrap();
        reduce(&mut s, sell("TCS", 180.0, 5), 3).unwrap();

        let h = s.holding("TCS").unwrap();
        assert_eq!(h.quantity, 15);
        assert!((h.avg_price - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_sell_to_zero_removes_holding() {
        let mut s = PortfolioState::new(10_000.0);
        reduce(&mut s, buy("ITC", 430.70, 5), 1).unwrap();
        reduce(&mut s, sell("ITC", 450.0, 5), 2).unwrap();

        assert!(s.holding("ITC").is_none());
        assert!(s.holdings.is_empty());
    }

    #[test]
    fn test_insufficient_funds_is_noop() {
        let mut s = PortfolioState::new(1_000.0);
        let before = s.clone();

        let err = reduce(&mut s, buy("MARUTI", 12_500.0, 1), 1).unwrap_err();
        assert!(matches!(err, TradeError::InsufficientFunds { .. }));
        assert_eq!(s, before);
    }

    #[test]
    fn test_oversell_is_noop() {
        let mut s = PortfolioState::new(100_000.0);
        reduce(&mut s, buy("SBIN", 830.60, 5), 1).unwrap();
        let before = s.clone();

        let err = reduce(&mut s, sell("SBIN", 830.60, 6), 2).unwrap_err();
        assert_eq!(err, TradeError::InsufficientShares { requested: 6, held: 5 });
        assert_eq!(s, before);
    }

    #[test]
    fn test_sell_without_position() {
        let mut s = PortfolioState::new(100_000.0);
        let before = s.clone();

        let err = reduce(&mut s, sell("WIPRO", 480.25, 1), 1).unwrap_err();
        assert_eq!(err, TradeError::NoHolding("WIPRO".to_string()));
        assert_eq!(s, before);
    }

    #[test]
    fn test_zero_quantity_rejected_first() {
        // Zero quantity fails before any other precondition, even when the
        // sell would also fail for lack of a position.
        let mut s = PortfolioState::new(0.0);
        assert_eq!(
            reduce(&mut s, buy("TCS", 100.0, 0), 1),
            Err(TradeError::InvalidQuantity(0))
        );
        assert_eq!(
            reduce(&mut s, sell("TCS", 100.0, 0), 1),
            Err(TradeError::InvalidQuantity(0))
        );
    }

    #[test]
    fn test_cash_never_negative() {
        let mut s = PortfolioState::new(2_950.75 * 3.0);
        reduce(&mut s, buy("RELIANCE", 2950.75, 3), 1).unwrap();
        assert!(s.cash >= 0.0);
        // Next buy must bounce, not overdraw.
        assert!(reduce(&mut s, buy("RELIANCE", 2950.75, 1), 2).is_err());
        assert!(s.cash >= 0.0);
    }

    #[test]
    fn test_complete_module_idempotent() {
        let mut s = PortfolioState::new(0.0);
        reduce(&mut s, Action::CompleteModule { id: "basics-1".to_string() }, 1).unwrap();
        reduce(&mut s, Action::CompleteModule { id: "basics-1".to_string() }, 2).unwrap();
        assert_eq!(s.completed_modules, vec!["basics-1".to_string()]);
    }

    #[test]
    fn test_complete_course_credits_bonus_once() {
        let mut s = PortfolioState::new(100_000.0);
        reduce(&mut s, Action::CompleteCourse { bonus: 10_000.0 }, 1).unwrap();
        let once = s.clone();
        reduce(&mut s, Action::CompleteCourse { bonus: 10_000.0 }, 2).unwrap();

        assert_eq!(s, once);
        assert_eq!(s.cash, 110_000.0);
        assert!(s.course_completed);
    }

    #[test]
    fn test_hydrate_replaces_everything() {
        let mut s = PortfolioState::new(100_000.0);
        reduce(&mut s, buy("TCS", 100.0, 1), 1).unwrap();

        let snapshot = PortfolioState::new(42.0);
        reduce(&mut s, Action::Hydrate(Box::new(snapshot.clone())), 2).unwrap();
        assert_eq!(s, snapshot);
    }

    #[test]
    fn test_orders_newest_first() {
        let mut s = PortfolioState::new(100_000.0);
        reduce(&mut s, buy("TCS", 100.0, 1), 10).unwrap();
        reduce(&mut s, sell("TCS", 110.0, 1), 20).unwrap();

        assert_eq!(s.orders.len(), 2);
        assert_eq!(s.orders[0].side, TradeSide::Sell);
        assert_eq!(s.orders[1].side, TradeSide::Buy);
        assert!(s.orders[0].id > s.orders[1].id);
    }
}
