use std::sync::Arc;

use anyhow::Result;

use paperfolio::config::EngineConfig;
use paperfolio::engine::state::TradeSide;
use paperfolio::logging::{log, obj, v_num, v_str, Domain, Level};
use paperfolio::market::catalog::LISTINGS;
use paperfolio::market::quotes::{QuoteBoard, QuoteProvider};
use paperfolio::market::ticker;
use paperfolio::session::{EnvIdentity, IdentityProvider, Session};
use paperfolio::storage::{PortfolioStore, SqliteStore};
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = EngineConfig::from_env();
    let board = QuoteBoard::from_catalog(LISTINGS, &cfg);

    let identity = EnvIdentity.identity();
    let store: Option<Box<dyn PortfolioStore>> = match &identity {
        Some(_) => Some(Box::new(SqliteStore::open(&cfg.sqlite_path)?)),
        None => None,
    };

    let mut session = Session::start(cfg.clone(), Arc::new(board.clone()), identity, store)?;
    session.attach_ticker(ticker::spawn(board.clone(), &cfg));

    log(
        Level::Info,
        Domain::System,
        "market_open",
        obj(&[("listings", v_num(board.quotes().len() as f64))]),
    );

    // Scripted demo round: a starter buy, a few live ticks, a partial
    // exit, then teardown with the final state flushed.
    session.submit_trade(TradeSide::Buy, "RELIANCE", 10)?;
    session.complete_module("basics-1");

    sleep(Duration::from_millis(cfg.tick_interval_ms * 3)).await;

    if let Some(price) = session.current_price("RELIANCE") {
        log(
            Level::Info,
            Domain::Market,
            "quote",
            obj(&[("symbol", v_str("RELIANCE")), ("price", v_num(price))]),
        );
    }
    session.submit_trade(TradeSide::Sell, "RELIANCE", 5)?;

    let state = session.state();
    log(
        Level::Info,
        Domain::System,
        "demo_summary",
        obj(&[
            ("cash", v_num(state.cash)),
            ("book_value", v_num(state.book_value())),
            ("holdings", v_num(state.holdings.len() as f64)),
            ("orders", v_num(state.orders.len() as f64)),
        ]),
    );

    session.shutdown().await;
    Ok(())
}
