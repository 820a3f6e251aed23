//! One simulation session: hydration, the trade/query API, observer
//! notifications and teardown.
//!
//! The session is the single writer of its [`PortfolioState`]; every
//! mutation goes through the reducer as a discrete, fully-applied
//! transition. The live ticker and the persistence task are independent
//! timers owned here so teardown can cancel both. Sessions share nothing
//! process-wide: two sessions in one test run are fully isolated.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tokio::time::Duration;

use crate::config::EngineConfig;
use crate::engine::reducer::{reduce, Action, TradeError};
use crate::engine::state::{Holding, PortfolioState, TradeSide};
use crate::logging::{log, obj, ts_epoch_ms, v_num, v_str, Domain, Level};
use crate::market::quotes::{Quote, QuoteProvider};
use crate::market::ticker::TickerHandle;
use crate::storage::PortfolioStore;
use crate::sync::{self, SyncHandle};

/// Supplies the stable per-session identity, or none for anonymous play.
pub trait IdentityProvider {
    fn identity(&self) -> Option<String>;
}

/// Identity from the `USER_ID` env var.
pub struct EnvIdentity;

impl IdentityProvider for EnvIdentity {
    fn identity(&self) -> Option<String> {
        std::env::var("USER_ID").ok().filter(|v| !v.is_empty())
    }
}

/// Anonymous: in-memory state only, no durable persistence.
pub struct Anonymous;

impl IdentityProvider for Anonymous {
    fn identity(&self) -> Option<String> {
        None
    }
}

pub struct Session {
    cfg: EngineConfig,
    quotes: Arc<dyn QuoteProvider>,
    state: PortfolioState,
    sync: Option<SyncHandle>,
    ticker: Option<TickerHandle>,
    watch_tx: watch::Sender<PortfolioState>,
}

impl Session {
    /// Start a session. With an identity and a store, persisted state is
    /// hydrated (or default state written once for a new identity) and the
    /// write-behind task is spawned. Anonymous sessions run purely in
    /// memory. Must be called inside a tokio runtime.
    pub fn start(
        cfg: EngineConfig,
        quotes: Arc<dyn QuoteProvider>,
        identity: Option<String>,
        store: Option<Box<dyn PortfolioStore>>,
    ) -> Result<Self> {
        let mut state = PortfolioState::new(cfg.starting_cash);

        let sync = match (identity, store) {
            (Some(user), Some(mut store)) => {
                match store.load(&user) {
                    Ok(Some(snapshot)) => {
                        let _ = reduce(&mut state, Action::Hydrate(Box::new(snapshot)), ts_epoch_ms());
                        log(
                            Level::Info,
                            Domain::System,
                            "session_hydrated",
                            obj(&[("user_id", v_str(&user)), ("cash", v_num(state.cash))]),
                        );
                    }
                    Ok(None) => {
                        // New identity: seed the store with defaults, once.
                        if let Err(err) = store.save(&user, &state) {
                            log(
                                Level::Warn,
                                Domain::Persist,
                                "initial_write_failed",
                                obj(&[
                                    ("user_id", v_str(&user)),
                                    ("error", v_str(&err.to_string())),
                                ]),
                            );
                        }
                    }
                    Err(err) => {
                        // Unreadable store: keep playing on defaults.
                        log(
                            Level::Warn,
                            Domain::Persist,
                            "load_failed",
                            obj(&[
                                ("user_id", v_str(&user)),
                                ("error", v_str(&err.to_string())),
                            ]),
                        );
                    }
                }
                Some(sync::spawn(
                    user,
                    store,
                    Duration::from_millis(cfg.debounce_ms),
                ))
            }
            _ => {
                log(Level::Info, Domain::System, "session_anonymous", obj(&[]));
                None
            }
        };

        let (watch_tx, _) = watch::channel(state.clone());

        Ok(Self {
            cfg,
            quotes,
            state,
            sync,
            ticker: None,
            watch_tx,
        })
    }

    /// Hand the live ticker to the session so teardown cancels it.
    pub fn attach_ticker(&mut self, ticker: TickerHandle) {
        self.ticker = Some(ticker);
    }

    /// Execute a trade against the price resolved right now, not a price
    /// captured earlier by the caller. Exactly one quote read per commit.
    pub fn submit_trade(
        &mut self,
        side: TradeSide,
        symbol: &str,
        quantity: u32,
    ) -> Result<&PortfolioState, TradeError> {
        let price = self
            .quotes
            .current_price(symbol)
            .ok_or_else(|| TradeError::UnknownSymbol(symbol.to_string()))?;

        let action = match side {
            TradeSide::Buy => Action::Buy {
                symbol: symbol.to_string(),
                price,
                quantity,
            },
            TradeSide::Sell => Action::Sell {
                symbol: symbol.to_string(),
                price,
                quantity,
            },
        };

        match reduce(&mut self.state, action, ts_epoch_ms()) {
            Ok(()) => {
                log(
                    Level::Info,
                    Domain::Trade,
                    "trade_committed",
                    obj(&[
                        ("symbol", v_str(symbol)),
                        ("side", v_str(side.as_str())),
                        ("quantity", v_num(quantity as f64)),
                        ("price", v_num(price)),
                        ("cash", v_num(self.state.cash)),
                    ]),
                );
                self.committed();
                Ok(&self.state)
            }
            Err(err) => {
                log(
                    Level::Debug,
                    Domain::Trade,
                    "trade_rejected",
                    obj(&[
                        ("symbol", v_str(symbol)),
                        ("side", v_str(side.as_str())),
                        ("quantity", v_num(quantity as f64)),
                        ("reason", v_str(&err.to_string())),
                    ]),
                );
                Err(err)
            }
        }
    }

    /// Record a completed academy module. Idempotent; repeats are no-ops
    /// and schedule no write.
    pub fn complete_module(&mut self, id: &str) {
        if self.state.completed_modules.iter().any(|m| m == id) {
            return;
        }
        let _ = reduce(
            &mut self.state,
            Action::CompleteModule { id: id.to_string() },
            ts_epoch_ms(),
        );
        self.committed();
    }

    /// Mark the course finished and credit the bonus, first time only.
    pub fn complete_course(&mut self) {
        if self.state.course_completed {
            return;
        }
        let _ = reduce(
            &mut self.state,
            Action::CompleteCourse {
                bonus: self.cfg.course_bonus,
            },
            ts_epoch_ms(),
        );
        log(
            Level::Info,
            Domain::Trade,
            "course_completed",
            obj(&[("bonus", v_num(self.cfg.course_bonus))]),
        );
        self.committed();
    }

    pub fn state(&self) -> &PortfolioState {
        &self.state
    }

    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.state.holding(symbol)
    }

    pub fn current_price(&self, symbol: &str) -> Option<f64> {
        self.quotes.current_price(symbol)
    }

    pub fn quote(&self, symbol: &str) -> Option<Quote> {
        self.quotes.quote(symbol)
    }

    pub fn quotes(&self) -> Vec<Quote> {
        self.quotes.quotes()
    }

    /// Observe committed transitions. Receivers pull the latest snapshot;
    /// the engine never pushes into renderer internals.
    pub fn subscribe(&self) -> watch::Receiver<PortfolioState> {
        self.watch_tx.subscribe()
    }

    /// Cancel both timers and flush the final state. Completes only after
    /// the pending snapshot (if any) hit the store.
    pub async fn shutdown(mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
        if let Some(sync) = self.sync.take() {
            sync.shutdown().await;
        }
        log(
            Level::Info,
            Domain::System,
            "session_closed",
            obj(&[
                ("cash", v_num(self.state.cash)),
                ("holdings", v_num(self.state.holdings.len() as f64)),
                ("orders", v_num(self.state.orders.len() as f64)),
            ]),
        );
    }

    /// Post-commit fanout: observers see the new snapshot, persistence
    /// gets a coalesced write scheduled.
    fn committed(&self) {
        // send_replace stores the snapshot even with no receivers yet, so
        // a subscriber attaching later still reads the latest commit.
        let _ = self.watch_tx.send_replace(self.state.clone());
        if let Some(sync) = &self.sync {
            sync.schedule(self.state.clone());
        }
    }
}
