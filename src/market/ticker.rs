//! Live tick simulator.
//!
//! On a fixed interval every tracked symbol draws from its own
//! `"<symbol>:feed"` stream and gets a bounded multiplicative perturbation.
//! This task is the sole writer of live quote fields; the portfolio reducer
//! only ever reads from the board.

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::config::EngineConfig;
use crate::logging::{log, obj, v_num, Domain, Level};
use crate::market::history::round2;
use crate::market::quotes::QuoteBoard;
use crate::rng::SeededStream;

/// One tick step: bounded percentage move, clamped to the floor, rounded
/// to display precision. `r` is the symbol's next feed draw in `[0, 1)`;
/// `span` of 0.01 means a move in (-0.5%, +0.5%).
pub fn perturb(price: f64, r: f64, span: f64, floor: f64) -> f64 {
    let change_pct = (r - 0.5) * span;
    round2((price * (1.0 + change_pct)).max(floor))
}

/// Running tick task. Dropping the handle does not stop the task; call
/// [`TickerHandle::stop`] on teardown.
pub struct TickerHandle {
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

/// Spawn the interval task driving `board`. Each symbol gets a dedicated
/// feed stream, so tick sequences are reproducible per symbol and
/// independent of the history walk.
pub fn spawn(board: QuoteBoard, cfg: &EngineConfig) -> TickerHandle {
    let mut feeds: Vec<(String, SeededStream)> = board
        .symbols()
        .into_iter()
        .map(|sym| {
            let stream = SeededStream::new(&format!("{}:feed", sym));
            (sym, stream)
        })
        .collect();

    let span = cfg.tick_volatility;
    let floor = cfg.price_floor;
    let period = Duration::from_millis(cfg.tick_interval_ms);

    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick of a tokio interval fires immediately; skip it so
        // trades placed right after startup resolve at anchor prices.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let mut idx = 0;
            board.update_all(|sym, price, _close| {
                let (fed_sym, stream) = &mut feeds[idx];
                idx += 1;
                debug_assert_eq!(fed_sym.as_str(), sym);
                perturb(price, stream.next_f64(), span, floor)
            });
            log(
                Level::Debug,
                Domain::Market,
                "tick",
                obj(&[("symbols", v_num(idx as f64))]),
            );
        }
    });

    TickerHandle { task }
}
