//! Engine configuration: env overrides with sane defaults.
//!
//! Every tunable of the simulation lives here so that tests and parallel
//! sessions can run with their own values instead of process-wide globals.

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Cash a fresh portfolio starts with.
    pub starting_cash: f64,
    /// One-time bonus credited on course completion.
    pub course_bonus: f64,
    /// Live tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Span of the per-tick perturbation; 0.01 means +/-0.5%.
    pub tick_volatility: f64,
    /// Quiet period before a persistence write, in milliseconds.
    pub debounce_ms: u64,
    /// Years of business-day history generated per symbol.
    pub history_years: i64,
    /// Per-step volatility of the historical walk.
    pub daily_volatility: f64,
    /// Bias below 0.5 gives the series a gentle upward drift read forward.
    pub drift_bias: f64,
    /// Uniform strictly-positive price floor (history and ticks).
    pub price_floor: f64,
    /// Trailing window for derived open/high/low/close stats.
    pub stats_window: usize,
    /// Sqlite file backing the durable store.
    pub sqlite_path: String,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            starting_cash: env_f64("STARTING_CASH", 100_000.0),
            course_bonus: env_f64("COURSE_BONUS", 10_000.0),
            tick_interval_ms: env_u64("TICK_MS", 3_000),
            tick_volatility: env_f64("TICK_VOL", 0.01),
            debounce_ms: env_u64("DEBOUNCE_MS", 1_000),
            history_years: env_u64("HISTORY_YEARS", 5) as i64,
            daily_volatility: env_f64("DAILY_VOL", 0.02),
            drift_bias: env_f64("DRIFT_BIAS", 0.48),
            price_floor: env_f64("PRICE_FLOOR", 0.01),
            stats_window: env_u64("STATS_WINDOW", 60) as usize,
            sqlite_path: std::env::var("SQLITE_PATH")
                .unwrap_or_else(|_| "./paperfolio.sqlite".to_string()),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_cash: 100_000.0,
            course_bonus: 10_000.0,
            tick_interval_ms: 3_000,
            tick_volatility: 0.01,
            debounce_ms: 1_000,
            history_years: 5,
            daily_volatility: 0.02,
            drift_bias: 0.48,
            price_floor: 0.01,
            stats_window: 60,
            sqlite_path: "./paperfolio.sqlite".to_string(),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_simulator_constants() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.starting_cash, 100_000.0);
        assert_eq!(cfg.course_bonus, 10_000.0);
        assert_eq!(cfg.debounce_ms, 1_000);
        assert_eq!(cfg.tick_interval_ms, 3_000);
        assert!(cfg.drift_bias < 0.5);
    }
}
