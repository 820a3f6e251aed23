pub mod config;
pub mod engine;
pub mod logging;
pub mod market;
pub mod rng;
pub mod session;
pub mod storage;
pub mod sync;
