//! Deterministic seeded random streams.
//!
//! Every simulated price series in this crate is driven by one of these
//! streams. The same seed string always yields the same sequence, which is
//! what makes price histories and live feeds replayable in tests. Distinct
//! concerns use distinct seed strings (`"RELIANCE:history"` vs
//! `"RELIANCE:feed"`) so the static walk and the live feed for one symbol
//! never correlate.

/// Seeded pseudo-random stream yielding values in `[0, 1)`.
///
/// The seed is folded into a 32-bit integer with a polynomial string hash;
/// each draw pushes the running state through a sine scramble and returns
/// the fractional part. Not cryptographic, not statistically strong — just
/// cheap, stable and portable.
#[derive(Debug, Clone)]
pub struct SeededStream {
    state: f64,
}

impl SeededStream {
    pub fn new(seed: &str) -> Self {
        Self {
            state: hash_seed(seed) as f64,
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        let x = self.state.sin() * 10_000.0;
        self.state = x;
        x - x.floor()
    }
}

impl Iterator for SeededStream {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

/// Polynomial (x31) string hash folded into 32 bits.
fn hash_seed(seed: &str) -> i32 {
    let mut h: i32 = 0;
    for b in seed.bytes() {
        h = h.wrapping_mul(31).wrapping_add(b as i32);
    }
    h
}
