//! xorshift64* random number generator
//!
//! This is a fast, high-quality PRNG that is deterministic and suitable
//! for simulation purposes.
//!
//! # Algorithm
//!
//! xorshift64* is a variant of xorshift that passes TestU01's BigCrush
//! statistical tests. It uses 64-bit state and produces 64-bit output.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. This is CRITICAL for:
//! - `--seed` reproducibility of a whole season
//! - Testing (verify behavior)
//! - Checkpoint/resume (the state is the only cursor)

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use sector_sim_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let unit = rng.next_f64(); // [0, 1)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is mapped to 1 (xorshift requirement).
    ///
    /// # Example
    /// ```
    /// use sector_sim_core_rs::RngManager;
    ///
    /// let rng = RngManager::new(12345);
    /// assert_eq!(rng.get_state(), 12345);
    /// ```
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    ///
    /// This advances the internal state and returns a random value.
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Get current RNG state (for checkpointing/replay)
    ///
    /// # Example
    /// ```
    /// use sector_sim_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// rng.next();
    /// let state = rng.get_state();
    ///
    /// // Later, can recreate RNG from this state
    /// let mut resumed = RngManager::new(state);
    /// assert_eq!(resumed.next(), rng.next());
    /// ```
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    ///
    /// # Example
    /// ```
    /// use sector_sim_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let probability = rng.next_f64();
    /// assert!(probability >= 0.0 && probability < 1.0);
    /// ```
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Convert to [0.0, 1.0) by dividing by 2^53
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Bernoulli draw: true with probability `p`
    ///
    /// Always consumes exactly one draw, even for p = 0 or p = 1.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from the standard normal distribution (Box-Muller transform)
    ///
    /// Consumes exactly two draws. The first uniform is shifted to (0, 1] so
    /// the logarithm is always finite; the result is never NaN or infinite.
    pub fn standard_normal(&mut self) -> f64 {
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Sample from N(mean, std_dev²)
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.standard_normal()
    }

    /// Categorical draw: index chosen with probability proportional to its weight
    ///
    /// Consumes exactly one draw. Weights need not sum to 1; non-positive
    /// weights are never selected.
    ///
    /// # Panics
    /// Panics if `weights` is empty or has no positive weight.
    ///
    /// # Example
    /// ```
    /// use sector_sim_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// let idx = rng.choose_weighted(&[0.0, 1.0, 0.0]);
    /// assert_eq!(idx, 1);
    /// ```
    pub fn choose_weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        assert!(total > 0.0, "weights must contain a positive entry");

        let mut target = self.next_f64() * total;
        let mut last_positive = 0;

        for (idx, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            last_positive = idx;
            if target < *weight {
                return idx;
            }
            target -= weight;
        }

        // Rounding can leave a sliver of mass past the last bucket
        last_positive
    }
}
