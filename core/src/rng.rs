//! Deterministic random number generation.
//!
//! RULE: Nothing in the crate may call any platform RNG.
//! All randomness flows through DataRng instances derived
//! from the single master seed of the session.
//!
//! Each consumer gets its own stream, seeded deterministically
//! from (master_seed XOR stream_index). This means:
//!   - Adding a new stream never changes existing streams.
//!   - Re-running an algorithm with the same seed replays it exactly.

use crate::error::{BankError, BankResult};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single consumer.
#[derive(Clone)]
pub struct DataRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl DataRng {
    /// Create a stream from the master seed and a stable stream index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n). `n` must be positive.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        debug_assert!(n > 0, "n must be > 0");
        // Rejection sampling keeps the draw unbiased for every n.
        let zone = u64::MAX - (u64::MAX % n);
        loop {
            let v = self.inner.next_u64();
            if v < zone {
                return v % n;
            }
        }
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform float in [lo, hi].
    pub fn rand_uniform(&mut self, lo: f64, hi: f64) -> BankResult<f64> {
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(BankError::Config(format!(
                "rand_uniform: lower bound {lo} exceeds upper bound {hi}"
            )));
        }
        Ok(lo + (hi - lo) * self.next_f64())
    }

    /// Uniform integer in [lo, hi], both inclusive.
    pub fn rand_int(&mut self, lo: i64, hi: i64) -> BankResult<i64> {
        if lo > hi {
            return Err(BankError::Config(format!(
                "rand_int: lower bound {lo} exceeds upper bound {hi}"
            )));
        }
        let span = (hi as i128 - lo as i128 + 1) as u128;
        if span > u64::MAX as u128 {
            return Ok(self.inner.next_u64() as i64);
        }
        Ok((lo as i128 + self.next_u64_below(span as u64) as i128) as i64)
    }

    /// Index in [0, len). Callers guarantee `len > 0`.
    pub fn index(&mut self, len: usize) -> usize {
        self.next_u64_below(len as u64) as usize
    }

    /// Pick one element uniformly.
    pub fn choose<'a, T>(&mut self, seq: &'a [T]) -> BankResult<&'a T> {
        if seq.is_empty() {
            return Err(BankError::Config("choose: empty sequence".into()));
        }
        let i = self.index(seq.len());
        Ok(&seq[i])
    }

    /// Draw `k` distinct indices from [0, len) in draw order.
    pub fn sample_indices(&mut self, len: usize, k: usize) -> BankResult<Vec<usize>> {
        if k > len {
            return Err(BankError::Config(format!(
                "sample: cannot draw {k} items from {len}"
            )));
        }
        // Partial Fisher-Yates over an index table.
        let mut pool: Vec<usize> = (0..len).collect();
        for i in 0..k {
            let j = i + self.index(len - i);
            pool.swap(i, j);
        }
        pool.truncate(k);
        Ok(pool)
    }

    /// Draw `k` distinct elements (by position) in draw order.
    pub fn sample<T: Clone>(&mut self, seq: &[T], k: usize) -> BankResult<Vec<T>> {
        Ok(self
            .sample_indices(seq.len(), k)?
            .into_iter()
            .map(|i| seq[i].clone())
            .collect())
    }
}

/// All RNG streams for one session, indexed by stable slot.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// A fresh stream. Two calls with the same slot yield identical streams.
    pub fn stream(&self, slot: StreamSlot) -> DataRng {
        DataRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries; only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Generator = 0,
    Clustering = 1,
    Genetic = 2,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generator => "generator",
            Self::Clustering => "clustering",
            Self::Genetic => "genetic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_slot_same_stream() {
        let bank = RngBank::new(42);
        let mut a = bank.stream(StreamSlot::Genetic);
        let mut b = bank.stream(StreamSlot::Genetic);
        for _ in 0..32 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn slots_are_independent() {
        let bank = RngBank::new(42);
        let mut a = bank.stream(StreamSlot::Generator);
        let mut b = bank.stream(StreamSlot::Clustering);
        let xs: Vec<u64> = (0..8).map(|_| a.next_u64_below(1_000_000)).collect();
        let ys: Vec<u64> = (0..8).map(|_| b.next_u64_below(1_000_000)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn bounds_are_validated() {
        let mut rng = RngBank::new(1).stream(StreamSlot::Generator);
        assert!(matches!(rng.rand_uniform(2.0, 1.0), Err(BankError::Config(_))));
        assert!(matches!(rng.rand_int(5, 4), Err(BankError::Config(_))));
        assert!(matches!(rng.sample(&[1, 2, 3], 4), Err(BankError::Config(_))));
        assert!(matches!(rng.choose::<u8>(&[]), Err(BankError::Config(_))));
    }

    #[test]
    fn ranges_are_respected() {
        let mut rng = RngBank::new(7).stream(StreamSlot::Generator);
        for _ in 0..1000 {
            let v = rng.rand_int(300, 850).unwrap();
            assert!((300..=850).contains(&v));
            let f = rng.rand_uniform(10.0, 20.0).unwrap();
            assert!((10.0..=20.0).contains(&f));
        }
        assert_eq!(rng.rand_int(3, 3).unwrap(), 3);
    }

    #[test]
    fn sample_draws_distinct_items() {
        let mut rng = RngBank::new(9).stream(StreamSlot::Clustering);
        let mut picked = rng.sample(&(0..20).collect::<Vec<_>>(), 20).unwrap();
        picked.sort_unstable();
        assert_eq!(picked, (0..20).collect::<Vec<_>>());
    }
}
