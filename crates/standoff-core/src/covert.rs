//! The covert coin: the only source of chance in round resolution.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Decides whether a covert intrusion is traced.
///
/// Drawn exactly once per resolved covert action, in roster order.
pub trait CovertRoll {
    /// Returns `true` when the intrusion is traced back to the actor.
    fn traced(&mut self, trace_chance_pct: u32) -> bool;
}

/// Seeded pseudo-random coin. Two coins with the same seed agree forever.
#[derive(Debug, Clone)]
pub struct SeededCovert {
    rng: SmallRng,
}

impl SeededCovert {
    /// Create a coin from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl CovertRoll for SeededCovert {
    fn traced(&mut self, trace_chance_pct: u32) -> bool {
        match trace_chance_pct {
            0 => false,
            100.. => true,
            pct => self.rng.random_range(0..100_u32) < pct,
        }
    }
}

/// A coin that always lands the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCovert {
    /// Whether every intrusion is traced.
    pub traced: bool,
}

impl FixedCovert {
    /// Every intrusion is traced.
    pub const fn always_traced() -> Self {
        Self { traced: true }
    }

    /// No intrusion is ever traced.
    pub const fn never_traced() -> Self {
        Self { traced: false }
    }
}

impl CovertRoll for FixedCovert {
    fn traced(&mut self, _trace_chance_pct: u32) -> bool {
        self.traced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SeededCovert::new(7);
        let mut b = SeededCovert::new(7);
        for _ in 0..64 {
            assert_eq!(a.traced(50), b.traced(50));
        }
    }

    #[test]
    fn extreme_chances_are_certain() {
        let mut coin = SeededCovert::new(42);
        for _ in 0..32 {
            assert!(!coin.traced(0));
            assert!(coin.traced(100));
        }
    }

    #[test]
    fn even_chance_lands_both_ways() {
        let mut coin = SeededCovert::new(42);
        let traced = (0..200).filter(|_| coin.traced(50)).count();
        assert!(traced > 50 && traced < 150, "traced {traced} of 200");
    }
}
