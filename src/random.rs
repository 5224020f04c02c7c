//! Random-variable abstraction backing every `*Rv` configuration key (§5.1):
//! `registration_interval`, `send_interval`, `transmission_delay`,
//! `processing_delay`, and `e2_node_inactivity_interval` are all draws from
//! a `RandomVariable`, matching the source's `ns3::RandomVariableStream`
//! abstraction but expressed as a small, object-safe trait over `rand`.
use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;

/// Draws a non-negative number of seconds. Implementations own their own
/// RNG state so multiple `Simulation`s never share mutable randomness.
pub trait RandomVariable: fmt::Debug {
    fn sample(&mut self) -> f64;
}

/// Always returns the same value. The default for every `*Rv` key the spec
/// lists with a constant default (e.g. `ric_transmission_delay_rv`).
#[derive(Debug, Clone, Copy)]
pub struct Constant(pub f64);

impl RandomVariable for Constant {
    fn sample(&mut self) -> f64 {
        self.0
    }
}

/// Uniformly distributed in `[low, high)`.
#[derive(Debug)]
pub struct Uniform {
    low: f64,
    high: f64,
    rng: StdRng,
}

impl Uniform {
    pub fn new(low: f64, high: f64, seed: u64) -> Self {
        assert!(low <= high, "Uniform random variable requires low <= high");
        Uniform { low, high, rng: StdRng::seed_from_u64(seed) }
    }
}

impl RandomVariable for Uniform {
    fn sample(&mut self) -> f64 {
        if self.low == self.high {
            return self.low;
        }
        self.rng.random_range(self.low..self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_always_same() {
        let mut rv = Constant(2.5);
        assert_eq!(rv.sample(), 2.5);
        assert_eq!(rv.sample(), 2.5);
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut rv = Uniform::new(1.0, 2.0, 42);
        for _ in 0..100 {
            let v = rv.sample();
            assert!(v >= 1.0 && v < 2.0);
        }
    }
}
