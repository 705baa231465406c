//! Float randomizer used for per-voice analog detune.
//!
//! The generator is injected, so tests can pass a seeded RNG and get
//! reproducible detune draws. Hosted builds (`std`) default to an
//! entropy-seeded `StdRng`.

use rand::{Rng, RngCore};

/// Uniform float source in a caller-chosen range.
#[derive(Clone, Debug)]
pub struct Randomizer<R> {
    rng: R,
}

impl<R: RngCore> Randomizer<R> {
    #[inline]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Next float in `[low, high)`. A degenerate range returns `low`.
    #[inline]
    pub fn next_float(&mut self, low: f32, high: f32) -> f32 {
        if high <= low {
            return low;
        }
        let u: f32 = self.rng.gen();
        let v = low + (high - low) * u;
        // `u` is < 1 but the affine map can still round up onto `high`
        if v < high { v } else { low }
    }

    #[inline]
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

#[cfg(feature = "std")]
impl Randomizer<rand::rngs::StdRng> {
    /// Randomizer seeded from the operating system's entropy source.
    pub fn from_entropy() -> Self {
        use rand::SeedableRng;
        Self::new(rand::rngs::StdRng::from_entropy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn draws_stay_in_bounds() {
        let mut r = Randomizer::new(StdRng::seed_from_u64(3));
        for _ in 0..10_000 {
            let v = r.next_float(-0.281_273, 0.291_284_6);
            assert!((-0.281_273..0.291_284_6).contains(&v), "v={}", v);
        }
    }

    #[test]
    fn seeded_draws_repeat() {
        let mut a = Randomizer::new(StdRng::seed_from_u64(42));
        let mut b = Randomizer::new(StdRng::seed_from_u64(42));
        for _ in 0..16 {
            assert_eq!(a.next_float(0.0, 1.0), b.next_float(0.0, 1.0));
        }
    }

    #[test]
    fn empty_range_returns_low() {
        let mut r = Randomizer::new(StdRng::seed_from_u64(0));
        assert_eq!(r.next_float(1.0, 1.0), 1.0);
        assert_eq!(r.next_float(2.0, 1.0), 2.0);
    }
}
