//! Per-frame driver for a voice patch.
//!
//! This module defines the minimal `Generator` trait and a lightweight `Engine<G>`
//! wrapper that owns a generator (patch), tracks the host sample rate and time,
//! and produces one **mono** sample at a time with zero heap work per sample.
//!
//! Design goals
//! - No dynamic allocations in the audio thread
//! - SR changes handled lazily (if the host reconfigures), with cheap branching
//! - Generic over the patch type, so patches can be swapped without trait objects

use blitvox_core::rate::SampleRateSource;

/// Anything that can generate one sample at a time.
pub trait Generator {
    /// Called when the engine is (re)initialized or when the sample rate changes.
    fn reset(&mut self, sr: f32);

    /// Generate the next mono sample. Implementations should assume the sample
    /// rate has been communicated via `reset`.
    fn next(&mut self) -> f32;
}

/// Lightweight realtime engine that owns a generator.
///
/// The audio callback should call `next(sr)` for every output sample. If the
/// `sr` reported by the host changes, the engine will call `reset(sr)` on the
/// inner generator once and continue.
#[derive(Clone, Debug)]
pub struct Engine<G: Generator> {
    sr: f32,
    t: f64,
    gen: G,
}

impl<G: Generator> Engine<G> {
    /// Construct with an already-configured generator running at `sr`.
    #[inline]
    pub fn new(mut gen: G, sr: f32) -> Self {
        debug_assert!(sr > 0.0, "sample rate must be positive");
        gen.reset(sr);
        Self { sr, t: 0.0, gen }
    }

    /// Produce **one** mono sample at the given sample rate.
    ///
    /// - If `sr` differs from the current engine `sr`, we update and call `reset(sr)`.
    /// - We track `t` (seconds) incrementally.
    #[inline]
    pub fn next(&mut self, sr: f32) -> f32 {
        self.set_sample_rate(sr);
        self.t += 1.0 / f64::from(self.sr);
        self.gen.next()
    }

    /// Switch to `sr` without producing a sample; resets the generator only
    /// when the rate actually changed.
    #[inline]
    pub fn set_sample_rate(&mut self, sr: f32) {
        if sr != self.sr {
            #[cfg(feature = "tracing")]
            tracing::debug!(from = self.sr, to = sr, "engine sample rate changed");
            self.sr = sr;
            self.gen.reset(sr);
        }
    }

    /// Fill `out` with consecutive samples at the current sample rate.
    #[inline]
    pub fn render(&mut self, out: &mut [f32]) {
        let sr = self.sr;
        for s in out.iter_mut() {
            *s = self.next(sr);
        }
    }

    /// Return the engine's current sample rate.
    #[inline] pub fn sample_rate(&self) -> f32 { self.sr }

    /// Return elapsed time (seconds) since this engine was created.
    #[inline] pub fn time(&self) -> f64 { self.t }

    /// Replace the inner generator in a zero-allocation manner.
    /// We call `reset(sr)` on the new patch.
    #[inline]
    pub fn swap_patch(&mut self, mut patch: G) {
        #[cfg(feature = "tracing")]
        tracing::debug!(sr = self.sr, "engine patch swapped");
        patch.reset(self.sr);
        self.gen = patch;
    }

    /// Get a mutable reference to the inner generator for live parameter tweaks.
    #[inline]
    pub fn patch_mut(&mut self) -> &mut G { &mut self.gen }

    #[inline]
    pub fn patch(&self) -> &G { &self.gen }
}

impl<G: Generator> SampleRateSource for Engine<G> {
    #[inline]
    fn sample_rate(&self) -> f32 {
        self.sr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts calls; emits the sample rate it was last reset with.
    #[derive(Default)]
    struct Probe {
        resets: u32,
        sr: f32,
    }

    impl Generator for Probe {
        fn reset(&mut self, sr: f32) {
            self.resets += 1;
            self.sr = sr;
        }

        fn next(&mut self) -> f32 {
            self.sr
        }
    }

    #[test]
    fn resets_once_per_rate_change() {
        let mut e = Engine::new(Probe::default(), 48_000.0);
        assert_eq!(e.patch().resets, 1);
        for _ in 0..10 {
            assert_eq!(e.next(48_000.0), 48_000.0);
        }
        assert_eq!(e.patch().resets, 1);
        assert_eq!(e.next(44_100.0), 44_100.0);
        assert_eq!(e.next(44_100.0), 44_100.0);
        assert_eq!(e.patch().resets, 2);
        assert_eq!(e.sample_rate(), 44_100.0);

        let t = e.time();
        e.set_sample_rate(44_100.0);
        assert_eq!(e.patch().resets, 2);
        e.set_sample_rate(96_000.0);
        assert_eq!(e.patch().resets, 3);
        assert_eq!(e.time(), t);
    }

    #[test]
    fn time_advances_per_sample() {
        let mut e = Engine::new(Probe::default(), 1000.0);
        let mut buf = [0.0; 500];
        e.render(&mut buf);
        assert!((e.time() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn swap_resets_new_patch() {
        let mut e = Engine::new(Probe::default(), 22_050.0);
        e.swap_patch(Probe::default());
        assert_eq!(e.patch().resets, 1);
        assert_eq!(e.patch_mut().sr, 22_050.0);
    }
}
