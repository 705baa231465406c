//! Moog-style 24 dB/oct resonant ladder low-pass.
//!
//! Four cascaded one-pole stages with global feedback from the last stage.
//! Coefficients are rebuilt from cutoff and resonance on every tick, so fast
//! modulation is always exact. The only thing keeping the feedback loop in
//! check is a cubic soft saturation on the last stage (`b4 -= b4³/6`).
//!
//! In [`LadderMode::Classic`] resonance near 1.0 combined with extreme
//! cutoffs can still run away. That is part of the emulated character.
//! [`LadderMode::Hardened`] additionally clamps the stage registers.
//!
//! After Stilson/Smith and the CSound moogvcf, as refined by Paul Kellett.

use blitvox_core::dsp::{clip, OUTPUT_VOLTAGE};

/// Register bound applied by [`LadderMode::Hardened`].
pub const HARDENED_REGISTER_LIMIT: f32 = 1.5;

/// Feedback stability policy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LadderMode {
    /// Cubic soft saturation only; may diverge at full resonance.
    #[default]
    Classic,
    /// Classic plus a hard clamp of the four stage registers.
    Hardened,
}

/// All outputs of one tick, clipped to ±1 and scaled to ±5 V.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LadderTaps {
    pub lowpass: f32,
    pub highpass: f32,
    pub bandpass: f32,
}

/// Resonant four-pole ladder filter.
#[derive(Copy, Clone, Debug, Default)]
pub struct LadderFilter {
    mode: LadderMode,

    // stage registers; b0 holds last tick's (feedback-corrected) input
    b0: f32,
    b1: f32,
    b2: f32,
    b3: f32,
    b4: f32,
    t1: f32,
    t2: f32,

    // coefficients of the last tick
    p: f32,
    f: f32,
    q: f32,
}

impl LadderFilter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_mode(mode: LadderMode) -> Self {
        Self { mode, ..Self::default() }
    }

    #[inline] pub fn mode(&self) -> LadderMode { self.mode }
    #[inline] pub fn set_mode(&mut self, mode: LadderMode) { self.mode = mode; }

    /// Clear every register.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::with_mode(self.mode);
    }

    /// Run one tick of the ladder and return the raw (unclipped) last stage.
    ///
    /// `input` is clipped to ±1. `cutoff` is a fraction of Nyquist in
    /// [~0, 1], `resonance` is in [0, 1].
    #[inline]
    pub fn tick(&mut self, input: f32, cutoff: f32, resonance: f32) -> f32 {
        let q = 1.0 - cutoff;
        self.p = cutoff + 0.8 * cutoff * q;
        self.f = self.p + self.p - 1.0;
        self.q = resonance * (1.0 + 0.5 * q * (1.0 - q + 5.6 * q * q));

        let (p, f) = (self.p, self.f);
        let x = clip(input, 1.0) - self.q * self.b4;

        // order matters: t1/t2 carry the previous stage values forward
        self.t1 = self.b1;
        self.b1 = (x + self.b0) * p - self.b1 * f;

        self.t2 = self.b2;
        self.b2 = (self.b1 + self.t1) * p - self.b2 * f;

        self.t1 = self.b3;
        self.b3 = (self.b2 + self.t2) * p - self.b3 * f;

        self.b4 = (self.b3 + self.t1) * p - self.b4 * f;
        self.b4 -= self.b4 * self.b4 * self.b4 * 0.166_666_667;

        self.b0 = x;

        if self.mode == LadderMode::Hardened {
            self.b1 = clip(self.b1, HARDENED_REGISTER_LIMIT);
            self.b2 = clip(self.b2, HARDENED_REGISTER_LIMIT);
            self.b3 = clip(self.b3, HARDENED_REGISTER_LIMIT);
            self.b4 = clip(self.b4, HARDENED_REGISTER_LIMIT);
        }

        self.b4
    }

    /// Low-pass output for one tick, clipped to ±1 and scaled to ±5 V.
    #[inline]
    pub fn process(&mut self, input: f32, cutoff: f32, resonance: f32) -> f32 {
        clip(self.tick(input, cutoff, resonance), 1.0) * OUTPUT_VOLTAGE
    }

    /// Low-, high- and band-pass outputs for one tick.
    #[inline]
    pub fn process_taps(&mut self, input: f32, cutoff: f32, resonance: f32) -> LadderTaps {
        let lp = self.tick(input, cutoff, resonance);
        LadderTaps {
            lowpass: clip(lp, 1.0) * OUTPUT_VOLTAGE,
            highpass: clip(self.b0 - lp, 1.0) * OUTPUT_VOLTAGE,
            bandpass: clip(3.0 * (self.b3 - lp), 1.0) * OUTPUT_VOLTAGE,
        }
    }

    /// `(p, f, q)` computed on the last tick.
    #[inline]
    pub fn coefficients(&self) -> (f32, f32, f32) {
        (self.p, self.f, self.q)
    }

    /// `[b0, b1, b2, b3, b4]` after the last tick.
    #[inline]
    pub fn registers(&self) -> [f32; 5] {
        [self.b0, self.b1, self.b2, self.b3, self.b4]
    }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_in_silence_out() {
        let mut lf = LadderFilter::new();
        for _ in 0..1000 {
            assert_eq!(lf.process(0.0, 0.5, 0.5), 0.0);
        }
    }

    #[test]
    fn dc_passes_at_zero_resonance() {
        let mut lf = LadderFilter::new();
        let mut y = 0.0;
        for _ in 0..8192 {
            y = lf.process(0.1, 0.3, 0.0);
        }
        assert!((y - 0.5).abs() < 0.02, "y={}", y);
    }

    #[test]
    fn coefficients_follow_cutoff() {
        let mut lf = LadderFilter::new();
        lf.tick(0.0, 1.0, 0.0);
        let (p, f, q) = lf.coefficients();
        assert_eq!((p, f, q), (1.0, 1.0, 0.0));

        lf.tick(0.0, 0.5, 1.0);
        let (p, f, q) = lf.coefficients();
        assert!((p - 0.7).abs() < 1e-6);
        assert!((f - 0.4).abs() < 1e-6);
        assert!((q - 1.475).abs() < 1e-6, "q={}", q);
    }

    #[test]
    fn input_is_clipped() {
        let mut a = LadderFilter::new();
        let mut b = LadderFilter::new();
        for _ in 0..256 {
            assert_eq!(a.process(7.0, 0.4, 0.2), b.process(1.0, 0.4, 0.2));
        }
    }

    #[test]
    fn output_is_bounded_to_five_volts() {
        let mut lf = LadderFilter::new();
        for i in 0..20_000 {
            let x = if (i / 40) % 2 == 0 { 1.0 } else { -1.0 };
            let y = lf.process(x, 0.2, 1.0);
            assert!(y.abs() <= OUTPUT_VOLTAGE);
        }
    }

    #[test]
    fn hardened_mode_clamps_registers() {
        let mut lf = LadderFilter::with_mode(LadderMode::Hardened);
        for i in 0..20_000 {
            let x = if (i / 7) % 2 == 0 { 1.0 } else { -1.0 };
            lf.tick(x, 0.9, 1.0);
            for r in &lf.registers()[1..] {
                assert!(r.abs() <= HARDENED_REGISTER_LIMIT);
            }
        }
    }

    #[test]
    fn recurrence_matches_reference_trace() {
        // cutoff 0.5 -> p = 0.7, f = 0.4; resonance 0.5 -> q = 0.7375
        let expected: [(f32, [f32; 5]); 3] = [
            (0.5, [0.5, 0.35, 0.245, 0.1715, 0.119_761_64]),
            (0.25, [0.161_675_78, 0.323_173_08, 0.373_221_16, 0.364_154_82, 0.321_223_2]),
            (-0.5, [-0.736_902_1, -0.531_927_6, -0.295_416_65, -0.091_198_77, 0.062_539_12]),
        ];

        let mut lf = LadderFilter::new();
        for (i, (input, regs)) in expected.iter().enumerate() {
            let y = lf.tick(*input, 0.5, 0.5);
            assert!((y - regs[4]).abs() < 1e-6, "tick {}: b4={}", i, y);
            for (got, want) in lf.registers().iter().zip(regs) {
                assert!((got - want).abs() < 1e-6, "tick {}: {:?} != {:?}", i, lf.registers(), regs);
            }
        }
    }

    #[test]
    fn classic_mode_leaves_registers_unclamped() {
        let mut lf = LadderFilter::new();
        let mut peak = 0.0_f32;
        for i in 0..20_000 {
            let x = if (i / 7) % 2 == 0 { 1.0 } else { -1.0 };
            lf.tick(x, 0.9, 1.0);
            for r in &lf.registers()[1..] {
                peak = peak.max(r.abs());
            }
        }
        assert!(peak > HARDENED_REGISTER_LIMIT, "peak={}", peak);
    }

    #[test]
    fn reset_keeps_mode() {
        let mut lf = LadderFilter::with_mode(LadderMode::Hardened);
        lf.process(0.5, 0.5, 0.5);
        lf.reset();
        assert_eq!(lf.mode(), LadderMode::Hardened);
        assert_eq!(lf.registers(), [0.0; 5]);
    }

    #[test]
    fn taps_are_scaled() {
        let mut lf = LadderFilter::new();
        let mut taps = LadderTaps::default();
        for _ in 0..4096 {
            taps = lf.process_taps(0.1, 0.5, 0.0);
        }
        assert!((taps.lowpass - 0.5).abs() < 0.02);
        assert!(taps.highpass.abs() < 0.05, "hp={}", taps.highpass);
        assert!(taps.bandpass.abs() < 0.05, "bp={}", taps.bandpass);
    }
}
