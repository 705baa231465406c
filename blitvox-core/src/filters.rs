//! One-pole building blocks used by the oscillator.
//!
//! Contents
//! - `Integrator`   : leaky integrator that turns impulse trains into ramps
//! - `DcBlocker`    : one-pole high-pass removing the integrators' DC offset
//! - `Lp6dbFilter`  : "RC-style" 6 dB/oct low-pass
//!
//! Notes
//! - The integrator's bandwidth is driven per call by the oscillator's phase
//!   increment, so it tracks pitch without recomputing coefficients.
//! - None of these flush denormals; the voice runs them on audio-rate signals
//!   that never decay to silence while the oscillator runs.

use crate::dsp::TAU;
use crate::rate::SampleRateSource;

/// Default leak of the oscillator integrators.
pub const INTEGRATOR_LEAK: f32 = 0.25;

/// Default pole radius of the DC blocker.
pub const DC_BLOCKER_POLE: f32 = 0.999;

/// Default cutoff of [`Lp6dbFilter`] in Hz.
pub const LP6DB_DEFAULT_CUTOFF: f32 = 22_000.0;

/// Leaky integrator: `value += (input - value) * (leak * step_gain)`.
///
/// With `leak * step_gain` in (0, 1] the recurrence approaches a constant
/// input monotonically and never overshoots it.
#[derive(Copy, Clone, Debug)]
pub struct Integrator {
    leak: f32,
    value: f32,
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new(INTEGRATOR_LEAK)
    }
}

impl Integrator {
    #[inline]
    pub fn new(leak: f32) -> Self {
        Self { leak, value: 0.0 }
    }

    /// Feed one sample; `step_gain` is usually the oscillator phase increment.
    #[inline]
    pub fn add(&mut self, input: f32, step_gain: f32) -> f32 {
        self.value += (input - self.value) * (self.leak * step_gain);
        self.value
    }

    #[inline] pub fn value(&self) -> f32 { self.value }
    #[inline] pub fn leak(&self) -> f32 { self.leak }
    #[inline] pub fn reset(&mut self) { self.value = 0.0; }
}

/// DC blocker (one-pole high-pass).
/// Difference equation:
///   y[n] = x[n] - x[n-1] + r * y[n-1]
#[derive(Copy, Clone, Debug)]
pub struct DcBlocker {
    r: f32,
    x1: f32,
    y1: f32,
}

impl Default for DcBlocker {
    fn default() -> Self {
        Self::new(DC_BLOCKER_POLE)
    }
}

impl DcBlocker {
    #[inline]
    pub fn new(r: f32) -> Self {
        Self { r, x1: 0.0, y1: 0.0 }
    }

    #[inline]
    pub fn filter(&mut self, x: f32) -> f32 {
        let y = x - self.x1 + self.r * self.y1;
        self.x1 = x;
        self.y1 = y;
        y
    }

    #[inline] pub fn value(&self) -> f32 { self.y1 }

    #[inline]
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

/// One-pole low-pass `y += alpha * (x - y)` with an RC-derived `alpha`:
/// `RC = 1 / (2π fc)`, `dt = 1 / sr`, `alpha = dt / (RC + dt)`.
#[derive(Copy, Clone, Debug)]
pub struct Lp6dbFilter {
    fc: f32,
    alpha: f32,
    y0: f32,
}

impl Lp6dbFilter {
    /// Create a low-pass at the default 22 kHz cutoff.
    #[inline]
    pub fn new(rate: &impl SampleRateSource) -> Self {
        Self::with_cutoff(LP6DB_DEFAULT_CUTOFF, rate)
    }

    #[inline]
    pub fn with_cutoff(fc: f32, rate: &impl SampleRateSource) -> Self {
        let mut s = Self { fc, alpha: 1.0, y0: 0.0 };
        s.update_frequency(fc, rate);
        s
    }

    /// Recompute `alpha` for cutoff `fc` Hz at the host's current sample rate.
    #[inline]
    pub fn update_frequency(&mut self, fc: f32, rate: &impl SampleRateSource) {
        let sr = rate.sample_rate();
        debug_assert!(sr > 0.0 && fc > 0.0, "cutoff and sample rate must be positive");
        self.fc = fc;
        let rc = 1.0 / (fc * TAU);
        let dt = 1.0 / sr;
        self.alpha = dt / (rc + dt);
    }

    #[inline]
    pub fn filter(&mut self, x: f32) -> f32 {
        let y = self.y0 + self.alpha * (x - self.y0);
        self.y0 = y;
        y
    }

    #[inline] pub fn cutoff(&self) -> f32 { self.fc }
    #[inline] pub fn alpha(&self) -> f32 { self.alpha }
    #[inline] pub fn value(&self) -> f32 { self.y0 }
    #[inline] pub fn reset(&mut self) { self.y0 = 0.0; }
}

// ------------------------------------ Tests --------------------------------------
