//! Band-limited impulse train (BLIT) oscillator.
//!
//! One phase accumulator drives two impulse trains offset by the pulse
//! width. A cascade of three leaky integrators turns them into ramp, pulse
//! and triangle shapes; saw and saw-tri are fixed linear combinations of
//! those. Everything is computed per sample with no allocation.
//!
//! Derived state (phase increment, harmonic count) is recomputed lazily:
//! setters only mark it stale, and the next [`BlitOscillator::process`] (or an
//! explicit [`BlitOscillator::refresh`]) rebuilds it once.
//!
//! Preconditions, not runtime checks:
//! - frequency must be strictly positive when derived state is rebuilt
//! - the sample rate must be strictly positive
//! - saturation must be in (0, 1]

use core::f32::consts::PI;

use blitvox_core::cached::Cached;
use blitvox_core::dsp::{
    blit, floor, phase_increment, pow2, quadratic_bipolar, wave_shaper, wrap_two_pi,
    BLIT_HARMONICS, NOTE_C4,
};
use blitvox_core::filters::{DcBlocker, Integrator};
use blitvox_core::random::Randomizer;
use blitvox_core::rate::SampleRateSource;
use rand::rngs::StdRng;
use rand::RngCore;

/// Lower bound of the per-instance analog detune (Hz).
pub const DETUNE_LOW: f32 = -0.281_273;
/// Upper bound of the per-instance analog detune (Hz).
pub const DETUNE_HIGH: f32 = 0.291_284_6;

/// Narrowest accepted pulse width (fraction of half a period).
pub const PULSE_WIDTH_MIN: f32 = 0.1;
/// Widest accepted pulse width.
pub const PULSE_WIDTH_MAX: f32 = 1.0;

/// Output trim applied to the ramp and saw branches.
const RAMP_GAIN: f32 = 3.0;
/// Pulse branch gain.
const PULSE_GAIN: f32 = 1.6;
/// Gain of the third (triangle) integrator.
const TRIANGLE_GAIN: f32 = 5.0;

/// Snapshot of all waveform outputs after one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BlitWaves {
    pub ramp: f32,
    pub saw: f32,
    pub pulse: f32,
    pub saw_tri: f32,
    pub triangle: f32,
}

/// BLIT oscillator with analog-style detune.
///
/// Generic over the detune RNG so tests can inject a seeded generator;
/// [`BlitOscillator::new`] seeds a `StdRng` from entropy.
#[derive(Clone, Debug)]
pub struct BlitOscillator<R = StdRng> {
    frequency: f32,
    pulse_width: f32,
    phase: f32,
    incr: f32,
    harmonics: u32,
    saturation: f32,
    detune: f32,
    sample_rate: f32,

    rand: Randomizer<R>,
    waves: BlitWaves,

    // 1 V/oct translation memos: input -> derived value
    octave_coeff: Cached<f32>,
    cv_base: Cached<f32>,
    tune_offset: Cached<f32>,

    int1: Integrator,
    int2: Integrator,
    int3: Integrator,
    dcb_saw: DcBlocker,
    dcb_pulse: DcBlocker,

    stale: bool,
    recomputations: u64,
}

impl BlitOscillator<StdRng> {
    /// Oscillator with an entropy-seeded detune draw.
    pub fn new(rate: &impl SampleRateSource) -> Self {
        Self::with_rng(rate, Randomizer::from_entropy())
    }
}

impl<R: RngCore> BlitOscillator<R> {
    /// Oscillator drawing its detune from `rand`.
    pub fn with_rng(rate: &impl SampleRateSource, rand: Randomizer<R>) -> Self {
        let mut osc = Self {
            frequency: 0.0,
            pulse_width: PULSE_WIDTH_MAX,
            phase: 0.0,
            incr: 0.0,
            harmonics: 0,
            saturation: 1.0,
            detune: 0.0,
            sample_rate: rate.sample_rate(),
            rand,
            waves: BlitWaves::default(),
            octave_coeff: Cached::new(0.0, 1.0),
            cv_base: Cached::new(0.0, 1.0),
            tune_offset: Cached::new(0.0, 0.0),
            int1: Integrator::default(),
            int2: Integrator::default(),
            int3: Integrator::default(),
            dcb_saw: DcBlocker::default(),
            dcb_pulse: DcBlocker::default(),
            stale: true,
            recomputations: 0,
        };
        osc.reset();
        osc
    }

    /// Put the oscillator back into its initial state at middle C, drawing a
    /// fresh detune and rebuilding all derived state once.
    pub fn reset(&mut self) {
        self.frequency = 0.0;
        self.pulse_width = PULSE_WIDTH_MAX;
        self.phase = 0.0;
        self.incr = 0.0;
        self.saturation = 1.0;
        self.detune = self.rand.next_float(DETUNE_LOW, DETUNE_HIGH);
        self.waves = BlitWaves::default();

        self.octave_coeff = Cached::new(0.0, 1.0);
        self.cv_base = Cached::new(0.0, 1.0);
        self.tune_offset = Cached::new(0.0, 0.0);

        self.int1.reset();
        self.int2.reset();
        self.int3.reset();
        self.dcb_saw.reset();
        self.dcb_pulse.reset();

        self.set_frequency(NOTE_C4);
        self.refresh();

        #[cfg(feature = "tracing")]
        tracing::debug!(detune = self.detune, sample_rate = self.sample_rate, "oscillator reset");
    }

    /// Set the oscillator frequency in Hz. Equal values are ignored so the
    /// derived state stays valid.
    #[inline]
    pub fn set_frequency(&mut self, frequency: f32) {
        if self.frequency != frequency {
            self.frequency = frequency;
            self.stale = true;
        }
    }

    /// Set the pulse width, clamped into [0.1, 1.0].
    #[inline]
    pub fn set_pulse_width(&mut self, pw: f32) {
        self.pulse_width = pw.clamp(PULSE_WIDTH_MIN, PULSE_WIDTH_MAX);
        self.stale = true;
    }

    /// Set the waveshaper amount in (0, 1]; 1 is the clean end.
    #[inline]
    pub fn set_saturation(&mut self, amount: f32) {
        debug_assert!(amount > 0.0, "saturation amount must be positive");
        self.saturation = amount;
        self.stale = true;
    }

    /// Sample-rate change notification from the host.
    #[inline]
    pub fn set_sample_rate(&mut self, rate: &impl SampleRateSource) {
        let sr = rate.sample_rate();
        if self.sample_rate != sr {
            self.sample_rate = sr;
            self.stale = true;
        }
    }

    /// Translate a 1 V/oct pitch voltage plus linear FM, fine tune and octave
    /// offset into the oscillator frequency:
    ///
    /// `f = (C4 + sign(tune)·tune²) · 2^cv · 2^octave + detune + fm`
    ///
    /// Each power term is only recomputed when its own input changed.
    pub fn update_pitch(&mut self, cv: f32, fm: f32, tune: f32, octave: f32) {
        let coeff = self.octave_coeff.get(octave, pow2);
        let base = self.cv_base.get(cv, pow2);
        let offset = self.tune_offset.get(tune, quadratic_bipolar);

        self.set_frequency((NOTE_C4 + offset) * base * coeff + self.detune + fm);
    }

    /// Rebuild phase increment and harmonic count if any input changed.
    #[inline]
    pub fn refresh(&mut self) {
        if !self.stale {
            return;
        }
        debug_assert!(self.frequency > 0.0, "oscillator frequency must be positive");

        self.incr = phase_increment(self.frequency, self.sample_rate);
        // float -> int casts saturate, so a degenerate frequency yields 0 harmonics
        self.harmonics = floor(BLIT_HARMONICS / self.frequency) as u32;
        self.stale = false;
        self.recomputations += 1;
    }

    /// Advance one sample. Must be called exactly once per audio frame.
    pub fn process(&mut self) {
        self.refresh();

        self.phase = wrap_two_pi(self.incr + self.phase);

        let w = self.pulse_width * PI;
        let n = self.harmonics as f32;

        let blit1 = blit(n, self.phase);
        let blit2 = blit(n, wrap_two_pi(w + self.phase));

        let ramp = self.int1.add(blit1, self.incr);
        let delta = ramp - self.int2.add(blit2, self.incr);
        let beta = self.int3.add(delta, self.incr) * TRIANGLE_GAIN;

        let saw = -ramp;
        let triangle = PI / w * beta;
        let saw_tri = saw + beta;

        let saw = self.dcb_saw.filter(saw * RAMP_GAIN);
        let pulse = self.dcb_pulse.filter(delta * PULSE_GAIN);

        let amount = self.saturation;
        self.waves = BlitWaves {
            ramp: ramp * RAMP_GAIN,
            saw: wave_shaper(amount, saw),
            pulse: wave_shaper(amount, pulse),
            saw_tri: wave_shaper(amount, saw_tri),
            triangle: wave_shaper(amount, triangle),
        };
    }

    #[inline] pub fn frequency(&self) -> f32 { self.frequency }
    #[inline] pub fn pulse_width(&self) -> f32 { self.pulse_width }
    #[inline] pub fn saturation(&self) -> f32 { self.saturation }
    #[inline] pub fn detune(&self) -> f32 { self.detune }
    #[inline] pub fn phase(&self) -> f32 { self.phase }
    #[inline] pub fn phase_increment(&self) -> f32 { self.incr }
    #[inline] pub fn harmonics(&self) -> u32 { self.harmonics }
    #[inline] pub fn sample_rate(&self) -> f32 { self.sample_rate }

    /// How many times derived state has been rebuilt since construction.
    #[inline] pub fn recomputations(&self) -> u64 { self.recomputations }

    #[inline] pub fn waves(&self) -> BlitWaves { self.waves }
    #[inline] pub fn ramp(&self) -> f32 { self.waves.ramp }
    #[inline] pub fn saw(&self) -> f32 { self.waves.saw }
    #[inline] pub fn pulse(&self) -> f32 { self.waves.pulse }
    #[inline] pub fn saw_tri(&self) -> f32 { self.waves.saw_tri }
    #[inline] pub fn triangle(&self) -> f32 { self.waves.triangle }
}
