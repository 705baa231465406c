//! Host-facing voice modules.
//!
//! A host runtime calls `step` once per audio frame with the current knob
//! values and CV inputs. These wrappers turn panel-range values into the
//! normalized parameters of [`BlitOscillator`] and [`LadderFilter`]:
//!
//! - `Vco`: 1 V/oct + FM + quadratic tune + octave into frequency; forwards
//!   saturation and pulse width only when they changed.
//! - `Vcf`: exponential cutoff knob (20 Hz · 1000^x) with CV, normalized to
//!   Nyquist; resonance with CV; ±10 V input normalized to ±1.

use blitvox_core::dsp::{clip, pow};
use blitvox_core::random::Randomizer;
use blitvox_core::rate::SampleRateSource;
use rand::rngs::StdRng;
use rand::RngCore;

use crate::ladder::{LadderFilter, LadderMode, LadderTaps};
use crate::oscillator::{BlitOscillator, PULSE_WIDTH_MAX, PULSE_WIDTH_MIN};

// --------------------------------- VCO -------------------------------------------

/// VCO panel settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VcoParams {
    /// Fine tune, -15..15 (quadratic response, ± up to 225 Hz).
    pub tune: f32,
    /// Octave offset, -3..3.
    pub octave: f32,
    /// FM input attenuator, 0..1.
    pub fm_amount: f32,
    /// Waveshaper amount, 0.1..1 (1 = clean).
    pub saturation: f32,
    /// Pulse width, 0.1..1.
    pub pulse_width: f32,
}

impl Default for VcoParams {
    fn default() -> Self {
        Self { tune: 0.0, octave: 0.0, fm_amount: 1.0, saturation: 1.0, pulse_width: 1.0 }
    }
}

/// VCO jack inputs for one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VcoInputs {
    /// Pitch in volts, 1 V/oct, 0 V = C4.
    pub voct: f32,
    /// Linear FM in Hz.
    pub fm: f32,
}

/// VCO jack outputs for one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VcoOutputs {
    pub ramp: f32,
    pub pulse: f32,
    pub saw_tri: f32,
    pub triangle: f32,
}

/// Voltage-controlled BLIT oscillator module.
#[derive(Clone, Debug)]
pub struct Vco<R = StdRng> {
    osc: BlitOscillator<R>,
    params: VcoParams,
}

impl Vco<StdRng> {
    pub fn new(rate: &impl SampleRateSource) -> Self {
        Self::from_oscillator(BlitOscillator::new(rate))
    }
}

impl<R: RngCore> Vco<R> {
    pub fn with_rng(rate: &impl SampleRateSource, rand: Randomizer<R>) -> Self {
        Self::from_oscillator(BlitOscillator::with_rng(rate, rand))
    }

    fn from_oscillator(osc: BlitOscillator<R>) -> Self {
        Self { osc, params: VcoParams::default() }
    }

    #[inline] pub fn params(&self) -> &VcoParams { &self.params }
    #[inline] pub fn params_mut(&mut self) -> &mut VcoParams { &mut self.params }
    #[inline] pub fn set_params(&mut self, params: VcoParams) { self.params = params; }
    #[inline] pub fn oscillator(&self) -> &BlitOscillator<R> { &self.osc }

    /// Process one frame.
    pub fn step(&mut self, rate: &impl SampleRateSource, inputs: VcoInputs) -> VcoOutputs {
        let p = self.params;

        self.osc.set_sample_rate(rate);
        self.osc.update_pitch(inputs.voct, inputs.fm * p.fm_amount, p.tune, p.octave);

        if self.osc.saturation() != p.saturation {
            self.osc.set_saturation(p.saturation);
        }
        // compare in the oscillator's clamped domain
        let pulse_width = p.pulse_width.clamp(PULSE_WIDTH_MIN, PULSE_WIDTH_MAX);
        if self.osc.pulse_width() != pulse_width {
            self.osc.set_pulse_width(pulse_width);
        }

        self.osc.process();

        VcoOutputs {
            ramp: self.osc.ramp(),
            pulse: self.osc.pulse(),
            saw_tri: self.osc.saw_tri(),
            triangle: self.osc.triangle(),
        }
    }

    /// Reset the oscillator (new detune draw).
    pub fn reset(&mut self) {
        self.osc.reset();
    }
}

// --------------------------------- VCF -------------------------------------------

/// Lowest cutoff of the exponential knob, in Hz.
pub const CUTOFF_MIN_HZ: f32 = 20.0;
/// Ratio between the top and bottom of the cutoff knob.
pub const CUTOFF_RANGE: f32 = 1000.0;
/// Cutoff CV scaling (knob units per volt).
pub const CUTOFF_CV_SCALE: f32 = 0.05;
/// Resonance CV scaling (knob units per volt).
pub const RESONANCE_CV_SCALE: f32 = 0.1;
/// Audio input scaling from ±10 V into the ladder's ±1 range.
pub const INPUT_SCALE: f32 = 0.1;

/// VCF panel settings, all 0..1.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VcfParams {
    pub cutoff: f32,
    pub resonance: f32,
    pub cutoff_cv_amount: f32,
    pub resonance_cv_amount: f32,
}

/// VCF jack inputs for one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VcfInputs {
    pub signal: f32,
    pub cutoff_cv: f32,
    pub resonance_cv: f32,
}

/// Voltage-controlled ladder filter module.
#[derive(Copy, Clone, Debug, Default)]
pub struct Vcf {
    filter: LadderFilter,
    params: VcfParams,
    cutoff: f32,
    resonance: f32,
}

impl Vcf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: LadderMode) -> Self {
        Self { filter: LadderFilter::with_mode(mode), ..Self::default() }
    }

    #[inline] pub fn params(&self) -> &VcfParams { &self.params }
    #[inline] pub fn params_mut(&mut self) -> &mut VcfParams { &mut self.params }
    #[inline] pub fn set_params(&mut self, params: VcfParams) { self.params = params; }
    #[inline] pub fn filter(&self) -> &LadderFilter { &self.filter }

    /// Normalized cutoff (fraction of Nyquist) used on the last frame.
    #[inline] pub fn cutoff(&self) -> f32 { self.cutoff }
    /// Resonance used on the last frame.
    #[inline] pub fn resonance(&self) -> f32 { self.resonance }

    fn update(&mut self, rate: &impl SampleRateSource, inputs: &VcfInputs) -> f32 {
        let p = &self.params;
        let cutoff_cv = inputs.cutoff_cv * CUTOFF_CV_SCALE * p.cutoff_cv_amount;
        let resonance_cv = inputs.resonance_cv * RESONANCE_CV_SCALE * p.resonance_cv_amount;

        let hz = CUTOFF_MIN_HZ * pow(CUTOFF_RANGE, p.cutoff + cutoff_cv);
        let nyquist = rate.sample_rate() * 0.5;

        self.cutoff = clip(hz / nyquist, 1.0);
        self.resonance = clip(p.resonance + resonance_cv, 1.0);

        clip(inputs.signal * INPUT_SCALE, 1.0)
    }

    /// Process one frame; returns the low-pass output in volts (±5 V).
    pub fn step(&mut self, rate: &impl SampleRateSource, inputs: VcfInputs) -> f32 {
        let x = self.update(rate, &inputs);
        self.filter.process(x, self.cutoff, self.resonance)
    }

    /// Process one frame and return all ladder taps.
    pub fn step_taps(&mut self, rate: &impl SampleRateSource, inputs: VcfInputs) -> LadderTaps {
        let x = self.update(rate, &inputs);
        self.filter.process_taps(x, self.cutoff, self.resonance)
    }

    pub fn reset(&mut self) {
        self.filter.reset();
    }
}

// ------------------------------------ Tests --------------------------------------
