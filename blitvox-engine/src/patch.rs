//! A mono voice patch: `Vco` into `Vcf`, with a slow sine LFO on the cutoff CV.
//!
//! The patch implements [`Generator`], so it can be driven by [`Engine`]
//! (see [`crate::graph`]). Output is normalized from the filter's ±5 V range
//! to ±1 and multiplied by the patch gain.
//!
//! [`Engine`]: crate::graph::Engine

use blitvox_core::dsp::{fast_sin, wrap_two_pi, OUTPUT_VOLTAGE, TAU};
use rand::rngs::StdRng;
use rand::RngCore;

use crate::graph::Generator;
use crate::modules::{Vcf, VcfInputs, VcfParams, Vco, VcoInputs, VcoOutputs, VcoParams};

/// Which VCO output feeds the filter.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Waveform {
    #[default]
    Ramp,
    Pulse,
    SawTri,
    Triangle,
}

impl Waveform {
    #[inline]
    fn pick(self, out: &VcoOutputs) -> f32 {
        match self {
            Waveform::Ramp => out.ramp,
            Waveform::Pulse => out.pulse,
            Waveform::SawTri => out.saw_tri,
            Waveform::Triangle => out.triangle,
        }
    }
}

/// Sine LFO in volts (±`depth` · 10 V) on a wrapped phase.
#[derive(Copy, Clone, Debug)]
pub struct SineLfo {
    phase: f32,
    incr: f32,
    rate_hz: f32,
    depth: f32,
}

impl SineLfo {
    pub fn new(rate_hz: f32, depth: f32, sr: f32) -> Self {
        let mut lfo = Self { phase: 0.0, incr: 0.0, rate_hz, depth };
        lfo.set_sample_rate(sr);
        lfo
    }

    #[inline]
    pub fn set_sample_rate(&mut self, sr: f32) {
        self.incr = TAU * self.rate_hz / sr.max(1.0);
    }

    #[inline]
    pub fn set_rate(&mut self, rate_hz: f32, sr: f32) {
        self.rate_hz = rate_hz.max(0.0);
        self.set_sample_rate(sr);
    }

    #[inline] pub fn set_depth(&mut self, depth: f32) { self.depth = depth.clamp(0.0, 1.0); }

    /// Next LFO value in volts.
    #[inline]
    pub fn next(&mut self) -> f32 {
        self.phase = wrap_two_pi(self.phase + self.incr);
        fast_sin(self.phase) * self.depth * 10.0
    }
}

/// VCO → VCF voice.
#[derive(Clone, Debug)]
pub struct Patch<R = StdRng> {
    vco: Vco<R>,
    vcf: Vcf,
    lfo: SineLfo,
    waveform: Waveform,
    pitch: f32,
    gain: f32,
    sr: f32,
}

impl Patch<StdRng> {
    /// Patch with an entropy-seeded VCO at sample rate `sr`.
    pub fn new(sr: f32) -> Self {
        Self::from_vco(Vco::new(&sr), sr)
    }
}

impl<R: RngCore> Patch<R> {
    /// Patch around an existing VCO (e.g. one with a seeded detune).
    pub fn from_vco(vco: Vco<R>, sr: f32) -> Self {
        let mut vcf = Vcf::new();
        vcf.set_params(VcfParams {
            cutoff: 0.55,
            resonance: 0.4,
            cutoff_cv_amount: 1.0,
            resonance_cv_amount: 0.0,
        });
        Self {
            vco,
            vcf,
            lfo: SineLfo::new(0.2, 0.3, sr),
            waveform: Waveform::Ramp,
            pitch: 0.0,
            gain: 0.5,
            sr,
        }
    }

    #[inline] pub fn set_pitch(&mut self, volts: f32) { self.pitch = volts; }
    #[inline] pub fn set_waveform(&mut self, w: Waveform) { self.waveform = w; }
    #[inline] pub fn set_gain(&mut self, g: f32) { self.gain = g.max(0.0); }
    #[inline] pub fn set_vco_params(&mut self, p: VcoParams) { self.vco.set_params(p); }
    #[inline] pub fn set_vcf_params(&mut self, p: VcfParams) { self.vcf.set_params(p); }
    #[inline] pub fn set_lfo(&mut self, rate_hz: f32, depth: f32) {
        self.lfo.set_rate(rate_hz, self.sr);
        self.lfo.set_depth(depth);
    }

    #[inline] pub fn vco(&self) -> &Vco<R> { &self.vco }
    #[inline] pub fn vcf(&self) -> &Vcf { &self.vcf }
}

impl<R: RngCore> Generator for Patch<R> {
    fn reset(&mut self, sr: f32) {
        self.sr = sr;
        self.lfo.set_sample_rate(sr);
        // the VCO picks the new rate up on its next step
    }

    fn next(&mut self) -> f32 {
        let sr = self.sr;
        let out = self.vco.step(&sr, VcoInputs { voct: self.pitch, fm: 0.0 });
        let cutoff_cv = self.lfo.next();
        let y = self.vcf.step(
            &sr,
            VcfInputs { signal: self.waveform.pick(&out), cutoff_cv, resonance_cv: 0.0 },
        );
        y / OUTPUT_VOLTAGE * self.gain
    }
}
