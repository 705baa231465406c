//! C ABI wrapper for the blitvox voice modules.
//!
//! A host runtime creates VCO and VCF instances, pushes knob values when they
//! change, and calls the `*_step` functions once per audio frame. A complete
//! VCO -> VCF patch with block rendering is exposed as well.
//!
//! ABI notes
//! - All functions are `extern "C"` and `#[no_mangle]`.
//! - Handles are opaque and heap-allocated; the caller owns them and must
//!   release them with the matching `*_destroy`.
//! - Null handles and null/empty buffers are ignored (0 or no-op), never a panic.
//!
//! Threading
//! - Handles are NOT thread-safe; drive each one from a single audio thread.

use blitvox_engine::{
    Engine, LadderMode, Patch, Vcf, VcfInputs, VcfParams, Vco, VcoInputs, VcoParams, Waveform,
};

#[inline]
fn handle<'a, T>(ptr: *mut T) -> Option<&'a mut T> {
    // SAFETY: callers hand back pointers obtained from the matching `*_create`
    unsafe { ptr.as_mut() }
}

#[inline]
fn sanitize_rate(sr: f32) -> f32 {
    if sr.is_finite() { sr.max(1.0) } else { 48_000.0 }
}

fn destroy<T>(ptr: *mut T) {
    if !ptr.is_null() {
        // SAFETY: pointer came from Box::into_raw in the matching constructor
        unsafe { drop(Box::from_raw(ptr)) };
    }
}

// --- VCO -------------------------------------------------------------------------

/// Opaque VCO handle.
pub struct BlitvoxVco {
    sr: f32,
    inner: Vco,
}

/// The four VCO outputs of one frame, in volts.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BlitvoxVcoOutputs {
    pub ramp: f32,
    pub pulse: f32,
    pub saw_tri: f32,
    pub triangle: f32,
}

/// Create a VCO with an entropy-drawn detune.
#[no_mangle]
pub extern "C" fn blitvox_vco_create(sample_rate: f32) -> *mut BlitvoxVco {
    let sr = sanitize_rate(sample_rate);
    Box::into_raw(Box::new(BlitvoxVco { sr, inner: Vco::new(&sr) }))
}

#[no_mangle]
pub extern "C" fn blitvox_vco_destroy(vco: *mut BlitvoxVco) {
    destroy(vco);
}

/// Inform the VCO of a new host sample rate.
#[no_mangle]
pub extern "C" fn blitvox_vco_set_sample_rate(vco: *mut BlitvoxVco, sample_rate: f32) {
    if let Some(v) = handle(vco) {
        v.sr = sanitize_rate(sample_rate);
    }
}

/// Panel values: tune -15..15, octave -3..3, fm 0..1, saturation 0.1..1, pulse width 0.1..1.
#[no_mangle]
pub extern "C" fn blitvox_vco_set_params(
    vco: *mut BlitvoxVco,
    tune: f32,
    octave: f32,
    fm_amount: f32,
    saturation: f32,
    pulse_width: f32,
) {
    if let Some(v) = handle(vco) {
        v.inner.set_params(VcoParams {
            tune,
            octave,
            fm_amount,
            saturation: saturation.clamp(0.1, 1.0),
            pulse_width: pulse_width.clamp(0.1, 1.0),
        });
    }
}

/// Process one frame. `voct` is 1 V/oct (0 V = C4), `fm` is in Hz before the
/// FM attenuator. Writes into `out`; returns 1 on success, 0 otherwise.
#[no_mangle]
pub extern "C" fn blitvox_vco_step(
    vco: *mut BlitvoxVco,
    voct: f32,
    fm: f32,
    out: *mut BlitvoxVcoOutputs,
) -> u32 {
    let (Some(v), Some(out)) = (handle(vco), handle(out)) else {
        return 0;
    };
    let sr = v.sr;
    let o = v.inner.step(&sr, VcoInputs { voct, fm });
    *out = BlitvoxVcoOutputs { ramp: o.ramp, pulse: o.pulse, saw_tri: o.saw_tri, triangle: o.triangle };
    1
}

/// Reset phase and integrators and draw a new detune.
#[no_mangle]
pub extern "C" fn blitvox_vco_reset(vco: *mut BlitvoxVco) {
    if let Some(v) = handle(vco) {
        v.inner.reset();
    }
}

// --- VCF -------------------------------------------------------------------------

/// Opaque VCF handle.
pub struct BlitvoxVcf {
    sr: f32,
    inner: Vcf,
}

/// Create a VCF. `hardened != 0` clamps the ladder registers at high resonance.
#[no_mangle]
pub extern "C" fn blitvox_vcf_create(sample_rate: f32, hardened: u32) -> *mut BlitvoxVcf {
    let mode = if hardened != 0 { LadderMode::Hardened } else { LadderMode::Classic };
    Box::into_raw(Box::new(BlitvoxVcf { sr: sanitize_rate(sample_rate), inner: Vcf::with_mode(mode) }))
}

#[no_mangle]
pub extern "C" fn blitvox_vcf_destroy(vcf: *mut BlitvoxVcf) {
    destroy(vcf);
}

#[no_mangle]
pub extern "C" fn blitvox_vcf_set_sample_rate(vcf: *mut BlitvoxVcf, sample_rate: f32) {
    if let Some(f) = handle(vcf) {
        f.sr = sanitize_rate(sample_rate);
    }
}

/// Panel values, all 0..1.
#[no_mangle]
pub extern "C" fn blitvox_vcf_set_params(
    vcf: *mut BlitvoxVcf,
    cutoff: f32,
    resonance: f32,
    cutoff_cv_amount: f32,
    resonance_cv_amount: f32,
) {
    if let Some(f) = handle(vcf) {
        f.inner.set_params(VcfParams { cutoff, resonance, cutoff_cv_amount, resonance_cv_amount });
    }
}

/// Process one frame; returns the low-pass output in volts (±5 V), 0 on a null handle.
#[no_mangle]
pub extern "C" fn blitvox_vcf_step(
    vcf: *mut BlitvoxVcf,
    signal: f32,
    cutoff_cv: f32,
    resonance_cv: f32,
) -> f32 {
    match handle(vcf) {
        Some(f) => {
            let sr = f.sr;
            f.inner.step(&sr, VcfInputs { signal, cutoff_cv, resonance_cv })
        }
        None => 0.0,
    }
}

#[no_mangle]
pub extern "C" fn blitvox_vcf_reset(vcf: *mut BlitvoxVcf) {
    if let Some(f) = handle(vcf) {
        f.inner.reset();
    }
}

// --- Patch -----------------------------------------------------------------------

/// Opaque VCO -> VCF patch with a cutoff LFO.
pub struct BlitvoxPatch {
    inner: Engine<Patch>,
}

#[no_mangle]
pub extern "C" fn blitvox_patch_create(sample_rate: f32) -> *mut BlitvoxPatch {
    let sr = sanitize_rate(sample_rate);
    Box::into_raw(Box::new(BlitvoxPatch { inner: Engine::new(Patch::new(sr), sr) }))
}

#[no_mangle]
pub extern "C" fn blitvox_patch_destroy(patch: *mut BlitvoxPatch) {
    destroy(patch);
}

/// Reset the patch to a new sample rate.
#[no_mangle]
pub extern "C" fn blitvox_patch_set_sample_rate(patch: *mut BlitvoxPatch, sample_rate: f32) {
    if let Some(p) = handle(patch) {
        p.inner.set_sample_rate(sanitize_rate(sample_rate));
    }
}

#[no_mangle]
pub extern "C" fn blitvox_patch_set_pitch(patch: *mut BlitvoxPatch, volts: f32) {
    if let Some(p) = handle(patch) {
        p.inner.patch_mut().set_pitch(volts);
    }
}

/// 0 = ramp, 1 = pulse, 2 = saw-tri, 3 = triangle; other values are ignored.
#[no_mangle]
pub extern "C" fn blitvox_patch_set_waveform(patch: *mut BlitvoxPatch, waveform: u32) {
    let w = match waveform {
        0 => Waveform::Ramp,
        1 => Waveform::Pulse,
        2 => Waveform::SawTri,
        3 => Waveform::Triangle,
        _ => return,
    };
    if let Some(p) = handle(patch) {
        p.inner.patch_mut().set_waveform(w);
    }
}

/// Output gain, clamped to [0, +inf); non-finite values restore 1.0.
#[no_mangle]
pub extern "C" fn blitvox_patch_set_gain(patch: *mut BlitvoxPatch, gain: f32) {
    if let Some(p) = handle(patch) {
        p.inner.patch_mut().set_gain(if gain.is_finite() { gain } else { 1.0 });
    }
}

#[no_mangle]
pub extern "C" fn blitvox_patch_set_lfo(patch: *mut BlitvoxPatch, rate_hz: f32, depth: f32) {
    if let Some(p) = handle(patch) {
        p.inner.patch_mut().set_lfo(rate_hz, depth);
    }
}

/// Render `frames` of audio into an interleaved f32 buffer with `channels` channels.
/// The patch is mono; each sample is duplicated to all channels.
///
/// Returns the number of frames rendered (0 on error).
#[no_mangle]
pub extern "C" fn blitvox_patch_render_interleaved_f32(
    patch: *mut BlitvoxPatch,
    out_interleaved: *mut f32,
    frames: u32,
    channels: u32,
) -> u32 {
    if out_interleaved.is_null() || frames == 0 || channels == 0 {
        return 0;
    }
    let Some(p) = handle(patch) else {
        return 0;
    };
    let ch = channels as usize;
    // SAFETY: caller guarantees `frames * channels` writable floats
    let out = unsafe { std::slice::from_raw_parts_mut(out_interleaved, frames as usize * ch) };

    let sr = p.inner.sample_rate();
    for frame in out.chunks_exact_mut(ch) {
        frame.fill(p.inner.next(sr));
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn null_handles_are_ignored() {
        let mut out = BlitvoxVcoOutputs::default();
        assert_eq!(blitvox_vco_step(ptr::null_mut(), 0.0, 0.0, &mut out), 0);
        assert_eq!(blitvox_vcf_step(ptr::null_mut(), 1.0, 0.0, 0.0), 0.0);
        assert_eq!(blitvox_patch_render_interleaved_f32(ptr::null_mut(), ptr::null_mut(), 4, 2), 0);
        blitvox_vco_set_params(ptr::null_mut(), 0.0, 0.0, 1.0, 1.0, 1.0);
        blitvox_vcf_reset(ptr::null_mut());
        blitvox_vco_destroy(ptr::null_mut());
        blitvox_vcf_destroy(ptr::null_mut());
        blitvox_patch_destroy(ptr::null_mut());
    }

    #[test]
    fn vco_into_vcf_round_trip() {
        let vco = blitvox_vco_create(44_100.0);
        let vcf = blitvox_vcf_create(44_100.0, 1);
        blitvox_vco_set_params(vco, 0.0, 0.0, 1.0, 1.0, 0.5);
        blitvox_vcf_set_params(vcf, 0.7, 0.2, 0.0, 0.0);

        let mut out = BlitvoxVcoOutputs::default();
        let mut peak = 0.0_f32;
        for _ in 0..4410 {
            assert_eq!(blitvox_vco_step(vco, 0.0, 0.0, &mut out), 1);
            let y = blitvox_vcf_step(vcf, out.ramp, 0.0, 0.0);
            assert!(y.is_finite() && y.abs() <= 5.0);
            peak = peak.max(y.abs());
        }
        assert!(peak > 0.05, "peak={}", peak);

        blitvox_vco_destroy(vco);
        blitvox_vcf_destroy(vcf);
    }

    #[test]
    fn patch_renders_duplicated_channels() {
        let patch = blitvox_patch_create(48_000.0);
        let mut buf = vec![0.0_f32; 256 * 2];
        assert_eq!(blitvox_patch_render_interleaved_f32(patch, buf.as_mut_ptr(), 256, 2), 256);
        for frame in buf.chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert!(buf.iter().any(|s| *s != 0.0));
        blitvox_patch_destroy(patch);
    }
}
