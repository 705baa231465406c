//! blitvox engine: the BLIT oscillator, the resonant ladder filter, and the
//! host-facing modules that drive them once per audio frame.
//!
//! Crate layout:
//! - [`oscillator`] : `BlitOscillator`, five band-limited waveforms from one phase
//! - [`ladder`]     : `LadderFilter`, 24 dB/oct resonant low-pass
//! - [`modules`]    : `Vco` / `Vcf`, panel knobs and CV into normalized parameters
//! - [`graph`]      : `Generator` trait and `Engine<G>` per-frame driver
//! - [`patch`]      : a VCO → VCF voice that implements `Generator`
//!
//! Oscillator and filter share no state. Wiring one into the other is the
//! job of the surrounding runtime (or [`patch::Patch`]).
//!
//! Nothing here allocates, locks, or blocks per sample. Every type is plain
//! unsynchronized state meant to be stepped from a single audio thread.

pub mod graph;
pub mod ladder;
pub mod modules;
pub mod oscillator;
pub mod patch;

// Re-export some commonly used items to make downstream imports ergonomic.
pub use graph::{Engine, Generator};
pub use ladder::{LadderFilter, LadderMode, LadderTaps};
pub use modules::{Vcf, VcfInputs, VcfParams, Vco, VcoInputs, VcoOutputs, VcoParams};
pub use oscillator::{BlitOscillator, BlitWaves};
pub use patch::{Patch, Waveform};
