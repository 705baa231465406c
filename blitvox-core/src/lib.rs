#![cfg_attr(not(feature = "std"), no_std)]
//! blitvox core: no_std-ready numeric primitives for a band-limited
//! oscillator and a resonant ladder filter.
//!
//! Features
//! - `std`       : (default) use the Rust standard library, entropy-seeded randomizer
//! - `no-std`    : build with `#![no_std]` and use `libm` as the math backend
//! - `micromath` : use `micromath` as the math backend
//! - `fast-math` : polynomial sine inside the BLIT kernel
//!
//! Modules
//! - [`dsp`]     : math backend, constants, fast trig, phase wrap, BLIT kernel, shapers
//! - [`filters`] : leaky integrator, DC blocker, 6 dB low-pass
//! - [`random`]  : injectable float randomizer (detune)
//! - [`cached`]  : `Cached<T>` memo cell for expensive derived values
//! - [`rate`]    : host sample-rate accessor
//!
//! Design
//! - No heap allocations; every call is constant time
//! - Preconditions are `debug_assert!`s, never runtime errors

pub mod cached;
pub mod dsp;
pub mod filters;
pub mod random;
pub mod rate;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::cached::Cached;
    pub use crate::dsp::{
        blit, clip, fast_sin, phase_increment, quadratic_bipolar, wave_shaper, wrap_two_pi,
        BLIT_HARMONICS, NOTE_C4, OUTPUT_VOLTAGE, TAU,
    };
    pub use crate::filters::{DcBlocker, Integrator, Lp6dbFilter};
    pub use crate::random::Randomizer;
    pub use crate::rate::SampleRateSource;
}

#[cfg(test)]
mod smoke {

    #[test]
    fn prelude_exists() {
        use crate::prelude::*;
        let _ = wrap_two_pi(7.0);
        let _ = blit(10.0, 0.3);
        let mut int = Integrator::default();
        let _ = int.add(1.0, phase_increment(NOTE_C4, 48_000.0));
        let mut lp = Lp6dbFilter::new(&48_000.0_f32);
        let _ = lp.filter(0.1);
    }
}
