//! Sample-rate accessor supplied by the host runtime.
//!
//! The core never owns the audio clock. Anything that needs the sample rate
//! (phase increments, one-pole coefficients) asks a [`SampleRateSource`],
//! which is assumed positive and constant between explicit change
//! notifications.

/// Host-side sample-rate query.
pub trait SampleRateSource {
    /// Current sample rate in Hz. Must be positive.
    fn sample_rate(&self) -> f32;
}

/// A bare `f32` is a fixed sample rate.
impl SampleRateSource for f32 {
    #[inline]
    fn sample_rate(&self) -> f32 {
        *self
    }
}

impl<T: SampleRateSource + ?Sized> SampleRateSource for &T {
    #[inline]
    fn sample_rate(&self) -> f32 {
        (**self).sample_rate()
    }
}
