//! Numeric primitives shared by the oscillator and the ladder filter.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate feature `no-std`)
//! - Math backend selection that works in both `std` and `no_std` contexts
//! - Constant-time, allocation-free helpers that are safe to call per sample
//!
//! Features used by this file:
//! - `fast-math` : the BLIT kernel uses [`fast_sin`] instead of the backend sine
//!
//! Conventions:
//! - Angles are radians. Functions documented as "pre-wrapped" do no range
//!   reduction of their own; call [`wrap_two_pi`] first.
//! - Preconditions are checked with `debug_assert!` only. Release builds keep
//!   the raw numeric behavior, including NaN/inf propagation on bad input.

#![allow(clippy::excessive_precision)]

use core::f32::consts::PI;

use cfg_if::cfg_if;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // micromath preferred if explicitly requested (works in no_std)
    if #[cfg(feature = "micromath")] {
        use micromath::F32Ext as _;
        #[inline] fn m_sin(x: f32) -> f32 { x.sin() }
        #[inline] fn m_exp(x: f32) -> f32 { x.exp() }
        #[inline] fn m_sqrt(x: f32) -> f32 { x.sqrt() }
        #[inline] fn m_pow(b: f32, e: f32) -> f32 { b.powf(e) }
        #[inline] fn m_round(x: f32) -> f32 { x.round() }
        #[inline] fn m_floor(x: f32) -> f32 { x.floor() }
        #[inline] fn m_abs(x: f32) -> f32 { x.abs() }
    // libm (C math) in no_std
    } else if #[cfg(feature = "no-std")] {
        #[inline] fn m_sin(x: f32) -> f32 { libm::sinf(x) }
        #[inline] fn m_exp(x: f32) -> f32 { libm::expf(x) }
        #[inline] fn m_sqrt(x: f32) -> f32 { libm::sqrtf(x) }
        #[inline] fn m_pow(b: f32, e: f32) -> f32 { libm::powf(b, e) }
        #[inline] fn m_round(x: f32) -> f32 { libm::roundf(x) }
        #[inline] fn m_floor(x: f32) -> f32 { libm::floorf(x) }
        #[inline] fn m_abs(x: f32) -> f32 { libm::fabsf(x) }
    // std backend
    } else {
        #[inline] fn m_sin(x: f32) -> f32 { x.sin() }
        #[inline] fn m_exp(x: f32) -> f32 { x.exp() }
        #[inline] fn m_sqrt(x: f32) -> f32 { x.sqrt() }
        #[inline] fn m_pow(b: f32, e: f32) -> f32 { b.powf(e) }
        #[inline] fn m_round(x: f32) -> f32 { x.round() }
        #[inline] fn m_floor(x: f32) -> f32 { x.floor() }
        #[inline] fn m_abs(x: f32) -> f32 { x.abs() }
    }
}

// --------------------------------- Constants -------------------------------------

/// 2π (one oscillator period in radians)
pub const TAU: f32 = 2.0 * PI;

/// 1 / 2π
pub const INV_TAU: f32 = 1.0 / TAU;

/// Middle C in Hz. 0 V on the 1 V/oct pitch input maps here.
pub const NOTE_C4: f32 = 261.626;

/// Highest harmonic frequency (Hz) the BLIT kernel is allowed to synthesize.
/// `harmonics = floor(BLIT_HARMONICS / frequency)`.
pub const BLIT_HARMONICS: f32 = 21_000.0;

/// Nominal output level of the voice modules (±5 V).
pub const OUTPUT_VOLTAGE: f32 = 5.0;

// --------------------------------- Backend re-exports ----------------------------

/// `base^exp` through the selected math backend.
#[inline]
pub fn pow(base: f32, exp: f32) -> f32 {
    m_pow(base, exp)
}

/// `2^x` through the selected math backend (1 V/oct conversions).
#[inline]
pub fn pow2(x: f32) -> f32 {
    m_pow(2.0, x)
}

/// `floor(x)` through the selected math backend.
#[inline]
pub fn floor(x: f32) -> f32 {
    m_floor(x)
}

// --------------------------------- Fast trig -------------------------------------

/// Polynomial sine approximation for angles already wrapped into [-π, π].
///
/// No range reduction happens here; outside [-π, π] the error grows quickly.
#[inline]
pub fn fast_sin(angle: f32) -> f32 {
    let sqr = angle * angle;
    let mut result = -2.39e-08_f32;
    result = result * sqr + 2.7526e-06;
    result = result * sqr - 1.98409e-04;
    result = result * sqr + 8.3333315e-03;
    result = result * sqr - 1.666666664e-01;
    result = result * sqr + 1.0;
    result * angle
}

/// Quadratic sine approximation, low precision. Accepts one period of slack
/// on either side of [-π, π].
#[inline]
pub fn qsin_lp(x: f32) -> f32 {
    let x = if x < -PI {
        x + TAU
    } else if x > PI {
        x - TAU
    } else {
        x
    };

    if x < 0.0 {
        x * (1.273_239_54 + 0.405_284_735 * x)
    } else {
        x * (1.273_239_54 - 0.405_284_735 * x)
    }
}

/// Quadratic sine approximation, high precision (extra correction pass).
/// Wraps its input, so any finite angle is accepted.
#[inline]
pub fn qsin_hp(x: f32) -> f32 {
    let s = qsin_lp(wrap_two_pi(x));
    if s < 0.0 {
        s * (-0.255 * (s + 1.0) + 1.0)
    } else {
        s * (0.255 * (s - 1.0) + 1.0)
    }
}

// --------------------------------- Phase -----------------------------------------

/// Wrap an angle into (-π, π] by subtracting the nearest multiple of 2π.
///
/// Values already in range are returned untouched, which makes the function
/// exactly idempotent: `wrap_two_pi(wrap_two_pi(x)) == wrap_two_pi(x)`.
#[inline]
pub fn wrap_two_pi(x: f32) -> f32 {
    if x > -PI && x <= PI {
        return x;
    }

    let b = x * INV_TAU;
    let y = (b - m_round(b)) * TAU;

    // rounding at the half-period lands on -π; fold it onto the closed end
    if y <= -PI {
        y + TAU
    } else if y > PI {
        y - TAU
    } else {
        y
    }
}

/// Phase increment per sample for `frequency` Hz at `sample_rate` Hz.
///
/// Precondition: `sample_rate > 0`.
#[inline]
pub fn phase_increment(frequency: f32, sample_rate: f32) -> f32 {
    debug_assert!(sample_rate > 0.0, "sample rate must be positive");
    TAU * frequency / sample_rate
}

// --------------------------------- BLIT ------------------------------------------

#[inline]
fn kernel_sin(x: f32) -> f32 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            fast_sin(x)
        } else {
            m_sin(x)
        }
    }
}

/// Band-limited impulse train sample for `harmonics` partials at `phase`.
///
/// Dirichlet kernel `sin((N - 0.5)·φ) / sin(0.5·φ)`, offset by -1 and scaled
/// by 2 so that the train has zero mean. `phase == 0` is the 0/0 point of the
/// kernel and returns exactly `1.0`.
///
/// `phase` must be pre-wrapped into [-π, π].
#[inline]
pub fn blit(harmonics: f32, phase: f32) -> f32 {
    if phase == 0.0 {
        return 1.0;
    }

    let a = wrap_two_pi((clip_low(harmonics - 1.0, 0.0) + 0.5) * phase);
    let x = kernel_sin(a) / kernel_sin(0.5 * phase);
    (x - 1.0) * 2.0
}

// --------------------------------- Clipping --------------------------------------

/// Symmetric hard clamp into `[-limit, limit]`.
#[inline]
pub fn clip(x: f32, limit: f32) -> f32 {
    if x > limit {
        limit
    } else if x < -limit {
        -limit
    } else {
        x
    }
}

/// Clamp from below only.
#[inline]
pub fn clip_low(x: f32, floor: f32) -> f32 {
    if x < floor { floor } else { x }
}

/// Clamp from above only.
#[inline]
pub fn clip_high(x: f32, ceil: f32) -> f32 {
    if x > ceil { ceil } else { x }
}

// --------------------------------- Nonlinearities --------------------------------

/// Signed square: `sign(t)·t²`. Gives fine-tune knobs a musical response.
#[inline]
pub fn quadratic_bipolar(t: f32) -> f32 {
    let t2 = t * t;
    if t >= 0.0 { t2 } else { -t2 }
}

/// Rational saturation curve with drive `a` in [0, 1).
///
/// `a → 0` is linear (gain 2), `a → 1` approaches a hard sign function.
#[inline]
pub fn shape(a: f32, x: f32) -> f32 {
    let k = 2.0 * a / (1.0 - a);
    let h = x * 0.5;
    let b = (1.0 + k) * h / (1.0 + k * m_abs(h));
    b * 4.0
}

/// Oscillator waveshaper driven by a saturation `amount` in (0, 1].
///
/// `amount = 1` is the linear end, smaller amounts compress harder. Odd
/// symmetric and continuous in `x`.
#[inline]
pub fn wave_shaper(amount: f32, x: f32) -> f32 {
    debug_assert!(amount > 0.0, "saturation amount must be positive");
    shape(1.0 - amount, x)
}

/// Soft saturation above threshold `a` (0 < a < 1); passes `|x| <= a` untouched.
#[inline]
pub fn saturate(x: f32, a: f32) -> f32 {
    let (x, sign) = if x < 0.0 { (-x, -1.0) } else { (x, 1.0) };

    if x <= a {
        return x * sign;
    }

    let over = (x - a) / (1.0 - a);
    let d = a + (x - a) / (1.0 + over * over);

    if d > 1.0 {
        (a + 1.0) / 2.0 * sign
    } else {
        d * sign
    }
}

/// Asymmetric exponential overdrive curve.
#[inline]
pub fn overdrive(input: f32) -> f32 {
    let x = input * 0.686_306;
    let a = 1.0 + m_exp(m_sqrt(m_abs(x)) * -0.75);
    (m_exp(x) - m_exp(-x * a)) / (m_exp(x) + m_exp(-x))
}

// --------------------------------- Tests (std only) ------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_sin_tracks_sin_in_range() {
        let mut x = -PI;
        while x <= PI {
            assert!((fast_sin(x) - x.sin()).abs() < 1e-3, "x={}", x);
            x += 0.01;
        }
    }

    #[test]
    fn qsin_variants_stay_close() {
        for i in -31..=31 {
            let x = i as f32 * 0.1;
            assert!((qsin_lp(x) - x.sin()).abs() < 0.06, "lp x={}", x);
            assert!((qsin_hp(x) - x.sin()).abs() < 0.01, "hp x={}", x);
        }
    }

    #[test]
    fn wrap_folds_half_period() {
        assert_eq!(wrap_two_pi(PI), PI);
        assert!((wrap_two_pi(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_two_pi(-3.0 * PI) - PI).abs() < 1e-5);
        assert!(wrap_two_pi(-PI) > -PI);
        assert!((wrap_two_pi(TAU + 0.5) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn blit_is_one_at_zero_phase() {
        for n in [0.0, 1.0, 2.0, 47.0, 1000.0] {
            assert_eq!(blit(n, 0.0), 1.0);
        }
    }

    #[test]
    fn blit_is_bounded_by_harmonic_count() {
        let n = 47.0;
        let mut phase = -PI + 0.001;
        while phase < PI {
            let v = blit(n, phase);
            assert!(v.abs() <= 4.0 * n + 1e-2, "phase={} v={}", phase, v);
            phase += 0.013;
        }
    }

    #[test]
    fn clip_is_symmetric() {
        assert_eq!(clip(2.0, 1.0), 1.0);
        assert_eq!(clip(-2.0, 1.0), -1.0);
        assert_eq!(clip(0.3, 1.0), 0.3);
        assert_eq!(clip_low(-1.0, 0.0), 0.0);
        assert_eq!(clip_high(3.0, 2.0), 2.0);
    }

    #[test]
    fn quadratic_bipolar_keeps_sign() {
        assert_eq!(quadratic_bipolar(3.0), 9.0);
        assert_eq!(quadratic_bipolar(-3.0), -9.0);
        assert_eq!(quadratic_bipolar(0.0), 0.0);
    }

    #[test]
    fn wave_shaper_is_odd_and_linear_at_full_amount() {
        for x in [-2.0, -0.5, 0.0, 0.25, 1.5] {
            assert!((wave_shaper(1.0, x) - 2.0 * x).abs() < 1e-6);
            for amount in [0.1, 0.5, 0.9] {
                assert!((wave_shaper(amount, x) + wave_shaper(amount, -x)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn wave_shaper_compresses_at_low_amount() {
        let soft = wave_shaper(0.1, 4.0);
        let lin = wave_shaper(1.0, 4.0);
        assert!(soft > 0.0 && soft < lin, "soft={} lin={}", soft, lin);
        // asymptote of the curve is 4·(1 + k)/k
        assert!(wave_shaper(0.1, 1.0e6) < 4.5);
    }

    #[test]
    fn saturate_passes_below_threshold() {
        assert_eq!(saturate(0.3, 0.5), 0.3);
        assert_eq!(saturate(-0.3, 0.5), -0.3);
        let y = saturate(0.9, 0.5);
        assert!(y > 0.5 && y < 0.9, "y={}", y);
        assert!(saturate(10.0, 0.5) <= 1.0);
    }

    #[test]
    fn overdrive_is_finite_and_monotonic_near_zero() {
        assert!(overdrive(0.0).abs() < 1e-6);
        assert!(overdrive(0.5) > overdrive(0.1));
        assert!(overdrive(10.0).is_finite());
    }
}
