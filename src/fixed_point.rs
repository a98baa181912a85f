//! Q15 fixed-point helpers.
//!
//! Filter coefficients are stored as Q15 fractions: an integer `n`
//! represents `n / 2^15`, so `Q15_ONE` is 1.0. Products of a Q15
//! coefficient and an integer are shifted right by [`Q15_SHIFT`] to return
//! to the integer's scale.
//!
//! The conversions are `const fn`, meant for deriving coefficients at
//! compile time. The estimators themselves never touch floating point.

/// Position of the binary point in a Q15 value.
pub const Q15_SHIFT: u32 = 15;

/// The value 1.0 in Q15.
pub const Q15_ONE: i32 = 1 << Q15_SHIFT;

/// Converts a fraction to Q15, rounding to nearest.
///
/// Values beyond the `i32` range saturate; sensible coefficients stay well
/// within `-1.0..=1.0`.
#[must_use]
pub const fn q15(value: f64) -> i32 {
    let scaled = value * Q15_ONE as f64;
    if scaled < 0.0 {
        (scaled - 0.5) as i32
    } else {
        (scaled + 0.5) as i32
    }
}

/// Converts a Q15 value back to a fraction.
#[must_use]
pub fn q15_to_f64(value: i32) -> f64 {
    f64::from(value) / f64::from(Q15_ONE)
}
