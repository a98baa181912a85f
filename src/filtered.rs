//! Filtered RMS estimation through a cascade of fixed-point low-pass filters.
//!
//! Instead of averaging the squared signal over an exact window, this
//! estimator smooths it with two identical first-order IIR low-pass filters
//! in series and takes the square root of the result:
//!
//! ```text
//! x ──► x² ──► H(z) ──► H(z) ──► √ ──► rms
//!
//!          b0 + b1·z⁻¹
//! H(z) = ───────────────
//!           1 + a·z⁻¹
//! ```
//!
//! # Characteristics
//!
//! * Constant memory, independent of the signal frequency
//! * Exponential weighting of past samples; the time constant is fixed by
//!   the coefficients, so no frequency is needed per sample
//! * Unity DC gain when `b0 + b1 == 1 + a`, so a constant input `v`
//!   converges to `|v|`
//!
//! # Arithmetic
//!
//! Samples are `i16`, squares are up to `2^30`. The cascade carries power in
//! Q15, so squares enter at up to `2^45` and the delay line keeps fifteen
//! fractional bits. Every multiply-accumulate is done in `i64` and shifted
//! back by [`Q15_SHIFT`] once per stage, staying below `2^61` for valid
//! coefficients. Only the final power is rounded to an integer before the
//! square root, so small inputs settle on `|v|` instead of a truncation
//! dead band.

use crate::{
    error::{Error, Result},
    fixed_point::{Q15_ONE, Q15_SHIFT, q15},
    isqrt::isqrt_narrow,
};

/// Number of filter stages in the cascade.
pub const STAGES: usize = 2;

/// Coefficients of a first-order IIR filter in Q15.
///
/// Implements `y[n] = b0·x[n] + b1·x[n-1] - a·y[n-1]`. A low-pass filter
/// has its pole `p = -a` just below 1.0.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Coefficients {
    /// Feedback gain, the negated pole
    pub a: i32,

    /// Feed-forward gains for the current and the previous input
    pub b: [i32; 2],
}

impl Coefficients {
    /// Pole of the default filter: a time constant of about 77 samples.
    pub const DEFAULT_POLE: i32 = q15(0.987);

    /// Creates coefficients from raw Q15 values.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` unless:
    /// * The pole lies in `0.0..1.0`, so `a` is in `-1.0 < a <= 0.0`
    /// * Both feed-forward gains are non-negative and not both zero
    /// * The DC gain `(b0 + b1) / (1 + a)` does not exceed one
    ///
    /// These keep the output non-negative and bounded by the input, which
    /// is what makes the `i64` arithmetic overflow-free.
    pub fn new(a: i32, b0: i32, b1: i32) -> Result<Self> {
        if a <= -Q15_ONE || a > 0 {
            return Err(Error::invalid_argument(format!(
                "feedback coefficient {a} must encode a pole in 0.0..1.0"
            )));
        }

        if b0 < 0 || b1 < 0 || b0 + b1 == 0 {
            return Err(Error::invalid_argument(format!(
                "feed-forward coefficients {b0} and {b1} must be non-negative and non-zero"
            )));
        }

        if b0 + b1 > Q15_ONE + a {
            return Err(Error::invalid_argument(format!(
                "coefficients a = {a}, b = [{b0}, {b1}] have a DC gain above unity"
            )));
        }

        Ok(Self { a, b: [b0, b1] })
    }

    /// Creates a unity-gain single-pole low-pass filter.
    ///
    /// The gain `1 - pole` is split evenly over both taps, putting a zero
    /// at Nyquist. `b0 + b1 == 1 + a` holds exactly, whatever the rounding
    /// of the pole.
    ///
    /// # Panics
    ///
    /// Panics if `pole` is outside `0..Q15_ONE`.
    #[must_use]
    pub const fn low_pass(pole: i32) -> Self {
        assert!(pole >= 0 && pole < Q15_ONE, "pole must be in 0.0..1.0");

        let gain = Q15_ONE - pole;
        let b0 = gain / 2;
        Self {
            a: -pole,
            b: [b0, gain - b0],
        }
    }

    /// Whether a constant input passes through unattenuated.
    #[must_use]
    pub const fn has_unity_gain(&self) -> bool {
        self.b[0] + self.b[1] == Q15_ONE + self.a
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::low_pass(Self::DEFAULT_POLE)
    }
}

/// Persistent state of the filter cascade.
///
/// Holds, for every stage, the previous input and the previous output, as
/// power in Q15.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DelayLine {
    /// Previous input of each stage
    pub dx: [i64; STAGES],

    /// Previous output of each stage
    pub dy: [i64; STAGES],
}

impl DelayLine {
    /// Clears the state, as if no sample had been processed.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Runs one value through one stage.
    #[inline]
    fn step(&mut self, stage: usize, coefficients: &Coefficients, x: i64) -> i64 {
        let acc = i64::from(coefficients.b[0]) * x + i64::from(coefficients.b[1]) * self.dx[stage]
            - i64::from(coefficients.a) * self.dy[stage];
        let y = acc >> Q15_SHIFT;

        self.dx[stage] = x;
        self.dy[stage] = y;
        y
    }
}

/// Feeds one sample through the squared-signal filter cascade.
///
/// Squares `sample`, low-pass filters it through every stage of `delay`,
/// and returns the square root of the smoothed power.
///
/// # Returns
///
/// The current RMS estimate
#[must_use]
#[inline]
pub fn rms_explicit(coefficients: &Coefficients, delay: &mut DelayLine, sample: i16) -> u16 {
    let squared = i64::from(sample) * i64::from(sample);

    let mut power = squared << Q15_SHIFT;
    for stage in 0..STAGES {
        power = delay.step(stage, coefficients, power);
    }

    // bounded by the squared input, so at most 2^30 once rounded
    let power = (power + (1 << (Q15_SHIFT - 1))) >> Q15_SHIFT;
    isqrt_narrow(u32::try_from(power.max(0)).unwrap_or(u32::MAX))
}

/// Filtered RMS estimator for one signal.
///
/// Owns its coefficients and delay line; create one per channel.
#[derive(Clone, Debug, Default)]
pub struct FilteredRms {
    coefficients: Coefficients,
    delay: DelayLine,
}

impl FilteredRms {
    #[must_use]
    pub fn new(coefficients: Coefficients) -> Self {
        Self {
            coefficients,
            delay: DelayLine::default(),
        }
    }

    /// Processes one sample.
    ///
    /// # Returns
    ///
    /// The RMS estimate after this sample
    #[inline]
    pub fn process(&mut self, sample: i16) -> u16 {
        rms_explicit(&self.coefficients, &mut self.delay, sample)
    }

    #[must_use]
    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    #[must_use]
    pub fn delay_line(&self) -> &DelayLine {
        &self.delay
    }

    /// Resets the delay line without changing coefficients.
    pub fn reset(&mut self) {
        self.delay.reset();
    }
}
