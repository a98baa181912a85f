//! Synthetic test tones.
//!
//! Generates a quantized sine with optional gaussian noise, standing in for
//! a sampled mains or sensor signal when exercising the estimators. This is
//! test and benchmark scaffolding: unlike the estimators, it uses floating
//! point freely.

use std::f64::consts::{PI, TAU};

/// Infinite iterator over the samples of a noisy sine.
///
/// Amplitude and noise are ratios of full scale, where 1.0 maps to
/// `i16::MAX`. Samples beyond full scale are clipped.
#[derive(Clone, Debug)]
pub struct ToneGenerator {
    sample_rate: u32,
    frequency: f64,
    amplitude: f64,
    noise: f64,

    /// Index of the next sample
    position: u64,

    // Initialize a dedicated random number generator for reproducibility
    rng: fastrand::Rng,

    /// Second gaussian value of the last Box-Muller pair
    spare: Option<f64>,
}

impl ToneGenerator {
    /// Creates a noiseless tone.
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Samples per second
    /// * `frequency` - Tone frequency in Hz
    /// * `amplitude` - Peak level as a ratio of full scale
    #[must_use]
    pub fn new(sample_rate: u32, frequency: f32, amplitude: f32) -> Self {
        Self {
            sample_rate,
            frequency: f64::from(frequency),
            amplitude: f64::from(amplitude),
            noise: 0.0,
            position: 0,
            rng: fastrand::Rng::new(),
            spare: None,
        }
    }

    /// Adds gaussian noise with the given standard deviation, as a ratio of
    /// full scale.
    #[must_use]
    pub fn with_noise(mut self, std_dev: f32) -> Self {
        self.noise = f64::from(std_dev.abs());
        self
    }

    /// Seeds the noise source, making the tone reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self.spare = None;
        self
    }

    /// RMS the tone should measure, in sample units.
    ///
    /// Sine and noise are uncorrelated, so their powers add. Ignores
    /// quantization and clipping.
    #[must_use]
    pub fn expected_rms(&self) -> f64 {
        let power = self.amplitude * self.amplitude / 2.0 + self.noise * self.noise;
        power.sqrt() * f64::from(i16::MAX)
    }

    /// Draws a standard normal value using the Box-Muller transform.
    fn gaussian(&mut self) -> f64 {
        if let Some(spare) = self.spare.take() {
            return spare;
        }

        // 1 - [0, 1) keeps the logarithm finite
        let u1 = 1.0 - self.rng.f64();
        let u2 = self.rng.f64();
        let radius = (-2.0 * u1.ln()).sqrt();
        let (sin, cos) = (TAU * u2).sin_cos();

        self.spare = Some(radius * sin);
        radius * cos
    }
}

impl Iterator for ToneGenerator {
    type Item = i16;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let time = self.position as f64 / f64::from(self.sample_rate);
        self.position += 1;

        let mut value = self.amplitude * (2.0 * PI * self.frequency * time).sin();
        if self.noise > 0.0 {
            value += self.noise * self.gaussian();
        }

        let scaled = (value * f64::from(i16::MAX)).round();
        Some(scaled.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
