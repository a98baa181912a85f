//! Sample-exact moving RMS over one signal period.
//!
//! Keeps the squares of the most recent samples in a [`RingBuffer`] sized for
//! the lowest supported frequency, together with their running sum. Every
//! sample adds its square and subtracts whatever the window evicts, so each
//! update costs O(1) regardless of the window length.
//!
//! The window follows the frequency passed with each sample: one period is
//! `sample_rate * 10 / freq` samples, with `freq` in decihertz.

use crate::{
    config::{Config, DeciHertz},
    error::Result,
    isqrt::isqrt_wide,
    ringbuf::RingBuffer,
};

/// Moving RMS estimator with an exact, frequency-tracking window.
///
/// Once a full period has been fed at a constant frequency, every output is
/// the exact integer-truncated RMS of the trailing period. While the window
/// fills, the partial sum is still divided by the full window length, so
/// the estimate ramps up from zero.
#[derive(Clone, Debug)]
pub struct BlockRms {
    config: Config,

    /// Squares of the samples in the current window
    window: RingBuffer,

    /// Sum of all squares in `window`
    sum: u64,
}

impl BlockRms {
    /// Creates an estimator for the given deployment.
    ///
    /// Allocates a ring buffer of [`Config::capacity`] squared samples; no
    /// further allocation happens afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            window: RingBuffer::new(config.capacity())?,
            sum: 0,
        })
    }

    /// Processes one sample taken at fundamental frequency `freq`.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if `freq` is outside the configured range,
    /// or if one period does not fit the ring buffer. These are caller bugs;
    /// the estimator state is left untouched.
    ///
    /// # Returns
    ///
    /// The RMS over the last period, including this sample
    pub fn process(&mut self, sample: i16, freq: DeciHertz) -> Result<u16> {
        self.config.check_frequency(freq)?;

        let size = self.config.window_len(freq) as usize;
        if size != self.window.active_size() {
            self.window.set_active_size(size)?;
            log::debug!("block window resized to {size} samples for {freq}");
        }

        let squared = u32::from(sample.unsigned_abs()).pow(2);
        self.sum += u64::from(squared);
        self.sum -= self.window.push_pop(squared);

        // the mean of squares of i16 is at most 2^30
        Ok(isqrt_wide(self.sum / size as u64) as u16)
    }

    /// Current window length in samples.
    #[must_use]
    pub fn window_len(&self) -> usize {
        self.window.active_size()
    }

    /// Sum of the squared samples in the current window.
    #[must_use]
    pub fn sum_of_squares(&self) -> u64 {
        self.sum
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Empties the window, as if no sample had been processed.
    pub fn reset(&mut self) {
        self.window.reset();
        self.sum = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const FIFTY_HZ: DeciHertz = DeciHertz::from_hz(50);

    fn naive_rms(squares: &[u64], size: usize) -> u16 {
        let start = squares.len().saturating_sub(size);
        let sum: u64 = squares[start..].iter().sum();
        (sum as f64 / size as f64).sqrt().floor() as u16
    }

    #[test]
    fn matches_naive_recomputation() {
        let mut rms = BlockRms::new(Config::default()).unwrap();
        let mut rng = fastrand::Rng::with_seed(0x424c_4f43);
        let mut squares = Vec::new();

        for _ in 0..1000 {
            let sample = rng.i16(..);
            squares.push(u64::from(sample.unsigned_abs()).pow(2));

            let output = rms.process(sample, FIFTY_HZ).unwrap();
            assert_eq!(output, naive_rms(&squares, 30));

            let start = squares.len().saturating_sub(30);
            assert_eq!(rms.sum_of_squares(), squares[start..].iter().sum::<u64>());
        }
    }

    #[test]
    fn converges_to_sine_rms() {
        // 50 Hz at 1500 Hz sampling: 30 samples per period
        let mut rms = BlockRms::new(Config::default()).unwrap();
        let amplitude = 10_000.0;
        let expected = amplitude / 2f64.sqrt();

        for n in 0..300 {
            let phase = 2.0 * std::f64::consts::PI * f64::from(n) / 30.0;
            let sample = (amplitude * phase.sin()).round() as i16;
            let output = rms.process(sample, FIFTY_HZ).unwrap();
            if n >= 30 {
                assert!(
                    (f64::from(output) - expected).abs() <= 1.0,
                    "sample {n}: {output} vs {expected}"
                );
            }
        }
    }

    #[test]
    fn follows_frequency_changes() {
        let mut rms = BlockRms::new(Config::default()).unwrap();
        let mut rng = fastrand::Rng::with_seed(0x4652_4551);
        let mut squares = Vec::new();
        let mut feed = |rms: &mut BlockRms, freq: DeciHertz, squares: &mut Vec<u64>| {
            let sample = rng.i16(-5000..5000);
            squares.push(u64::from(sample.unsigned_abs()).pow(2));
            rms.process(sample, freq).unwrap()
        };

        for _ in 0..100 {
            feed(&mut rms, FIFTY_HZ, &mut squares);
        }

        // shrinking to 15 samples is exact straight away
        let hundred_hz = DeciHertz::from_hz(100);
        for _ in 0..40 {
            let output = feed(&mut rms, hundred_hz, &mut squares);
            assert_eq!(output, naive_rms(&squares, 15));
            assert_eq!(rms.window_len(), 15);
        }

        // growing to 50 samples is exact once the window has refilled
        let thirty_hz = DeciHertz::from_hz(30);
        for _ in 0..35 {
            feed(&mut rms, thirty_hz, &mut squares);
        }
        for _ in 0..20 {
            let output = feed(&mut rms, thirty_hz, &mut squares);
            assert_eq!(output, naive_rms(&squares, 50));
        }
    }

    #[test]
    fn min_frequency_fits_capacity() {
        let config = Config::default();
        let mut rms = BlockRms::new(config).unwrap();
        for _ in 0..200 {
            assert!(rms.process(i16::MAX, config.min_frequency()).is_ok());
        }
        assert_eq!(rms.window_len(), 50);
        assert_eq!(rms.process(i16::MAX, config.min_frequency()).unwrap(), 32_767);
    }

    #[test]
    fn full_scale_window_does_not_overflow() {
        let config = Config::new(48_000, 20, 20).unwrap();
        let mut rms = BlockRms::new(config).unwrap();
        let mut output = 0;
        for _ in 0..2400 {
            output = rms.process(i16::MIN, config.min_frequency()).unwrap();
        }
        assert_eq!(output, 32_768);
        assert_eq!(rms.sum_of_squares(), 2400 << 30);
    }

    #[test]
    fn frequencies_below_the_minimum_fail() {
        // 5.0 Hz would ask for 300 samples; 29.0 Hz would still fit 51
        let mut rms = BlockRms::new(Config::default()).unwrap();
        rms.process(1000, FIFTY_HZ).unwrap();

        for freq in [DeciHertz(50), DeciHertz(290), DeciHertz(299)] {
            let error = rms.process(1000, freq).unwrap_err();
            assert_eq!(error.kind, ErrorKind::OutOfRange);
            assert!(error.to_string().contains("30.0 Hz"), "{error}");
        }

        // nothing changed
        assert_eq!(rms.sum_of_squares(), 1_000_000);
        assert_eq!(rms.window_len(), 30);
    }

    #[test]
    fn zero_and_excessive_frequencies_fail() {
        let mut rms = BlockRms::new(Config::default()).unwrap();
        for freq in [DeciHertz(0), DeciHertz(1001)] {
            let error = rms.process(1, freq).unwrap_err();
            assert_eq!(error.kind, ErrorKind::OutOfRange);
        }
        assert_eq!(rms.sum_of_squares(), 0);
    }

    #[test]
    fn reset_forgets_history() {
        let mut rms = BlockRms::new(Config::default()).unwrap();
        for _ in 0..30 {
            rms.process(3000, FIFTY_HZ).unwrap();
        }
        rms.reset();
        assert_eq!(rms.sum_of_squares(), 0);
        assert_eq!(rms.process(0, FIFTY_HZ).unwrap(), 0);
    }
}
