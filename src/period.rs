//! Once-per-period RMS.
//!
//! Accumulates squared samples over a full period and only then computes a
//! new RMS value, which is held until the next period completes. Cheaper
//! than [`BlockRms`](crate::block::BlockRms): no sample history, and a
//! single narrow square root per period. The price is latency, since the
//! output trails the signal by up to one period.

use crate::{
    config::{Config, DeciHertz},
    error::Result,
    isqrt::isqrt_narrow,
};

/// RMS estimator that updates once per signal period.
#[derive(Clone, Debug)]
pub struct PeriodRms {
    config: Config,

    /// Sum of squares since the last period boundary
    sum: u64,

    /// Samples since the last period boundary; always below the window
    /// length after a call
    count: u32,

    /// RMS of the last completed period
    held: u16,
}

impl PeriodRms {
    /// Creates an estimator for the given deployment.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            sum: 0,
            count: 0,
            held: 0,
        })
    }

    /// Processes one sample taken at fundamental frequency `freq`.
    ///
    /// The period length is re-evaluated on every call, so a frequency
    /// change takes effect within the running period.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if `freq` lies outside the configured
    /// range. The estimator state is left untouched.
    ///
    /// # Returns
    ///
    /// The RMS of the last completed period, or 0 before the first one
    /// completes
    pub fn process(&mut self, sample: i16, freq: DeciHertz) -> Result<u16> {
        self.config.check_frequency(freq)?;
        let size = self.config.window_len(freq);

        self.sum += u64::from(u32::from(sample.unsigned_abs()).pow(2));
        self.count += 1;

        if self.count >= size {
            let mean = self.sum / u64::from(size);
            self.held = isqrt_narrow(u32::try_from(mean).unwrap_or(u32::MAX));
            log::trace!("period of {} samples at {freq}: rms {}", self.count, self.held);

            self.sum = 0;
            self.count = 0;
        }

        Ok(self.held)
    }

    /// RMS of the last completed period.
    #[must_use]
    pub fn last(&self) -> u16 {
        self.held
    }

    /// Samples accumulated towards the running period.
    #[must_use]
    pub fn pending(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discards the running period and the held output.
    pub fn reset(&mut self) {
        self.sum = 0;
        self.count = 0;
        self.held = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const FIFTY_HZ: DeciHertz = DeciHertz::from_hz(50);

    #[test]
    fn constant_input_yields_magnitude() {
        for value in [0, 1, -1, 1234, -1234, i16::MAX, i16::MIN] {
            let mut rms = PeriodRms::new(Config::default()).unwrap();
            let outputs: Vec<_> = (0..30)
                .map(|_| rms.process(value, FIFTY_HZ).unwrap())
                .collect();

            assert!(outputs[..29].iter().all(|&output| output == 0));
            assert_eq!(outputs[29], value.unsigned_abs());
        }
    }

    #[test]
    fn output_changes_only_at_period_boundaries() {
        let mut rms = PeriodRms::new(Config::default()).unwrap();
        let mut rng = fastrand::Rng::with_seed(0x5045_5249);

        let mut previous = 0;
        for n in 1..=600 {
            let output = rms.process(rng.i16(..), FIFTY_HZ).unwrap();
            if n % 30 != 0 {
                assert_eq!(output, previous, "changed mid-period at sample {n}");
            }
            assert!(rms.pending() < 30);
            previous = output;
        }
    }

    #[test]
    fn computes_period_rms() {
        let mut rms = PeriodRms::new(Config::default()).unwrap();
        let samples: Vec<i16> = (0..30).map(|n| (n * 100 - 1500) as i16).collect();
        let sum: u64 = samples
            .iter()
            .map(|&s| u64::from(s.unsigned_abs()).pow(2))
            .sum();

        let mut output = 0;
        for &sample in &samples {
            output = rms.process(sample, FIFTY_HZ).unwrap();
        }
        assert_eq!(u64::from(output), ((sum / 30) as f64).sqrt() as u64);
    }

    #[test]
    fn shorter_period_closes_running_one() {
        let mut rms = PeriodRms::new(Config::default()).unwrap();
        for _ in 0..20 {
            rms.process(100, FIFTY_HZ).unwrap();
        }

        // 100 Hz needs 15 samples, and 21 are already in
        assert_eq!(rms.process(100, DeciHertz::from_hz(100)).unwrap(), 118);
        assert_eq!(rms.pending(), 0);
    }

    #[test]
    fn rejects_out_of_range_frequencies() {
        let mut rms = PeriodRms::new(Config::default()).unwrap();
        for freq in [DeciHertz(0), DeciHertz(50), DeciHertz(299), DeciHertz(1001)] {
            let error = rms.process(1, freq).unwrap_err();
            assert_eq!(error.kind, ErrorKind::OutOfRange);
        }
        assert_eq!(rms.pending(), 0);
    }

    #[test]
    fn reset_discards_progress() {
        let mut rms = PeriodRms::new(Config::default()).unwrap();
        for _ in 0..45 {
            rms.process(500, FIFTY_HZ).unwrap();
        }
        assert_eq!(rms.last(), 500);
        assert_eq!(rms.pending(), 15);

        rms.reset();
        assert_eq!(rms.last(), 0);
        assert_eq!(rms.pending(), 0);
    }
}
