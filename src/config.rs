//! Deployment configuration for the RMS estimators.
//!
//! Describes the signal the estimators are fed:
//! * Sample rate of the incoming signal
//! * Lowest and highest supported fundamental frequency
//!
//! The lowest frequency sizes the ring buffer of the block estimator, the
//! range as a whole bounds the frequencies estimators accept per sample.
//!
//! Configuration is read from TOML:
//!
//! ```toml
//! sample_rate = 1500
//! min_freq = 30
//! max_freq = 100
//! ```
//!
//! Any key may be omitted to keep its default.

use std::{fmt, fs, path::Path, str::FromStr};

use serde::Deserialize;

use crate::error::{Error, Result};

/// A frequency in tenths of a hertz.
///
/// Estimators take their fundamental frequency in this unit, which gives
/// 0.1 Hz resolution without floating point. A window length then follows
/// from `sample_rate * 10 / frequency`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DeciHertz(pub u16);

impl DeciHertz {
    /// Converts whole hertz into decihertz.
    ///
    /// # Panics
    ///
    /// Panics if `hz` exceeds 6553, in every build profile. Use
    /// [`checked_from_hz`](Self::checked_from_hz) for untrusted input.
    #[must_use]
    pub const fn from_hz(hz: u16) -> Self {
        match Self::checked_from_hz(hz) {
            Some(freq) => freq,
            None => panic!("frequency in hertz does not fit decihertz"),
        }
    }

    /// Converts whole hertz into decihertz, or `None` if `hz` exceeds 6553.
    #[must_use]
    pub const fn checked_from_hz(hz: u16) -> Option<Self> {
        match hz.checked_mul(10) {
            Some(tenths) => Some(Self(tenths)),
            None => None,
        }
    }

    /// Returns the raw number of tenths of a hertz.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Returns the frequency in hertz, for display and signal synthesis.
    #[must_use]
    pub fn as_hz_f32(self) -> f32 {
        f32::from(self.0) / 10.0
    }
}

impl fmt::Display for DeciHertz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} Hz", self.0 / 10, self.0 % 10)
    }
}

/// Parses a frequency in hertz with at most one decimal, like `50` or
/// `49.5`. A trailing `Hz` unit is accepted.
impl FromStr for DeciHertz {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_suffix("Hz").map_or(trimmed, str::trim_end);
        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

        let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !digits_only(whole) || !digits_only(fraction) {
            return Err(Error::invalid_argument(format!("invalid frequency: {s}")));
        }
        if fraction.len() > 1 {
            return Err(Error::invalid_argument(format!(
                "frequency {s} has more than 0.1 Hz resolution"
            )));
        }

        let tenths = fraction.parse::<u16>().unwrap_or(0);
        whole
            .parse::<u16>()
            .ok()
            .and_then(Self::checked_from_hz)
            .and_then(|freq| freq.0.checked_add(tenths))
            .map(Self)
            .ok_or_else(|| Error::out_of_range(format!("frequency {s} is too high")))
    }
}

/// Signal parameters shared by all estimators of a deployment.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Rate at which samples arrive, in Hz.
    pub sample_rate: u32,

    /// Lowest supported fundamental frequency, in Hz.
    pub min_freq: u16,

    /// Highest supported fundamental frequency, in Hz.
    pub max_freq: u16,
}

impl Config {
    /// Default sampling rate in Hz.
    pub const DEFAULT_SAMPLE_RATE: u32 = 1500;

    /// Default lowest fundamental frequency in Hz.
    pub const DEFAULT_MIN_FREQ: u16 = 30;

    /// Default highest fundamental frequency in Hz.
    pub const DEFAULT_MAX_FREQ: u16 = 100;

    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are inconsistent, see
    /// [`validate`](Self::validate).
    pub fn new(sample_rate: u32, min_freq: u16, max_freq: u16) -> Result<Self> {
        let config = Self {
            sample_rate,
            min_freq,
            max_freq,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// * `Error::NotFound` - The file does not exist
    /// * `Error::InvalidArgument` - The file is not valid TOML or has unknown keys
    /// * `Error::OutOfRange` - The parameters are inconsistent
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = contents.parse::<Self>()?;
        log::debug!("loaded configuration from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Checks the parameters for consistency.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if:
    /// * Any parameter is zero
    /// * `min_freq` exceeds `max_freq`
    /// * `max_freq` exceeds the Nyquist frequency of `sample_rate`
    /// * `max_freq` does not fit in [`DeciHertz`]
    /// * `sample_rate` is too high to scale by ten in 32 bits
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 || self.min_freq == 0 || self.max_freq == 0 {
            return Err(Error::out_of_range(format!(
                "sample rate and frequencies must be non-zero: {:?}",
                self
            )));
        }

        if self.min_freq > self.max_freq {
            return Err(Error::out_of_range(format!(
                "minimum frequency {} Hz exceeds maximum frequency {} Hz",
                self.min_freq, self.max_freq
            )));
        }

        if u32::from(self.max_freq) * 2 > self.sample_rate {
            return Err(Error::out_of_range(format!(
                "maximum frequency {} Hz exceeds the Nyquist frequency of {} Hz",
                self.max_freq,
                self.sample_rate / 2
            )));
        }

        if self.max_freq.checked_mul(10).is_none() {
            return Err(Error::out_of_range(format!(
                "maximum frequency {} Hz exceeds {} Hz",
                self.max_freq,
                u16::MAX / 10
            )));
        }

        if self.sample_rate.checked_mul(10).is_none() {
            return Err(Error::out_of_range(format!(
                "sample rate {} Hz is too high",
                self.sample_rate
            )));
        }

        Ok(())
    }

    /// Lowest supported frequency.
    #[must_use]
    pub const fn min_frequency(&self) -> DeciHertz {
        DeciHertz::from_hz(self.min_freq)
    }

    /// Highest supported frequency.
    #[must_use]
    pub const fn max_frequency(&self) -> DeciHertz {
        DeciHertz::from_hz(self.max_freq)
    }

    /// Number of squared samples the block estimator must be able to hold.
    ///
    /// One period at the lowest supported frequency, plus one.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        (self.sample_rate / self.min_freq as u32) as usize + 1
    }

    /// Number of samples in one period at `freq`.
    ///
    /// # Panics
    ///
    /// Panics if `freq` is zero. Use [`check_frequency`](Self::check_frequency)
    /// first.
    #[must_use]
    #[inline]
    pub const fn window_len(&self, freq: DeciHertz) -> u32 {
        self.sample_rate * 10 / freq.0 as u32
    }

    /// Checks that `freq` lies within the supported range.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if `freq` is below `min_freq` or above
    /// `max_freq`. This includes a zero frequency.
    #[inline]
    pub fn check_frequency(&self, freq: DeciHertz) -> Result<()> {
        if freq < self.min_frequency() || freq > self.max_frequency() {
            return Err(Error::out_of_range(format!(
                "frequency {freq} outside supported range {} to {}",
                self.min_frequency(),
                self.max_frequency()
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: Self::DEFAULT_SAMPLE_RATE,
            min_freq: Self::DEFAULT_MIN_FREQ,
            max_freq: Self::DEFAULT_MAX_FREQ,
        }
    }
}

/// Parses and validates a TOML configuration.
impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
