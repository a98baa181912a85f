//! Uniform access to the RMS estimators.
//!
//! Wraps the three estimators behind one type, so callers that pick an
//! algorithm at runtime (like the command-line harness) can drive them the
//! same way. Code that knows its estimator statically should use the
//! concrete types directly.

use std::{fmt, str::FromStr};

use crate::{
    block::BlockRms,
    config::{Config, DeciHertz},
    error::{Error, Result},
    filtered::{Coefficients, FilteredRms},
    period::PeriodRms,
};

/// The available estimation algorithms.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Kind {
    /// Moving RMS over an exact period, updated every sample
    Block,
    /// RMS of each completed period, held in between
    Period,
    /// Fixed-point low-pass cascade on the squared signal
    Filtered,
}

impl Kind {
    /// All kinds, in display order.
    pub const ALL: [Kind; 3] = [Kind::Block, Kind::Period, Kind::Filtered];
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Block => "block",
            Self::Period => "period",
            Self::Filtered => "filtered",
        };
        f.pad(s)
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "period" => Ok(Self::Period),
            "filtered" | "iir" => Ok(Self::Filtered),
            _ => Err(Error::invalid_argument(format!("unknown estimator: {s}"))),
        }
    }
}

/// Any of the RMS estimators.
///
/// Uses specialized implementations:
/// * `Block`: [`BlockRms`], exact moving window
/// * `Period`: [`PeriodRms`], one update per period
/// * `Filtered`: [`FilteredRms`], IIR cascade with default coefficients
#[derive(Clone, Debug)]
pub enum Estimator {
    Block(BlockRms),
    Period(PeriodRms),
    Filtered(FilteredRms),
}

impl Estimator {
    /// Creates an estimator of the given kind.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(kind: Kind, config: Config) -> Result<Self> {
        let estimator = match kind {
            Kind::Block => Self::Block(BlockRms::new(config)?),
            Kind::Period => Self::Period(PeriodRms::new(config)?),
            Kind::Filtered => {
                config.validate()?;
                Self::Filtered(FilteredRms::new(Coefficients::default()))
            }
        };

        Ok(estimator)
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Block(_) => Kind::Block,
            Self::Period(_) => Kind::Period,
            Self::Filtered(_) => Kind::Filtered,
        }
    }

    /// Processes one sample.
    ///
    /// The filtered estimator has its time constant baked into its
    /// coefficients and ignores `freq`.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if a frequency-driven estimator is given a
    /// frequency outside the configured range.
    #[inline]
    pub fn process(&mut self, sample: i16, freq: DeciHertz) -> Result<u16> {
        match self {
            Self::Block(block) => block.process(sample, freq),
            Self::Period(period) => period.process(sample, freq),
            Self::Filtered(filtered) => Ok(filtered.process(sample)),
        }
    }

    /// Resets the estimator to its initial state.
    pub fn reset(&mut self) {
        match self {
            Self::Block(block) => block.reset(),
            Self::Period(period) => period.reset(),
            Self::Filtered(filtered) => filtered.reset(),
        }
    }
}
