//! Streaming RMS estimation in integer arithmetic.
//!
//! Estimates the root-mean-square amplitude of a sampled signal one sample
//! at a time, without floating point and without allocating after
//! construction. Meant to be called straight from a sampling interrupt or
//! polling loop.
//!
//! # Estimators
//!
//! * [`BlockRms`](block::BlockRms) - Exact moving RMS over one signal
//!   period, updated every sample. Needs the fundamental frequency with every
//!   sample and a ring buffer sized for the lowest frequency.
//! * [`PeriodRms`](period::PeriodRms) - RMS of each completed period, held
//!   until the next one completes. Needs the frequency but no history.
//! * [`FilteredRms`](filtered::FilteredRms) - Two cascaded fixed-point
//!   low-pass filters on the squared signal. Needs neither frequency nor
//!   history; the smoothing time is fixed by its coefficients.
//!
//! # Units
//!
//! Samples are `i16`. RMS values are `u16`, as the magnitude of `i16::MIN`
//! does not fit `i16`. Frequencies are passed as [`DeciHertz`](config::DeciHertz).
//!
//! # Concurrency
//!
//! Estimators are plain owned values mutated through `&mut self`. Keep one
//! per signal channel; independent instances share nothing.
//!
//! # Example
//!
//! ```rust
//! use rmscalc::{block::BlockRms, config::{Config, DeciHertz}};
//!
//! let mut rms = BlockRms::new(Config::default())?;
//! let estimate = rms.process(1234, DeciHertz::from_hz(50))?;
//! ```

pub mod block;
pub mod config;
pub mod error;
pub mod estimator;
pub mod filtered;
pub mod fixed_point;
pub mod isqrt;
pub mod period;
pub mod ringbuf;
pub mod signal;
