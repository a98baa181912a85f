//! Command-line harness for the RMS estimators.
//!
//! Synthesizes a noisy test tone, runs it through the selected estimators
//! and reports how far each settles from the true RMS. With `--trace`, every
//! sample and estimate is written as CSV for plotting.

use std::{path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser};
use log::{LevelFilter, debug, error, info};

use rmscalc::{
    config::{Config, DeciHertz},
    error::{Error, Result},
    estimator::{Estimator, Kind},
    signal::ToneGenerator,
};

/// Measure fixed-point RMS estimators against a synthetic tone
#[derive(Clone, Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Deployment configuration file (TOML)
    ///
    /// Sets sample rate and supported frequency range. Without it, the
    /// defaults of 1500 Hz sampling and 30 to 100 Hz apply.
    #[arg(short, long, value_name = "FILE", env = "RMSCALC_CONFIG")]
    config: Option<PathBuf>,

    /// Tone frequency in Hz, with at most one decimal
    #[arg(short, long, default_value = "50", env = "RMSCALC_FREQUENCY")]
    frequency: DeciHertz,

    /// Tone amplitude as a ratio of full scale
    #[arg(short, long, default_value_t = 0.5)]
    amplitude: f32,

    /// Standard deviation of the added gaussian noise, as a ratio of full scale
    #[arg(short, long, default_value_t = 0.05)]
    noise: f32,

    /// Length of the tone in seconds
    #[arg(short, long, default_value_t = 1.0)]
    duration: f32,

    /// Number of initial samples left out of the average estimate
    #[arg(long, default_value_t = 120)]
    settle: usize,

    /// Seed for the noise generator, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Estimator to run: block, period, filtered or all
    #[arg(short, long, default_value = "all")]
    estimator: Selection,

    /// Write every sample and estimate to stdout as CSV
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Suppresses all output except warnings and errors.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,

    /// Enable verbose logging
    ///
    /// Specify twice for trace logging.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Which estimators to run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Selection {
    One(Kind),
    All,
}

impl Selection {
    fn kinds(self) -> Vec<Kind> {
        match self {
            Self::One(kind) => vec![kind],
            Self::All => Kind::ALL.to_vec(),
        }
    }
}

impl std::str::FromStr for Selection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::One)
        }
    }
}

/// Settled behaviour of one estimator over the tone.
#[derive(Debug, Default)]
struct Report {
    sum: u64,
    count: u64,
    min: u16,
    max: u16,
}

impl Report {
    fn record(&mut self, estimate: u16) {
        if self.count == 0 {
            self.min = estimate;
            self.max = estimate;
        } else {
            self.min = self.min.min(estimate);
            self.max = self.max.max(estimate);
        }

        self.sum += u64::from(estimate);
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum as f64 / self.count as f64)
    }
}

fn init_logger(args: &Args) {
    let mut logger = env_logger::Builder::from_env(
        // Note: if you change the default logging level here, then you should too in
        // `--verbose` and `--quiet` command line options.
        env_logger::Env::default().default_filter_or(concat!(env!("CARGO_CRATE_NAME"), "=info")),
    );

    if args.verbose > 0 || args.quiet {
        let level = if args.quiet {
            LevelFilter::Warn
        } else if args.verbose == 1 {
            LevelFilter::Debug
        } else {
            LevelFilter::Trace
        };

        logger.filter_module(env!("CARGO_CRATE_NAME"), level);
    }

    logger.init();
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.check_frequency(args.frequency)?;

    if !args.duration.is_finite() || args.duration <= 0.0 {
        return Err(Error::invalid_argument(format!(
            "duration must be positive, not {}",
            args.duration
        )));
    }

    let mut tone = ToneGenerator::new(config.sample_rate, args.frequency.as_hz_f32(), args.amplitude)
        .with_noise(args.noise);
    if let Some(seed) = args.seed {
        tone = tone.with_seed(seed);
    }
    let expected = tone.expected_rms();

    let kinds = args.estimator.kinds();
    let mut estimators = kinds
        .iter()
        .map(|&kind| Estimator::new(kind, config))
        .collect::<Result<Vec<_>>>()?;
    let mut reports: Vec<Report> = kinds.iter().map(|_| Report::default()).collect();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let samples = (f64::from(args.duration) * f64::from(config.sample_rate)).round() as usize;
    info!(
        "running {} samples of {} at {} Hz sampling through {} estimator(s)",
        samples,
        args.frequency,
        config.sample_rate,
        estimators.len()
    );
    debug!("ring buffer capacity {} samples", config.capacity());

    if args.trace {
        let header: Vec<String> = kinds.iter().map(ToString::to_string).collect();
        println!("sample,{}", header.join(","));
    }

    let mut row = Vec::with_capacity(estimators.len());
    for (n, sample) in tone.take(samples).enumerate() {
        row.clear();
        for (estimator, report) in estimators.iter_mut().zip(&mut reports) {
            let estimate = estimator.process(sample, args.frequency)?;
            if n >= args.settle {
                report.record(estimate);
            }
            row.push(estimate.to_string());
        }

        if args.trace {
            println!("{sample},{}", row.join(","));
        }
    }

    for (kind, report) in kinds.iter().zip(&reports) {
        match report.average() {
            Some(average) => {
                let error = 100.0 * (average - expected).abs() / expected;
                info!(
                    "{kind:>8}: real {expected:.1}, rms {average:.1} (min {}, max {}), error {error:.2}%",
                    report.min, report.max
                );
            }
            None => info!("{kind:>8}: no samples after settling"),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(&args);
    debug!("{args:#?}");

    if let Err(e) = run(&args) {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
