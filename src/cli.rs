//! CLI definition and dispatch.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::bar_series::BarSeries;
use crate::domain::config_validation::{
    validate_series_config, validate_signals_config, SeriesConfig, SignalsConfig,
};
use crate::domain::error::BarlensError;
use crate::domain::indicator::{Indicator, NumericIndicator};
use crate::domain::rule::Rule;
use crate::ports::data_port::BarSource;

#[derive(Parser, Debug)]
#[command(name = "barlens", about = "Time-indexed bar series and indicator toolkit")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the index range of the configured series
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List SMA crossover signals on the configured series
    Signals {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);
    match cli.command {
        Command::Info { config } => run_info(&config),
        Command::Signals { config } => run_signals(&config),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    // A second init (repeated `run` calls in one process) is harmless.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BarlensError> {
    FileConfigAdapter::from_file(path)
}

/// Loads the bars named by `config` and builds the series.
///
/// A relative data path is resolved against `config_dir`.
pub fn build_series(
    config: &SeriesConfig,
    config_dir: &Path,
) -> Result<Rc<BarSeries<f64>>, BarlensError> {
    let data_path = if config.data.is_absolute() {
        config.data.clone()
    } else {
        config_dir.join(&config.data)
    };

    let mut source = CsvAdapter::new(data_path);
    if let Some(period) = config.time_period {
        source = source.with_time_period(period);
    }
    let bars = source.load_bars()?;
    let series = BarSeries::from_bars(config.name.clone(), config.base_time, bars)?;
    Ok(Rc::new(series))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Over,
    Under,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Over => write!(f, "over"),
            Direction::Under => write!(f, "under"),
        }
    }
}

/// A bar where the fast close SMA crossed the slow one.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub index: isize,
    pub end_time: DateTime<Utc>,
    pub direction: Direction,
    pub fast: f64,
    pub slow: f64,
}

/// Crossings of SMA(fast) over SMA(slow) on the close, skipping the slow
/// average's warm-up bars.
pub fn find_signals(
    series: &Rc<BarSeries<f64>>,
    signals: SignalsConfig,
) -> Result<Vec<Signal>, BarlensError> {
    let close = NumericIndicator::close_price(series);
    let fast = close.sma(signals.fast)?;
    let slow = close.sma(signals.slow)?;
    let over = fast.crossed_over(&slow)?;
    let under = fast.crossed_under(&slow)?;

    let start = series.begin_index() + slow.unstable_bars() as isize;
    log::debug!(
        "scanning {fast} against {slow} over [{start}, {}]",
        series.end_index()
    );

    let mut found = Vec::new();
    for index in start..=series.end_index() {
        let direction = if over.is_satisfied(index)? {
            Direction::Over
        } else if under.is_satisfied(index)? {
            Direction::Under
        } else {
            continue;
        };
        found.push(Signal {
            index,
            end_time: series.bar(index)?.end_time,
            direction,
            fast: fast.value(index)?,
            slow: slow.value(index)?,
        });
    }
    Ok(found)
}

fn config_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or_else(|| Path::new("."))
}

fn run_info(config_path: &Path) -> ExitCode {
    match info(config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn info(config_path: &Path) -> Result<(), BarlensError> {
    let adapter = load_config(config_path)?;
    let series_config = validate_series_config(&adapter)?;
    let series = build_series(&series_config, config_dir(adapter.source()))?;

    println!("name:        {}", series.name());
    println!("base time:   {}", series.base_time().to_rfc3339());
    println!("time period: {}", series.time_period());
    println!("begin index: {}", series.begin_index());
    println!("end index:   {}", series.end_index());
    println!("bars:        {}", series.bar_count());
    Ok(())
}

fn run_signals(config_path: &Path) -> ExitCode {
    match signals(config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn signals(config_path: &Path) -> Result<(), BarlensError> {
    let adapter = load_config(config_path)?;
    let series_config = validate_series_config(&adapter)?;
    let signals_config = validate_signals_config(&adapter)?;
    let series = build_series(&series_config, config_dir(adapter.source()))?;

    let found = find_signals(&series, signals_config)?;
    eprintln!(
        "{}: {} signals for SMA({}) vs SMA({})",
        series.name(),
        found.len(),
        signals_config.fast,
        signals_config.slow
    );
    for signal in &found {
        println!(
            "{}\t{}\t{}\t{:.4}\t{:.4}",
            signal.index,
            signal.end_time.to_rfc3339(),
            signal.direction,
            signal.fast,
            signal.slow
        );
    }
    Ok(())
}
