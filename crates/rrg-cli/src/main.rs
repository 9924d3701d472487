//! rrg: Relative Rotation Graph coordinates for a sector universe.
//!
//! Reads one CSV per sector (plus the benchmark) from a data directory and
//! writes RS-Ratio / RS-Momentum tails as JSON.
//!
//! Usage:
//!   rrg compute --interval weekly
//!   rrg compute --interval daily --method sma --sectors BANK,ICT --output rrg.json
//!   rrg sweep --methods wma,kama --rs-min 8 --rs-max 12 --output-dir results

mod report;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use rotation_graph::{default_selection, sweep, BatchOrchestrator, SectorInput, SweepGrid};
use rrg_core::{BatchStatus, Interval, PriceSeries, RrgConfig, SeriesSource, SmoothingMethod};
use series_loader::CsvDirectorySource;
use std::path::PathBuf;

use crate::report::{write_json, write_sweep, ComputeReport};

#[derive(Parser)]
#[command(name = "rrg")]
#[command(about = "Relative Rotation Graph computation for sector indices", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute one RRG batch and print or save the tails
    Compute {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long)]
        rs_period: Option<usize>,

        #[arg(long)]
        mom_period: Option<usize>,

        /// wilder, sma, wma, dema, tema, hma, kama, zlema or tma
        #[arg(short, long)]
        method: Option<SmoothingMethod>,

        /// Tail length in interval units
        #[arg(short, long)]
        tail: Option<usize>,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run every method × period combination and write one JSON file per combination
    Sweep {
        #[command(flatten)]
        data: DataArgs,

        /// Defaults to every exploratory method
        #[arg(long, value_delimiter = ',')]
        methods: Vec<SmoothingMethod>,

        #[arg(long, default_value = "5")]
        rs_min: usize,

        /// Exclusive
        #[arg(long, default_value = "15")]
        rs_max: usize,

        #[arg(long, default_value = "5")]
        mom_min: usize,

        /// Exclusive
        #[arg(long, default_value = "15")]
        mom_max: usize,

        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
}

#[derive(Args)]
struct DataArgs {
    /// Directory holding daily/ and 1h/ CSV folders
    #[arg(long, env = "RRG_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// weekly, daily or 1h
    #[arg(short, long, default_value = "weekly")]
    interval: Interval,

    /// Benchmark file stem
    #[arg(long, default_value = series_loader::DEFAULT_BENCHMARK)]
    benchmark: String,

    /// Comma-separated sector ids; defaults to the main sectors
    #[arg(short, long, value_delimiter = ',')]
    sectors: Vec<String>,

    /// Use every sector in the data directory
    #[arg(long, conflicts_with = "sectors")]
    all: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Compute {
            data,
            rs_period,
            mom_period,
            method,
            tail,
            output,
        } => {
            let mut config = RrgConfig::from_env_with(RrgConfig::for_interval(data.interval))?;
            if let Some(p) = rs_period {
                config.rs_period = p;
            }
            if let Some(p) = mom_period {
                config.mom_period = p;
            }
            if let Some(m) = method {
                config.smoothing = m;
            }
            if let Some(t) = tail {
                config.tail_length = t;
            }
            config.validate()?;

            run_compute(&data, config, output)
        }
        Commands::Sweep {
            data,
            methods,
            rs_min,
            rs_max,
            mom_min,
            mom_max,
            output_dir,
        } => {
            if rs_min >= rs_max || mom_min >= mom_max {
                bail!("empty period range: rs {}..{}, mom {}..{}", rs_min, rs_max, mom_min, mom_max);
            }
            let base = RrgConfig::from_env_with(RrgConfig::for_interval(data.interval))?;
            let grid = SweepGrid {
                methods: if methods.is_empty() {
                    SmoothingMethod::exploratory()
                } else {
                    methods
                },
                rs_periods: (rs_min..rs_max).collect(),
                mom_periods: (mom_min..mom_max).collect(),
                base,
            };

            run_sweep(&data, &grid, output_dir)
        }
    }
}

fn init_tracing() {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "rrg=info,rotation_graph=info,series_loader=warn".into())
    };
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter()).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter()).init();
    }
}

/// Benchmark plus the selected sectors, each sector carrying its own load error
fn load_inputs(data: &DataArgs) -> anyhow::Result<(PriceSeries, Vec<SectorInput>)> {
    let source = CsvDirectorySource::new(&data.data_dir, data.interval).with_benchmark(&data.benchmark);

    let benchmark = source
        .benchmark()
        .with_context(|| format!("loading benchmark {} from {}", data.benchmark, source.dir().display()))?;

    let selected = select_sectors(data, source.sector_ids()?);
    let missing: Vec<&String> = selected
        .iter()
        .filter(|id| !source.dir().join(format!("{}.csv", id)).is_file())
        .collect();
    if !missing.is_empty() {
        tracing::warn!("No data for {:?} in {}", missing, source.dir().display());
    }

    tracing::info!(
        "{} interval: benchmark {} ({} points), {} sectors",
        data.interval,
        data.benchmark,
        benchmark.len(),
        selected.len()
    );

    let sectors = selected
        .into_iter()
        .map(|id| {
            let prices = source.load(&id);
            SectorInput { id, prices }
        })
        .collect();

    Ok((benchmark, sectors))
}

/// Sector ids to run: every file with `--all`, the main sectors by default,
/// otherwise exactly what was asked for so that unknown ids surface as failures.
fn select_sectors(data: &DataArgs, available: Vec<String>) -> Vec<String> {
    if data.all {
        return available;
    }
    if data.sectors.is_empty() {
        return default_selection(&available, None);
    }

    let mut requested: Vec<String> = Vec::with_capacity(data.sectors.len());
    for id in &data.sectors {
        if !requested.contains(id) {
            requested.push(id.clone());
        }
    }
    requested
}

fn run_compute(data: &DataArgs, config: RrgConfig, output: Option<PathBuf>) -> anyhow::Result<()> {
    let (benchmark, sectors) = load_inputs(data)?;

    let result = BatchOrchestrator::new(config.clone()).run(&benchmark, &sectors)?;

    if result.status() == BatchStatus::AllFailed {
        let reasons: Vec<String> = result
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.sector, f.reason))
            .collect();
        bail!("All sectors failed\n  {}", reasons.join("\n  "));
    }

    let report = ComputeReport::new(data.interval, config, &result);
    if let Some(as_of) = report.as_of {
        tracing::info!("Data as of {}", as_of.format("%Y-%m-%d %H:%M"));
    }
    write_json(&report, output.as_deref())
}

fn run_sweep(data: &DataArgs, grid: &SweepGrid, output_dir: PathBuf) -> anyhow::Result<()> {
    let (benchmark, sectors) = load_inputs(data)?;

    let entries = sweep(&benchmark, &sectors, grid)?;
    let written = write_sweep(&entries, &output_dir)?;

    tracing::info!(
        "Sweep complete: {} of {} combinations produced output in {}",
        written.len(),
        grid.len(),
        output_dir.display()
    );
    Ok(())
}
