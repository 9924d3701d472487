use rrg_core::{Interval, PriceSeries, Result, RrgError, SeriesSource};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::csv_reader::parse_price_csv;
use crate::resample::resample;

/// File stem of the benchmark index
pub const DEFAULT_BENCHMARK: &str = "SET";

/// Load one CSV file and apply the sampling rules of `interval`.
pub fn load_csv(path: &Path, interval: Interval) -> Result<PriceSeries> {
    let symbol = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let file = File::open(path)
        .map_err(|e| RrgError::source(&symbol, format!("{}: {}", path.display(), e)))?;
    let raw = parse_price_csv(file, &symbol)?;
    let series = resample(raw, interval)?;

    tracing::debug!(
        symbol = %symbol,
        interval = %interval,
        points = series.len(),
        "Loaded price series"
    );
    Ok(series)
}

/// One CSV per instrument in a directory: `<data_dir>/daily` for weekly and
/// daily runs, `<data_dir>/1h` for hourly runs.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    dir: PathBuf,
    interval: Interval,
    benchmark: String,
}

impl CsvDirectorySource {
    pub fn new(data_dir: impl AsRef<Path>, interval: Interval) -> Self {
        Self {
            dir: data_dir.as_ref().join(Self::subdir(interval)),
            interval,
            benchmark: DEFAULT_BENCHMARK.to_string(),
        }
    }

    pub fn with_benchmark(mut self, benchmark: impl Into<String>) -> Self {
        self.benchmark = benchmark.into();
        self
    }

    /// Weekly bars are built from the daily files
    pub fn subdir(interval: Interval) -> &'static str {
        match interval {
            Interval::Hour1 => "1h",
            Interval::Weekly | Interval::Daily => "daily",
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn benchmark_id(&self) -> &str {
        &self.benchmark
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", id))
    }
}

impl SeriesSource for CsvDirectorySource {
    fn benchmark(&self) -> Result<PriceSeries> {
        let path = self.path_for(&self.benchmark);
        if !path.is_file() {
            return Err(RrgError::MissingBenchmark(format!(
                "{} not found",
                path.display()
            )));
        }
        load_csv(&path, self.interval)
    }

    fn sector_ids(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            RrgError::source(self.dir.display().to_string(), format!("cannot list directory: {}", e))
        })?;

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .map(|ext| ext.eq_ignore_ascii_case("csv"))
                        .unwrap_or(false)
            })
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .filter(|id| *id != self.benchmark)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    fn load(&self, sector_id: &str) -> Result<PriceSeries> {
        load_csv(&self.path_for(sector_id), self.interval)
    }
}
