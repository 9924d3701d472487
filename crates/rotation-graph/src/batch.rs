use rayon::prelude::*;
use rrg_core::{BatchResult, PriceSeries, Result, RrgConfig, RrgError, RrgSeries, SeriesSource};
use smoothing_engine::Smoother;

use crate::alignment::{align, check_output, check_overlap};
use crate::transform::compute_with;

/// One sector handed to a batch, or the reason its prices could not be produced
#[derive(Debug, Clone)]
pub struct SectorInput {
    pub id: String,
    pub prices: Result<PriceSeries>,
}

impl SectorInput {
    pub fn new(id: impl Into<String>, prices: PriceSeries) -> Self {
        Self {
            id: id.into(),
            prices: Ok(prices),
        }
    }

    pub fn failed(id: impl Into<String>, error: RrgError) -> Self {
        Self {
            id: id.into(),
            prices: Err(error),
        }
    }
}

/// Runs alignment and the RRG transform over a sector universe for one configuration.
///
/// Sectors are independent: each one either lands in the result mapping or in
/// the failure list with its reason, and the rest of the batch carries on.
/// Sectors are processed in parallel; results are collected in input order.
pub struct BatchOrchestrator {
    config: RrgConfig,
}

impl BatchOrchestrator {
    pub fn new(config: RrgConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RrgConfig {
        &self.config
    }

    /// Compute every sector with the configured smoothing method.
    ///
    /// Fails only when the benchmark has no data.
    pub fn run(&self, benchmark: &PriceSeries, sectors: &[SectorInput]) -> Result<BatchResult> {
        let method = self.config.smoothing;
        self.run_with(benchmark, sectors, &method)
    }

    /// Same as [`run`](Self::run) with a caller-supplied smoothing strategy.
    pub fn run_with<S>(
        &self,
        benchmark: &PriceSeries,
        sectors: &[SectorInput],
        smoother: &S,
    ) -> Result<BatchResult>
    where
        S: Smoother + ?Sized,
    {
        if benchmark.is_empty() {
            return Err(RrgError::MissingBenchmark("benchmark series is empty".to_string()));
        }

        tracing::debug!(
            sectors = sectors.len(),
            rs_period = self.config.rs_period,
            mom_period = self.config.mom_period,
            smoother = smoother.name(),
            "Starting RRG batch"
        );

        let outcomes: Vec<(&str, Result<RrgSeries>)> = sectors
            .par_iter()
            .map(|sector| (sector.id.as_str(), self.process_sector(benchmark, sector, smoother)))
            .collect();

        let mut batch = BatchResult::new();
        for (id, outcome) in outcomes {
            let recorded = match &outcome {
                Ok(series) => batch.record_success(id, series.clone()),
                Err(e) => {
                    tracing::warn!("Skipping sector {}: {}", id, e);
                    batch.record_failure(id, e)
                }
            };
            if !recorded {
                tracing::warn!("Duplicate sector id {} ignored", id);
            }
        }

        tracing::info!(
            "RRG batch ({} {}/{}): {} sectors ok, {} skipped",
            smoother.name(),
            self.config.rs_period,
            self.config.mom_period,
            batch.sectors.len(),
            batch.failures.len()
        );

        Ok(batch)
    }

    /// Load the benchmark and every sector from `source`, then run the batch.
    ///
    /// A benchmark that cannot be loaded fails the whole run; a sector that
    /// cannot be loaded becomes a failure entry.
    pub fn run_source(&self, source: &dyn SeriesSource) -> Result<BatchResult> {
        let benchmark = source
            .benchmark()
            .map_err(|e| RrgError::MissingBenchmark(e.to_string()))?;

        let sectors: Vec<SectorInput> = source
            .sector_ids()?
            .into_iter()
            .map(|id| {
                let prices = source.load(&id);
                SectorInput { id, prices }
            })
            .collect();

        self.run(&benchmark, &sectors)
    }

    fn process_sector<S>(
        &self,
        benchmark: &PriceSeries,
        sector: &SectorInput,
        smoother: &S,
    ) -> Result<RrgSeries>
    where
        S: Smoother + ?Sized,
    {
        let prices = sector.prices.as_ref().map_err(Clone::clone)?;

        let (sector_aligned, benchmark_aligned) = align(prices, benchmark);
        check_overlap(sector_aligned.len(), &self.config)?;

        let series = compute_with(
            &sector_aligned,
            &benchmark_aligned,
            self.config.rs_period,
            self.config.mom_period,
            smoother,
        )?;
        check_output(series.len(), &self.config)?;

        tracing::debug!(
            sector = %sector.id,
            aligned = sector_aligned.len(),
            points = series.len(),
            "Sector computed"
        );
        Ok(series)
    }
}
