//! Brute-force search over smoothing method × RS period × momentum period.
//!
//! Each configuration is an ordinary batch run; the grid is evaluated in
//! parallel and configurations where no sector survives are left out.

use rayon::prelude::*;
use rrg_core::{BatchResult, PriceSeries, Result, RrgConfig, RrgError, SmoothingMethod};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::batch::{BatchOrchestrator, SectorInput};

/// The parameter grid to search
#[derive(Debug, Clone)]
pub struct SweepGrid {
    pub methods: Vec<SmoothingMethod>,
    pub rs_periods: Vec<usize>,
    pub mom_periods: Vec<usize>,
    /// Thresholds and tail shared by every configuration
    pub base: RrgConfig,
}

impl Default for SweepGrid {
    fn default() -> Self {
        Self {
            methods: SmoothingMethod::exploratory(),
            rs_periods: (5..15).collect(),
            mom_periods: (5..15).collect(),
            base: RrgConfig::default(),
        }
    }
}

impl SweepGrid {
    /// Configurations in method, then RS period, then momentum period order
    pub fn configs(&self) -> Vec<RrgConfig> {
        let mut configs = Vec::with_capacity(self.len());
        for &method in &self.methods {
            for &rs_period in &self.rs_periods {
                for &mom_period in &self.mom_periods {
                    configs.push(
                        self.base
                            .clone()
                            .with_smoothing(method)
                            .with_periods(rs_period, mom_period),
                    );
                }
            }
        }
        configs
    }

    pub fn len(&self) -> usize {
        self.methods.len() * self.rs_periods.len() * self.mom_periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One configuration that produced at least one sector
#[derive(Debug, Clone, Serialize)]
pub struct SweepEntry {
    /// `{rs_period}_{mom_period}_{method}`
    pub label: String,
    pub config: RrgConfig,
    pub result: BatchResult,
}

impl SweepEntry {
    pub fn label_for(config: &RrgConfig) -> String {
        format!("{}_{}_{}", config.rs_period, config.mom_period, config.smoothing)
    }
}

/// Run one batch per grid configuration.
pub fn sweep(
    benchmark: &PriceSeries,
    sectors: &[SectorInput],
    grid: &SweepGrid,
) -> Result<Vec<SweepEntry>> {
    if benchmark.is_empty() {
        return Err(RrgError::MissingBenchmark("benchmark series is empty".to_string()));
    }

    let configs = grid.configs();
    let total = configs.len();
    let done = AtomicUsize::new(0);
    tracing::info!(
        "Running {} combinations ({} methods x {} rs periods x {} mom periods)",
        total,
        grid.methods.len(),
        grid.rs_periods.len(),
        grid.mom_periods.len()
    );

    let entries: Vec<Option<SweepEntry>> = configs
        .into_par_iter()
        .map(|config| {
            let label = SweepEntry::label_for(&config);
            let outcome = BatchOrchestrator::new(config.clone()).run(benchmark, sectors);

            let count = done.fetch_add(1, Ordering::Relaxed) + 1;
            if count % 10 == 0 || count == total {
                tracing::info!(
                    "Progress: {}/{} ({:.1}%)",
                    count,
                    total,
                    100.0 * count as f64 / total as f64
                );
            }

            match outcome {
                Ok(result) if !result.sectors.is_empty() => Some(SweepEntry { label, config, result }),
                Ok(_) => {
                    tracing::debug!("{}: no sector survived, skipped", label);
                    None
                }
                Err(e) => {
                    tracing::warn!("{} failed: {}", label, e);
                    None
                }
            }
        })
        .collect();

    Ok(entries.into_iter().flatten().collect())
}
