use anyhow::Context;
use chrono::{DateTime, Utc};
use rotation_graph::SweepEntry;
use rrg_core::{BatchResult, BatchStatus, Interval, Quadrant, RrgConfig, RrgPoint, SectorFailure};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// JSON document written by `rrg compute`
#[derive(Debug, Serialize)]
pub struct ComputeReport {
    pub interval: Interval,
    pub config: RrgConfig,
    pub status: BatchStatus,
    /// Latest timestamp across every sector
    pub as_of: Option<DateTime<Utc>>,
    pub tail_unit: &'static str,
    pub sectors: BTreeMap<String, SectorReport>,
    pub failures: Vec<SectorFailure>,
}

#[derive(Debug, Serialize)]
pub struct SectorReport {
    /// Quadrant of the newest point
    pub quadrant: Option<Quadrant>,
    pub tail: Vec<RrgPoint>,
}

impl ComputeReport {
    pub fn new(interval: Interval, config: RrgConfig, result: &BatchResult) -> Self {
        let sectors = result
            .sectors
            .iter()
            .map(|(id, series)| {
                let tail = series.tail(config.tail_length).to_vec();
                let quadrant = tail.last().map(RrgPoint::quadrant);
                (id.clone(), SectorReport { quadrant, tail })
            })
            .collect();

        Self {
            interval,
            status: result.status(),
            as_of: result.latest_timestamp(),
            tail_unit: interval.tail_unit(),
            sectors,
            failures: result.failures.clone(),
            config,
        }
    }
}

/// Write `value` as pretty JSON to `path`, or to stdout when no path is given
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// One `{label}.json` per sweep entry; returns the written paths
pub fn write_sweep(entries: &[SweepEntry], output_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let mut written = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = output_dir.join(format!("{}.json", entry.label));
        let json = serde_json::to_string_pretty(entry)?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
