//! The JdK two-stage normalization.
//!
//! ```text
//! rs          = sector / benchmark
//! rs_ratio    = 100 + (rs - smooth(rs, rs_period)) / smooth(rs, rs_period) * 100
//! rs_momentum = 100 + (rs_ratio - smooth(rs_ratio, mom_period)) / smooth(rs_ratio, mom_period) * 100
//! ```
//!
//! Timestamps where either coordinate is undefined or non-finite are dropped,
//! which also trims the warm-up of both smoothing stages.

use rrg_core::{PriceSeries, Result, RrgError, RrgPoint, RrgSeries, SmoothingMethod, CENTER};
use smoothing_engine::Smoother;

use crate::alignment::align;

/// RRG coordinates for one sector with one of the built-in smoothing methods.
pub fn compute(
    sector: &PriceSeries,
    benchmark: &PriceSeries,
    rs_period: usize,
    mom_period: usize,
    method: SmoothingMethod,
) -> Result<RrgSeries> {
    compute_with(sector, benchmark, rs_period, mom_period, &method)
}

/// Same as [`compute`] with any [`Smoother`] strategy.
pub fn compute_with<S>(
    sector: &PriceSeries,
    benchmark: &PriceSeries,
    rs_period: usize,
    mom_period: usize,
    smoother: &S,
) -> Result<RrgSeries>
where
    S: Smoother + ?Sized,
{
    let (sector, benchmark) = align(sector, benchmark);
    if sector.is_empty() {
        return Ok(RrgSeries::default());
    }

    let rs: Vec<f64> = sector
        .points()
        .iter()
        .zip(benchmark.points())
        .map(|(s, b)| s.close / b.close)
        .collect();

    let rs_smooth = smoothed(smoother, &rs, rs_period)?;
    let (rs_ratio, ratio_degenerate) = oscillator(&rs, &rs_smooth);

    let ratio_smooth = smoothed(smoother, &rs_ratio, mom_period)?;
    let (rs_momentum, momentum_degenerate) = oscillator(&rs_ratio, &ratio_smooth);

    if ratio_degenerate + momentum_degenerate > 0 {
        tracing::debug!(
            smoother = smoother.name(),
            ratio_degenerate,
            momentum_degenerate,
            "dropped points with a zero or non-finite baseline"
        );
    }

    let points: Vec<RrgPoint> = sector
        .timestamps()
        .zip(rs_ratio.iter().zip(&rs_momentum))
        .filter_map(|(timestamp, (&ratio, &momentum))| RrgPoint::new(timestamp, ratio, momentum))
        .collect();

    Ok(RrgSeries::new(points))
}

/// `100 + (value - baseline) / baseline * 100`.
///
/// Undefined inputs give an undefined result. A zero or non-finite baseline
/// is `DegenerateSmoothing`.
pub fn normalize(value: f64, baseline: f64) -> Result<f64> {
    if value.is_nan() || baseline.is_nan() {
        return Ok(f64::NAN);
    }
    if baseline == 0.0 || !baseline.is_finite() {
        return Err(RrgError::degenerate(format!("baseline {}", baseline)));
    }

    let result = CENTER + ((value - baseline) / baseline) * CENTER;
    if !result.is_finite() {
        return Err(RrgError::degenerate(format!(
            "value {} over baseline {}",
            value, baseline
        )));
    }
    Ok(result)
}

fn smoothed<S>(smoother: &S, data: &[f64], period: usize) -> Result<Vec<f64>>
where
    S: Smoother + ?Sized,
{
    let result = smoother.smooth(data, period)?;
    if result.len() != data.len() {
        return Err(RrgError::InvalidData(format!(
            "{} returned {} values for {} inputs",
            smoother.name(),
            result.len(),
            data.len()
        )));
    }
    Ok(result)
}

/// Oscillator values plus how many positions had a degenerate baseline.
fn oscillator(values: &[f64], baseline: &[f64]) -> (Vec<f64>, usize) {
    let mut degenerate = 0;
    let result = values
        .iter()
        .zip(baseline)
        .map(|(&v, &b)| match normalize(v, b) {
            Ok(x) => x,
            Err(_) => {
                degenerate += 1;
                f64::NAN
            }
        })
        .collect();
    (result, degenerate)
}
