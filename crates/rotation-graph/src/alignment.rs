//! Timestamp alignment and the minimum-data gates around the transform.

use rrg_core::{PriceSeries, Result, RrgConfig, RrgError};
use std::cmp::Ordering;

/// Restrict both series to the timestamps they share, ascending.
pub fn align(sector: &PriceSeries, benchmark: &PriceSeries) -> (PriceSeries, PriceSeries) {
    let (sector_idx, benchmark_idx) = shared_indices(sector, benchmark);
    (sector.select(&sector_idx), benchmark.select(&benchmark_idx))
}

/// Number of timestamps present in both series
pub fn overlap_count(sector: &PriceSeries, benchmark: &PriceSeries) -> usize {
    shared_indices(sector, benchmark).0.len()
}

/// Gate before the transform: `rs_period + mom_period + margin` aligned samples.
pub fn check_overlap(aligned: usize, config: &RrgConfig) -> Result<()> {
    let required = config.min_overlap();
    if aligned < required {
        return Err(RrgError::insufficient_data(required, aligned, "overlapping timestamps"));
    }
    Ok(())
}

/// Gate after the transform: at least `min_output_points` coordinates.
pub fn check_output(points: usize, config: &RrgConfig) -> Result<()> {
    if points < config.min_output_points {
        return Err(RrgError::insufficient_data(
            config.min_output_points,
            points,
            "RRG points",
        ));
    }
    Ok(())
}

// Both inputs are strictly ascending, so a single merge pass finds the intersection.
fn shared_indices(a: &PriceSeries, b: &PriceSeries) -> (Vec<usize>, Vec<usize>) {
    let (a, b) = (a.points(), b.points());
    let mut a_idx = Vec::new();
    let mut b_idx = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].timestamp.cmp(&b[j].timestamp) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                a_idx.push(i);
                b_idx.push(j);
                i += 1;
                j += 1;
            }
        }
    }

    (a_idx, b_idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn ts(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::days(day)
    }

    fn series(days: &[i64], price: f64) -> PriceSeries {
        PriceSeries::from_pairs(days.iter().map(|&d| (ts(d), price + d as f64))).unwrap()
    }

    #[test]
    fn test_align_intersection() {
        let sector = series(&[0, 1, 2, 4, 5, 7], 10.0);
        let benchmark = series(&[1, 2, 3, 5, 6, 7, 8], 100.0);

        let (s, b) = align(&sector, &benchmark);
        let days: Vec<DateTime<Utc>> = s.timestamps().collect();
        assert_eq!(days, vec![ts(1), ts(2), ts(5), ts(7)]);
        assert_eq!(s.timestamps().collect::<Vec<_>>(), b.timestamps().collect::<Vec<_>>());
        // Values travel with their own timestamps
        assert_eq!(s.closes(), vec![11.0, 12.0, 15.0, 17.0]);
        assert_eq!(b.closes(), vec![101.0, 102.0, 105.0, 107.0]);
        assert_eq!(overlap_count(&sector, &benchmark), 4);
    }

    #[test]
    fn test_align_disjoint() {
        let sector = series(&[0, 2, 4], 10.0);
        let benchmark = series(&[1, 3, 5], 100.0);
        let (s, b) = align(&sector, &benchmark);
        assert!(s.is_empty());
        assert!(b.is_empty());
    }

    #[test]
    fn test_check_overlap_threshold() {
        let config = RrgConfig::default().with_periods(10, 10);
        assert!(check_overlap(30, &config).is_ok());
        let err = check_overlap(29, &config).unwrap_err();
        assert_eq!(err, RrgError::insufficient_data(30, 29, "overlapping timestamps"));

        let tight = RrgConfig {
            min_overlap_margin: 5,
            ..config
        };
        assert!(check_overlap(25, &tight).is_ok());
    }

    #[test]
    fn test_check_output_threshold() {
        let config = RrgConfig::default();
        assert!(check_output(5, &config).is_ok());
        assert!(check_output(4, &config).is_err());
    }
}
