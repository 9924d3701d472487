use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{FailureKind, Result, RrgError};
use crate::CENTER;

/// One close price at one timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// Close prices ordered by strictly increasing timestamp.
///
/// Every close is finite and positive, so dividing by one is always safe.
/// Construction is the only place these rules are checked; the series is
/// immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for (i, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(RrgError::InvalidData(format!(
                    "close {} at {} is not a positive finite price",
                    point.close, point.timestamp
                )));
            }
            if i > 0 && points[i - 1].timestamp >= point.timestamp {
                return Err(RrgError::InvalidData(format!(
                    "timestamps not strictly increasing at {}",
                    point.timestamp
                )));
            }
        }
        Ok(Self { points })
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (DateTime<Utc>, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(timestamp, close)| PricePoint { timestamp, close })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.points.iter().map(|p| p.timestamp)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Sub-series made of the points at `indices`.
    ///
    /// `indices` must be strictly ascending, which keeps the ordering
    /// invariant without re-validating.
    pub fn select(&self, indices: &[usize]) -> PriceSeries {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        PriceSeries {
            points: indices.iter().map(|&i| self.points[i]).collect(),
        }
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = RrgError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

/// RRG quadrant of a point relative to the (100, 100) centre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Quadrant {
    Leading,
    Weakening,
    Lagging,
    Improving,
}

impl Quadrant {
    pub fn classify(rs_ratio: f64, rs_momentum: f64) -> Self {
        match (rs_ratio >= CENTER, rs_momentum >= CENTER) {
            (true, true) => Quadrant::Leading,
            (true, false) => Quadrant::Weakening,
            (false, false) => Quadrant::Lagging,
            (false, true) => Quadrant::Improving,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::Leading => "LEADING",
            Quadrant::Weakening => "WEAKENING",
            Quadrant::Lagging => "LAGGING",
            Quadrant::Improving => "IMPROVING",
        }
    }
}

/// A single RRG coordinate. Both components are always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RrgPoint {
    pub timestamp: DateTime<Utc>,
    pub rs_ratio: f64,
    pub rs_momentum: f64,
}

impl RrgPoint {
    /// Returns `None` unless both components are finite.
    pub fn new(timestamp: DateTime<Utc>, rs_ratio: f64, rs_momentum: f64) -> Option<Self> {
        if rs_ratio.is_finite() && rs_momentum.is_finite() {
            Some(Self {
                timestamp,
                rs_ratio,
                rs_momentum,
            })
        } else {
            None
        }
    }

    pub fn quadrant(&self) -> Quadrant {
        Quadrant::classify(self.rs_ratio, self.rs_momentum)
    }
}

/// Coordinates for one sector under one benchmark and one configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RrgSeries {
    points: Vec<RrgPoint>,
}

impl RrgSeries {
    pub fn new(points: Vec<RrgPoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[RrgPoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&RrgPoint> {
        self.points.last()
    }

    /// The last `length` points, oldest first. Values are untouched.
    pub fn tail(&self, length: usize) -> &[RrgPoint] {
        let start = self.points.len().saturating_sub(length);
        &self.points[start..]
    }

    pub fn to_tail(&self, length: usize) -> RrgSeries {
        RrgSeries {
            points: self.tail(length).to_vec(),
        }
    }
}

/// A sector that did not make it into the batch mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorFailure {
    pub sector: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl SectorFailure {
    pub fn from_error(sector: impl Into<String>, error: &RrgError) -> Self {
        Self {
            sector: sector.into(),
            kind: error.kind(),
            reason: error.to_string(),
        }
    }
}

/// Overall shape of a batch, as seen by whoever renders it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// No sectors were supplied at all
    NoSectors,
    /// Every sector produced a series
    Complete,
    /// Some sectors succeeded, some failed
    Partial,
    /// Sectors were supplied and every one failed
    AllFailed,
}

/// Successful series keyed by sector id, plus the sectors that were skipped.
///
/// A sector id lives in at most one of the two collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub sectors: BTreeMap<String, RrgSeries>,
    pub failures: Vec<SectorFailure>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, sector: &str) -> bool {
        self.sectors.contains_key(sector) || self.failures.iter().any(|f| f.sector == sector)
    }

    /// Returns false when the sector was already recorded.
    pub fn record_success(&mut self, sector: impl Into<String>, series: RrgSeries) -> bool {
        let sector = sector.into();
        if self.contains(&sector) {
            return false;
        }
        self.sectors.insert(sector, series);
        true
    }

    /// Returns false when the sector was already recorded.
    pub fn record_failure(&mut self, sector: impl Into<String>, error: &RrgError) -> bool {
        let sector = sector.into();
        if self.contains(&sector) {
            return false;
        }
        self.failures.push(SectorFailure::from_error(sector, error));
        true
    }

    pub fn status(&self) -> BatchStatus {
        match (self.sectors.is_empty(), self.failures.is_empty()) {
            (true, true) => BatchStatus::NoSectors,
            (false, true) => BatchStatus::Complete,
            (false, false) => BatchStatus::Partial,
            (true, false) => BatchStatus::AllFailed,
        }
    }

    pub fn get(&self, sector: &str) -> Option<&RrgSeries> {
        self.sectors.get(sector)
    }

    /// Most recent timestamp across all successful series.
    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.sectors
            .values()
            .filter_map(|s| s.last().map(|p| p.timestamp))
            .max()
    }

    /// Same batch with every series cut down to its display tail.
    pub fn with_tail(&self, length: usize) -> BatchResult {
        BatchResult {
            sectors: self
                .sectors
                .iter()
                .map(|(id, series)| (id.clone(), series.to_tail(length)))
                .collect(),
            failures: self.failures.clone(),
        }
    }
}

/// Sampling interval a batch was computed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Weekly,
    Daily,
    #[serde(rename = "1h")]
    Hour1,
}

impl Interval {
    pub fn name(&self) -> &'static str {
        match self {
            Interval::Weekly => "weekly",
            Interval::Daily => "daily",
            Interval::Hour1 => "1h",
        }
    }

    /// Unit a tail length is counted in
    pub fn tail_unit(&self) -> &'static str {
        match self {
            Interval::Weekly => "weeks",
            Interval::Daily => "days",
            Interval::Hour1 => "hours",
        }
    }

    pub fn all() -> Vec<Interval> {
        vec![Interval::Weekly, Interval::Daily, Interval::Hour1]
    }
}

impl std::str::FromStr for Interval {
    type Err = RrgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "weekly" | "week" | "1w" => Ok(Interval::Weekly),
            "daily" | "day" | "1d" => Ok(Interval::Daily),
            "1h" | "hourly" | "hour" => Ok(Interval::Hour1),
            other => Err(RrgError::InvalidConfig(format!("unknown interval '{}'", other))),
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day)
    }

    fn rrg_series(n: usize) -> RrgSeries {
        RrgSeries::new(
            (0..n)
                .map(|i| RrgPoint::new(ts(i as i64), 100.0 + i as f64, 100.0 - i as f64).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_price_series_rejects_unordered() {
        let result = PriceSeries::from_pairs(vec![(ts(1), 10.0), (ts(0), 11.0)]);
        assert!(matches!(result, Err(RrgError::InvalidData(_))));
    }

    #[test]
    fn test_price_series_rejects_duplicate_timestamp() {
        let result = PriceSeries::from_pairs(vec![(ts(0), 10.0), (ts(0), 11.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_price_series_rejects_non_positive() {
        assert!(PriceSeries::from_pairs(vec![(ts(0), 0.0)]).is_err());
        assert!(PriceSeries::from_pairs(vec![(ts(0), -1.0)]).is_err());
        assert!(PriceSeries::from_pairs(vec![(ts(0), f64::NAN)]).is_err());
    }

    #[test]
    fn test_price_series_deserialize_validates() {
        let json = serde_json::json!([
            { "timestamp": "2024-01-02T00:00:00Z", "close": 10.0 },
            { "timestamp": "2024-01-01T00:00:00Z", "close": 11.0 }
        ]);
        assert!(serde_json::from_value::<PriceSeries>(json).is_err());
    }

    #[test]
    fn test_rrg_point_requires_finite() {
        assert!(RrgPoint::new(ts(0), f64::INFINITY, 100.0).is_none());
        assert!(RrgPoint::new(ts(0), 100.0, f64::NAN).is_none());
        assert!(RrgPoint::new(ts(0), 100.0, 100.0).is_some());
    }

    #[test]
    fn test_tail_selection() {
        let series = rrg_series(50);
        let tail = series.tail(5);
        assert_eq!(tail.len(), 5);
        assert_eq!(tail, &series.points()[45..]);
        assert_eq!(tail[0].timestamp, ts(45));
        assert_eq!(tail[4].timestamp, ts(49));

        // Longer than the series returns everything
        assert_eq!(series.tail(500).len(), 50);
    }

    #[test]
    fn test_quadrants() {
        assert_eq!(Quadrant::classify(101.0, 101.0), Quadrant::Leading);
        assert_eq!(Quadrant::classify(101.0, 99.0), Quadrant::Weakening);
        assert_eq!(Quadrant::classify(99.0, 99.0), Quadrant::Lagging);
        assert_eq!(Quadrant::classify(99.0, 101.0), Quadrant::Improving);
        assert_eq!(Quadrant::classify(100.0, 100.0), Quadrant::Leading);
    }

    #[test]
    fn test_batch_status() {
        let mut batch = BatchResult::new();
        assert_eq!(batch.status(), BatchStatus::NoSectors);

        batch.record_failure("BANK", &RrgError::insufficient_data(30, 5, "overlap"));
        assert_eq!(batch.status(), BatchStatus::AllFailed);

        batch.record_success("ENERG", rrg_series(10));
        assert_eq!(batch.status(), BatchStatus::Partial);
    }

    #[test]
    fn test_batch_sector_recorded_once() {
        let mut batch = BatchResult::new();
        assert!(batch.record_success("ICT", rrg_series(10)));
        assert!(!batch.record_failure("ICT", &RrgError::InvalidParameter("x".into())));
        assert!(!batch.record_success("ICT", rrg_series(3)));
        assert_eq!(batch.sectors.len(), 1);
        assert!(batch.failures.is_empty());
        assert_eq!(batch.get("ICT").map(|s| s.len()), Some(10));
    }

    #[test]
    fn test_with_tail_keeps_failures() {
        let mut batch = BatchResult::new();
        batch.record_success("ICT", rrg_series(20));
        batch.record_failure("BANK", &RrgError::source("BANK", "unreadable"));

        let tailed = batch.with_tail(3);
        assert_eq!(tailed.get("ICT").map(|s| s.len()), Some(3));
        assert_eq!(tailed.failures.len(), 1);
        assert_eq!(tailed.latest_timestamp(), Some(ts(19)));
    }

    #[test]
    fn test_interval_parse() {
        assert_eq!("Weekly".parse::<Interval>().unwrap(), Interval::Weekly);
        assert_eq!("1h".parse::<Interval>().unwrap(), Interval::Hour1);
        assert!("monthly".parse::<Interval>().is_err());
    }
}
