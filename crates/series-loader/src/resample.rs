use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use rrg_core::{Interval, PriceSeries, Result, RrgError};

/// Hourly bars are stored in UTC and shown in exchange-local time (UTC+7)
pub const HOURLY_OFFSET_HOURS: i64 = 7;

/// The Friday closing the week that contains `timestamp` (the Friday itself included)
pub fn week_ending_friday(timestamp: DateTime<Utc>) -> NaiveDate {
    let date = timestamp.date_naive();
    let from_monday = date.weekday().num_days_from_monday() as i64;
    let friday = Weekday::Fri.num_days_from_monday() as i64;
    date + Duration::days((friday - from_monday).rem_euclid(7))
}

/// Apply the sampling rules of `interval` to a raw series.
///
/// - weekly: last close of each week, labelled with that week's Friday at 00:00;
///   weeks without data produce no point
/// - daily: unchanged
/// - 1h: every timestamp moved forward by [`HOURLY_OFFSET_HOURS`]
pub fn resample(series: PriceSeries, interval: Interval) -> Result<PriceSeries> {
    match interval {
        Interval::Daily => Ok(series),
        Interval::Hour1 => {
            let offset = Duration::hours(HOURLY_OFFSET_HOURS);
            PriceSeries::from_pairs(series.points().iter().map(|p| (p.timestamp + offset, p.close)))
        }
        Interval::Weekly => weekly(&series),
    }
}

fn weekly(series: &PriceSeries) -> Result<PriceSeries> {
    let mut weeks: Vec<(NaiveDate, f64)> = Vec::new();

    for point in series.points() {
        let friday = week_ending_friday(point.timestamp);
        match weeks.last_mut() {
            Some(last) if last.0 == friday => last.1 = point.close,
            _ => weeks.push((friday, point.close)),
        }
    }

    let mut labelled = Vec::with_capacity(weeks.len());
    for (friday, close) in weeks {
        let midnight = friday
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| RrgError::InvalidData(format!("no midnight on {}", friday)))?;
        labelled.push((midnight.and_utc(), close));
    }
    PriceSeries::from_pairs(labelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_week_ending_friday() {
        // 2024-03-04 is a Monday
        let friday = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        assert_eq!(week_ending_friday(at(2024, 3, 4, 0)), friday);
        assert_eq!(week_ending_friday(at(2024, 3, 8, 16)), friday);
        assert_eq!(
            week_ending_friday(at(2024, 3, 9, 0)),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_weekly_takes_last_close_of_each_week() {
        let series = PriceSeries::from_pairs(vec![
            (at(2024, 3, 4, 0), 10.0),
            (at(2024, 3, 6, 0), 11.0),
            (at(2024, 3, 7, 0), 12.0),
            // no data the week ending 2024-03-15
            (at(2024, 3, 18, 0), 13.0),
            (at(2024, 3, 22, 0), 14.0),
        ])
        .unwrap();

        let weekly = resample(series, Interval::Weekly).unwrap();
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly.points()[0].timestamp, at(2024, 3, 8, 0));
        assert_eq!(weekly.points()[0].close, 12.0);
        assert_eq!(weekly.points()[1].timestamp, at(2024, 3, 22, 0));
        assert_eq!(weekly.points()[1].close, 14.0);
    }

    #[test]
    fn test_hourly_shift() {
        let series = PriceSeries::from_pairs(vec![(at(2024, 3, 4, 3), 1.0), (at(2024, 3, 4, 4), 2.0)]).unwrap();
        let shifted = resample(series, Interval::Hour1).unwrap();
        assert_eq!(shifted.points()[0].timestamp, at(2024, 3, 4, 10));
        assert_eq!(shifted.points()[1].timestamp, at(2024, 3, 4, 11));
    }

    #[test]
    fn test_daily_unchanged() {
        let series = PriceSeries::from_pairs(vec![(at(2024, 3, 4, 0), 1.0)]).unwrap();
        assert_eq!(resample(series.clone(), Interval::Daily).unwrap(), series);
    }
}
