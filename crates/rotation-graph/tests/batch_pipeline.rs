use approx::assert_abs_diff_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rotation_graph::{compute, BatchOrchestrator, CacheKey, RrgCache, SectorInput};
use rrg_core::{BatchStatus, FailureKind, Interval, PriceSeries, Quadrant, RrgConfig, SmoothingMethod};

fn week(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 3, 0, 0, 0).unwrap() + Duration::weeks(n)
}

fn prices(n: i64, f: impl Fn(i64) -> f64) -> PriceSeries {
    PriceSeries::from_pairs((0..n).map(|i| (week(i), f(i)))).unwrap()
}

#[test]
fn short_sector_fails_while_others_succeed() {
    let benchmark = prices(200, |i| 1500.0 + 10.0 * (i as f64 / 7.0).sin());
    let sectors = vec![
        SectorInput::new("BANK", prices(200, |i| 400.0 * 1.002f64.powi(i as i32))),
        SectorInput::new("ENERG", prices(200, |i| 30.0 - 0.05 * i as f64)),
        SectorInput::new("MEDIA", prices(5, |_| 12.0)),
    ];

    let result = BatchOrchestrator::new(RrgConfig::default())
        .run(&benchmark, &sectors)
        .unwrap();

    assert_eq!(result.status(), BatchStatus::Partial);
    assert!(result.contains("BANK"));
    assert!(result.contains("ENERG"));
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].sector, "MEDIA");
    assert_eq!(result.failures[0].kind, FailureKind::InsufficientData);
    assert_eq!(result.latest_timestamp(), Some(week(199)));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["failures"][0]["kind"], "insufficient_data");
}

#[test]
fn tail_keeps_the_most_recent_points() {
    let benchmark = prices(50, |_| 1000.0);
    let sectors = vec![SectorInput::new("ICT", prices(50, |i| 80.0 + (i as f64 / 3.0).cos()))];

    let config = RrgConfig::new(5, 5, SmoothingMethod::Wilder).with_tail_length(5);
    let result = BatchOrchestrator::new(config.clone())
        .run(&benchmark, &sectors)
        .unwrap();

    let full = result.get("ICT").unwrap();
    assert_eq!(full.len(), 50);

    let tailed = result.with_tail(config.tail_length);
    let tail = tailed.get("ICT").unwrap();
    assert_eq!(tail.len(), 5);
    assert_eq!(tail.points()[0].timestamp, week(45));
    assert_eq!(tail.last(), full.last());
    assert_eq!(
        tail.last().unwrap().quadrant(),
        Quadrant::classify(full.last().unwrap().rs_ratio, full.last().unwrap().rs_momentum)
    );
}

#[test]
fn constant_relative_strength_sits_on_the_centre() {
    let benchmark = prices(25, |_| 1500.0);
    let sector = prices(25, |_| 1800.0);

    let series = compute(&sector, &benchmark, 10, 10, SmoothingMethod::Wilder).unwrap();
    assert!(series.len() >= 5);
    for point in series.points() {
        assert_abs_diff_eq!(point.rs_ratio, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(point.rs_momentum, 100.0, epsilon = 1e-9);
    }
}

#[test]
fn disjoint_timestamps_give_empty_series() {
    let benchmark = prices(40, |_| 1500.0);
    let sector = PriceSeries::from_pairs((0..40).map(|i| (week(i) + Duration::days(1), 50.0))).unwrap();

    let series = compute(&sector, &benchmark, 10, 10, SmoothingMethod::Wilder).unwrap();
    assert!(series.is_empty());

    let result = BatchOrchestrator::new(RrgConfig::default())
        .run(&benchmark, &[SectorInput::new("FIN", sector)])
        .unwrap();
    assert_eq!(result.status(), BatchStatus::AllFailed);
    assert_eq!(result.failures[0].kind, FailureKind::InsufficientData);
}

#[test]
fn cached_batch_is_reused_until_expiry() {
    let benchmark = prices(60, |i| 1500.0 + i as f64);
    let sectors = vec![SectorInput::new("PROP", prices(60, |i| 9.0 + 0.01 * i as f64))];
    let config = RrgConfig::for_interval(Interval::Weekly);
    let orchestrator = BatchOrchestrator::new(config.clone());
    let cache = RrgCache::new();
    let key = CacheKey::new(Interval::Weekly, &config);

    let first = cache
        .get_or_compute(key, || orchestrator.run(&benchmark, &sectors))
        .unwrap();
    let second = cache
        .get_or_compute(key, || panic!("should be served from cache"))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);
}
