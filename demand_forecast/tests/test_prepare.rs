use chrono::{Duration, NaiveDate};
use demand_forecast::{prepare_series, ForecastError};
use stock_series::{Cadence, ConsumptionSeries};

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn weekly_series(pairs: &[(i64, f64)]) -> ConsumptionSeries {
    ConsumptionSeries::from_pairs(
        pairs
            .iter()
            .map(|&(week, quantity)| (start_date() + Duration::weeks(week), quantity))
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_complete_series_passes_through() {
    let series = weekly_series(&[(0, 10.0), (1, 12.0), (2, 11.0)]);
    let prepared = prepare_series(&series, Cadence::weekly()).unwrap();

    assert_eq!(prepared.len(), 3);
    assert_eq!(prepared.values(), &[10.0, 12.0, 11.0]);
    assert!(prepared.imputed().iter().all(|&flag| !flag));
    assert_eq!(prepared.observed_count(), 3);
}

#[test]
fn test_gap_is_imputed_with_neighbor_mean() {
    // Week 2 is missing
    let series = weekly_series(&[(0, 10.0), (1, 12.0), (3, 16.0)]);
    let prepared = prepare_series(&series, Cadence::weekly()).unwrap();

    assert_eq!(prepared.len(), 4);
    assert_eq!(prepared.values()[2], 14.0); // (12 + 16) / 2
    assert_eq!(prepared.imputed(), &[false, false, true, false]);
    assert!(prepared.is_imputed(2));
}

#[test]
fn test_grid_has_one_point_per_cadence_step() {
    let series = weekly_series(&[(0, 10.0), (2, 12.0), (5, 16.0)]);
    let prepared = prepare_series(&series, Cadence::weekly()).unwrap();

    assert_eq!(prepared.len(), 6);
    for (i, window) in prepared.dates().windows(2).enumerate() {
        assert_eq!(
            (window[1] - window[0]).num_days(),
            7,
            "step {} is not one week",
            i
        );
    }
}

#[test]
fn test_no_unmarked_synthetic_points() {
    let series = weekly_series(&[(0, 10.0), (1, 12.0), (4, 20.0)]);
    let prepared = prepare_series(&series, Cadence::weekly()).unwrap();

    // Every non-imputed point must carry an original observation
    let observed: Vec<(NaiveDate, f64)> = prepared
        .dates()
        .iter()
        .zip(prepared.values().iter())
        .zip(prepared.imputed().iter())
        .filter(|(_, &imputed)| !imputed)
        .map(|((&date, &value), _)| (date, value))
        .collect();

    assert_eq!(
        observed,
        vec![
            (start_date(), 10.0),
            (start_date() + Duration::weeks(1), 12.0),
            (start_date() + Duration::weeks(4), 20.0),
        ]
    );
}

#[test]
fn test_negative_quantity_clamped_and_marked() {
    let series = weekly_series(&[(0, 10.0), (1, -5.0), (2, 12.0)]);
    let prepared = prepare_series(&series, Cadence::weekly()).unwrap();

    assert_eq!(prepared.values()[1], 0.0);
    assert!(prepared.is_imputed(1));
    assert_eq!(prepared.observed_count(), 2);
}

#[test]
fn test_off_cadence_observation_is_invalid() {
    let series = ConsumptionSeries::from_pairs(vec![
        (start_date(), 10.0),
        (start_date() + Duration::weeks(1), 12.0),
        (start_date() + Duration::days(10), 11.0),
    ])
    .unwrap();

    assert!(matches!(
        prepare_series(&series, Cadence::weekly()),
        Err(ForecastError::InvalidSeries(_))
    ));
}

#[test]
fn test_single_point_is_insufficient() {
    let series = weekly_series(&[(0, 10.0)]);

    assert!(matches!(
        prepare_series(&series, Cadence::weekly()),
        Err(ForecastError::InsufficientData { needed: 2, got: 1 })
    ));
}

#[test]
fn test_daily_cadence() {
    let series = ConsumptionSeries::from_pairs(vec![
        (start_date(), 4.0),
        (start_date() + Duration::days(1), 6.0),
        (start_date() + Duration::days(3), 8.0),
    ])
    .unwrap();

    let prepared = prepare_series(&series, Cadence::daily()).unwrap();
    assert_eq!(prepared.len(), 4);
    assert_eq!(prepared.values()[2], 7.0); // (6 + 8) / 2
    assert!(prepared.is_imputed(2));
}

#[test]
fn test_truncated_keeps_prefix() {
    let series = weekly_series(&[(0, 10.0), (1, 12.0), (2, 11.0), (3, 13.0)]);
    let prepared = prepare_series(&series, Cadence::weekly()).unwrap();

    let prefix = prepared.truncated(2);
    assert_eq!(prefix.len(), 2);
    assert_eq!(prefix.values(), &prepared.values()[..2]);
    assert_eq!(prefix.cadence(), prepared.cadence());
}
