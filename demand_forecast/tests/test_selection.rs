use std::f64::consts::PI;

use chrono::{Duration, NaiveDate};
use demand_forecast::models::arima::ArimaModel;
use demand_forecast::models::moving_average::MovingAverageModel;
use demand_forecast::models::seasonal::SeasonalTrendModel;
use demand_forecast::{
    forecast_accuracy, prepare_series, select_and_forecast, FittedModel, ForecastError,
    ForecastModel, ModelKind, PreparedSeries, SelectorConfig,
};
use stock_series::{Cadence, ConsumptionSeries};

fn prepared(values: &[f64]) -> PreparedSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let series = ConsumptionSeries::from_pairs(
        values
            .iter()
            .enumerate()
            .map(|(week, &quantity)| (start + Duration::weeks(week as i64), quantity))
            .collect(),
    )
    .unwrap();

    prepare_series(&series, Cadence::weekly()).unwrap()
}

fn seasonal_component(t: usize) -> f64 {
    10.0 * (2.0 * PI * (t % 7) as f64 / 7.0).sin()
}

/// 52 weekly points with a clear upward linear trend and weekly seasonality
/// of amplitude 10.
fn yearly_series() -> Vec<f64> {
    (0..52)
        .map(|t| 100.0 + 2.0 * t as f64 + seasonal_component(t))
        .collect()
}

#[test]
fn test_seasonal_series_selects_seasonal_model() {
    let series = prepared(&yearly_series());
    let outcome = select_and_forecast(&series, 1, &SelectorConfig::default()).unwrap();

    assert_eq!(outcome.winner.kind, ModelKind::SeasonalTrend);
    let rmse = outcome.winner.holdout_rmse.unwrap();
    assert!(rmse < 0.5, "holdout RMSE unexpectedly large: {}", rmse);

    // Week 53 continues the trend plus the seasonal swing
    let expected = 100.0 + 2.0 * 52.0 + seasonal_component(52);
    let step = outcome.forecast.steps()[0];
    assert!(
        (step.point - expected).abs() < 1e-6,
        "week 53 forecast {} far from {}",
        step.point,
        expected
    );
    assert!(step.lower <= step.point && step.point <= step.upper);
}

#[test]
fn test_winner_has_lowest_holdout_rmse() {
    let values: Vec<f64> = (0..24)
        .map(|t| 40.0 + 1.2 * t as f64 + if t % 5 == 0 { 3.0 } else { -1.0 })
        .collect();
    let series = prepared(&values);
    let config = SelectorConfig::default();

    let outcome = select_and_forecast(&series, 4, &config).unwrap();
    let winner_rmse = outcome.winner.holdout_rmse.unwrap();

    // Recompute every feasible candidate's score by hand
    let n = series.len();
    let holdout = 4usize.min(n / 4).max(1);
    let prefix = series.truncated(n - holdout);
    let tail = &series.values()[n - holdout..];

    let mut rivals = Vec::new();
    if let Ok(fitted) = SeasonalTrendModel::new(config.season_length).unwrap().fit(&prefix) {
        rivals.push(fitted.forecast(holdout).unwrap());
    }
    if let Ok(fitted) = ArimaModel::new().fit(&prefix) {
        rivals.push(fitted.forecast(holdout).unwrap());
    }
    if let Ok(fitted) = MovingAverageModel::new(config.ma_window).unwrap().fit(&prefix) {
        rivals.push(fitted.forecast(holdout).unwrap());
    }

    assert!(!rivals.is_empty());
    for forecast in rivals {
        let rmse = forecast_accuracy(&forecast.points(), tail).unwrap().rmse;
        assert!(
            winner_rmse <= rmse + 1e-9,
            "winner rmse {} beaten by rival rmse {}",
            winner_rmse,
            rmse
        );
    }
}

#[test]
fn test_ties_resolve_by_priority_order() {
    // Constant series: every candidate scores a held-out RMSE of zero, so
    // the fixed priority order must decide.
    let series = prepared(&[20.0; 28]);
    let outcome = select_and_forecast(&series, 3, &SelectorConfig::default()).unwrap();

    assert_eq!(outcome.winner.kind, ModelKind::SeasonalTrend);
    assert_eq!(outcome.winner.holdout_rmse, Some(0.0));
}

#[test]
fn test_selection_is_deterministic() {
    let values: Vec<f64> = (0..26)
        .map(|t| 55.0 + 0.7 * t as f64 + seasonal_component(t))
        .collect();
    let series = prepared(&values);

    let first = select_and_forecast(&series, 5, &SelectorConfig::default()).unwrap();
    let second = select_and_forecast(&series, 5, &SelectorConfig::default()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_infeasible_candidates_are_skipped_not_fatal() {
    // 10 points: the seasonal candidate (needs 2 cycles) cannot fit even the
    // full series, but selection proceeds with the rest.
    let values: Vec<f64> = (0..10).map(|t| 15.0 + t as f64).collect();
    let series = prepared(&values);

    let outcome = select_and_forecast(&series, 3, &SelectorConfig::default()).unwrap();

    assert_ne!(outcome.winner.kind, ModelKind::SeasonalTrend);
    assert!(outcome.winner.holdout_rmse.is_some());
    assert!(outcome
        .skipped
        .iter()
        .any(|skip| skip.kind == ModelKind::SeasonalTrend));
}

#[test]
fn test_short_series_picks_by_priority_without_scoring() {
    let series = prepared(&[10.0, 12.0, 11.0]);
    let outcome = select_and_forecast(&series, 2, &SelectorConfig::default()).unwrap();

    // No held-out tail is possible at 3 points; seasonal and ARIMA are
    // infeasible and the baseline wins by default without a score.
    assert_eq!(outcome.winner.kind, ModelKind::MovingAverage);
    assert_eq!(outcome.winner.holdout_rmse, None);
    assert_eq!(outcome.skipped.len(), 2);
}

#[test]
fn test_two_point_series_falls_through_to_baseline() {
    let series = prepared(&[10.0, 14.0]);
    let outcome = select_and_forecast(&series, 2, &SelectorConfig::default()).unwrap();

    assert_eq!(outcome.winner.kind, ModelKind::MovingAverage);
    for step in outcome.forecast.steps() {
        assert!((step.point - 12.0).abs() < 1e-9);
        assert!(step.lower <= step.point && step.point <= step.upper);
    }
}

#[test]
fn test_zero_horizon_is_invalid() {
    let series = prepared(&[10.0, 12.0, 11.0, 13.0, 12.0, 14.0]);

    assert!(matches!(
        select_and_forecast(&series, 0, &SelectorConfig::default()),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_winner_refit_covers_requested_horizon() {
    let values: Vec<f64> = (0..20).map(|t| 30.0 + 1.5 * t as f64).collect();
    let series = prepared(&values);

    let outcome = select_and_forecast(&series, 9, &SelectorConfig::default()).unwrap();
    assert_eq!(outcome.forecast.len(), 9);
}
