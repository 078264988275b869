//! The forecast engine.
//!
//! Builds a gap-filled daily quantity series, selects a smoothing strategy
//! from the amount of history, and produces point forecasts with spike
//! flags for both the history and the horizon.
//!
//! Strategy selection is a pure function of series length:
//!
//! | regime | condition | method |
//! |---|---|---|
//! | sparse | n < 7 | flat forecast at the historical mean |
//! | short | 7 <= n <= 14 | exponential smoothing with additive trend |
//! | full | n > 14 | additive trend + additive weekly seasonality |
//!
//! The full regime needs more than two complete weekly cycles; at exactly
//! two the seasonal components cannot be validated against anything, so
//! 14-day histories stay on the trend-only model.
//!
//! A fit failure in the short/full regimes falls back to the sparse flat
//! mean: forecasting always returns a usable series for non-empty input.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use shopsight_core::{DailySeries, ForecastMetadata, ForecastRegime, ForecastResult, SalesRecord};

use super::metrics::daily_quantity;

/// Default spike threshold multiplier.
pub const DEFAULT_SPIKE_THRESHOLD: f64 = 1.5;
/// Weekly seasonality period for the full regime.
pub const SEASONAL_PERIOD: usize = 7;
/// Trailing window length for historical spike detection.
const ROLLING_WINDOW: usize = 7;

/// Smoothing parameter grid for the trend-only fit.
const TREND_GRID: [f64; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];
/// Coarser grid for the three-parameter seasonal fit.
const SEASONAL_GRID: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];

/// A model fit that could not produce a usable forecast.
#[derive(Debug)]
enum FitError {
    /// Not enough points for the model's initialization.
    TooShort,
    /// The optimization produced no finite candidate.
    NonFinite,
}

/// Forecast demand for the next `period_days` days.
///
/// The horizon starts the day after the last observed date. Revenue
/// projection multiplies each predicted quantity by the mean unit price of
/// the filtered records. An empty input yields an empty result with no
/// metadata.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Row counts will never exceed f64 precision
pub fn forecast(records: &[SalesRecord], period_days: usize, spike_threshold: f64) -> ForecastResult {
    let series = DailySeries::gap_filled(&daily_quantity(records));
    if series.is_empty() {
        return ForecastResult::default();
    }

    let regime = ForecastRegime::for_history(series.len());
    let values = series.values();

    let (predicted, regime) = match regime {
        ForecastRegime::Sparse => (flat_forecast(&series, period_days), regime),
        ForecastRegime::Short => match holt_forecast(&values, period_days) {
            Ok(predicted) => (predicted, regime),
            Err(e) => {
                tracing::warn!("trend fit failed ({e:?}), falling back to flat mean");
                (flat_forecast(&series, period_days), ForecastRegime::Sparse)
            }
        },
        ForecastRegime::Full => match holt_winters_forecast(&values, period_days, SEASONAL_PERIOD) {
            Ok(predicted) => (predicted, regime),
            Err(e) => {
                tracing::warn!("seasonal fit failed ({e:?}), falling back to flat mean");
                (flat_forecast(&series, period_days), ForecastRegime::Sparse)
            }
        },
    };

    let avg_price = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| r.price).sum::<f64>() / records.len() as f64
    };

    let horizon = horizon_dates(&series, period_days);
    let forecast: BTreeMap<NaiveDate, f64> =
        horizon.iter().copied().zip(predicted.iter().copied()).collect();
    let revenue_forecast: BTreeMap<NaiveDate, f64> = forecast
        .iter()
        .map(|(&d, &q)| (d, q * avg_price))
        .collect();

    let historical_spikes = rolling_spikes(&series, spike_threshold);
    let forecast_spikes = global_spikes(&series, &forecast, spike_threshold);

    ForecastResult {
        forecast,
        revenue_forecast,
        historical_spikes,
        forecast_spikes,
        metadata: Some(ForecastMetadata {
            regime,
            historical_days_used: series.len(),
            avg_price,
            period_days,
            spike_threshold,
        }),
    }
}

/// The forecast dates: `period_days` days starting after the last observation.
fn horizon_dates(series: &DailySeries, period_days: usize) -> Vec<NaiveDate> {
    let Some(last) = series.last_date() else {
        return Vec::new();
    };

    let mut dates = Vec::with_capacity(period_days);
    let mut day = last;
    for _ in 0..period_days {
        let Some(next) = day.checked_add_days(Days::new(1)) else {
            break;
        };
        dates.push(next);
        day = next;
    }
    dates
}

/// Sparse regime: the historical mean, repeated for the horizon.
fn flat_forecast(series: &DailySeries, period_days: usize) -> Vec<f64> {
    vec![series.mean(); period_days]
}

// =============================================================================
// Exponential Smoothing
// =============================================================================

/// Trend-only exponential smoothing (additive trend, no seasonality).
///
/// Smoothing parameters are chosen by grid search minimizing the one-step
/// in-sample squared error.
#[allow(clippy::cast_precision_loss)] // Horizon lengths will never exceed f64 precision
fn holt_forecast(values: &[f64], horizon: usize) -> Result<Vec<f64>, FitError> {
    if values.len() < 2 {
        return Err(FitError::TooShort);
    }

    let mut best: Option<(f64, f64, f64)> = None; // (sse, level, trend)
    for &alpha in &TREND_GRID {
        for &beta in &TREND_GRID {
            let Some((sse, level, trend)) = holt_fit(values, alpha, beta) else {
                continue;
            };
            if best.is_none_or(|(best_sse, _, _)| sse < best_sse) {
                best = Some((sse, level, trend));
            }
        }
    }

    let (_, level, trend) = best.ok_or(FitError::NonFinite)?;
    Ok((1..=horizon)
        .map(|h| trend.mul_add(h as f64, level))
        .collect())
}

/// One Holt fit pass. Returns `None` when the recursion leaves f64 range.
fn holt_fit(values: &[f64], alpha: f64, beta: f64) -> Option<(f64, f64, f64)> {
    let first = values.first().copied()?;
    let second = values.get(1).copied()?;

    let mut level = first;
    let mut trend = second - first;
    let mut sse = 0.0;

    for y in values.iter().copied().skip(1) {
        let pred = level + trend;
        let err = y - pred;
        sse += err * err;

        let new_level = alpha.mul_add(y, (1.0 - alpha) * (level + trend));
        trend = beta.mul_add(new_level - level, (1.0 - beta) * trend);
        level = new_level;
    }

    (sse.is_finite() && level.is_finite() && trend.is_finite()).then_some((sse, level, trend))
}

/// Additive Holt-Winters: level, trend and a `period`-day seasonal cycle.
///
/// Requires two full seasons for initialization; the regime gate guarantees
/// this for the weekly period.
#[allow(clippy::cast_precision_loss)] // Horizon lengths will never exceed f64 precision
fn holt_winters_forecast(values: &[f64], horizon: usize, period: usize) -> Result<Vec<f64>, FitError> {
    if period == 0 || values.len() < 2 * period {
        return Err(FitError::TooShort);
    }

    let mut best: Option<(f64, f64, f64, Vec<f64>)> = None; // (sse, level, trend, seasonals)
    for &alpha in &SEASONAL_GRID {
        for &beta in &SEASONAL_GRID {
            for &gamma in &SEASONAL_GRID {
                let Some(fit) = holt_winters_fit(values, period, alpha, beta, gamma) else {
                    continue;
                };
                if best.as_ref().is_none_or(|(best_sse, ..)| fit.0 < *best_sse) {
                    best = Some(fit);
                }
            }
        }
    }

    let (_, level, trend, seasonals) = best.ok_or(FitError::NonFinite)?;
    Ok((1..=horizon)
        .map(|h| {
            let seasonal = seasonals
                .get((values.len() + h - 1) % period)
                .copied()
                .unwrap_or(0.0);
            trend.mul_add(h as f64, level) + seasonal
        })
        .collect())
}

/// One Holt-Winters fit pass. Returns `None` when the recursion leaves
/// f64 range.
#[allow(clippy::cast_precision_loss)] // Season lengths will never exceed f64 precision
fn holt_winters_fit(
    values: &[f64],
    period: usize,
    alpha: f64,
    beta: f64,
    gamma: f64,
) -> Option<(f64, f64, f64, Vec<f64>)> {
    let season1 = values.get(..period)?;
    let season2 = values.get(period..2 * period)?;

    let mean1 = season1.iter().sum::<f64>() / period as f64;
    let mean2 = season2.iter().sum::<f64>() / period as f64;

    let mut level = mean1;
    let mut trend = (mean2 - mean1) / period as f64;
    let mut seasonals: Vec<f64> = season1.iter().map(|y| y - mean1).collect();

    let mut sse = 0.0;
    for (t, y) in values.iter().copied().enumerate() {
        let idx = t % period;
        let seasonal = seasonals.get(idx).copied().unwrap_or(0.0);

        let pred = level + trend + seasonal;
        let err = y - pred;
        sse += err * err;

        let new_level = alpha.mul_add(y - seasonal, (1.0 - alpha) * (level + trend));
        let new_trend = beta.mul_add(new_level - level, (1.0 - beta) * trend);
        if let Some(s) = seasonals.get_mut(idx) {
            *s = gamma.mul_add(y - new_level, (1.0 - gamma) * seasonal);
        }
        level = new_level;
        trend = new_trend;
    }

    let finite =
        sse.is_finite() && level.is_finite() && trend.is_finite() && seasonals.iter().all(|s| s.is_finite());
    finite.then_some((sse, level, trend, seasonals))
}

// =============================================================================
// Spike Detection
// =============================================================================

/// Historical spikes against a trailing 7-day rolling window.
///
/// The window is left-aligned and ends at the day itself; the first 6 days
/// have no full window and are omitted from the output rather than
/// reported as false. The deviation is the sample standard deviation.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Window lengths will never exceed f64 precision
pub fn rolling_spikes(series: &DailySeries, threshold: f64) -> BTreeMap<NaiveDate, bool> {
    let points = series.points();
    let mut spikes = BTreeMap::new();

    if points.len() < ROLLING_WINDOW {
        return spikes;
    }

    for window in points.windows(ROLLING_WINDOW) {
        let Some(&(date, value)) = window.last() else {
            continue;
        };

        let mean = window.iter().map(|(_, v)| v).sum::<f64>() / ROLLING_WINDOW as f64;
        let ss: f64 = window.iter().map(|(_, v)| (v - mean).powi(2)).sum();
        let std = (ss / (ROLLING_WINDOW - 1) as f64).sqrt();

        spikes.insert(date, value > threshold.mul_add(std, mean));
    }

    spikes
}

/// Forecast spikes against the global historical distribution.
///
/// There is no future rolling history to use, so a forecast day is a spike
/// when its prediction exceeds the global historical mean plus
/// `threshold` sample deviations. With under two days of history the
/// deviation is undefined and nothing is flagged.
#[must_use]
pub fn global_spikes(
    series: &DailySeries,
    forecast: &BTreeMap<NaiveDate, f64>,
    threshold: f64,
) -> BTreeMap<NaiveDate, bool> {
    let mean = series.mean();
    let std = series.sample_std();

    forecast
        .iter()
        .map(|(&date, &value)| {
            let spike = std.is_some_and(|std| value > threshold.mul_add(std, mean));
            (date, spike)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).expect("valid date")
    }

    fn record(day: u32, price: f64, quantity: f64) -> SalesRecord {
        SalesRecord {
            date: date(day),
            product: "Widget".to_string(),
            category: "X".to_string(),
            item_type: "Unknown".to_string(),
            price,
            cost: 0.0,
            quantity,
            invoice_id: None,
        }
    }

    fn series_of(values: &[f64]) -> DailySeries {
        let totals: BTreeMap<NaiveDate, f64> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (date(1 + u32::try_from(i).expect("small index")), v))
            .collect();
        DailySeries::gap_filled(&totals)
    }

    #[test]
    fn test_sparse_regime_is_flat_mean() {
        let records: Vec<SalesRecord> = (1..=6).map(|d| record(d, 10.0, f64::from(d))).collect();
        let result = forecast(&records, 7, DEFAULT_SPIKE_THRESHOLD);

        let meta = result.metadata.expect("non-empty input has metadata");
        assert_eq!(meta.regime, ForecastRegime::Sparse);
        assert_eq!(meta.historical_days_used, 6);

        let mean = 3.5;
        assert_eq!(result.forecast.len(), 7);
        for value in result.forecast.values() {
            assert!((value - mean).abs() < 1e-9);
        }
    }

    #[test]
    fn test_short_regime_tracks_linear_trend() {
        // Perfectly linear demand fits the trend model exactly
        let records: Vec<SalesRecord> = (1..=10).map(|d| record(d, 10.0, f64::from(d))).collect();
        let result = forecast(&records, 3, DEFAULT_SPIKE_THRESHOLD);

        let meta = result.metadata.expect("non-empty input has metadata");
        assert_eq!(meta.regime, ForecastRegime::Short);

        let predicted: Vec<f64> = result.forecast.values().copied().collect();
        for (i, value) in predicted.iter().enumerate() {
            let expected = 11.0 + i as f64;
            assert!(
                (value - expected).abs() < 0.5,
                "day {i}: predicted {value}, expected about {expected}"
            );
        }
    }

    #[test]
    fn test_two_full_cycles_stay_on_trend_model() {
        // Exactly two weekly cycles is not enough to validate a seasonal fit
        let records: Vec<SalesRecord> = (1..=14).map(|d| record(d, 10.0, 5.0)).collect();
        let result = forecast(&records, 7, DEFAULT_SPIKE_THRESHOLD);
        let meta = result.metadata.expect("non-empty input has metadata");
        assert_eq!(meta.regime, ForecastRegime::Short);
        assert_eq!(meta.historical_days_used, 14);
    }

    #[test]
    fn test_full_regime_learns_weekly_cycle() {
        // Three identical weeks with a Saturday surge
        let week = [2.0, 2.0, 2.0, 2.0, 2.0, 9.0, 2.0];
        let records: Vec<SalesRecord> = week
            .iter()
            .cycle()
            .take(21)
            .enumerate()
            .map(|(i, &q)| record(1 + u32::try_from(i).expect("small index"), 10.0, q))
            .collect();

        let result = forecast(&records, 7, DEFAULT_SPIKE_THRESHOLD);
        let meta = result.metadata.expect("non-empty input has metadata");
        assert_eq!(meta.regime, ForecastRegime::Full);

        // The surge day (position 5 of the cycle) should stand out in the horizon
        let predicted: Vec<f64> = result.forecast.values().copied().collect();
        let surge = predicted.get(5).copied().expect("7-day horizon");
        let quiet = predicted.first().copied().expect("7-day horizon");
        assert!(
            surge > quiet + 3.0,
            "expected the learned cycle to surge (quiet {quiet}, surge {surge})"
        );
    }

    #[test]
    fn test_horizon_starts_day_after_last_observation() {
        let records: Vec<SalesRecord> = (1..=6).map(|d| record(d, 10.0, 1.0)).collect();
        let result = forecast(&records, 3, DEFAULT_SPIKE_THRESHOLD);

        let dates: Vec<NaiveDate> = result.forecast.keys().copied().collect();
        assert_eq!(dates, vec![date(7), date(8), date(9)]);
    }

    #[test]
    fn test_gap_days_count_toward_regime() {
        // 2 observed days spanning 10 calendar days: gap-filling makes this
        // a 10-day series, which is the short regime
        let records = vec![record(1, 10.0, 4.0), record(10, 10.0, 6.0)];
        let result = forecast(&records, 2, DEFAULT_SPIKE_THRESHOLD);
        let meta = result.metadata.expect("non-empty input has metadata");
        assert_eq!(meta.historical_days_used, 10);
        assert_eq!(meta.regime, ForecastRegime::Short);
    }

    #[test]
    fn test_empty_input_is_empty_result() {
        let result = forecast(&[], 7, DEFAULT_SPIKE_THRESHOLD);
        assert!(result.forecast.is_empty());
        assert!(result.revenue_forecast.is_empty());
        assert!(result.historical_spikes.is_empty());
        assert!(result.forecast_spikes.is_empty());
        assert!(result.metadata.is_none());
    }

    #[test]
    fn test_revenue_projection_uses_mean_price() {
        let records: Vec<SalesRecord> = (1..=6).map(|d| record(d, 10.0, 2.0)).collect();
        let result = forecast(&records, 2, DEFAULT_SPIKE_THRESHOLD);

        for (day, quantity) in &result.forecast {
            let revenue = result.revenue_forecast.get(day).expect("same dates");
            assert!((revenue - quantity * 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rolling_spikes_omit_first_six_days() {
        let series = series_of(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 20.0]);
        let spikes = rolling_spikes(&series, DEFAULT_SPIKE_THRESHOLD);

        // Days 1-6 have no full trailing window
        assert_eq!(spikes.len(), 3);
        assert!(!spikes.contains_key(&date(6)));
        assert_eq!(spikes.get(&date(7)), Some(&false));
        assert_eq!(spikes.get(&date(9)), Some(&true));
    }

    #[test]
    fn test_rolling_spikes_short_series_empty() {
        let series = series_of(&[1.0, 2.0, 3.0]);
        assert!(rolling_spikes(&series, DEFAULT_SPIKE_THRESHOLD).is_empty());
    }

    #[test]
    fn test_global_spikes_flag_outliers_only() {
        let series = series_of(&[2.0, 2.0, 2.0, 2.0, 2.0, 2.0]);
        let mut horizon = BTreeMap::new();
        horizon.insert(date(7), 2.0);
        horizon.insert(date(8), 50.0);

        let spikes = global_spikes(&series, &horizon, DEFAULT_SPIKE_THRESHOLD);
        assert_eq!(spikes.get(&date(7)), Some(&false));
        assert_eq!(spikes.get(&date(8)), Some(&true));
    }

    #[test]
    fn test_global_spikes_undefined_std_flags_nothing() {
        let series = series_of(&[2.0]);
        let mut horizon = BTreeMap::new();
        horizon.insert(date(2), 100.0);

        let spikes = global_spikes(&series, &horizon, DEFAULT_SPIKE_THRESHOLD);
        assert_eq!(spikes.get(&date(2)), Some(&false));
    }

    #[test]
    fn test_holt_winters_rejects_single_season() {
        let values = vec![1.0; 10];
        assert!(matches!(
            holt_winters_forecast(&values, 7, 7),
            Err(FitError::TooShort)
        ));
    }
}
