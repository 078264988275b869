//! Forecast results and regime selection metadata.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Forecasting strategy selected from the amount of usable history.
///
/// The regime is a pure function of the gap-filled series length; there is
/// no hidden state in the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastRegime {
    /// Under 7 days of history: flat forecast at the historical mean.
    Sparse,
    /// 7 to 14 days: exponential smoothing with an additive trend.
    Short,
    /// More than two full weekly cycles: additive trend plus additive
    /// weekly seasonality.
    Full,
}

impl ForecastRegime {
    /// Select the regime for a gap-filled series of `days` days.
    #[must_use]
    pub const fn for_history(days: usize) -> Self {
        match days {
            0..=6 => Self::Sparse,
            7..=14 => Self::Short,
            _ => Self::Full,
        }
    }

    /// Display label for responses.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sparse => "sparse",
            Self::Short => "short",
            Self::Full => "full",
        }
    }
}

/// Metadata describing how a forecast was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetadata {
    /// Strategy that produced the point forecasts.
    pub regime: ForecastRegime,
    /// Days of gap-filled history fed to the model.
    pub historical_days_used: usize,
    /// Mean unit price of the filtered dataset, used for revenue projection.
    pub avg_price: f64,
    /// Forecast horizon length in days.
    pub period_days: usize,
    /// Spike threshold multiplier applied to both spike passes.
    pub spike_threshold: f64,
}

/// A short-horizon demand forecast with spike flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Predicted quantity per forecast day.
    pub forecast: BTreeMap<NaiveDate, f64>,
    /// Predicted quantity x mean historical price per forecast day.
    pub revenue_forecast: BTreeMap<NaiveDate, f64>,
    /// Historical spike flags. Days without a full trailing window are
    /// omitted rather than reported as false.
    pub historical_spikes: BTreeMap<NaiveDate, bool>,
    /// Spike flags for the forecast horizon, judged against the global
    /// historical distribution.
    pub forecast_spikes: BTreeMap<NaiveDate, bool>,
    /// How the forecast was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ForecastMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regime_is_pure_function_of_length() {
        assert_eq!(ForecastRegime::for_history(0), ForecastRegime::Sparse);
        assert_eq!(ForecastRegime::for_history(6), ForecastRegime::Sparse);
        assert_eq!(ForecastRegime::for_history(7), ForecastRegime::Short);
        assert_eq!(ForecastRegime::for_history(10), ForecastRegime::Short);
        assert_eq!(ForecastRegime::for_history(14), ForecastRegime::Short);
        assert_eq!(ForecastRegime::for_history(15), ForecastRegime::Full);
        assert_eq!(ForecastRegime::for_history(20), ForecastRegime::Full);
    }

    #[test]
    fn test_regime_labels() {
        assert_eq!(ForecastRegime::Sparse.label(), "sparse");
        assert_eq!(ForecastRegime::Short.label(), "short");
        assert_eq!(ForecastRegime::Full.label(), "full");
    }
}
